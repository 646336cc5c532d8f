// MONDO OBO Parser
//
// Stanza walk over the OBO release. Only `[Term]` stanzas and the fields
// the pipeline consumes are decoded; everything else is skipped line-wise.

use super::models::MondoTerm;
use crate::adapter::Result;
use regex::Regex;
use tracing::{info, warn};

/// Bundled fallback sample: a small consistent slice of MONDO whose xrefs
/// cover the disease ids used by the other bundled samples.
pub const SAMPLE_OBO: &str = r#"format-version: 1.2
ontology: mondo

[Term]
id: MONDO:0004992
name: cancer
def: "A tumor composed of atypical neoplastic cells." [NCIT:C9305]
synonym: "malignant neoplasm" EXACT []
xref: DOID:162 {source="MONDO:equivalentTo"}

[Term]
id: MONDO:0007254
name: breast carcinoma
def: "A carcinoma that arises from epithelial cells of the breast." [NCIT:C4872]
synonym: "carcinoma of breast" EXACT []
xref: DOID:1612 {source="MONDO:equivalentTo"}
xref: EFO:0000305 {source="MONDO:equivalentTo"}
is_a: MONDO:0004992 ! cancer

[Term]
id: MONDO:0008903
name: lung carcinoma
def: "A carcinoma that arises from the lung." [NCIT:C4878]
xref: DOID:1324 {source="MONDO:equivalentTo"}
xref: EFO:0000684 {source="MONDO:equivalentTo"}
is_a: MONDO:0004992 ! cancer

[Term]
id: MONDO:0005575
name: colorectal carcinoma
xref: DOID:9256 {source="MONDO:equivalentTo"}
xref: EFO:0005842 {source="MONDO:equivalentTo"}
is_a: MONDO:0004992 ! cancer

[Term]
id: MONDO:0018874
name: acute myeloid leukemia (obsolete duplicate)
is_obsolete: true
replaced_by: MONDO:0018874

[Typedef]
id: part_of
name: part of
"#;

/// Parse `[Term]` stanzas from OBO content
pub fn parse_obo(content: &str) -> Result<Vec<MondoTerm>> {
    // def/synonym values are quoted with trailing attribution brackets
    let quoted = Regex::new(r#"^"(.*)""#)
        .map_err(|e| crate::adapter::AdapterError::Parse(e.to_string()))?;

    let mut terms = Vec::new();
    let mut current: Option<MondoTerm> = None;
    let mut in_term_stanza = false;

    for line in content.lines() {
        let line = line.trim();

        if line.starts_with('[') {
            if let Some(term) = current.take() {
                push_term(&mut terms, term);
            }
            in_term_stanza = line == "[Term]";
            if in_term_stanza {
                current = Some(MondoTerm::default());
            }
            continue;
        }

        if !in_term_stanza {
            continue;
        }
        let Some(term) = current.as_mut() else {
            continue;
        };
        let Some((tag, value)) = line.split_once(": ") else {
            continue;
        };

        match tag {
            "id" => term.id = value.to_string(),
            "name" => term.name = value.to_string(),
            "def" => {
                if let Some(captures) = quoted.captures(value) {
                    term.definition = captures[1].to_string();
                }
            },
            "synonym" => {
                if let Some(captures) = quoted.captures(value) {
                    term.synonyms.push(captures[1].to_string());
                }
            },
            "xref" => {
                // Trailing source annotations are in braces
                let xref = value.split_whitespace().next().unwrap_or(value);
                term.xrefs.push(xref.to_string());
            },
            "is_a" => {
                // "MONDO:0004992 ! cancer"
                if let Some(parent) = value.split_whitespace().next() {
                    term.parents.push(parent.to_string());
                }
            },
            "is_obsolete" => term.is_obsolete = value == "true",
            "replaced_by" => term.replaced_by = Some(value.to_string()),
            _ => {},
        }
    }

    if let Some(term) = current.take() {
        push_term(&mut terms, term);
    }

    info!("Parsed {} MONDO terms", terms.len());
    Ok(terms)
}

fn push_term(terms: &mut Vec<MondoTerm>, term: MondoTerm) {
    if term.id.is_empty() {
        warn!("Skipping MONDO term stanza without id");
        return;
    }
    terms.push(term);
}

// ============================================================================
// Tests
// ============================================================================
