// STRING Protein Id Resolution
//
// STRING names proteins as "<taxon>.<ensembl-protein-id>" (e.g.
// "9606.ENSP00000216911"). The canonical protein space is UniProt, so the
// resolver builds a reverse index once per run from UniProt's own STRING
// cross-reference export: accession -> semicolon-delimited STRING ids, each
// split again on '.' to drop the taxon segment. The index is built from a
// sorted accession walk so candidate order does not depend on map iteration
// order.

use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, info};

/// Reverse index from Ensembl protein-id suffixes to UniProt accessions
#[derive(Debug, Default)]
pub struct StringIdResolver {
    /// protein-id suffix -> candidate accessions, in stable build order
    index: HashMap<String, Vec<String>>,
    /// reviewed (SwissProt) accession set used for tie-breaking
    reviewed: HashSet<String>,
}

impl StringIdResolver {
    /// Resolver with no index; every lookup fails closed
    pub fn empty() -> Self {
        StringIdResolver::default()
    }

    /// Build the reverse index from UniProt's STRING cross-reference export.
    ///
    /// `xrefs` maps accession -> raw xref field value, e.g.
    /// `"9606.ENSP00000269305;"`. Input pairs are walked in sorted accession
    /// order so repeated runs over the same cached export produce the same
    /// candidate lists.
    pub fn from_xrefs<S: AsRef<str>>(
        xrefs: impl IntoIterator<Item = (S, S)>,
        reviewed: HashSet<String>,
    ) -> Self {
        let sorted: BTreeMap<String, String> = xrefs
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string()))
            .collect();

        let mut index: HashMap<String, Vec<String>> = HashMap::new();

        for (accession, field) in &sorted {
            for string_id in field.split(';').map(str::trim).filter(|s| !s.is_empty()) {
                let Some(suffix) = Self::strip_taxon(string_id) else {
                    continue;
                };

                let candidates = index.entry(suffix.to_string()).or_default();
                if !candidates.iter().any(|c| c == accession) {
                    candidates.push(accession.clone());
                }
            }
        }

        info!(
            "Built STRING reverse index: {} protein suffixes, {} reviewed accessions",
            index.len(),
            reviewed.len()
        );

        StringIdResolver { index, reviewed }
    }

    /// Drop the leading taxon segment from a STRING id.
    ///
    /// `"9606.ENSP00000216911"` -> `"ENSP00000216911"`; an id without a dot
    /// is already a bare protein id.
    pub fn strip_taxon(string_id: &str) -> Option<&str> {
        let string_id = string_id.trim();
        if string_id.is_empty() {
            return None;
        }

        match string_id.split_once('.') {
            Some((_taxon, suffix)) if !suffix.is_empty() => Some(suffix),
            Some(_) => None,
            None => Some(string_id),
        }
    }

    /// Resolve a STRING id to a UniProt accession.
    ///
    /// Tie-break: the first reviewed candidate when one exists, otherwise
    /// the first candidate overall. An empty index or an unknown id returns
    /// None and the caller drops the edge; identifiers are never guessed.
    pub fn resolve(&self, string_id: &str) -> Option<&str> {
        if self.index.is_empty() {
            return None;
        }

        let suffix = Self::strip_taxon(string_id)?;
        let candidates = self.index.get(suffix)?;

        if let Some(reviewed) = candidates.iter().find(|c| self.reviewed.contains(*c)) {
            return Some(reviewed);
        }

        let first = candidates.first().map(String::as_str);
        if first.is_some() && !self.reviewed.is_empty() {
            debug!("No reviewed candidate for {}, using first overall", string_id);
        }
        first
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }
}

// ============================================================================
// Tests
// ============================================================================
