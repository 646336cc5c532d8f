// Gene Id Chain Resolution
//
// Association sources name targets by Ensembl gene id, but the canonical
// species-crossing gene space is NCBI (Entrez) Gene. The chain runs
// Ensembl gene -> UniProt accession -> Entrez Gene id, both legs built from
// UniProt's own cross-reference export:
//
// - Ensembl leg: first transcript of the xref_ensembl field, trailing
//   isoform annotation and version suffix stripped, transcript id rewritten
//   to its gene id form.
// - Entrez leg: first semicolon-delimited value of the xref_geneid field.
//   A key that is present with an empty value is unmapped; only absent keys
//   and empty values are distinguished upstream, and both mean "no
//   mapping" here.

use std::collections::{BTreeMap, HashMap};
use tracing::info;

/// Two-leg resolver from Ensembl gene ids to Entrez Gene ids
#[derive(Debug, Default)]
pub struct GeneIdResolver {
    ensembl_to_uniprot: HashMap<String, String>,
    uniprot_to_entrez: HashMap<String, String>,
}

impl GeneIdResolver {
    /// Resolver with no mappings; every lookup fails closed
    pub fn empty() -> Self {
        GeneIdResolver::default()
    }

    /// Build both legs from UniProt cross-reference exports.
    ///
    /// `ensembl_xrefs` maps accession -> raw xref_ensembl value (e.g.
    /// `"ENST00000269305.9 [P04637-1];ENST00000413465.6"`), `geneid_xrefs`
    /// maps accession -> raw xref_geneid value (e.g. `"7157;"`). Inputs are
    /// walked in sorted accession order so that when two accessions claim
    /// the same gene the winner is stable across runs.
    pub fn from_xrefs<S: AsRef<str>>(
        ensembl_xrefs: impl IntoIterator<Item = (S, S)>,
        geneid_xrefs: impl IntoIterator<Item = (S, S)>,
    ) -> Self {
        let mut uniprot_to_entrez = HashMap::new();
        for (accession, field) in sorted_pairs(geneid_xrefs) {
            // Present-but-empty values are unmapped
            let Some(entrez) = first_delimited_value(&field) else {
                continue;
            };
            uniprot_to_entrez.insert(accession, entrez.to_string());
        }

        let mut ensembl_to_uniprot = HashMap::new();
        for (accession, field) in sorted_pairs(ensembl_xrefs) {
            let Some(gene_id) = ensembl_gene_from_xref(&field) else {
                continue;
            };
            ensembl_to_uniprot.entry(gene_id).or_insert(accession);
        }

        info!(
            "Built gene id chain: {} Ensembl->UniProt, {} UniProt->Entrez mappings",
            ensembl_to_uniprot.len(),
            uniprot_to_entrez.len()
        );

        GeneIdResolver {
            ensembl_to_uniprot,
            uniprot_to_entrez,
        }
    }

    /// Resolve the full chain: Ensembl gene id -> Entrez Gene id
    pub fn resolve(&self, ensembl_gene_id: &str) -> Option<&str> {
        let accession = self.uniprot_for_ensembl(ensembl_gene_id)?;
        self.entrez_for_uniprot(accession)
    }

    /// First leg only
    pub fn uniprot_for_ensembl(&self, ensembl_gene_id: &str) -> Option<&str> {
        let base = ensembl_gene_id.split('.').next().unwrap_or(ensembl_gene_id);
        self.ensembl_to_uniprot.get(base).map(String::as_str)
    }

    /// Second leg only
    pub fn entrez_for_uniprot(&self, accession: &str) -> Option<&str> {
        self.uniprot_to_entrez.get(accession).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.ensembl_to_uniprot.is_empty() && self.uniprot_to_entrez.is_empty()
    }
}

fn sorted_pairs<S: AsRef<str>>(
    pairs: impl IntoIterator<Item = (S, S)>,
) -> BTreeMap<String, String> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string()))
        .collect()
}

/// Derive an Ensembl gene id from a raw xref_ensembl field value.
///
/// Takes the first transcript, drops the ` [isoform]` annotation and the
/// version suffix, and rewrites the ENST stem to ENSG. A field that already
/// carries a gene id is used as-is.
pub fn ensembl_gene_from_xref(field: &str) -> Option<String> {
    let first = first_delimited_value(field)?;
    let first = first.split(" [").next().unwrap_or(first);
    let base = first.split('.').next().unwrap_or(first);

    if base.starts_with("ENSG") {
        return Some(base.to_string());
    }

    base.strip_prefix("ENST")
        .map(|digits| format!("ENSG{}", digits))
}

/// First non-empty value of a semicolon-delimited xref field
fn first_delimited_value(field: &str) -> Option<&str> {
    field
        .split(';')
        .map(str::trim)
        .find(|part| !part.is_empty())
}

// ============================================================================
// Tests
// ============================================================================
