// Disease Id Crosswalk
//
// The canonical disease space is MONDO. Sources name diseases in EFO, DOID,
// MedDRA, UMLS or Orphanet codes, usually as "EFO_0000305" or "DOID:1612".
// The crosswalk maps (namespace, local-id) pairs to MONDO local ids. It can
// be seeded from the small built-in table or built from the MONDO
// ontology's own xref lines by the disease adapter; an unresolved disease
// drops the association.

use std::collections::HashMap;
use tracing::info;

/// Crosswalk from foreign disease codes to MONDO local ids
#[derive(Debug, Clone, Default)]
pub struct DiseaseCrosswalk {
    /// (uppercase namespace, local id) -> MONDO local id
    map: HashMap<(String, String), String>,
}

impl DiseaseCrosswalk {
    /// Crosswalk with no entries; every lookup fails closed
    pub fn empty() -> Self {
        DiseaseCrosswalk::default()
    }

    /// Small built-in table covering the associations exercised by the
    /// bundled samples; real runs replace this with a crosswalk built from
    /// the MONDO ontology
    pub fn builtin() -> Self {
        let mut crosswalk = DiseaseCrosswalk::empty();
        crosswalk.insert("EFO", "0000305", "0007254"); // breast carcinoma
        crosswalk.insert("EFO", "0000684", "0008903"); // lung carcinoma
        crosswalk.insert("EFO", "0005842", "0005575"); // colorectal carcinoma
        crosswalk.insert("DOID", "1612", "0007254");
        crosswalk.insert("DOID", "1324", "0008903");
        crosswalk
    }

    /// Register a mapping from a foreign code to a MONDO local id
    pub fn insert(&mut self, namespace: &str, local_id: &str, mondo_local: &str) {
        self.map.insert(
            (namespace.to_ascii_uppercase(), local_id.to_string()),
            mondo_local.to_string(),
        );
    }

    /// Build from `(mondo_local, xref)` pairs, where `xref` is a MONDO xref
    /// line value such as `"EFO:0000305"` or `"DOID:1612"`
    pub fn from_xref_pairs<S: AsRef<str>>(pairs: impl IntoIterator<Item = (S, S)>) -> Self {
        let mut crosswalk = DiseaseCrosswalk::empty();

        for (mondo_local, xref) in pairs {
            let Some((namespace, local_id)) = split_disease_id(xref.as_ref()) else {
                continue;
            };
            crosswalk.insert(namespace, local_id, mondo_local.as_ref());
        }

        info!("Built disease crosswalk with {} entries", crosswalk.len());
        crosswalk
    }

    /// Resolve a foreign disease id to a MONDO local id.
    ///
    /// Ids already in the MONDO namespace short-circuit to their local id.
    pub fn resolve<'a>(&'a self, disease_id: &'a str) -> Option<&'a str> {
        let (namespace, local_id) = split_disease_id(disease_id)?;

        if namespace.eq_ignore_ascii_case("mondo") {
            return Some(local_id);
        }

        self.map
            .get(&(namespace.to_ascii_uppercase(), local_id.to_string()))
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }
}

/// Split a disease id into `(namespace, local-id)`.
///
/// Accepts both the underscore form used by association exports
/// (`EFO_0000305`) and the colon form used by ontology xrefs
/// (`DOID:1612`). Resolution of `MONDO:0007254` by local id depends on this
/// returning the separator-independent pair.
pub fn split_disease_id(disease_id: &str) -> Option<(&str, &str)> {
    let disease_id = disease_id.trim();

    let (namespace, local_id) = disease_id
        .split_once(':')
        .or_else(|| disease_id.split_once('_'))?;

    if namespace.is_empty() || local_id.is_empty() {
        return None;
    }

    Some((namespace, local_id))
}

// ============================================================================
// Tests
// ============================================================================
