//! Identifier normalization
//!
//! Converts `(prefix, raw id)` pairs into canonical compact identifiers
//! (CURIEs, `prefix:local-id`). The prefix table is a controlled registry
//! injected at construction; there is no module-level global. The same
//! `(prefix, raw_id)` pair recurs thousands of times per run, so results are
//! memoized behind a lock.

use std::collections::HashMap;
use std::sync::Mutex;

/// Canonical prefixes accepted in emitted CURIEs
pub const KNOWN_PREFIXES: &[&str] = &[
    "uniprot", "ncbigene", "ensembl", "ncbitaxon", "chembl", "go", "doid", "mondo", "efo",
    "meddra", "hp", "drugbank", "reactome", "umls",
];

/// Controlled registry of identifier prefixes.
///
/// Maps canonical prefixes to themselves and common upstream spellings
/// (`UniProtKB`, `GeneID`, …) to their canonical form.
#[derive(Debug, Clone)]
pub struct PrefixRegistry {
    entries: HashMap<String, String>,
}

impl Default for PrefixRegistry {
    fn default() -> Self {
        let mut registry = PrefixRegistry {
            entries: HashMap::new(),
        };

        for prefix in KNOWN_PREFIXES {
            registry.register(prefix, prefix);
        }

        // Spellings seen in upstream exports
        registry.register("uniprotkb", "uniprot");
        registry.register("swissprot", "uniprot");
        registry.register("geneid", "ncbigene");
        registry.register("entrez", "ncbigene");
        registry.register("ncbi_gene", "ncbigene");
        registry.register("taxonomy", "ncbitaxon");
        registry.register("ncbi_taxid", "ncbitaxon");
        registry.register("medgen", "umls");

        registry
    }
}

impl PrefixRegistry {
    /// Empty registry; useful for tests exercising fail-closed behavior
    pub fn empty() -> Self {
        PrefixRegistry {
            entries: HashMap::new(),
        }
    }

    /// Register an alias for a canonical prefix
    pub fn register(&mut self, alias: &str, canonical: &str) {
        self.entries
            .insert(alias.to_ascii_lowercase(), canonical.to_ascii_lowercase());
    }

    /// Canonical form of a prefix, if known
    pub fn canonical(&self, prefix: &str) -> Option<&str> {
        self.entries
            .get(&prefix.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn is_known(&self, prefix: &str) -> bool {
        self.canonical(prefix).is_some()
    }
}

/// Normalizes raw identifiers into CURIEs.
///
/// `normalize` is pure: identical inputs always produce the identical
/// output, which makes the memo cache safe.
#[derive(Debug)]
pub struct IdNormalizer {
    registry: PrefixRegistry,
    add_prefix: bool,
    cache: Mutex<HashMap<(String, String), Option<String>>>,
}

impl IdNormalizer {
    pub fn new(registry: PrefixRegistry, add_prefix: bool) -> Self {
        IdNormalizer {
            registry,
            add_prefix,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Normalizer over the default registry with prefixing enabled
    pub fn standard() -> Self {
        Self::new(PrefixRegistry::default(), true)
    }

    /// Convert `(prefix, raw_id)` into a CURIE.
    ///
    /// Returns `None` for an empty raw id (the caller omits the node/edge)
    /// and for a prefix the registry does not know. When prefixing is
    /// disabled the raw id passes through unchanged (legacy behavior).
    pub fn normalize(&self, prefix: &str, raw_id: &str) -> Option<String> {
        let raw_id = raw_id.trim();
        if raw_id.is_empty() {
            return None;
        }

        if !self.add_prefix {
            return Some(raw_id.to_string());
        }

        let key = (prefix.to_string(), raw_id.to_string());
        if let Ok(cache) = self.cache.lock() {
            if let Some(hit) = cache.get(&key) {
                return hit.clone();
            }
        }

        let result = self
            .registry
            .canonical(prefix)
            .map(|canonical| format!("{}:{}", canonical, raw_id));

        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(key, result.clone());
        }

        result
    }

    /// Whether a CURIE produced by this normalizer is syntactically valid:
    /// known prefix and non-empty local id.
    pub fn is_valid_curie(&self, curie: &str) -> bool {
        match curie.split_once(':') {
            Some((prefix, local)) => self.registry.is_known(prefix) && !local.trim().is_empty(),
            None => false,
        }
    }
}
