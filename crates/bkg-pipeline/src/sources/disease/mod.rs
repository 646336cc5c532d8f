// Disease Ontology Ingestion Module
//
// Node-authoritative adapter for diseases, fed by the MONDO ontology OBO
// release. Besides disease nodes and the is-a hierarchy, this module is
// where the disease id crosswalk comes from: MONDO terms carry EFO, DOID,
// MedDRA and UMLS xrefs, and the crosswalk built from them is what lets the
// association adapters resolve foreign disease codes into MONDO CURIEs.
//
// Data source: http://purl.obolibrary.org/obo/mondo.obo (~60MB)

pub mod adapter;
pub mod models;
pub mod parser;

pub use adapter::{DiseaseAdapter, DiseaseEdgeType, DiseaseNodeType};
pub use models::MondoTerm;
pub use parser::parse_obo;

/// Default URL of the MONDO OBO release
pub const MONDO_URL: &str = "http://purl.obolibrary.org/obo/mondo.obo";

/// Cache filename for the ontology
pub const MONDO_FILENAME: &str = "mondo.obo";

/// Crosswalk namespaces accepted from MONDO xref lines
pub const CROSSWALK_NAMESPACES: &[&str] = &["EFO", "DOID", "MEDDRA", "UMLS", "ORPHANET"];
