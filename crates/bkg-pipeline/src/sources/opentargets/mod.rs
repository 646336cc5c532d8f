// Open Targets Ingestion Module
//
// Edge-only adapter for gene-disease associations from the Open Targets
// platform overall-score export (JSON lines). Open Targets names targets by
// Ensembl gene id and diseases by EFO/MONDO codes; gene nodes are owned by
// the UniProt adapter (Entrez ids) and disease nodes by the disease
// ontology adapter (MONDO), so every association runs the
// Ensembl -> UniProt -> Entrez chain and the disease crosswalk before an
// edge is emitted. Every association's disposition is audited.
//
// Data source:
// https://ftp.ebi.ac.uk/pub/databases/opentargets/platform/
//   {release}/output/etl/json/associationByOverallDirect/ (JSON lines)

pub mod adapter;
pub mod models;
pub mod parser;

pub use adapter::OpenTargetsAdapter;
pub use models::OpenTargetsAssociation;
pub use parser::parse_associations;

/// Platform release served by the default download URL
pub const OPENTARGETS_RELEASE: &str = "24.06";

/// Default URL of the overall direct association export
pub const ASSOCIATIONS_URL: &str = "https://ftp.ebi.ac.uk/pub/databases/opentargets/platform/24.06/output/etl/json/associationByOverallDirect/associations.json";

/// Cache filename for the association export
pub const ASSOCIATIONS_FILENAME: &str = "opentargets_associations.jsonl";
