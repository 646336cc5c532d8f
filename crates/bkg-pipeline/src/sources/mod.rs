// Source Adapters
//
// One module per upstream database, each implementing the Adapter contract.
// Node authority is fixed per entity type: UniProt owns protein, gene and
// organism nodes; ChEMBL owns compound nodes; the disease ontology owns
// disease nodes; the side-effect source owns side-effect terms. Every other
// adapter is edge-only and references those types by CURIE after resolving
// its native identifiers.

pub mod chembl;
pub mod disease;
pub mod opentargets;
pub mod side_effect;
pub mod string_db;
pub mod uniprot;

pub use chembl::ChemblAdapter;
pub use disease::DiseaseAdapter;
pub use opentargets::OpenTargetsAdapter;
pub use side_effect::SideEffectAdapter;
pub use string_db::StringAdapter;
pub use uniprot::UniprotAdapter;
