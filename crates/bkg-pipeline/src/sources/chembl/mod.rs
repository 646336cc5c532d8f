// ChEMBL Ingestion Module
//
// Node-authoritative adapter for compounds and drugs. ChEMBL is a
// dual-backend source: the bulk TSV exports from the EBI FTP are preferred
// for full runs, the paginated REST API for test-mode runs (bulk downloads
// are too slow for small bounded runs). Either backend materializes the
// same three tables - molecules, activities, drug indications - so the
// output tuple shape is identical regardless of which backend served the
// data, and any backend error falls through to the alternate backend and
// finally to the bundled sample.
//
// Data sources:
// - Bulk: https://ftp.ebi.ac.uk/pub/databases/chembl/ChEMBLdb/releases/
// - API:  https://www.ebi.ac.uk/chembl/api/data (JSON, limit/offset pages)

pub mod adapter;
pub mod api;
pub mod models;
pub mod parser;

pub use adapter::{ChemblAdapter, ChemblEdgeType, ChemblNodeType};
pub use models::{ChemblActivity, ChemblIndication, ChemblMolecule};

/// ChEMBL release served by the default bulk URL
pub const CHEMBL_VERSION: &str = "ChEMBL_34";

/// Base URL of the bulk TSV exports
pub const BULK_BASE_URL: &str =
    "https://ftp.ebi.ac.uk/pub/databases/chembl/ChEMBLdb/releases/chembl_34";

/// Base URL of the paginated REST API
pub const API_BASE_URL: &str = "https://www.ebi.ac.uk/chembl/api/data";

/// Page size used against the REST API
pub const API_PAGE_SIZE: usize = 1000;

/// Bulk export filename for one of the three tables
pub fn bulk_filename(table: &str) -> String {
    format!("chembl_34_{}.tsv.gz", table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bulk_filename() {
        assert_eq!(bulk_filename("molecules"), "chembl_34_molecules.tsv.gz");
    }
}
