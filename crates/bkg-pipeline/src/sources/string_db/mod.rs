// STRING Ingestion Module
//
// Edge-only adapter for protein-protein interactions from the STRING
// per-organism links export. STRING names proteins as
// "<taxon>.<ensembl-protein-id>"; protein nodes are owned by the UniProt
// adapter, so both endpoints are resolved through the reverse index built
// from UniProt's STRING cross-reference export before an edge is emitted.
// Unresolvable endpoints drop the interaction and are audited.
//
// Data source:
// https://stringdb-downloads.org/download/protein.links.v12.0/
//   {taxon}.protein.links.v12.0.txt.gz (space-separated, gzipped)

pub mod adapter;
pub mod models;
pub mod parser;

pub use adapter::{StringAdapter, StringEdgeType};
pub use models::StringInteraction;
pub use parser::parse_links;

/// STRING release served by the default download URL
pub const STRING_VERSION: &str = "v12.0";

/// Base URL for the per-organism links exports
pub const LINKS_BASE_URL: &str = "https://stringdb-downloads.org/download/protein.links.v12.0";

/// Download URL for an organism's links file
pub fn links_url(base_url: &str, organism: &str) -> String {
    format!(
        "{}/{}.protein.links.{}.txt.gz",
        base_url, organism, STRING_VERSION
    )
}

/// Cache filename for an organism's links file
pub fn links_filename(organism: &str) -> String {
    format!("string_{}_protein_links.txt.gz", organism)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_links_url() {
        assert_eq!(
            links_url(LINKS_BASE_URL, "9606"),
            "https://stringdb-downloads.org/download/protein.links.v12.0/9606.protein.links.v12.0.txt.gz"
        );
    }

    #[test]
    fn test_links_filename() {
        assert_eq!(links_filename("9606"), "string_9606_protein_links.txt.gz");
    }
}
