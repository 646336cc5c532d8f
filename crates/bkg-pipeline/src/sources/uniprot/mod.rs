// UniProt Ingestion Module
//
// Node-authoritative adapter for proteins, genes and organisms, fed by the
// UniProtKB REST stream export (TSV). The same export carries the STRING,
// Ensembl and GeneID cross-reference columns that the edge-only adapters
// use to build their resolvers, so the fetch helper here is shared: every
// consumer of the export reads the same cached file under the cache root.
//
// Data source: https://rest.uniprot.org/uniprotkb/stream (TSV, ~1MB for the
// reviewed human proteome with the selected columns)

pub mod adapter;
pub mod models;
pub mod parser;

pub use adapter::{UniprotAdapter, UniprotEdgeType, UniprotNodeField, UniprotNodeType};
pub use models::UniprotRecord;
pub use parser::parse_tsv;

use crate::adapter::{AdapterConfig, HttpFetcher, Result};

/// UniProtKB REST stream endpoint
pub const STREAM_URL: &str = "https://rest.uniprot.org/uniprotkb/stream";

/// TSV columns requested from the stream endpoint
pub const STREAM_FIELDS: &str =
    "accession,protein_name,length,mass,organism_id,organism_name,gene_primary,xref_ensembl,xref_geneid,xref_string";

/// Cache filename for the export selected by a configuration
pub fn export_filename(config: &AdapterConfig) -> String {
    format!(
        "uniprot_{}_{}.tsv",
        config.organism.as_deref().unwrap_or("all"),
        if config.reviewed { "reviewed" } else { "full" }
    )
}

/// Stream URL for the export selected by a configuration
pub fn export_url(base_url: &str, config: &AdapterConfig) -> Result<String> {
    let mut query = match &config.organism {
        Some(taxon) => format!("organism_id:{}", taxon),
        None => "*".to_string(),
    };
    if config.reviewed {
        query = format!("{} AND reviewed:true", query);
    }

    let url = url::Url::parse_with_params(
        base_url,
        &[("format", "tsv"), ("fields", STREAM_FIELDS), ("query", query.as_str())],
    )
    .map_err(|e| crate::adapter::AdapterError::Validation(e.to_string()))?;

    Ok(url.to_string())
}

/// Fetch and parse the cross-reference export shared by this adapter and
/// the edge-only resolvers. All consumers read the same cached file.
pub async fn fetch_xref_export(
    fetcher: &HttpFetcher,
    config: &AdapterConfig,
    base_url: &str,
) -> Result<Vec<models::UniprotRecord>> {
    let url = export_url(base_url, config)?;
    let content = fetcher.fetch_text_cached(&url, &export_filename(config)).await?;
    parser::parse_tsv(&content)
}
