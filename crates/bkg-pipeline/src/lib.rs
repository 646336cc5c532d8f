//! BKG Pipeline Library
//!
//! Adapter framework and cross-reference resolution pipeline for building a
//! biological knowledge graph from heterogeneous public data sources.
//!
//! Every source-specific adapter implements the same contract: download into
//! an in-memory table (network or cache), then lazily stream canonical
//! node/edge tuples identified by CURIEs. Edge-only adapters resolve their
//! native identifier schemes (STRING protein ids, Ensembl gene ids, EFO/DOID
//! disease codes) into the canonical id spaces owned by the
//! node-authoritative adapters before an edge may be emitted; endpoints that
//! cannot be resolved are dropped and counted, never guessed.
//!
//! # Supported Data Sources
//!
//! - **UniProt**: proteins, genes, organisms (node-authoritative)
//! - **STRING**: protein-protein interaction edges
//! - **Open Targets**: gene-disease association edges
//! - **ChEMBL**: compounds and their target/indication edges
//! - **MONDO**: disease nodes, hierarchy, and the disease id crosswalk
//! - **Side effects**: drug-side effect frequency edges
//!
//! # Example
//!
//! ```no_run
//! use bkg_pipeline::adapter::{Adapter, AdapterConfig};
//! use bkg_pipeline::sources::uniprot::UniprotAdapter;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AdapterConfig::builder()
//!         .organism("9606")
//!         .test_mode(true)
//!         .build();
//!
//!     let mut adapter = UniprotAdapter::new(config)?;
//!     adapter.download().await?;
//!
//!     for node in adapter.nodes() {
//!         println!("{} [{}]", node.id, node.label);
//!     }
//!     Ok(())
//! }
//! ```

pub mod adapter;
pub mod curie;
pub mod graph;
pub mod pipeline;
pub mod resolve;
pub mod sources;
pub mod writer;

// Re-export the main entry points
pub use adapter::{Adapter, AdapterConfig, AdapterError, AdapterState};
pub use curie::{IdNormalizer, PrefixRegistry};
pub use graph::{Edge, Node, Provenance};
pub use pipeline::{Pipeline, PipelineStats};
pub use resolve::ResolutionAudit;
pub use writer::GraphWriter;
