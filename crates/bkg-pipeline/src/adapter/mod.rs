// Adapter Contract
//
// Uniform lifecycle and streaming interface implemented by every source
// adapter:
//
// - Construction takes an AdapterConfig (filters, thresholds, test mode,
//   cache root) plus any source-specific subtype/field selections.
// - download() moves Uninitialized -> DataLoaded: fetch from network or
//   cache, apply domain filters, truncate deterministically in test mode.
// - nodes()/edges() derive fresh iterators over the materialized tables and
//   may be called more than once (materialize-once contract); an adapter
//   whose tables have been consumed reports Exhausted and streams nothing.
//
// A download failure degrades to a bundled fallback sample instead of
// aborting; the fallback chain is an ordered list of named strategies whose
// attempts are recorded, never a silent catch-all.

pub mod config;
pub mod fallback;
pub mod fetcher;
pub mod sampler;

pub use config::{AdapterConfig, AdapterConfigBuilder, Threshold};
pub use fallback::{StrategyAttempt, StrategyLog};
pub use fetcher::HttpFetcher;
pub use sampler::{truncate_raw, DEFAULT_SAMPLE_LIMIT};

use crate::graph::{Edge, Node, Provenance};
use crate::resolve::ResolutionAudit;
use async_trait::async_trait;

/// Result type for adapter operations
pub type Result<T> = std::result::Result<T, AdapterError>;

/// Error types for adapter operations
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error("Download error: {0}")]
    Download(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Decompression error: {0}")]
    Decompression(String),

    #[error(transparent)]
    Common(#[from] bkg_common::BkgError),
}

impl From<csv::Error> for AdapterError {
    fn from(err: csv::Error) -> Self {
        AdapterError::Parse(err.to_string())
    }
}

impl From<serde_json::Error> for AdapterError {
    fn from(err: serde_json::Error) -> Self {
        AdapterError::Parse(err.to_string())
    }
}

/// Adapter lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterState {
    /// Constructed; no data fetched yet
    Uninitialized,
    /// Raw payloads decoded into in-memory tables
    DataLoaded,
    /// Tables consumed; streams are empty by contract
    Exhausted,
}

impl AdapterState {
    pub fn as_str(&self) -> &str {
        match self {
            AdapterState::Uninitialized => "uninitialized",
            AdapterState::DataLoaded => "data_loaded",
            AdapterState::Exhausted => "exhausted",
        }
    }
}

/// Boxed node stream borrowed from an adapter's materialized tables
pub type NodeStream<'a> = Box<dyn Iterator<Item = Node> + 'a>;

/// Boxed edge stream borrowed from an adapter's materialized tables
pub type EdgeStream<'a> = Box<dyn Iterator<Item = Edge> + 'a>;

/// Contract implemented by every source adapter.
///
/// `download()` on an adapter that is already `DataLoaded` is a no-op, so a
/// caller that pre-loaded one adapter (for example to extract a crosswalk)
/// can hand it to the pipeline driver unchanged.
#[async_trait]
pub trait Adapter: Send {
    /// Short source name used in logs and stats, e.g. "uniprot"
    fn name(&self) -> &'static str;

    /// Static source/version/licence metadata stamped into tuples
    fn provenance(&self) -> &Provenance;

    fn state(&self) -> AdapterState;

    /// Fetch and materialize the source tables
    async fn download(&mut self) -> Result<()>;

    /// Stream canonical node tuples; empty for edge-only adapters
    fn nodes(&self) -> NodeStream<'_>;

    /// Stream canonical edge tuples
    fn edges(&self) -> EdgeStream<'_>;

    /// Resolution disposition counters, for adapters that audit a
    /// cross-reference chain
    fn audit(&self) -> Option<ResolutionAudit> {
        None
    }
}
