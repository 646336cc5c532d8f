// Adapter Configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::sampler::DEFAULT_SAMPLE_LIMIT;

/// Threshold option applied by an adapter's domain filter.
///
/// Threshold kinds are adapter-specific and only one applies per adapter:
/// association/interaction sources take a minimum score, the side-effect
/// source a minimum frequency, ChEMBL a minimum clinical development phase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Threshold {
    /// Minimum association or interaction score
    Score(f64),
    /// Minimum side-effect frequency
    Frequency(f64),
    /// Minimum clinical development phase (4 = approved)
    MaxPhase(i32),
}

impl Threshold {
    pub fn score(&self) -> Option<f64> {
        match self {
            Threshold::Score(v) => Some(*v),
            _ => None,
        }
    }

    pub fn frequency(&self) -> Option<f64> {
        match self {
            Threshold::Frequency(v) => Some(*v),
            _ => None,
        }
    }

    pub fn max_phase(&self) -> Option<i32> {
        match self {
            Threshold::MaxPhase(v) => Some(*v),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Threshold::Score(_) => "score",
            Threshold::Frequency(_) => "frequency",
            Threshold::MaxPhase(_) => "max_phase",
        }
    }
}

/// Shared configuration surface for all source adapters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdapterConfig {
    /// NCBI taxonomy id filter, e.g. "9606" for human
    pub organism: Option<String>,

    /// Restrict UniProt entries to the reviewed (SwissProt) set
    pub reviewed: bool,

    /// Adapter-specific threshold filter
    pub threshold: Option<Threshold>,

    /// Deterministic truncation to the first `sample_limit` raw records
    pub test_mode: bool,

    /// Truncation point used in test mode
    pub sample_limit: usize,

    /// Emit CURIE-prefixed identifiers; disabling passes raw ids through
    pub add_prefix: bool,

    /// Cache root for raw upstream payloads
    pub cache_dir: PathBuf,

    /// HTTP timeout in seconds
    pub timeout_secs: u64,

    /// Maximum retries for failed downloads
    pub max_retries: u32,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        AdapterConfig {
            organism: Some("9606".to_string()),
            reviewed: true,
            threshold: None,
            test_mode: false,
            sample_limit: DEFAULT_SAMPLE_LIMIT,
            add_prefix: true,
            cache_dir: PathBuf::from(".cache"),
            timeout_secs: 300,
            max_retries: 3,
        }
    }
}

impl AdapterConfig {
    /// Create new config with builder pattern
    pub fn builder() -> AdapterConfigBuilder {
        AdapterConfigBuilder::default()
    }

    /// Configuration for bounded reproducible development runs
    pub fn test_config() -> Self {
        AdapterConfig {
            test_mode: true,
            ..Default::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.sample_limit == 0 {
            return Err("Sample limit must be greater than 0".to_string());
        }

        if self.timeout_secs == 0 {
            return Err("Timeout must be greater than 0".to_string());
        }

        if let Some(organism) = &self.organism {
            if organism.is_empty() || !organism.chars().all(|c| c.is_ascii_digit()) {
                return Err(format!("Organism must be a numeric NCBI taxon id, got '{}'", organism));
            }
        }

        if let Some(Threshold::Score(score)) = self.threshold {
            if score < 0.0 {
                return Err("Score threshold cannot be negative".to_string());
            }
        }

        if let Some(Threshold::Frequency(frequency)) = self.threshold {
            if !(0.0..=1.0).contains(&frequency) {
                return Err("Frequency threshold must be within [0, 1]".to_string());
            }
        }

        Ok(())
    }
}

/// Builder for AdapterConfig
#[derive(Debug, Default)]
pub struct AdapterConfigBuilder {
    config: AdapterConfig,
}

impl AdapterConfigBuilder {
    pub fn organism(mut self, organism: impl Into<String>) -> Self {
        self.config.organism = Some(organism.into());
        self
    }

    pub fn no_organism_filter(mut self) -> Self {
        self.config.organism = None;
        self
    }

    pub fn reviewed(mut self, reviewed: bool) -> Self {
        self.config.reviewed = reviewed;
        self
    }

    pub fn threshold(mut self, threshold: Threshold) -> Self {
        self.config.threshold = Some(threshold);
        self
    }

    pub fn test_mode(mut self, test_mode: bool) -> Self {
        self.config.test_mode = test_mode;
        self
    }

    pub fn sample_limit(mut self, limit: usize) -> Self {
        self.config.sample_limit = limit;
        self
    }

    pub fn add_prefix(mut self, add_prefix: bool) -> Self {
        self.config.add_prefix = add_prefix;
        self
    }

    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.cache_dir = dir.into();
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs;
        self
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    pub fn build(self) -> AdapterConfig {
        self.config
    }
}

// ============================================================================
// Tests
// ============================================================================
