// Side Effect Ingestion Module
//
// Adapter for drug side-effect frequencies. The export is a flat TSV of
// (drug ChEMBL id, MedDRA code, term name, frequency); rows below the
// frequency threshold are filtered, rows without a usable MedDRA code are
// dropped and audited. The adapter is node-authoritative for side-effect
// terms and references drugs by ChEMBL CURIE.

use crate::adapter::{
    truncate_raw, Adapter, AdapterConfig, AdapterState, EdgeStream, HttpFetcher, NodeStream,
    Result, StrategyLog,
};
use crate::curie::{IdNormalizer, PrefixRegistry};
use crate::graph::{clean_value, Edge, Node, Provenance};
use crate::resolve::ResolutionAudit;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use tracing::{info, warn};

/// Default URL of the side-effect frequency export
pub const FREQUENCIES_URL: &str = "http://sideeffects.embl.de/media/download/meddra_freq.tsv.gz";

/// Cache filename for the frequency export
pub const FREQUENCIES_FILENAME: &str = "side_effect_frequencies.tsv.gz";

/// One row of the frequency export
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SideEffectRecord {
    pub drug_chembl_id: String,
    #[serde(default)]
    pub meddra_id: String,
    #[serde(default)]
    pub side_effect_name: String,
    #[serde(default)]
    pub frequency: Option<f64>,
}

/// Bundled fallback sample; drug ids match the bundled ChEMBL sample
pub const SAMPLE_FREQUENCIES: &str = "\
drug_chembl_id\tmeddra_id\tside_effect_name\tfrequency
CHEMBL25\t10028813\tNausea\t0.07
CHEMBL25\t10019211\tHaemorrhage\t0.02
CHEMBL941\t10013968\tOedema\t0.55
CHEMBL941\t10013473\tDiarrhoea\t0.38
CHEMBL941\t\tUnspecified reaction\t0.12
";

/// Parse the frequency export
pub fn parse_frequencies(content: &str) -> Result<Vec<SideEffectRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = Vec::new();
    for result in reader.deserialize::<SideEffectRecord>() {
        match result {
            Ok(record) if record.drug_chembl_id.is_empty() => {
                warn!("Skipping side-effect row without drug id");
            },
            Ok(record) => records.push(record),
            Err(e) => warn!("Skipping malformed side-effect row: {}", e),
        }
    }

    info!("Parsed {} side-effect records", records.len());
    Ok(records)
}

#[derive(Debug, Clone, PartialEq)]
struct ResolvedSideEffect {
    drug_curie: String,
    term_curie: String,
    term_name: String,
    frequency: Option<f64>,
}

/// Adapter for drug side-effect frequency data
pub struct SideEffectAdapter {
    config: AdapterConfig,
    fetcher: HttpFetcher,
    normalizer: IdNormalizer,
    provenance: Provenance,
    frequencies_url: String,
    resolved: Vec<ResolvedSideEffect>,
    audit: ResolutionAudit,
    state: AdapterState,
    strategies: StrategyLog,
}

impl SideEffectAdapter {
    pub fn new(config: AdapterConfig) -> Result<Self> {
        config
            .validate()
            .map_err(crate::adapter::AdapterError::Validation)?;

        let fetcher = HttpFetcher::new(&config.cache_dir, config.timeout_secs, config.max_retries)?;
        let normalizer = IdNormalizer::new(PrefixRegistry::default(), config.add_prefix);
        let provenance = Provenance::new("sider", "4.1", "CC BY-NC-SA 4.0");

        Ok(SideEffectAdapter {
            config,
            fetcher,
            normalizer,
            provenance,
            frequencies_url: FREQUENCIES_URL.to_string(),
            resolved: Vec::new(),
            audit: ResolutionAudit::new(),
            state: AdapterState::Uninitialized,
            strategies: StrategyLog::new(),
        })
    }

    /// Override the export endpoint (mirrors and tests)
    pub fn with_frequencies_url(mut self, url: impl Into<String>) -> Self {
        self.frequencies_url = url.into();
        self
    }

    pub fn strategies(&self) -> &StrategyLog {
        &self.strategies
    }

    /// Filter and resolve raw rows into the materialized table
    fn resolve_records(&mut self, records: Vec<SideEffectRecord>) {
        let frequency_threshold = self.config.threshold.and_then(|t| t.frequency());

        for record in &records {
            if let Some(threshold) = frequency_threshold {
                if record.frequency.unwrap_or(0.0) < threshold {
                    self.audit.record_score_filtered();
                    continue;
                }
            }

            // MedDRA codes are numeric; anything else cannot be referenced
            let code = record.meddra_id.trim();
            let endpoints = (!code.is_empty() && code.chars().all(|c| c.is_ascii_digit()))
                .then(|| {
                    self.normalizer
                        .normalize("chembl", &record.drug_chembl_id)
                        .zip(self.normalizer.normalize("meddra", code))
                })
                .flatten();

            match endpoints {
                Some((drug_curie, term_curie)) => {
                    self.audit.record_success();
                    self.resolved.push(ResolvedSideEffect {
                        drug_curie,
                        term_curie,
                        term_name: record.side_effect_name.clone(),
                        frequency: record.frequency,
                    });
                },
                None => self.audit.record_mapping_failed(),
            }
        }

        self.state = AdapterState::DataLoaded;
    }
}

#[async_trait]
impl Adapter for SideEffectAdapter {
    fn name(&self) -> &'static str {
        "side_effect"
    }

    fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    fn state(&self) -> AdapterState {
        self.state
    }

    async fn download(&mut self) -> Result<()> {
        if self.state != AdapterState::Uninitialized {
            return Ok(());
        }

        let raw = match self
            .fetcher
            .fetch_text_cached(&self.frequencies_url, FREQUENCIES_FILENAME)
            .await
        {
            Ok(content) => match parse_frequencies(&content) {
                Ok(records) => {
                    self.strategies.success("frequency_export");
                    records
                },
                Err(e) => {
                    self.strategies.failure("frequency_export", &e);
                    self.strategies.success("bundled_sample");
                    parse_frequencies(SAMPLE_FREQUENCIES)?
                },
            },
            Err(e) => {
                self.strategies.failure("frequency_export", &e);
                self.strategies.success("bundled_sample");
                parse_frequencies(SAMPLE_FREQUENCIES)?
            },
        };

        let records = truncate_raw(raw, self.config.test_mode, self.config.sample_limit);
        self.resolve_records(records);

        info!(
            "Side-effect adapter materialized {} records ({})",
            self.resolved.len(),
            self.audit
        );
        Ok(())
    }

    fn nodes(&self) -> NodeStream<'_> {
        if self.state != AdapterState::DataLoaded {
            return Box::new(std::iter::empty());
        }

        let mut seen = HashSet::new();
        Box::new(self.resolved.iter().filter_map(move |r| {
            if !seen.insert(r.term_curie.clone()) {
                return None;
            }

            let mut props = self.provenance.props();
            if !r.term_name.is_empty() {
                props.insert("name".to_string(), Value::String(clean_value(&r.term_name)));
            }
            Some(Node::new(r.term_curie.clone(), "side_effect", props))
        }))
    }

    fn edges(&self) -> EdgeStream<'_> {
        if self.state != AdapterState::DataLoaded {
            return Box::new(std::iter::empty());
        }

        Box::new(self.resolved.iter().map(move |r| {
            let mut props = self.provenance.props();
            if let Some(frequency) = r.frequency {
                props.insert("frequency".to_string(), Value::from(frequency));
            }

            Edge::new(
                None,
                r.drug_curie.clone(),
                r.term_curie.clone(),
                "drug_has_side_effect",
                props,
            )
        }))
    }

    fn audit(&self) -> Option<ResolutionAudit> {
        Some(self.audit)
    }
}

// ============================================================================
// Tests
// ============================================================================
