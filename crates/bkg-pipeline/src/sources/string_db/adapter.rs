// STRING Adapter
//
// Resolution is eager: download() materializes the links table, builds the
// reverse index from the UniProt cross-reference export, and resolves every
// interaction into canonical endpoints while counting dispositions. The
// edge stream then derives from the resolved table alone, so repeated
// passes are identical and the audit is observable as soon as download()
// returns.

use super::parser::{parse_links, SAMPLE_LINKS};
use super::{links_filename, links_url, LINKS_BASE_URL, STRING_VERSION};
use crate::adapter::{
    truncate_raw, Adapter, AdapterConfig, AdapterState, EdgeStream, HttpFetcher, NodeStream,
    Result, StrategyLog,
};
use crate::curie::{IdNormalizer, PrefixRegistry};
use crate::graph::{Edge, Node, Provenance};
use crate::resolve::{ResolutionAudit, StringIdResolver};
use crate::sources::uniprot;
use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

/// Types of edges provided by the STRING adapter; STRING emits no nodes,
/// proteins come from the UniProt adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringEdgeType {
    ProteinProteinInteraction,
}

/// An interaction with both endpoints resolved to UniProt accessions
#[derive(Debug, Clone, PartialEq)]
struct ResolvedInteraction {
    source_curie: String,
    target_curie: String,
    combined_score: f64,
}

/// Edge-only adapter for STRING protein-protein interactions
pub struct StringAdapter {
    config: AdapterConfig,
    fetcher: HttpFetcher,
    normalizer: IdNormalizer,
    provenance: Provenance,
    links_base_url: String,
    xref_base_url: String,
    edge_types: Vec<StringEdgeType>,
    resolved: Vec<ResolvedInteraction>,
    audit: ResolutionAudit,
    state: AdapterState,
    strategies: StrategyLog,
}

impl StringAdapter {
    pub fn new(config: AdapterConfig) -> Result<Self> {
        config
            .validate()
            .map_err(crate::adapter::AdapterError::Validation)?;

        let fetcher = HttpFetcher::new(&config.cache_dir, config.timeout_secs, config.max_retries)?;
        let normalizer = IdNormalizer::new(PrefixRegistry::default(), config.add_prefix);
        let provenance = Provenance::new("string", STRING_VERSION, "CC BY 4.0");

        Ok(StringAdapter {
            config,
            fetcher,
            normalizer,
            provenance,
            links_base_url: LINKS_BASE_URL.to_string(),
            xref_base_url: uniprot::STREAM_URL.to_string(),
            edge_types: vec![StringEdgeType::ProteinProteinInteraction],
            resolved: Vec::new(),
            audit: ResolutionAudit::new(),
            state: AdapterState::Uninitialized,
            strategies: StrategyLog::new(),
        })
    }

    /// Override the links endpoint (mirrors and tests)
    pub fn with_links_base_url(mut self, url: impl Into<String>) -> Self {
        self.links_base_url = url.into();
        self
    }

    /// Override the UniProt stream endpoint used for the reverse index
    pub fn with_xref_base_url(mut self, url: impl Into<String>) -> Self {
        self.xref_base_url = url.into();
        self
    }

    /// Restrict the edge subtypes this adapter emits
    pub fn with_edge_types(mut self, edge_types: Vec<StringEdgeType>) -> Self {
        self.edge_types = edge_types;
        self
    }

    pub fn strategies(&self) -> &StrategyLog {
        &self.strategies
    }

    /// Build the reverse index from the shared UniProt export.
    ///
    /// The export query always asks for the organism's reviewed set: the
    /// reviewed flag drives the prefer-reviewed tie-break, and the STRING
    /// adapter must not depend on how the UniProt adapter was configured.
    async fn build_resolver(&mut self) -> StringIdResolver {
        let xref_config = AdapterConfig {
            reviewed: true,
            ..self.config.clone()
        };

        match uniprot::fetch_xref_export(&self.fetcher, &xref_config, &self.xref_base_url).await {
            Ok(records) => {
                self.strategies.success("uniprot_xref_export");
                let reviewed = records.iter().map(|r| r.accession.clone()).collect();
                StringIdResolver::from_xrefs(
                    records
                        .iter()
                        .map(|r| (r.accession.as_str(), r.xref_string.as_str())),
                    reviewed,
                )
            },
            Err(e) => {
                self.strategies.failure("uniprot_xref_export", &e);
                warn!("STRING reverse index unavailable; all interactions will be dropped");
                StringIdResolver::empty()
            },
        }
    }
}

#[async_trait]
impl Adapter for StringAdapter {
    fn name(&self) -> &'static str {
        "string"
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

        let organism = self.config.organism.clone().unwrap_or_else(|| "9606".to_string());
        let url = links_url(&self.links_base_url, &organism);
        let filename = links_filename(&organism);

        let raw = match self.fetcher.fetch_text_cached(&url, &filename).await {
            Ok(content) => match parse_links(&content) {
                Ok(interactions) => {
                    self.strategies.success("links_export");
                    interactions
                },
                Err(e) => {
                    self.strategies.failure("links_export", &e);
                    self.strategies.success("bundled_sample");
                    parse_links(SAMPLE_LINKS)?
                },
            },
            Err(e) => {
                self.strategies.failure("links_export", &e);
                self.strategies.success("bundled_sample");
                parse_links(SAMPLE_LINKS)?
            },
        };

        // Deterministic truncation before any filtering; raw self-links are
        // structural noise and are not part of the audited chain
        let interactions = truncate_raw(raw, self.config.test_mode, self.config.sample_limit);
        let interactions: Vec<_> = interactions
            .into_iter()
            .filter(|i| !i.is_self_interaction())
            .collect();

        let resolver = self.build_resolver().await;
        let score_threshold = self.config.threshold.and_then(|t| t.score());

        for interaction in &interactions {
            if let Some(threshold) = score_threshold {
                if interaction.combined_score < threshold {
                    self.audit.record_score_filtered();
                    continue;
                }
            }

            let resolved_pair = resolver
                .resolve(&interaction.protein_a)
                .zip(resolver.resolve(&interaction.protein_b));

            // A pair collapsing onto one accession cannot form an edge
            let endpoints = match resolved_pair {
                Some((a, b)) if a != b => self
                    .normalizer
                    .normalize("uniprot", a)
                    .zip(self.normalizer.normalize("uniprot", b)),
                _ => None,
            };

            match endpoints {
                Some((source_curie, target_curie)) => {
                    self.audit.record_success();
                    self.resolved.push(ResolvedInteraction {
                        source_curie,
                        target_curie,
                        combined_score: interaction.combined_score,
                    });
                },
                None => self.audit.record_mapping_failed(),
            }
        }

        info!(
            "STRING adapter materialized {} interactions ({})",
            self.resolved.len(),
            self.audit
        );
        self.state = AdapterState::DataLoaded;
        Ok(())
    }

    /// STRING emits no nodes; proteins come from the UniProt adapter
    fn nodes(&self) -> NodeStream<'_> {
        Box::new(std::iter::empty::<Node>())
    }

    fn edges(&self) -> EdgeStream<'_> {
        if self.state != AdapterState::DataLoaded
            || !self
                .edge_types
                .contains(&StringEdgeType::ProteinProteinInteraction)
        {
            return Box::new(std::iter::empty());
        }

        Box::new(self.resolved.iter().map(move |interaction| {
            let mut props = self.provenance.props();
            props.insert(
                "string_combined_score".to_string(),
                Value::from(interaction.combined_score),
            );

            Edge::new(
                None,
                interaction.source_curie.clone(),
                interaction.target_curie.clone(),
                "protein_protein_interaction",
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
