// Open Targets Adapter
//
// download() materializes the association export, builds the gene id chain
// from the UniProt cross-reference export, and resolves every association
// eagerly: score threshold first, then Ensembl -> UniProt -> Entrez and
// disease -> MONDO. Resolved associations are sorted by descending score
// and deduplicated on (gene, disease) so the stream is deterministic.

use super::parser::{parse_associations, SAMPLE_ASSOCIATIONS};
use super::{ASSOCIATIONS_FILENAME, ASSOCIATIONS_URL, OPENTARGETS_RELEASE};
use crate::adapter::{
    truncate_raw, Adapter, AdapterConfig, AdapterState, EdgeStream, HttpFetcher, NodeStream,
    Result, StrategyLog,
};
use crate::curie::{IdNormalizer, PrefixRegistry};
use crate::graph::{Edge, Node, Provenance};
use crate::resolve::{DiseaseCrosswalk, GeneIdResolver, ResolutionAudit};
use crate::sources::uniprot;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashSet;
use tracing::{info, warn};

/// An association with both endpoints resolved to canonical CURIEs
#[derive(Debug, Clone, PartialEq)]
struct ResolvedAssociation {
    gene_curie: String,
    disease_curie: String,
    score: f64,
    evidence_count: Option<i64>,
}

/// Edge-only adapter for Open Targets gene-disease associations
pub struct OpenTargetsAdapter {
    config: AdapterConfig,
    fetcher: HttpFetcher,
    normalizer: IdNormalizer,
    provenance: Provenance,
    associations_url: String,
    xref_base_url: String,
    crosswalk: DiseaseCrosswalk,
    resolved: Vec<ResolvedAssociation>,
    audit: ResolutionAudit,
    state: AdapterState,
    strategies: StrategyLog,
}

impl OpenTargetsAdapter {
    pub fn new(config: AdapterConfig) -> Result<Self> {
        config
            .validate()
            .map_err(crate::adapter::AdapterError::Validation)?;

        let fetcher = HttpFetcher::new(&config.cache_dir, config.timeout_secs, config.max_retries)?;
        let normalizer = IdNormalizer::new(PrefixRegistry::default(), config.add_prefix);
        let provenance = Provenance::new("opentargets", OPENTARGETS_RELEASE, "CC0 1.0");

        Ok(OpenTargetsAdapter {
            config,
            fetcher,
            normalizer,
            provenance,
            associations_url: ASSOCIATIONS_URL.to_string(),
            xref_base_url: uniprot::STREAM_URL.to_string(),
            crosswalk: DiseaseCrosswalk::builtin(),
            resolved: Vec::new(),
            audit: ResolutionAudit::new(),
            state: AdapterState::Uninitialized,
            strategies: StrategyLog::new(),
        })
    }

    /// Override the association export endpoint (mirrors and tests)
    pub fn with_associations_url(mut self, url: impl Into<String>) -> Self {
        self.associations_url = url.into();
        self
    }

    /// Override the UniProt stream endpoint used for the gene id chain
    pub fn with_xref_base_url(mut self, url: impl Into<String>) -> Self {
        self.xref_base_url = url.into();
        self
    }

    /// Replace the built-in disease crosswalk, typically with one built by
    /// the disease ontology adapter
    pub fn with_crosswalk(mut self, crosswalk: DiseaseCrosswalk) -> Self {
        self.crosswalk = crosswalk;
        self
    }

    pub fn strategies(&self) -> &StrategyLog {
        &self.strategies
    }

    async fn build_gene_resolver(&mut self) -> GeneIdResolver {
        let xref_config = AdapterConfig {
            reviewed: true,
            ..self.config.clone()
        };

        match uniprot::fetch_xref_export(&self.fetcher, &xref_config, &self.xref_base_url).await {
            Ok(records) => {
                self.strategies.success("uniprot_xref_export");
                GeneIdResolver::from_xrefs(
                    records
                        .iter()
                        .map(|r| (r.accession.as_str(), r.xref_ensembl.as_str())),
                    records
                        .iter()
                        .map(|r| (r.accession.as_str(), r.xref_geneid.as_str())),
                )
            },
            Err(e) => {
                self.strategies.failure("uniprot_xref_export", &e);
                warn!("Gene id chain unavailable; all associations will be dropped");
                GeneIdResolver::empty()
            },
        }
    }
}

#[async_trait]
impl Adapter for OpenTargetsAdapter {
    fn name(&self) -> &'static str {
        "opentargets"
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
            .fetch_text_cached(&self.associations_url, ASSOCIATIONS_FILENAME)
            .await
        {
            Ok(content) => match parse_associations(&content) {
                Ok(associations) => {
                    self.strategies.success("bulk_export");
                    associations
                },
                Err(e) => {
                    self.strategies.failure("bulk_export", &e);
                    self.strategies.success("bundled_sample");
                    parse_associations(SAMPLE_ASSOCIATIONS)?
                },
            },
            Err(e) => {
                self.strategies.failure("bulk_export", &e);
                self.strategies.success("bundled_sample");
                parse_associations(SAMPLE_ASSOCIATIONS)?
            },
        };

        // Deterministic truncation before any filtering
        let associations = truncate_raw(raw, self.config.test_mode, self.config.sample_limit);

        let gene_resolver = self.build_gene_resolver().await;
        let score_threshold = self.config.threshold.and_then(|t| t.score()).unwrap_or(0.0);

        let mut resolved = Vec::new();
        for association in &associations {
            if association.score <= score_threshold {
                self.audit.record_score_filtered();
                continue;
            }

            let entrez = gene_resolver.resolve(&association.target_id);
            let mondo_local = self.crosswalk.resolve(&association.disease_id);

            let endpoints = match (entrez, mondo_local) {
                (Some(entrez), Some(mondo_local)) => self
                    .normalizer
                    .normalize("ncbigene", entrez)
                    .zip(self.normalizer.normalize("mondo", mondo_local)),
                _ => None,
            };

            match endpoints {
                Some((gene_curie, disease_curie)) => {
                    self.audit.record_success();
                    resolved.push(ResolvedAssociation {
                        gene_curie,
                        disease_curie,
                        score: (association.score * 1000.0).round() / 1000.0,
                        evidence_count: association.evidence_count,
                    });
                },
                None => self.audit.record_mapping_failed(),
            }
        }

        // Descending score with a lexicographic tie-break keeps the stream
        // byte-identical across runs; duplicates keep their best-scored row
        resolved.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.gene_curie.cmp(&b.gene_curie))
                .then_with(|| a.disease_curie.cmp(&b.disease_curie))
        });

        let mut seen = HashSet::new();
        resolved.retain(|a| seen.insert((a.gene_curie.clone(), a.disease_curie.clone())));

        info!(
            "Open Targets adapter materialized {} associations ({})",
            resolved.len(),
            self.audit
        );
        self.resolved = resolved;
        self.state = AdapterState::DataLoaded;
        Ok(())
    }

    /// Open Targets emits no nodes; genes come from UniProt, diseases from
    /// the disease ontology adapter
    fn nodes(&self) -> NodeStream<'_> {
        Box::new(std::iter::empty::<Node>())
    }

    fn edges(&self) -> EdgeStream<'_> {
        if self.state != AdapterState::DataLoaded {
            return Box::new(std::iter::empty());
        }

        Box::new(self.resolved.iter().enumerate().map(move |(idx, association)| {
            let mut props = self.provenance.props();
            props.insert(
                "opentargets_score".to_string(),
                Value::from(association.score),
            );
            if let Some(count) = association.evidence_count {
                props.insert("evidence_count".to_string(), Value::from(count));
            }

            Edge::new(
                Some(format!("opentargets_{}", idx)),
                association.gene_curie.clone(),
                association.disease_curie.clone(),
                "gene_is_related_to_disease",
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::Threshold;
    use crate::sources::uniprot::parser::SAMPLE_TSV;
    use wiremock::matchers::{method, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mock_upstreams(associations_body: &str) -> MockServer {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path_regex(r"^/associations\.json$"))
            .respond_with(ResponseTemplate::new(200).set_body_string(associations_body))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path_regex(r"^/stream$"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SAMPLE_TSV))
            .mount(&server)
            .await;

        server
    }

    async fn downloaded_adapter(server: &MockServer, config: AdapterConfig) -> OpenTargetsAdapter {
        let mut adapter = OpenTargetsAdapter::new(config)
            .unwrap()
            .with_associations_url(format!("{}/associations.json", server.uri()))
            .with_xref_base_url(format!("{}/stream", server.uri()));
        adapter.download().await.unwrap();
        adapter
    }

    #[tokio::test]
    async fn test_full_chain_resolution() {
        let server = mock_upstreams(SAMPLE_ASSOCIATIONS).await;
        let dir = tempfile::tempdir().unwrap();
        let config = AdapterConfig::builder()
            .cache_dir(dir.path())
            .threshold(Threshold::Score(0.1))
            .build();

        let adapter = downloaded_adapter(&server, config).await;
        let edges: Vec<_> = adapter.edges().collect();

        // The 0.05-score association is excluded by the threshold
        assert_eq!(edges.len(), 4);
        assert_eq!(edges[0].source, "ncbigene:7157");
        assert_eq!(edges[0].target, "mondo:0007254");
        assert_eq!(edges[0].label, "gene_is_related_to_disease");
        assert_eq!(
            edges[0].properties.get("opentargets_score"),
            Some(&Value::from(0.95))
        );
        assert_eq!(
            edges[0].properties.get("evidence_count"),
            Some(&Value::from(157))
        );

        let audit = adapter.audit().unwrap();
        assert_eq!(audit.total, 5);
        assert_eq!(audit.score_filtered, 1);
        assert_eq!(audit.successful, 4);
        assert!(audit.is_consistent());
    }

    #[tokio::test]
    async fn test_score_rounding_to_three_decimals() {
        let body = r#"{"targetId":"ENSG00000269305","diseaseId":"EFO_0000305","score":0.30000001,"evidenceCount":9}
"#;
        let server = mock_upstreams(body).await;
        let dir = tempfile::tempdir().unwrap();
        let config = AdapterConfig::builder()
            .cache_dir(dir.path())
            .threshold(Threshold::Score(0.1))
            .build();

        let adapter = downloaded_adapter(&server, config).await;
        let edges: Vec<_> = adapter.edges().collect();
        assert_eq!(
            edges[0].properties.get("opentargets_score"),
            Some(&Value::from(0.3))
        );
    }

    #[tokio::test]
    async fn test_unresolved_disease_drops_association() {
        let body = r#"{"targetId":"ENSG00000269305","diseaseId":"EFO_9999999","score":0.8}
"#;
        let server = mock_upstreams(body).await;
        let dir = tempfile::tempdir().unwrap();
        let config = AdapterConfig::builder().cache_dir(dir.path()).build();

        let adapter = downloaded_adapter(&server, config).await;
        assert_eq!(adapter.edges().count(), 0);
        assert_eq!(adapter.audit().unwrap().mapping_failed, 1);
    }

    #[tokio::test]
    async fn test_unresolved_gene_drops_association() {
        let body = r#"{"targetId":"ENSG99999999999","diseaseId":"EFO_0000305","score":0.8}
"#;
        let server = mock_upstreams(body).await;
        let dir = tempfile::tempdir().unwrap();
        let config = AdapterConfig::builder().cache_dir(dir.path()).build();

        let adapter = downloaded_adapter(&server, config).await;
        assert_eq!(adapter.edges().count(), 0);
        assert_eq!(adapter.audit().unwrap().mapping_failed, 1);
    }

    #[tokio::test]
    async fn test_duplicates_keep_best_score() {
        let body = r#"{"targetId":"ENSG00000269305","diseaseId":"EFO_0000305","score":0.4}
{"targetId":"ENSG00000269305","diseaseId":"EFO_0000305","score":0.9}
"#;
        let server = mock_upstreams(body).await;
        let dir = tempfile::tempdir().unwrap();
        let config = AdapterConfig::builder().cache_dir(dir.path()).build();

        let adapter = downloaded_adapter(&server, config).await;
        let edges: Vec<_> = adapter.edges().collect();

        assert_eq!(edges.len(), 1);
        assert_eq!(
            edges[0].properties.get("opentargets_score"),
            Some(&Value::from(0.9))
        );
    }

    #[tokio::test]
    async fn test_edges_sorted_by_descending_score() {
        let server = mock_upstreams(SAMPLE_ASSOCIATIONS).await;
        let dir = tempfile::tempdir().unwrap();
        let config = AdapterConfig::builder().cache_dir(dir.path()).build();

        let adapter = downloaded_adapter(&server, config).await;
        let scores: Vec<f64> = adapter
            .edges()
            .filter_map(|e| e.properties.get("opentargets_score").and_then(Value::as_f64))
            .collect();

        let mut sorted = scores.clone();
        sorted.sort_by(|a, b| b.partial_cmp(a).unwrap());
        assert_eq!(scores, sorted);
    }

    #[tokio::test]
    async fn test_download_failure_degrades_to_sample() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let config = AdapterConfig::builder()
            .cache_dir(dir.path())
            .max_retries(1)
            .build();

        let adapter = downloaded_adapter(&server, config).await;

        assert_eq!(adapter.strategies().succeeded(), Some("bundled_sample"));
        // The xref export also failed, so the chain fails closed
        assert_eq!(adapter.edges().count(), 0);
        let audit = adapter.audit().unwrap();
        assert!(audit.is_consistent());
        assert_eq!(audit.successful, 0);
    }
}
