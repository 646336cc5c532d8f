// Disease Ontology Adapter
//
// Obsolete terms are excluded from nodes and hierarchy edges unless
// explicitly requested, but their xrefs still feed the crosswalk through
// their replacement term when one is named.

use super::models::MondoTerm;
use super::parser::{parse_obo, SAMPLE_OBO};
use super::{CROSSWALK_NAMESPACES, MONDO_FILENAME, MONDO_URL};
use crate::adapter::{
    truncate_raw, Adapter, AdapterConfig, AdapterState, EdgeStream, HttpFetcher, NodeStream,
    Result, StrategyLog,
};
use crate::curie::{IdNormalizer, PrefixRegistry};
use crate::graph::{clean_value, Edge, Node, Provenance};
use crate::resolve::{disease::split_disease_id, DiseaseCrosswalk};
use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

/// Types of nodes provided by the disease adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiseaseNodeType {
    Disease,
}

/// Types of edges provided by the disease adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiseaseEdgeType {
    DiseaseIsADisease,
}

/// Node-authoritative adapter for MONDO disease terms
pub struct DiseaseAdapter {
    config: AdapterConfig,
    fetcher: HttpFetcher,
    normalizer: IdNormalizer,
    provenance: Provenance,
    ontology_url: String,
    include_obsolete: bool,
    node_types: Vec<DiseaseNodeType>,
    edge_types: Vec<DiseaseEdgeType>,
    terms: Vec<MondoTerm>,
    state: AdapterState,
    strategies: StrategyLog,
}

impl DiseaseAdapter {
    pub fn new(config: AdapterConfig) -> Result<Self> {
        config
            .validate()
            .map_err(crate::adapter::AdapterError::Validation)?;

        let fetcher = HttpFetcher::new(&config.cache_dir, config.timeout_secs, config.max_retries)?;
        let normalizer = IdNormalizer::new(PrefixRegistry::default(), config.add_prefix);
        let provenance = Provenance::new("mondo", "2024-01", "CC BY 4.0");

        Ok(DiseaseAdapter {
            config,
            fetcher,
            normalizer,
            provenance,
            ontology_url: MONDO_URL.to_string(),
            include_obsolete: false,
            node_types: vec![DiseaseNodeType::Disease],
            edge_types: vec![DiseaseEdgeType::DiseaseIsADisease],
            terms: Vec::new(),
            state: AdapterState::Uninitialized,
            strategies: StrategyLog::new(),
        })
    }

    /// Override the ontology endpoint (mirrors and tests)
    pub fn with_ontology_url(mut self, url: impl Into<String>) -> Self {
        self.ontology_url = url.into();
        self
    }

    /// Keep obsolete terms in the node stream
    pub fn with_include_obsolete(mut self, include: bool) -> Self {
        self.include_obsolete = include;
        self
    }

    /// Restrict the node subtypes this adapter emits
    pub fn with_node_types(mut self, node_types: Vec<DiseaseNodeType>) -> Self {
        self.node_types = node_types;
        self
    }

    /// Restrict the edge subtypes this adapter emits
    pub fn with_edge_types(mut self, edge_types: Vec<DiseaseEdgeType>) -> Self {
        self.edge_types = edge_types;
        self
    }

    pub fn strategies(&self) -> &StrategyLog {
        &self.strategies
    }

    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    /// Build the disease crosswalk from the materialized terms' xrefs.
    ///
    /// Obsolete terms contribute through their replacement so stale foreign
    /// codes still land on a live MONDO id.
    pub fn crosswalk(&self) -> DiseaseCrosswalk {
        let pairs = self.terms.iter().flat_map(|term| {
            let target = match (&term.is_obsolete, &term.replaced_by) {
                (true, Some(replacement)) => replacement.as_str(),
                (true, None) => return Vec::new(),
                _ => term.id.as_str(),
            };
            let Some((_, mondo_local)) = target.split_once(':') else {
                return Vec::new();
            };

            term.xrefs
                .iter()
                .filter(|xref| {
                    split_disease_id(xref).is_some_and(|(namespace, _)| {
                        CROSSWALK_NAMESPACES.contains(&namespace.to_ascii_uppercase().as_str())
                    })
                })
                .map(|xref| (mondo_local.to_string(), xref.clone()))
                .collect::<Vec<_>>()
        });

        DiseaseCrosswalk::from_xref_pairs(pairs)
    }

    fn visible(&self, term: &MondoTerm) -> bool {
        self.include_obsolete || !term.is_obsolete
    }

    fn disease_node(&self, term: &MondoTerm) -> Option<Node> {
        let id = self.normalizer.normalize("mondo", term.local_id()?)?;
        let mut props = self.provenance.props();

        if !term.name.is_empty() {
            props.insert("name".to_string(), Value::String(clean_value(&term.name)));
        }
        if !term.definition.is_empty() {
            props.insert(
                "definition".to_string(),
                Value::String(clean_value(&term.definition)),
            );
        }
        if !term.synonyms.is_empty() {
            props.insert(
                "synonyms".to_string(),
                Value::Array(
                    term.synonyms
                        .iter()
                        .map(|s| Value::String(clean_value(s)))
                        .collect(),
                ),
            );
        }
        if term.is_obsolete {
            props.insert("is_obsolete".to_string(), Value::Bool(true));
        }

        Some(Node::new(id, "disease", props))
    }
}

#[async_trait]
impl Adapter for DiseaseAdapter {
    fn name(&self) -> &'static str {
        "disease"
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
            .fetch_text_cached(&self.ontology_url, MONDO_FILENAME)
            .await
        {
            Ok(content) => match parse_obo(&content) {
                Ok(terms) => {
                    self.strategies.success("obo_release");
                    terms
                },
                Err(e) => {
                    self.strategies.failure("obo_release", &e);
                    self.strategies.success("bundled_sample");
                    parse_obo(SAMPLE_OBO)?
                },
            },
            Err(e) => {
                self.strategies.failure("obo_release", &e);
                self.strategies.success("bundled_sample");
                parse_obo(SAMPLE_OBO)?
            },
        };

        let terms = truncate_raw(raw, self.config.test_mode, self.config.sample_limit);

        info!("Disease adapter materialized {} MONDO terms", terms.len());
        self.terms = terms;
        self.state = AdapterState::DataLoaded;
        Ok(())
    }

    fn nodes(&self) -> NodeStream<'_> {
        if self.state != AdapterState::DataLoaded
            || !self.node_types.contains(&DiseaseNodeType::Disease)
        {
            return Box::new(std::iter::empty());
        }

        Box::new(
            self.terms
                .iter()
                .filter(move |t| self.visible(t))
                .filter_map(move |t| self.disease_node(t)),
        )
    }

    fn edges(&self) -> EdgeStream<'_> {
        if self.state != AdapterState::DataLoaded
            || !self.edge_types.contains(&DiseaseEdgeType::DiseaseIsADisease)
        {
            return Box::new(std::iter::empty());
        }

        Box::new(
            self.terms
                .iter()
                .filter(move |t| self.visible(t))
                .flat_map(move |term| {
                    let child = term
                        .local_id()
                        .and_then(|local| self.normalizer.normalize("mondo", local));

                    term.parents.iter().filter_map(move |parent| {
                        let child = child.clone()?;
                        let (_, parent_local) = parent.split_once(':')?;
                        let parent_curie = self.normalizer.normalize("mondo", parent_local)?;
                        Some(Edge::new(
                            None,
                            child,
                            parent_curie,
                            "disease_is_a_disease",
                            self.provenance.props(),
                        ))
                    })
                }),
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded_adapter() -> DiseaseAdapter {
        let dir = tempfile::tempdir().unwrap();
        let config = AdapterConfig::builder().cache_dir(dir.path()).build();
        let mut adapter = DiseaseAdapter::new(config).unwrap();
        adapter.terms = parse_obo(SAMPLE_OBO).unwrap();
        adapter.state = AdapterState::DataLoaded;
        adapter
    }

    #[test]
    fn test_disease_nodes_exclude_obsolete() {
        let adapter = loaded_adapter();
        let nodes: Vec<_> = adapter.nodes().collect();

        assert_eq!(nodes.len(), 4);
        assert!(nodes.iter().any(|n| n.id == "mondo:0007254"));
        assert!(nodes.iter().all(|n| n.label == "disease"));
    }

    #[test]
    fn test_include_obsolete_keeps_flagged_node() {
        let adapter = loaded_adapter().with_include_obsolete(true);
        let nodes: Vec<_> = adapter.nodes().collect();

        assert_eq!(nodes.len(), 5);
        let obsolete = nodes.iter().find(|n| n.id == "mondo:0018874").unwrap();
        assert_eq!(obsolete.properties.get("is_obsolete"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_hierarchy_edges() {
        let adapter = loaded_adapter();
        let edges: Vec<_> = adapter.edges().collect();

        assert_eq!(edges.len(), 3);
        assert!(edges
            .iter()
            .all(|e| e.label == "disease_is_a_disease" && e.target == "mondo:0004992"));
    }

    #[test]
    fn test_crosswalk_from_xrefs() {
        let adapter = loaded_adapter();
        let crosswalk = adapter.crosswalk();

        assert_eq!(crosswalk.resolve("EFO_0000305"), Some("0007254"));
        assert_eq!(crosswalk.resolve("DOID:1324"), Some("0008903"));
        assert_eq!(crosswalk.resolve("EFO_0005842"), Some("0005575"));
        // NCIT attribution refs in def lines never enter the crosswalk
        assert_eq!(crosswalk.resolve("NCIT:C4872"), None);
    }

    #[tokio::test]
    async fn test_download_fallback_builds_crosswalk() {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let config = AdapterConfig::builder()
            .cache_dir(dir.path())
            .max_retries(1)
            .build();
        let mut adapter = DiseaseAdapter::new(config)
            .unwrap()
            .with_ontology_url(format!("{}/mondo.obo", server.uri()));

        adapter.download().await.unwrap();

        assert_eq!(adapter.strategies().succeeded(), Some("bundled_sample"));
        assert_eq!(adapter.term_count(), 5);
        assert!(!adapter.crosswalk().is_empty());
    }
}
