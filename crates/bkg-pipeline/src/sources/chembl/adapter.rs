// ChEMBL Adapter
//
// Backend choice is a policy: bulk TSV exports are preferred except in test
// mode, where the paginated API is faster for small bounded runs. Any
// backend error falls through to the alternate backend, then to the
// bundled sample; the chosen strategy is recorded, not inferred.

use super::api;
use super::models::{ChemblMolecule, ChemblTables};
use super::parser::{
    parse_activities_tsv, parse_indications_tsv, parse_molecules_tsv, sample_tables,
};
use super::{bulk_filename, API_BASE_URL, BULK_BASE_URL, CHEMBL_VERSION};
use crate::adapter::{
    truncate_raw, Adapter, AdapterConfig, AdapterState, EdgeStream, HttpFetcher, NodeStream,
    Result, StrategyLog,
};
use crate::curie::{IdNormalizer, PrefixRegistry};
use crate::graph::{clean_value, Edge, Node, Provenance};
use crate::resolve::{DiseaseCrosswalk, ResolutionAudit};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashSet;
use tracing::info;

/// Types of nodes provided by the ChEMBL adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChemblNodeType {
    Compound,
}

/// Types of edges provided by the ChEMBL adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChemblEdgeType {
    CompoundTargetsProtein,
    DrugTreatsDisease,
}

#[derive(Debug, Clone, PartialEq)]
struct ResolvedActivity {
    compound_curie: String,
    protein_curie: String,
    standard_type: String,
    standard_value: Option<f64>,
    standard_units: String,
}

#[derive(Debug, Clone, PartialEq)]
struct ResolvedIndication {
    compound_curie: String,
    disease_curie: String,
    max_phase_for_ind: Option<i32>,
}

/// Node-authoritative adapter for ChEMBL compounds and their edges
pub struct ChemblAdapter {
    config: AdapterConfig,
    fetcher: HttpFetcher,
    normalizer: IdNormalizer,
    provenance: Provenance,
    bulk_base_url: String,
    api_base_url: String,
    crosswalk: DiseaseCrosswalk,
    node_types: Vec<ChemblNodeType>,
    edge_types: Vec<ChemblEdgeType>,
    molecules: Vec<ChemblMolecule>,
    activities: Vec<ResolvedActivity>,
    indications: Vec<ResolvedIndication>,
    audit: ResolutionAudit,
    state: AdapterState,
    strategies: StrategyLog,
}

impl ChemblAdapter {
    pub fn new(config: AdapterConfig) -> Result<Self> {
        config
            .validate()
            .map_err(crate::adapter::AdapterError::Validation)?;

        let fetcher = HttpFetcher::new(&config.cache_dir, config.timeout_secs, config.max_retries)?;
        let normalizer = IdNormalizer::new(PrefixRegistry::default(), config.add_prefix);
        let provenance = Provenance::new("chembl", CHEMBL_VERSION, "CC BY-SA 3.0");

        Ok(ChemblAdapter {
            config,
            fetcher,
            normalizer,
            provenance,
            bulk_base_url: BULK_BASE_URL.to_string(),
            api_base_url: API_BASE_URL.to_string(),
            crosswalk: DiseaseCrosswalk::builtin(),
            node_types: vec![ChemblNodeType::Compound],
            edge_types: vec![
                ChemblEdgeType::CompoundTargetsProtein,
                ChemblEdgeType::DrugTreatsDisease,
            ],
            molecules: Vec::new(),
            activities: Vec::new(),
            indications: Vec::new(),
            audit: ResolutionAudit::new(),
            state: AdapterState::Uninitialized,
            strategies: StrategyLog::new(),
        })
    }

    /// Override the bulk export endpoint (mirrors and tests)
    pub fn with_bulk_base_url(mut self, url: impl Into<String>) -> Self {
        self.bulk_base_url = url.into();
        self
    }

    /// Override the REST API endpoint (mirrors and tests)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Replace the built-in disease crosswalk
    pub fn with_crosswalk(mut self, crosswalk: DiseaseCrosswalk) -> Self {
        self.crosswalk = crosswalk;
        self
    }

    /// Restrict the node subtypes this adapter emits
    pub fn with_node_types(mut self, node_types: Vec<ChemblNodeType>) -> Self {
        self.node_types = node_types;
        self
    }

    /// Restrict the edge subtypes this adapter emits
    pub fn with_edge_types(mut self, edge_types: Vec<ChemblEdgeType>) -> Self {
        self.edge_types = edge_types;
        self
    }

    pub fn strategies(&self) -> &StrategyLog {
        &self.strategies
    }

    async fn fetch_bulk(&self) -> Result<ChemblTables> {
        let molecules = self
            .fetcher
            .fetch_text_cached(
                &format!("{}/{}", self.bulk_base_url, bulk_filename("molecules")),
                &bulk_filename("molecules"),
            )
            .await?;
        let activities = self
            .fetcher
            .fetch_text_cached(
                &format!("{}/{}", self.bulk_base_url, bulk_filename("activities")),
                &bulk_filename("activities"),
            )
            .await?;
        let indications = self
            .fetcher
            .fetch_text_cached(
                &format!("{}/{}", self.bulk_base_url, bulk_filename("drug_indications")),
                &bulk_filename("drug_indications"),
            )
            .await?;

        Ok(ChemblTables {
            molecules: parse_molecules_tsv(&molecules)?,
            activities: parse_activities_tsv(&activities)?,
            indications: parse_indications_tsv(&indications)?,
        })
    }

    async fn fetch_api(&self) -> Result<ChemblTables> {
        let record_cap = self.config.test_mode.then_some(self.config.sample_limit);
        api::fetch_tables(&self.fetcher, &self.api_base_url, record_cap).await
    }

    /// Acquire the three tables through the backend policy
    async fn fetch_tables(&mut self) -> Result<ChemblTables> {
        // Bulk first, unless a small bounded run makes the API cheaper
        let backends: [&'static str; 2] = if self.config.test_mode {
            ["paginated_api", "bulk_dataset"]
        } else {
            ["bulk_dataset", "paginated_api"]
        };

        for backend in backends {
            let result = match backend {
                "bulk_dataset" => self.fetch_bulk().await,
                _ => self.fetch_api().await,
            };

            match result {
                Ok(tables) => {
                    self.strategies.success(backend);
                    return Ok(tables);
                },
                Err(e) => self.strategies.failure(backend, &e),
            }
        }

        self.strategies.success("bundled_sample");
        sample_tables()
    }

    fn compound_node(&self, molecule: &ChemblMolecule) -> Option<Node> {
        let id = self.normalizer.normalize("chembl", &molecule.chembl_id)?;
        let mut props = self.provenance.props();

        if !molecule.pref_name.is_empty() {
            props.insert(
                "name".to_string(),
                Value::String(clean_value(&molecule.pref_name)),
            );
        }
        if !molecule.molecule_type.is_empty() {
            props.insert(
                "molecule_type".to_string(),
                Value::String(molecule.molecule_type.clone()),
            );
        }
        if let Some(phase) = molecule.max_phase {
            props.insert("max_phase".to_string(), Value::from(phase));
        }
        if !molecule.canonical_smiles.is_empty() {
            props.insert(
                "canonical_smiles".to_string(),
                Value::String(molecule.canonical_smiles.clone()),
            );
        }
        if !molecule.standard_inchi_key.is_empty() {
            props.insert(
                "inchi_key".to_string(),
                Value::String(molecule.standard_inchi_key.clone()),
            );
        }

        Some(Node::new(id, "compound", props))
    }
}

#[async_trait]
impl Adapter for ChemblAdapter {
    fn name(&self) -> &'static str {
        "chembl"
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

        let tables = self.fetch_tables().await?;

        // Deterministic truncation of each raw table before filtering
        let molecules = truncate_raw(tables.molecules, self.config.test_mode, self.config.sample_limit);
        let activities = truncate_raw(tables.activities, self.config.test_mode, self.config.sample_limit);
        let indications = truncate_raw(tables.indications, self.config.test_mode, self.config.sample_limit);

        // Clinical-phase domain filter gates which compounds exist at all
        let min_phase = self.config.threshold.and_then(|t| t.max_phase());
        let molecules: Vec<ChemblMolecule> = molecules
            .into_iter()
            .filter(|m| match min_phase {
                Some(min) => m.max_phase.is_some_and(|p| p >= min),
                None => true,
            })
            .collect();

        let retained: HashSet<&str> = molecules.iter().map(|m| m.chembl_id.as_str()).collect();

        for activity in &activities {
            if !retained.contains(activity.molecule_chembl_id.as_str()) {
                self.audit.record_score_filtered();
                continue;
            }

            let endpoints = self
                .normalizer
                .normalize("chembl", &activity.molecule_chembl_id)
                .zip(self.normalizer.normalize("uniprot", &activity.target_accession));

            match endpoints {
                Some((compound_curie, protein_curie)) => {
                    self.audit.record_success();
                    self.activities.push(ResolvedActivity {
                        compound_curie,
                        protein_curie,
                        standard_type: activity.standard_type.clone(),
                        standard_value: activity.standard_value,
                        standard_units: activity.standard_units.clone(),
                    });
                },
                None => self.audit.record_mapping_failed(),
            }
        }

        for indication in &indications {
            if !retained.contains(indication.molecule_chembl_id.as_str()) {
                self.audit.record_score_filtered();
                continue;
            }

            let endpoints = self
                .crosswalk
                .resolve(&indication.efo_id)
                .and_then(|mondo_local| {
                    self.normalizer
                        .normalize("chembl", &indication.molecule_chembl_id)
                        .zip(self.normalizer.normalize("mondo", mondo_local))
                });

            match endpoints {
                Some((compound_curie, disease_curie)) => {
                    self.audit.record_success();
                    self.indications.push(ResolvedIndication {
                        compound_curie,
                        disease_curie,
                        max_phase_for_ind: indication.max_phase_for_ind,
                    });
                },
                None => self.audit.record_mapping_failed(),
            }
        }

        info!(
            "ChEMBL adapter materialized {} compounds, {} activities, {} indications ({})",
            molecules.len(),
            self.activities.len(),
            self.indications.len(),
            self.audit
        );
        self.molecules = molecules;
        self.state = AdapterState::DataLoaded;
        Ok(())
    }

    fn nodes(&self) -> NodeStream<'_> {
        if self.state != AdapterState::DataLoaded
            || !self.node_types.contains(&ChemblNodeType::Compound)
        {
            return Box::new(std::iter::empty());
        }

        Box::new(self.molecules.iter().filter_map(move |m| self.compound_node(m)))
    }

    fn edges(&self) -> EdgeStream<'_> {
        if self.state != AdapterState::DataLoaded {
            return Box::new(std::iter::empty());
        }

        let targets = self
            .edge_types
            .contains(&ChemblEdgeType::CompoundTargetsProtein)
            .then(|| {
                self.activities.iter().map(move |a| {
                    let mut props = self.provenance.props();
                    if !a.standard_type.is_empty() {
                        props.insert(
                            "standard_type".to_string(),
                            Value::String(a.standard_type.clone()),
                        );
                    }
                    if let Some(value) = a.standard_value {
                        props.insert("standard_value".to_string(), Value::from(value));
                    }
                    if !a.standard_units.is_empty() {
                        props.insert(
                            "standard_units".to_string(),
                            Value::String(a.standard_units.clone()),
                        );
                    }

                    Edge::new(
                        None,
                        a.compound_curie.clone(),
                        a.protein_curie.clone(),
                        "compound_targets_protein",
                        props,
                    )
                })
            })
            .into_iter()
            .flatten();

        let treats = self
            .edge_types
            .contains(&ChemblEdgeType::DrugTreatsDisease)
            .then(|| {
                self.indications.iter().map(move |i| {
                    let mut props = self.provenance.props();
                    if let Some(phase) = i.max_phase_for_ind {
                        props.insert("max_phase_for_indication".to_string(), Value::from(phase));
                    }

                    Edge::new(
                        None,
                        i.compound_curie.clone(),
                        i.disease_curie.clone(),
                        "drug_treats_disease",
                        props,
                    )
                })
            })
            .into_iter()
            .flatten();

        Box::new(targets.chain(treats))
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
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Every upstream fails, so the bundled sample serves the run
    async fn sample_adapter(config: AdapterConfig) -> ChemblAdapter {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let mut adapter = ChemblAdapter::new(config)
            .unwrap()
            .with_bulk_base_url(server.uri())
            .with_api_base_url(server.uri());
        adapter.download().await.unwrap();
        adapter
    }

    fn test_config(dir: &std::path::Path) -> AdapterConfig {
        AdapterConfig::builder().cache_dir(dir).max_retries(1).build()
    }

    #[tokio::test]
    async fn test_sample_fallback_emits_compound_nodes() {
        let dir = tempfile::tempdir().unwrap();
        let adapter = sample_adapter(test_config(dir.path())).await;

        assert_eq!(adapter.strategies().succeeded(), Some("bundled_sample"));

        let nodes: Vec<_> = adapter.nodes().collect();
        assert_eq!(nodes.len(), 4);
        assert_eq!(nodes[0].id, "chembl:CHEMBL25");
        assert_eq!(nodes[0].label, "compound");
        assert_eq!(nodes[0].properties.get("max_phase"), Some(&Value::from(4)));
    }

    #[tokio::test]
    async fn test_activity_edges_reference_uniprot() {
        let dir = tempfile::tempdir().unwrap();
        let adapter = sample_adapter(test_config(dir.path())).await;

        let edges: Vec<_> = adapter
            .edges()
            .filter(|e| e.label == "compound_targets_protein")
            .collect();
        assert_eq!(edges.len(), 4);
        assert_eq!(edges[0].source, "chembl:CHEMBL25");
        assert_eq!(edges[0].target, "uniprot:P24941");
        assert_eq!(
            edges[0].properties.get("standard_value"),
            Some(&Value::from(12000.0))
        );
    }

    #[tokio::test]
    async fn test_indication_edges_resolve_through_crosswalk() {
        let dir = tempfile::tempdir().unwrap();
        let adapter = sample_adapter(test_config(dir.path())).await;

        let edges: Vec<_> = adapter
            .edges()
            .filter(|e| e.label == "drug_treats_disease")
            .collect();

        // EFO:9999999 is not in the crosswalk and drops its indication
        assert_eq!(edges.len(), 2);
        assert!(edges.iter().any(|e| e.source == "chembl:CHEMBL941"
            && e.target == "mondo:0008903"));
        assert_eq!(adapter.audit().unwrap().mapping_failed, 1);
        assert!(adapter.audit().unwrap().is_consistent());
    }

    #[tokio::test]
    async fn test_max_phase_threshold_filters_compounds() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        config.threshold = Some(Threshold::MaxPhase(4));

        let adapter = sample_adapter(config).await;
        let nodes: Vec<_> = adapter.nodes().collect();

        // The phase-less sample compound is excluded
        assert_eq!(nodes.len(), 3);
        assert!(nodes.iter().all(|n| n.id != "chembl:CHEMBL6"));
    }

    #[tokio::test]
    async fn test_test_mode_prefers_api_backend() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        config.test_mode = true;

        let mut adapter = ChemblAdapter::new(config)
            .unwrap()
            .with_bulk_base_url(server.uri())
            .with_api_base_url(server.uri());
        adapter.download().await.unwrap();

        // Both backends failed, but the API was attempted first
        let attempts = adapter.strategies().attempts();
        assert_eq!(attempts[0].strategy, "paginated_api");
        assert_eq!(attempts[1].strategy, "bulk_dataset");
        assert_eq!(adapter.strategies().succeeded(), Some("bundled_sample"));
    }

    #[tokio::test]
    async fn test_bulk_backend_preferred_outside_test_mode() {
        let dir = tempfile::tempdir().unwrap();
        let adapter = sample_adapter(test_config(dir.path())).await;

        let attempts = adapter.strategies().attempts();
        assert_eq!(attempts[0].strategy, "bulk_dataset");
    }

    #[tokio::test]
    async fn test_activity_without_accession_is_mapping_failure() {
        use wiremock::matchers::path_regex;

        let server = MockServer::start().await;
        let molecules = "chembl_id\tpref_name\tmolecule_type\tmax_phase\tcanonical_smiles\tstandard_inchi_key\n\
                         CHEMBL25\tASPIRIN\tSmall molecule\t4\t\t\n";
        let activities = "molecule_chembl_id\ttarget_accession\tstandard_type\tstandard_value\tstandard_units\n\
                          CHEMBL25\t\tIC50\t100\tnM\n";
        let indications = "molecule_chembl_id\tefo_id\tmax_phase_for_ind\n";

        for (pattern, body) in [
            (r"^/chembl_34_molecules\.tsv\.gz$", molecules),
            (r"^/chembl_34_activities\.tsv\.gz$", activities),
            (r"^/chembl_34_drug_indications\.tsv\.gz$", indications),
        ] {
            use flate2::write::GzEncoder;
            use flate2::Compression;
            use std::io::Write;
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(body.as_bytes()).unwrap();

            Mock::given(method("GET"))
                .and(path_regex(pattern))
                .respond_with(ResponseTemplate::new(200).set_body_bytes(encoder.finish().unwrap()))
                .mount(&server)
                .await;
        }

        let dir = tempfile::tempdir().unwrap();
        let mut adapter = ChemblAdapter::new(test_config(dir.path()))
            .unwrap()
            .with_bulk_base_url(server.uri())
            .with_api_base_url(server.uri());
        adapter.download().await.unwrap();

        assert_eq!(adapter.strategies().succeeded(), Some("bulk_dataset"));
        // The empty accession cannot form a protein CURIE
        assert_eq!(
            adapter
                .edges()
                .filter(|e| e.label == "compound_targets_protein")
                .count(),
            0
        );
        assert_eq!(adapter.audit().unwrap().mapping_failed, 1);
    }
}
