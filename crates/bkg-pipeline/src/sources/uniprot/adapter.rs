// UniProt Adapter
//
// Node-authoritative for proteins, genes and organisms. Gene nodes carry
// Entrez ids when UniProt maps them, otherwise the Ensembl gene id derived
// from the first transcript xref; organism nodes carry NCBI taxon CURIEs.

use super::models::UniprotRecord;
use super::parser::{parse_tsv, SAMPLE_TSV};
use super::{export_filename, export_url, STREAM_URL};
use crate::adapter::{
    truncate_raw, Adapter, AdapterConfig, AdapterState, EdgeStream, HttpFetcher, NodeStream,
    Result, StrategyLog,
};
use crate::curie::{IdNormalizer, PrefixRegistry};
use crate::graph::{clean_value, Edge, Node, Provenance};
use crate::resolve::gene::ensembl_gene_from_xref;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashSet;
use tracing::info;

/// Types of nodes provided by the UniProt adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniprotNodeType {
    Protein,
    Gene,
    Organism,
}

/// Fields emitted onto protein nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniprotNodeField {
    Name,
    Length,
    Mass,
    GeneSymbol,
    OrganismName,
}

impl UniprotNodeField {
    pub fn as_str(&self) -> &str {
        match self {
            UniprotNodeField::Name => "name",
            UniprotNodeField::Length => "length",
            UniprotNodeField::Mass => "mass_daltons",
            UniprotNodeField::GeneSymbol => "symbol",
            UniprotNodeField::OrganismName => "name",
        }
    }

    pub fn all() -> Vec<UniprotNodeField> {
        vec![
            UniprotNodeField::Name,
            UniprotNodeField::Length,
            UniprotNodeField::Mass,
            UniprotNodeField::GeneSymbol,
            UniprotNodeField::OrganismName,
        ]
    }
}

/// Types of edges provided by the UniProt adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniprotEdgeType {
    GeneEncodesProtein,
    ProteinBelongsToOrganism,
}

/// Adapter for UniProtKB protein data
pub struct UniprotAdapter {
    config: AdapterConfig,
    fetcher: HttpFetcher,
    normalizer: IdNormalizer,
    provenance: Provenance,
    stream_url: String,
    node_types: Vec<UniprotNodeType>,
    node_fields: Vec<UniprotNodeField>,
    edge_types: Vec<UniprotEdgeType>,
    records: Vec<UniprotRecord>,
    state: AdapterState,
    strategies: StrategyLog,
}

impl UniprotAdapter {
    pub fn new(config: AdapterConfig) -> Result<Self> {
        config
            .validate()
            .map_err(crate::adapter::AdapterError::Validation)?;

        let fetcher = HttpFetcher::new(&config.cache_dir, config.timeout_secs, config.max_retries)?;
        let normalizer = IdNormalizer::new(PrefixRegistry::default(), config.add_prefix);
        let provenance = Provenance::new(
            "uniprot",
            chrono::Utc::now().format("%Y_%m").to_string(),
            "CC BY 4.0",
        );

        Ok(UniprotAdapter {
            config,
            fetcher,
            normalizer,
            provenance,
            stream_url: STREAM_URL.to_string(),
            node_types: vec![
                UniprotNodeType::Protein,
                UniprotNodeType::Gene,
                UniprotNodeType::Organism,
            ],
            node_fields: UniprotNodeField::all(),
            edge_types: vec![
                UniprotEdgeType::GeneEncodesProtein,
                UniprotEdgeType::ProteinBelongsToOrganism,
            ],
            records: Vec::new(),
            state: AdapterState::Uninitialized,
            strategies: StrategyLog::new(),
        })
    }

    /// Override the stream endpoint (mirrors and tests)
    pub fn with_stream_url(mut self, url: impl Into<String>) -> Self {
        self.stream_url = url.into();
        self
    }

    /// Restrict the node subtypes this adapter emits
    pub fn with_node_types(mut self, node_types: Vec<UniprotNodeType>) -> Self {
        self.node_types = node_types;
        self
    }

    /// Restrict the fields emitted onto nodes
    pub fn with_node_fields(mut self, node_fields: Vec<UniprotNodeField>) -> Self {
        self.node_fields = node_fields;
        self
    }

    /// Restrict the edge subtypes this adapter emits
    pub fn with_edge_types(mut self, edge_types: Vec<UniprotEdgeType>) -> Self {
        self.edge_types = edge_types;
        self
    }

    /// Strategies attempted by the last download
    pub fn strategies(&self) -> &StrategyLog {
        &self.strategies
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    fn field_enabled(&self, field: UniprotNodeField) -> bool {
        self.node_fields.contains(&field)
    }

    /// CURIE for the gene encoding a protein: Entrez id when mapped,
    /// otherwise the Ensembl gene derived from the first transcript xref
    fn gene_curie(&self, record: &UniprotRecord) -> Option<String> {
        if let Some(entrez) = record.entrez_gene_id() {
            return self.normalizer.normalize("ncbigene", entrez);
        }

        let ensembl_gene = ensembl_gene_from_xref(&record.xref_ensembl)?;
        self.normalizer.normalize("ensembl", &ensembl_gene)
    }

    fn protein_node(&self, record: &UniprotRecord) -> Option<Node> {
        let id = self.normalizer.normalize("uniprot", &record.accession)?;
        let mut props = self.provenance.props();

        if self.field_enabled(UniprotNodeField::Name) && !record.protein_name.is_empty() {
            props.insert(
                "name".to_string(),
                Value::String(clean_value(&record.protein_name)),
            );
        }
        if self.field_enabled(UniprotNodeField::Length) {
            if let Some(length) = record.length_value() {
                props.insert("length".to_string(), Value::from(length));
            }
        }
        if self.field_enabled(UniprotNodeField::Mass) {
            if let Some(mass) = record.mass_daltons() {
                props.insert("mass_daltons".to_string(), Value::from(mass));
            }
        }

        Some(Node::new(id, "protein", props))
    }

    fn gene_node(&self, record: &UniprotRecord) -> Option<Node> {
        let id = self.gene_curie(record)?;
        let mut props = self.provenance.props();

        if self.field_enabled(UniprotNodeField::GeneSymbol) && !record.gene_primary.is_empty() {
            props.insert(
                "symbol".to_string(),
                Value::String(clean_value(&record.gene_primary)),
            );
        }

        Some(Node::new(id, "gene", props))
    }

    fn organism_node(&self, record: &UniprotRecord) -> Option<Node> {
        let id = self.normalizer.normalize("ncbitaxon", &record.organism_id)?;
        let mut props = self.provenance.props();

        if self.field_enabled(UniprotNodeField::OrganismName) && !record.organism_name.is_empty() {
            props.insert(
                "name".to_string(),
                Value::String(clean_value(&record.organism_name)),
            );
        }

        Some(Node::new(id, "organism", props))
    }
}

#[async_trait]
impl Adapter for UniprotAdapter {
    fn name(&self) -> &'static str {
        "uniprot"
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

        let url = export_url(&self.stream_url, &self.config)?;
        let filename = export_filename(&self.config);

        let raw = match self.fetcher.fetch_text_cached(&url, &filename).await {
            Ok(content) => match parse_tsv(&content) {
                Ok(records) => {
                    self.strategies.success("rest_export");
                    records
                },
                Err(e) => {
                    self.strategies.failure("rest_export", &e);
                    self.strategies.success("bundled_sample");
                    parse_tsv(SAMPLE_TSV)?
                },
            },
            Err(e) => {
                self.strategies.failure("rest_export", &e);
                self.strategies.success("bundled_sample");
                parse_tsv(SAMPLE_TSV)?
            },
        };

        // Deterministic truncation happens before the domain filter
        let mut records = truncate_raw(raw, self.config.test_mode, self.config.sample_limit);

        if let Some(organism) = &self.config.organism {
            records.retain(|r| &r.organism_id == organism);
        }

        info!("UniProt adapter materialized {} records", records.len());
        self.records = records;
        self.state = AdapterState::DataLoaded;
        Ok(())
    }

    fn nodes(&self) -> NodeStream<'_> {
        if self.state != AdapterState::DataLoaded {
            return Box::new(std::iter::empty());
        }

        let proteins = self
            .node_types
            .contains(&UniprotNodeType::Protein)
            .then(|| self.records.iter().filter_map(move |r| self.protein_node(r)))
            .into_iter()
            .flatten();

        let mut seen_genes = HashSet::new();
        let genes = self
            .node_types
            .contains(&UniprotNodeType::Gene)
            .then(|| {
                self.records.iter().filter_map(move |r| {
                    let node = self.gene_node(r)?;
                    seen_genes.insert(node.id.clone()).then_some(node)
                })
            })
            .into_iter()
            .flatten();

        let mut seen_organisms = HashSet::new();
        let organisms = self
            .node_types
            .contains(&UniprotNodeType::Organism)
            .then(|| {
                self.records.iter().filter_map(move |r| {
                    let node = self.organism_node(r)?;
                    seen_organisms.insert(node.id.clone()).then_some(node)
                })
            })
            .into_iter()
            .flatten();

        Box::new(proteins.chain(genes).chain(organisms))
    }

    fn edges(&self) -> EdgeStream<'_> {
        if self.state != AdapterState::DataLoaded {
            return Box::new(std::iter::empty());
        }

        let gene_edges = self
            .edge_types
            .contains(&UniprotEdgeType::GeneEncodesProtein)
            .then(|| {
                self.records.iter().filter_map(move |r| {
                    let gene = self.gene_curie(r)?;
                    let protein = self.normalizer.normalize("uniprot", &r.accession)?;
                    Some(Edge::new(
                        None,
                        gene,
                        protein,
                        "gene_encodes_protein",
                        self.provenance.props(),
                    ))
                })
            })
            .into_iter()
            .flatten();

        let organism_edges = self
            .edge_types
            .contains(&UniprotEdgeType::ProteinBelongsToOrganism)
            .then(|| {
                self.records.iter().filter_map(move |r| {
                    let protein = self.normalizer.normalize("uniprot", &r.accession)?;
                    let organism = self.normalizer.normalize("ncbitaxon", &r.organism_id)?;
                    Some(Edge::new(
                        None,
                        protein,
                        organism,
                        "protein_belongs_to_organism",
                        self.provenance.props(),
                    ))
                })
            })
            .into_iter()
            .flatten();

        Box::new(gene_edges.chain(organism_edges))
    }
}

// ============================================================================
// Tests
// ============================================================================
