// Bulk Import Writer
//
// Collects the canonical tuple stream and writes the tab-separated layout
// the graph-database bulk loader consumes: per label, a header file
// declaring column roles (:ID for nodes; :START_ID, :END_ID, :TYPE for
// relationships) and a matching data file. Nodes deduplicate on id; edges
// deduplicate on (source, target, label) with their `source` provenance
// lists merged, which is what later conflict/consensus resolution keys on.

use crate::graph::{merge_sources, Edge, Node};
use bkg_common::{BkgError, Result};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use tracing::{debug, info};

/// Summary of a flushed run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriterStats {
    pub nodes_written: u64,
    pub edges_written: u64,
    pub duplicate_nodes: u64,
    pub merged_edges: u64,
    pub files: Vec<PathBuf>,
}

/// Writer producing the header/part file pairs for bulk import
pub struct GraphWriter {
    output_dir: PathBuf,
    /// label -> id -> node, ordered for deterministic output
    nodes: BTreeMap<String, BTreeMap<String, Node>>,
    /// label -> (source, target) -> edge
    edges: BTreeMap<String, BTreeMap<(String, String), Edge>>,
    duplicate_nodes: u64,
    merged_edges: u64,
}

impl GraphWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        GraphWriter {
            output_dir: output_dir.into(),
            nodes: BTreeMap::new(),
            edges: BTreeMap::new(),
            duplicate_nodes: 0,
            merged_edges: 0,
        }
    }

    /// Add a node; the first assertion of an id wins
    pub fn add_node(&mut self, node: Node) {
        let by_id = self.nodes.entry(node.label.clone()).or_default();
        if by_id.contains_key(&node.id) {
            self.duplicate_nodes += 1;
            return;
        }
        by_id.insert(node.id.clone(), node);
    }

    /// Add an edge; a duplicate assertion merges its `source` list into the
    /// existing edge instead of overwriting it
    pub fn add_edge(&mut self, edge: Edge) {
        let by_key = self.edges.entry(edge.label.clone()).or_default();
        let key = (edge.source.clone(), edge.target.clone());

        match by_key.get_mut(&key) {
            Some(existing) => {
                merge_sources(&mut existing.properties, &edge.properties);
                self.merged_edges += 1;
            },
            None => {
                by_key.insert(key, edge);
            },
        }
    }

    /// Write all collected tuples and return the run summary
    pub fn flush(&mut self) -> Result<WriterStats> {
        std::fs::create_dir_all(&self.output_dir)?;
        let mut stats = WriterStats::default();

        for (label, by_id) in &self.nodes {
            let prop_keys = property_keys(by_id.values().map(|n| &n.properties));

            let header_path = self.output_dir.join(format!("{}-header.csv", label));
            let mut header = tsv_writer(&header_path)?;
            let mut columns = vec![":ID".to_string()];
            columns.extend(prop_keys.iter().cloned());
            columns.push(":LABEL".to_string());
            header.write_record(&columns).map_err(csv_error)?;
            header.flush()?;

            let part_path = self.output_dir.join(format!("{}-part000.csv", label));
            let mut part = tsv_writer(&part_path)?;
            for node in by_id.values() {
                let mut row = vec![node.id.clone()];
                row.extend(prop_keys.iter().map(|k| field(node.properties.get(k))));
                row.push(node.label.clone());
                part.write_record(&row).map_err(csv_error)?;
                stats.nodes_written += 1;
            }
            part.flush()?;

            debug!("Wrote {} {} nodes", by_id.len(), label);
            stats.files.push(header_path);
            stats.files.push(part_path);
        }

        for (label, by_key) in &self.edges {
            let prop_keys = property_keys(by_key.values().map(|e| &e.properties));

            let header_path = self.output_dir.join(format!("{}-header.csv", label));
            let mut header = tsv_writer(&header_path)?;
            let mut columns = vec![":START_ID".to_string(), ":END_ID".to_string(), ":TYPE".to_string()];
            columns.extend(prop_keys.iter().cloned());
            header.write_record(&columns).map_err(csv_error)?;
            header.flush()?;

            let part_path = self.output_dir.join(format!("{}-part000.csv", label));
            let mut part = tsv_writer(&part_path)?;
            for edge in by_key.values() {
                let mut row = vec![edge.source.clone(), edge.target.clone(), edge.label.clone()];
                row.extend(prop_keys.iter().map(|k| field(edge.properties.get(k))));
                part.write_record(&row).map_err(csv_error)?;
                stats.edges_written += 1;
            }
            part.flush()?;

            debug!("Wrote {} {} edges", by_key.len(), label);
            stats.files.push(header_path);
            stats.files.push(part_path);
        }

        stats.duplicate_nodes = self.duplicate_nodes;
        stats.merged_edges = self.merged_edges;

        info!(
            "Bulk import written to {}: {} nodes, {} edges ({} duplicate nodes skipped, {} edges merged)",
            self.output_dir.display(),
            stats.nodes_written,
            stats.edges_written,
            stats.duplicate_nodes,
            stats.merged_edges
        );
        Ok(stats)
    }
}

fn tsv_writer(path: &std::path::Path) -> Result<csv::Writer<std::fs::File>> {
    csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(path)
        .map_err(csv_error)
}

fn csv_error(err: csv::Error) -> BkgError {
    BkgError::Parse(err.to_string())
}

/// Sorted union of property keys across a label's tuples
fn property_keys<'a>(
    props: impl Iterator<Item = &'a serde_json::Map<String, Value>>,
) -> Vec<String> {
    let mut keys = BTreeSet::new();
    for map in props {
        keys.extend(map.keys().cloned());
    }
    keys.into_iter().collect()
}

/// Render a property value as a TSV field; lists use the loader's `|`
/// separator (string values were cleaned of literal pipes upstream)
fn field(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| field(Some(v)))
            .collect::<Vec<_>>()
            .join("|"),
        Some(other) => other.to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================
