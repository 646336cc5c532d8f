//! Canonical graph tuple types
//!
//! Every adapter, whatever its upstream format, produces these two shapes.
//! Node and edge identifiers are CURIEs (`prefix:local-id`) produced by the
//! identifier normalizer; properties are an open JSON map so sources can
//! carry arbitrary fields without schema churn downstream.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Property bag attached to every node and edge
pub type Props = Map<String, Value>;

/// A graph node tuple: `(id, label, properties)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// CURIE identifier, e.g. `uniprot:P04637`
    pub id: String,
    /// Node label, e.g. `protein`
    pub label: String,
    pub properties: Props,
}

impl Node {
    pub fn new(id: impl Into<String>, label: impl Into<String>, properties: Props) -> Self {
        Node {
            id: id.into(),
            label: label.into(),
            properties,
        }
    }
}

/// A graph edge tuple: `(id, source, target, label, properties)`
///
/// The optional id is only set by sources that carry stable edge
/// identifiers; the bulk-import writer keys relationships on
/// `(source, target, label)` regardless.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: Option<String>,
    /// Source node CURIE
    pub source: String,
    /// Target node CURIE
    pub target: String,
    /// Relationship label, e.g. `protein_protein_interaction`
    pub label: String,
    pub properties: Props,
}

impl Edge {
    pub fn new(
        id: Option<String>,
        source: impl Into<String>,
        target: impl Into<String>,
        label: impl Into<String>,
        properties: Props,
    ) -> Self {
        Edge {
            id,
            source: source.into(),
            target: target.into(),
            label: label.into(),
            properties,
        }
    }

    /// Deduplication key used by the writer
    pub fn dedup_key(&self) -> (String, String, String) {
        (self.source.clone(), self.target.clone(), self.label.clone())
    }
}

/// Static source metadata stamped into every emitted property map.
///
/// `source` is stamped as a single-element list so that the writer can
/// accumulate additional asserting sources onto the same edge instead of
/// overwriting the first one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    pub source: String,
    pub version: String,
    pub licence: String,
}

impl Provenance {
    pub fn new(
        source: impl Into<String>,
        version: impl Into<String>,
        licence: impl Into<String>,
    ) -> Self {
        Provenance {
            source: source.into(),
            version: version.into(),
            licence: licence.into(),
        }
    }

    /// Seed a property map with the provenance fields
    pub fn props(&self) -> Props {
        let mut props = Props::new();
        props.insert(
            "source".to_string(),
            Value::Array(vec![Value::String(self.source.clone())]),
        );
        props.insert("version".to_string(), Value::String(self.version.clone()));
        props.insert("licence".to_string(), Value::String(self.licence.clone()));
        props
    }
}

/// Merge the `source` lists of two property maps asserting the same edge.
///
/// Sources already present are not repeated; order of first assertion is
/// preserved so output stays deterministic.
pub fn merge_sources(into: &mut Props, from: &Props) {
    let incoming: Vec<Value> = match from.get("source") {
        Some(Value::Array(list)) => list.clone(),
        Some(Value::String(s)) => vec![Value::String(s.clone())],
        _ => return,
    };

    let existing = into
        .entry("source".to_string())
        .or_insert_with(|| Value::Array(Vec::new()));

    // Normalize a scalar source left over from older property maps
    if let Value::String(s) = existing {
        *existing = Value::Array(vec![Value::String(s.clone())]);
    }

    if let Value::Array(list) = existing {
        for value in incoming {
            if !list.contains(&value) {
                list.push(value);
            }
        }
    }
}

/// Clean a string value for safe import into the graph database.
///
/// Pipe is the downstream array separator and single/double quotes break the
/// loader's quoting, so they are substituted rather than escaped.
pub fn clean_value(value: &str) -> String {
    value
        .replace('|', ",")
        .replace('\'', "^")
        .replace('"', "^")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_provenance_props() {
        let prov = Provenance::new("uniprot", "2026_01", "CC BY 4.0");
        let props = prov.props();

        assert_eq!(props.get("source"), Some(&json!(["uniprot"])));
        assert_eq!(props.get("version"), Some(&json!("2026_01")));
        assert_eq!(props.get("licence"), Some(&json!("CC BY 4.0")));
    }

    #[test]
    fn test_merge_sources_accumulates() {
        let mut a = Provenance::new("string", "v12.0", "CC BY 4.0").props();
        let b = Provenance::new("intact", "2026-01", "CC BY 4.0").props();

        merge_sources(&mut a, &b);
        assert_eq!(a.get("source"), Some(&json!(["string", "intact"])));
    }

    #[test]
    fn test_merge_sources_is_idempotent() {
        let mut a = Provenance::new("string", "v12.0", "CC BY 4.0").props();
        let b = Provenance::new("string", "v12.0", "CC BY 4.0").props();

        merge_sources(&mut a, &b);
        assert_eq!(a.get("source"), Some(&json!(["string"])));
    }

    #[test]
    fn test_merge_sources_upgrades_scalar() {
        let mut a = Props::new();
        a.insert("source".to_string(), json!("string"));
        let b = Provenance::new("intact", "2026-01", "CC BY 4.0").props();

        merge_sources(&mut a, &b);
        assert_eq!(a.get("source"), Some(&json!(["string", "intact"])));
    }

    #[test]
    fn test_clean_value() {
        assert_eq!(clean_value("a|b"), "a,b");
        assert_eq!(clean_value("it's \"quoted\" "), "it^s ^quoted^");
        assert_eq!(clean_value("  padded  "), "padded");
    }

    #[test]
    fn test_edge_dedup_key() {
        let edge = Edge::new(None, "uniprot:P04637", "uniprot:P38936", "ppi", Props::new());
        assert_eq!(
            edge.dedup_key(),
            (
                "uniprot:P04637".to_string(),
                "uniprot:P38936".to_string(),
                "ppi".to_string()
            )
        );
    }
}
