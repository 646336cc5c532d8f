// MONDO Ontology Models

use serde::{Deserialize, Serialize};

/// One `[Term]` stanza of the MONDO OBO release, restricted to the fields
/// the pipeline consumes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MondoTerm {
    /// Full ontology id, e.g. `MONDO:0007254`
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub definition: String,
    #[serde(default)]
    pub synonyms: Vec<String>,
    /// Foreign codes this term maps, e.g. `EFO:0000305`
    #[serde(default)]
    pub xrefs: Vec<String>,
    /// is_a parents, e.g. `MONDO:0004992`
    #[serde(default)]
    pub parents: Vec<String>,
    #[serde(default)]
    pub is_obsolete: bool,
    #[serde(default)]
    pub replaced_by: Option<String>,
}

impl MondoTerm {
    /// Local part of the ontology id (`0007254`)
    pub fn local_id(&self) -> Option<&str> {
        self.id.split_once(':').map(|(_, local)| local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_id() {
        let term = MondoTerm {
            id: "MONDO:0007254".to_string(),
            ..Default::default()
        };
        assert_eq!(term.local_id(), Some("0007254"));

        let malformed = MondoTerm {
            id: "no-colon".to_string(),
            ..Default::default()
        };
        assert_eq!(malformed.local_id(), None);
    }
}
