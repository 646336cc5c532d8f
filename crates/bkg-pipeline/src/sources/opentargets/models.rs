// Open Targets Export Models

use serde::{Deserialize, Serialize};

/// One association row of the overall direct score export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenTargetsAssociation {
    /// Ensembl gene id, e.g. `ENSG00000269305`
    pub target_id: String,
    /// Disease id in `EFO_0000305` or `MONDO_0007254` form
    pub disease_id: String,
    /// Overall association score in [0, 1]
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub evidence_count: Option<i64>,
}
