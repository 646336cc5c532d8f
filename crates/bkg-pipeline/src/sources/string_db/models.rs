// STRING Export Models

use serde::{Deserialize, Serialize};

/// One interaction row of the STRING links export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StringInteraction {
    /// STRING id of the first protein, e.g. `9606.ENSP00000269305`
    pub protein_a: String,
    /// STRING id of the second protein
    pub protein_b: String,
    /// Combined confidence score, 0-999
    pub combined_score: f64,
}

impl StringInteraction {
    /// Raw self-interactions never form an edge
    pub fn is_self_interaction(&self) -> bool {
        self.protein_a == self.protein_b
    }
}
