// ChEMBL Backend-Neutral Models
//
// Both backends decode into these three tables; everything downstream of
// download() is backend-agnostic.

use serde::{Deserialize, Serialize};

/// A molecule (drug or compound) row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChemblMolecule {
    /// ChEMBL id, e.g. `CHEMBL25`
    pub chembl_id: String,
    #[serde(default)]
    pub pref_name: String,
    #[serde(default)]
    pub molecule_type: String,
    /// Highest clinical development phase reached (4 = approved)
    #[serde(default)]
    pub max_phase: Option<i32>,
    #[serde(default)]
    pub canonical_smiles: String,
    #[serde(default)]
    pub standard_inchi_key: String,
}

/// A bioactivity row linking a molecule to a protein target
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChemblActivity {
    pub molecule_chembl_id: String,
    /// UniProt accession of the target protein; empty when the target has
    /// no protein component
    #[serde(default)]
    pub target_accession: String,
    #[serde(default)]
    pub standard_type: String,
    #[serde(default)]
    pub standard_value: Option<f64>,
    #[serde(default)]
    pub standard_units: String,
}

/// A drug indication row linking a molecule to a disease
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChemblIndication {
    pub molecule_chembl_id: String,
    /// Disease id in `EFO:0000305` or `EFO_0000305` form
    #[serde(default)]
    pub efo_id: String,
    #[serde(default)]
    pub max_phase_for_ind: Option<i32>,
}

/// The three tables a backend materializes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChemblTables {
    pub molecules: Vec<ChemblMolecule>,
    pub activities: Vec<ChemblActivity>,
    pub indications: Vec<ChemblIndication>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tables_are_empty() {
        let tables = ChemblTables::default();
        assert!(tables.molecules.is_empty());
        assert!(tables.activities.is_empty());
        assert!(tables.indications.is_empty());
    }
}
