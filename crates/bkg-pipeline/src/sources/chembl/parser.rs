// ChEMBL Bulk TSV Parsers

use super::models::{ChemblActivity, ChemblIndication, ChemblMolecule, ChemblTables};
use crate::adapter::Result;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

/// Bundled fallback molecules in the bulk export shape
pub const SAMPLE_MOLECULES_TSV: &str = "\
chembl_id\tpref_name\tmolecule_type\tmax_phase\tcanonical_smiles\tstandard_inchi_key
CHEMBL25\tASPIRIN\tSmall molecule\t4\tCC(=O)Oc1ccccc1C(=O)O\tBSYNRYMUTXBXSQ-UHFFFAOYSA-N
CHEMBL941\tIMATINIB\tSmall molecule\t4\tCc1ccc(NC(=O)c2ccc(CN3CCN(C)CC3)cc2)cc1Nc1nccc(-c2cccnc2)n1\tKTUFNOKKBVMGRW-UHFFFAOYSA-N
CHEMBL1201585\tTRASTUZUMAB\tAntibody\t4\t\t
CHEMBL6\tINDAZOLE\tSmall molecule\t\tc1ccc2[nH]ncc2c1\tBAXOFTOLAUCFNW-UHFFFAOYSA-N
";

/// Bundled fallback activities; accessions match the bundled UniProt sample
pub const SAMPLE_ACTIVITIES_TSV: &str = "\
molecule_chembl_id\ttarget_accession\tstandard_type\tstandard_value\tstandard_units
CHEMBL25\tP24941\tIC50\t12000\tnM
CHEMBL941\tP00533\tIC50\t180\tnM
CHEMBL941\tP24941\tKi\t2200\tnM
CHEMBL1201585\tP00533\tKd\t5\tnM
";

/// Bundled fallback indications; disease ids match the built-in crosswalk
pub const SAMPLE_INDICATIONS_TSV: &str = "\
molecule_chembl_id\tefo_id\tmax_phase_for_ind
CHEMBL941\tEFO:0000684\t4
CHEMBL1201585\tEFO:0000305\t4
CHEMBL25\tEFO:9999999\t3
";

fn parse_table<T: DeserializeOwned>(content: &str, what: &str) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for result in reader.deserialize::<T>() {
        match result {
            Ok(row) => rows.push(row),
            Err(e) => warn!("Skipping malformed ChEMBL {} row: {}", what, e),
        }
    }

    info!("Parsed {} ChEMBL {} rows", rows.len(), what);
    Ok(rows)
}

pub fn parse_molecules_tsv(content: &str) -> Result<Vec<ChemblMolecule>> {
    parse_table(content, "molecule")
}

pub fn parse_activities_tsv(content: &str) -> Result<Vec<ChemblActivity>> {
    parse_table(content, "activity")
}

pub fn parse_indications_tsv(content: &str) -> Result<Vec<ChemblIndication>> {
    parse_table(content, "indication")
}

/// The bundled sample as a full table set
pub fn sample_tables() -> Result<ChemblTables> {
    Ok(ChemblTables {
        molecules: parse_molecules_tsv(SAMPLE_MOLECULES_TSV)?,
        activities: parse_activities_tsv(SAMPLE_ACTIVITIES_TSV)?,
        indications: parse_indications_tsv(SAMPLE_INDICATIONS_TSV)?,
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sample_molecules() {
        let molecules = parse_molecules_tsv(SAMPLE_MOLECULES_TSV).unwrap();
        assert_eq!(molecules.len(), 4);
        assert_eq!(molecules[0].chembl_id, "CHEMBL25");
        assert_eq!(molecules[0].max_phase, Some(4));
        // Preclinical compound with the phase column empty
        assert_eq!(molecules[3].max_phase, None);
    }

    #[test]
    fn test_parse_sample_activities() {
        let activities = parse_activities_tsv(SAMPLE_ACTIVITIES_TSV).unwrap();
        assert_eq!(activities.len(), 4);
        assert_eq!(activities[0].target_accession, "P24941");
        assert_eq!(activities[0].standard_value, Some(12000.0));
    }

    #[test]
    fn test_parse_sample_indications() {
        let indications = parse_indications_tsv(SAMPLE_INDICATIONS_TSV).unwrap();
        assert_eq!(indications.len(), 3);
        assert_eq!(indications[0].efo_id, "EFO:0000684");
    }

    #[test]
    fn test_sample_tables() {
        let tables = sample_tables().unwrap();
        assert_eq!(tables.molecules.len(), 4);
        assert_eq!(tables.activities.len(), 4);
        assert_eq!(tables.indications.len(), 3);
    }
}
