// UniProt TSV Parser

use super::models::UniprotRecord;
use crate::adapter::Result;
use tracing::{info, warn};

/// Bundled fallback sample: a handful of well-known reviewed human entries
/// in the exact shape of the REST TSV export. Used when every download
/// strategy fails so downstream stages always have some data, and by tests.
pub const SAMPLE_TSV: &str = "\
Entry\tProtein names\tLength\tMass\tOrganism (ID)\tOrganism\tGene Names (primary)\tEnsembl\tGeneID\tSTRING
P04637\tCellular tumor antigen p53\t393\t43,653\t9606\tHomo sapiens (Human)\tTP53\tENST00000269305.9 [P04637-1];ENST00000413465.6\t7157;\t9606.ENSP00000269305;
P38936\tCyclin-dependent kinase inhibitor 1\t164\t18,119\t9606\tHomo sapiens (Human)\tCDKN1A\tENST00000244741.10\t1026;\t9606.ENSP00000244741;
P24941\tCyclin-dependent kinase 2\t298\t33,930\t9606\tHomo sapiens (Human)\tCDK2\tENST00000266970.9 [P24941-1]\t1017;\t9606.ENSP00000266970;
P00533\tEpidermal growth factor receptor\t1210\t134,277\t9606\tHomo sapiens (Human)\tEGFR\tENST00000275493.7\t1956;\t9606.ENSP00000275493;
P01308\tInsulin\t110\t11,981\t9606\tHomo sapiens (Human)\tINS\tENST00000381330.5\t3630;\t9606.ENSP00000370731;
";

/// Parse the TSV stream export into records
pub fn parse_tsv(content: &str) -> Result<Vec<UniprotRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = Vec::new();
    for result in reader.deserialize::<UniprotRecord>() {
        match result {
            Ok(record) if record.accession.is_empty() => {
                warn!("Skipping UniProt row without accession");
            },
            Ok(record) => records.push(record),
            Err(e) => {
                warn!("Skipping malformed UniProt row: {}", e);
            },
        }
    }

    info!("Parsed {} UniProt records", records.len());
    Ok(records)
}

// ============================================================================
// Tests
// ============================================================================
