// Open Targets JSON Lines Parser

use super::models::OpenTargetsAssociation;
use crate::adapter::Result;
use serde_jsonlines::JsonLinesReader;
use tracing::{info, warn};

/// Bundled fallback sample in the export shape; target ids line up with the
/// Ensembl xrefs of the bundled UniProt sample and disease ids with the
/// built-in crosswalk, so the full chain resolves offline.
pub const SAMPLE_ASSOCIATIONS: &str = r#"{"targetId":"ENSG00000269305","diseaseId":"EFO_0000305","score":0.95,"evidenceCount":157}
{"targetId":"ENSG00000244741","diseaseId":"EFO_0000684","score":0.89,"evidenceCount":234}
{"targetId":"ENSG00000266970","diseaseId":"EFO_0005842","score":0.87,"evidenceCount":189}
{"targetId":"ENSG00000275493","diseaseId":"EFO_0000684","score":0.61,"evidenceCount":88}
{"targetId":"ENSG00000275493","diseaseId":"EFO_0000305","score":0.05,"evidenceCount":3}
"#;

/// Parse the JSON lines export; malformed lines are skipped, not fatal
pub fn parse_associations(content: &str) -> Result<Vec<OpenTargetsAssociation>> {
    let mut reader = JsonLinesReader::new(content.as_bytes());
    let mut associations = Vec::new();
    let mut skipped = 0usize;

    for result in reader.read_all::<OpenTargetsAssociation>() {
        match result {
            Ok(association) => associations.push(association),
            Err(e) => {
                warn!("Skipping malformed Open Targets line: {}", e);
                skipped += 1;
            },
        }
    }

    info!(
        "Parsed {} Open Targets associations ({} skipped)",
        associations.len(),
        skipped
    );
    Ok(associations)
}

// ============================================================================
// Tests
// ============================================================================
