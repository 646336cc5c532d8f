// STRING Links Parser
//
// The links export is space-separated with a single header line:
//
//   protein1 protein2 combined_score
//   9606.ENSP00000269305 9606.ENSP00000244741 999

use super::models::StringInteraction;
use crate::adapter::Result;
use tracing::{info, warn};

/// Bundled fallback sample in the links export shape; the protein ids match
/// the STRING xrefs of the bundled UniProt sample so the chain resolves
/// offline.
pub const SAMPLE_LINKS: &str = "\
protein1 protein2 combined_score
9606.ENSP00000269305 9606.ENSP00000244741 999
9606.ENSP00000244741 9606.ENSP00000266970 965
9606.ENSP00000269305 9606.ENSP00000275493 910
9606.ENSP00000275493 9606.ENSP00000266970 802
9606.ENSP00000269305 9606.ENSP00000370731 310
";

/// Parse the links export into interaction rows
pub fn parse_links(content: &str) -> Result<Vec<StringInteraction>> {
    let mut interactions = Vec::new();

    for (line_number, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("protein1") {
            continue;
        }

        let mut parts = line.split_whitespace();
        let (Some(protein_a), Some(protein_b), Some(score)) =
            (parts.next(), parts.next(), parts.next())
        else {
            warn!("Skipping malformed STRING line {}", line_number + 1);
            continue;
        };

        let Ok(combined_score) = score.parse::<f64>() else {
            warn!("Skipping STRING line {} with non-numeric score", line_number + 1);
            continue;
        };

        interactions.push(StringInteraction {
            protein_a: protein_a.to_string(),
            protein_b: protein_b.to_string(),
            combined_score,
        });
    }

    info!("Parsed {} STRING interactions", interactions.len());
    Ok(interactions)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sample() {
        let interactions = parse_links(SAMPLE_LINKS).unwrap();
        assert_eq!(interactions.len(), 5);
        assert_eq!(interactions[0].protein_a, "9606.ENSP00000269305");
        assert_eq!(interactions[0].protein_b, "9606.ENSP00000244741");
        assert_eq!(interactions[0].combined_score, 999.0);
    }

    #[test]
    fn test_parse_skips_malformed_lines() {
        let content = "protein1 protein2 combined_score\n\
                       9606.ENSP1 9606.ENSP2 900\n\
                       truncated-line\n\
                       9606.ENSP3 9606.ENSP4 not-a-number\n";
        let interactions = parse_links(content).unwrap();
        assert_eq!(interactions.len(), 1);
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse_links("").unwrap().is_empty());
    }
}
