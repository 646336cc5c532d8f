// Cross-Reference Resolution
//
// Each entity type has one canonical identifier space: proteins are UniProt
// accessions, genes are NCBI (Entrez) Gene ids, diseases are MONDO terms.
// Edge-only sources name entities in their own schemes, so before an edge
// can be emitted its endpoints are converted through the resolvers in this
// module. Resolution fails closed: an endpoint that cannot be converted
// drops the edge and bumps a counter; identifiers are never guessed.
//
// All tie-breaks (stable-first-candidate, prefer-reviewed) are
// deterministic given identical cached inputs; reproducibility is tested
// directly.

pub mod disease;
pub mod gene;
pub mod string_id;

pub use disease::DiseaseCrosswalk;
pub use gene::GeneIdResolver;
pub use string_id::StringIdResolver;

use serde::Serialize;

/// Disposition counters for an audited resolution chain.
///
/// This is a required observable output of the adapters that resolve
/// associations (used for coverage audits), not merely a log line. Every
/// record lands in exactly one bucket, so
/// `total == score_filtered + mapping_failed + successful` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionAudit {
    pub total: u64,
    pub score_filtered: u64,
    pub mapping_failed: u64,
    pub successful: u64,
}

impl ResolutionAudit {
    pub fn new() -> Self {
        ResolutionAudit::default()
    }

    /// Record a record excluded by the score/frequency threshold
    pub fn record_score_filtered(&mut self) {
        self.total += 1;
        self.score_filtered += 1;
    }

    /// Record a record whose identifier chain could not be resolved
    pub fn record_mapping_failed(&mut self) {
        self.total += 1;
        self.mapping_failed += 1;
    }

    /// Record a fully resolved record
    pub fn record_success(&mut self) {
        self.total += 1;
        self.successful += 1;
    }

    /// Counter consistency invariant
    pub fn is_consistent(&self) -> bool {
        self.total == self.score_filtered + self.mapping_failed + self.successful
    }

    /// Fold another audit into this one
    pub fn merge(&mut self, other: &ResolutionAudit) {
        self.total += other.total;
        self.score_filtered += other.score_filtered;
        self.mapping_failed += other.mapping_failed;
        self.successful += other.successful;
    }
}

impl std::fmt::Display for ResolutionAudit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "total={} score_filtered={} mapping_failed={} successful={}",
            self.total, self.score_filtered, self.mapping_failed, self.successful
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
