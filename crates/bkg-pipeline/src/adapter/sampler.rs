// Test-Mode Sampler
//
// Deterministic prefix truncation applied to raw records before any domain
// filtering. Truncation is never random sampling: two runs over the same
// cached payload must see byte-identical record sequences, same order, same
// truncation point. The truncated prefix is not representative of the full
// distribution; that is an accepted cost of bounded development runs.

use tracing::info;

/// Default truncation point in test mode
pub const DEFAULT_SAMPLE_LIMIT: usize = 100;

/// Truncate `records` to the first `limit` entries when `test_mode` is set
pub fn truncate_raw<T>(records: Vec<T>, test_mode: bool, limit: usize) -> Vec<T> {
    if !test_mode || records.len() <= limit {
        return records;
    }

    info!(
        "Test mode: limiting data from {} to {} records",
        records.len(),
        limit
    );

    let mut records = records;
    records.truncate(limit);
    records
}

// ============================================================================
// Tests
// ============================================================================
