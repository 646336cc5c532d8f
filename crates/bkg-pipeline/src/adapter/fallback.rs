// Download Strategy Fallback Chain
//
// Adapters that can acquire their data more than one way (bulk dataset,
// paginated API, bundled sample) run an ordered list of named strategies.
// Each attempt is recorded as a structured outcome instead of disappearing
// into a nested catch chain, so tests can assert exactly which backend
// served a run and why the earlier ones were skipped.

use serde::Serialize;
use tracing::warn;

/// Outcome of one named download strategy
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrategyAttempt {
    pub strategy: &'static str,
    /// None on success, otherwise the failure rendered as text
    pub error: Option<String>,
}

/// Ordered record of the strategies an adapter tried during download()
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StrategyLog {
    attempts: Vec<StrategyAttempt>,
}

impl StrategyLog {
    pub fn new() -> Self {
        StrategyLog::default()
    }

    /// Record a failed strategy and log it; failures are never silent
    pub fn failure(&mut self, strategy: &'static str, error: impl std::fmt::Display) {
        warn!("Download strategy '{}' failed: {}", strategy, error);
        self.attempts.push(StrategyAttempt {
            strategy,
            error: Some(error.to_string()),
        });
    }

    /// Record the strategy that produced the data for this run
    pub fn success(&mut self, strategy: &'static str) {
        self.attempts.push(StrategyAttempt {
            strategy,
            error: None,
        });
    }

    /// Name of the successful strategy, if any succeeded
    pub fn succeeded(&self) -> Option<&'static str> {
        self.attempts
            .iter()
            .find(|a| a.error.is_none())
            .map(|a| a.strategy)
    }

    pub fn attempts(&self) -> &[StrategyAttempt] {
        &self.attempts
    }

    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================
