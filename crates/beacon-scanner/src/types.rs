//! Scan lifecycle types shared by the pipeline, queue, store, and callers.

use beacon_core::{PlanTier, ProductProfile};
use beacon_scoring::{ScoreDelta, ScoringBreakdown, ShareOfVoiceEntry};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Progress checkpoints reported through the store as a scan advances.
pub const PROGRESS_STARTED: u8 = 10;
pub const PROGRESS_SCORED: u8 = 80;
pub const PROGRESS_STRATEGY: u8 = 85;
pub const PROGRESS_DONE: u8 = 100;

/// Lifecycle state of a scan.
///
/// `queued → processing → generating_strategy → complete` is the happy
/// path. `failed` is only ever entered from `processing`;
/// `strategy_failed` only from `generating_strategy`, and the scan's score
/// stays valid there. Every scan ends in exactly one terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    Queued,
    Processing,
    GeneratingStrategy,
    Complete,
    Failed,
    StrategyFailed,
}

impl ScanStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ScanStatus::Queued => "queued",
            ScanStatus::Processing => "processing",
            ScanStatus::GeneratingStrategy => "generating_strategy",
            ScanStatus::Complete => "complete",
            ScanStatus::Failed => "failed",
            ScanStatus::StrategyFailed => "strategy_failed",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "queued" => Some(ScanStatus::Queued),
            "processing" => Some(ScanStatus::Processing),
            "generating_strategy" => Some(ScanStatus::GeneratingStrategy),
            "complete" => Some(ScanStatus::Complete),
            "failed" => Some(ScanStatus::Failed),
            "strategy_failed" => Some(ScanStatus::StrategyFailed),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ScanStatus::Complete | ScanStatus::Failed | ScanStatus::StrategyFailed
        )
    }
}

impl std::fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which pipeline step a scan is in (or failed in).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanPhase {
    GeneratingQueries,
    QueryingProviders,
    Scoring,
    PersistingResults,
    GeneratingStrategy,
}

impl ScanPhase {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ScanPhase::GeneratingQueries => "generating_queries",
            ScanPhase::QueryingProviders => "querying_providers",
            ScanPhase::Scoring => "scoring",
            ScanPhase::PersistingResults => "persisting_results",
            ScanPhase::GeneratingStrategy => "generating_strategy",
        }
    }
}

impl std::fmt::Display for ScanPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Everything the pipeline needs to run one scan.
#[derive(Debug, Clone)]
pub struct ScanRequest {
    pub scan_id: Uuid,
    pub brand_id: i64,
    pub profile: ProductProfile,
    pub tier: PlanTier,
    /// Caller-supplied questions, validated alongside generated ones.
    pub explicit_questions: Vec<String>,
}

/// Aggregated detections for one tracked competitor across a whole scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitorSnapshot {
    pub name: String,
    /// Responses in which the competitor was detected.
    pub mentions: usize,
    /// Mean confidence across detected responses; 0.0 with no mentions.
    pub avg_confidence: f64,
    /// Best (lowest) list rank seen across responses.
    pub best_position: Option<u32>,
}

/// Final output of a successful scan. The optional enrichment fields are
/// independently nullable; a missing one means that step failed or did not
/// apply, never that the scan failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    pub scan_id: Uuid,
    pub score: f64,
    pub breakdown: ScoringBreakdown,
    pub competitors: Vec<CompetitorSnapshot>,
    pub delta: Option<ScoreDelta>,
    pub share_of_voice: Option<Vec<ShareOfVoiceEntry>>,
    pub strategy: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            ScanStatus::Queued,
            ScanStatus::Processing,
            ScanStatus::GeneratingStrategy,
            ScanStatus::Complete,
            ScanStatus::Failed,
            ScanStatus::StrategyFailed,
        ] {
            assert_eq!(ScanStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ScanStatus::parse("bogus"), None);
    }

    #[test]
    fn exactly_three_terminal_states() {
        let terminal: Vec<_> = [
            ScanStatus::Queued,
            ScanStatus::Processing,
            ScanStatus::GeneratingStrategy,
            ScanStatus::Complete,
            ScanStatus::Failed,
            ScanStatus::StrategyFailed,
        ]
        .into_iter()
        .filter(|s| s.is_terminal())
        .collect();
        assert_eq!(
            terminal,
            vec![
                ScanStatus::Complete,
                ScanStatus::Failed,
                ScanStatus::StrategyFailed
            ]
        );
    }
}
