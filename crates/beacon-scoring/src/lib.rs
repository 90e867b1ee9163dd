//! Visibility scoring for the Beacon scan pipeline.
//!
//! Aggregates per-response brand detections into a composite 0–100 score
//! with supporting sub-metrics, and computes the post-scan trend
//! enrichments (delta against the prior scan, share-of-voice against
//! tracked competitors). All computation here is pure and synchronous.

pub mod delta;
pub mod scorer;
pub mod types;

pub use delta::{compute_delta, share_of_voice, ScoreDelta, ScoreSummary, ShareOfVoiceEntry};
pub use scorer::score;
pub use types::{CompetitorDetection, ResponseAnalysis, ScoringBreakdown};
