//! Trend enrichments computed after scoring: delta against the brand's
//! prior scan and share-of-voice against tracked competitors. Both are
//! best-effort extras — the orchestrator attaches them when available and
//! omits them otherwise.

use serde::{Deserialize, Serialize};

use crate::types::ScoringBreakdown;

/// The prior scan's headline numbers, read from the persisted record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub score: f64,
    pub mention_rate: f64,
}

/// Change between the current scan and the immediately prior one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoreDelta {
    pub score_change: f64,
    pub mention_rate_change: f64,
}

/// One brand's slice of mentions across a scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareOfVoiceEntry {
    pub brand: String,
    pub mentions: usize,
    /// Percentage of all mentions in the scan, 0–100.
    pub share: f64,
}

/// Compare the current breakdown to the prior scan's summary. `None`
/// without a prior scan — a brand's first scan has no trend.
#[must_use]
pub fn compute_delta(
    current: &ScoringBreakdown,
    prior: Option<&ScoreSummary>,
) -> Option<ScoreDelta> {
    prior.map(|p| ScoreDelta {
        score_change: current.final_score - p.score,
        mention_rate_change: current.mention_rate - p.mention_rate,
    })
}

/// Mention share per brand across the target and its tracked competitors.
///
/// Shares are percentages of all mentions in the scan and sum to 100 when
/// any mention exists; with zero mentions every share is 0. The target
/// brand is always the first entry, competitors follow in input order.
#[must_use]
pub fn share_of_voice(
    brand_name: &str,
    brand_mentions: usize,
    competitor_mentions: &[(String, usize)],
) -> Vec<ShareOfVoiceEntry> {
    let total: usize =
        brand_mentions + competitor_mentions.iter().map(|(_, n)| n).sum::<usize>();

    let share = |mentions: usize| -> f64 {
        if total == 0 {
            0.0
        } else {
            #[allow(clippy::cast_precision_loss)]
            let pct = mentions as f64 / total as f64 * 100.0;
            pct
        }
    };

    let mut entries = Vec::with_capacity(competitor_mentions.len() + 1);
    entries.push(ShareOfVoiceEntry {
        brand: brand_name.to_string(),
        mentions: brand_mentions,
        share: share(brand_mentions),
    });
    for (name, mentions) in competitor_mentions {
        entries.push(ShareOfVoiceEntry {
            brand: name.clone(),
            mentions: *mentions,
            share: share(*mentions),
        });
    }
    entries
}
