//! Composite score computation.
//!
//! `final_score = 100 × position-weighted mention composite ×
//! cross_model_consistency × competitor_density_factor`, clamped to
//! [0, 100]. Each factor is monotonic: more mentions, better positions,
//! more provider agreement, or fewer competitor co-mentions never lower
//! the score.

use std::collections::BTreeMap;

use crate::types::{ResponseAnalysis, ScoringBreakdown};

/// Penalty multiplier for a query on which providers disagree.
const DISAGREEMENT_PENALTY: f64 = 0.6;

/// Position factor for a detection without list position: below rank 1,
/// above undetected.
const NO_POSITION_FACTOR: f64 = 0.6;

/// Floor for the competitor density factor — crowding dampens the score
/// but never eliminates it.
const DENSITY_FLOOR: f64 = 0.85;

/// Density penalty per average co-mentioned competitor.
const DENSITY_SLOPE: f64 = 0.03;

/// Aggregate detection results across queries and providers into a
/// [`ScoringBreakdown`]. An empty slice yields the all-zero breakdown —
/// never a division by zero.
#[must_use]
pub fn score(analyses: &[ResponseAnalysis], total_queries: usize) -> ScoringBreakdown {
    if analyses.is_empty() {
        return ScoringBreakdown::zero(total_queries);
    }

    #[allow(clippy::cast_precision_loss)]
    let total = analyses.len() as f64;

    let detected_count = analyses.iter().filter(|a| a.brand.detected).count();
    #[allow(clippy::cast_precision_loss)]
    let mention_rate = detected_count as f64 / total;

    let composite = analyses.iter().map(contribution).sum::<f64>() / total;

    let intent_weighted_score = intent_weighted(analyses);
    let cross_model_consistency = consistency(analyses);
    let competitor_density_factor = density_factor(analyses);

    let final_score =
        (100.0 * composite * cross_model_consistency * competitor_density_factor).clamp(0.0, 100.0);

    ScoringBreakdown {
        final_score,
        mention_rate,
        intent_weighted_score,
        cross_model_consistency,
        competitor_density_factor,
        provider_scores: provider_scores(analyses),
        detected_count,
        total_analyses: analyses.len(),
        total_queries,
    }
}

/// Per-analysis contribution to the mention composite: the position
/// factor when detected, zero when not.
fn contribution(analysis: &ResponseAnalysis) -> f64 {
    if analysis.brand.detected {
        position_factor(analysis.brand.position)
    } else {
        0.0
    }
}

/// Monotonic decay over list rank: rank 1 → 1.0, rank 4 ≈ 0.53. A
/// detection outside any ranked list gets a neutral factor. The exact
/// curve is a tunable, not a contract.
fn position_factor(position: Option<u32>) -> f64 {
    match position {
        Some(rank) => 1.0 / (0.3f64.mul_add(f64::from(rank.max(1) - 1), 1.0)),
        None => NO_POSITION_FACTOR,
    }
}

/// Mention rate weighted by intent: being recommended on a high-intent
/// query counts more than on a low-intent one.
fn intent_weighted(analyses: &[ResponseAnalysis]) -> f64 {
    let total_weight: f64 = analyses.iter().map(|a| f64::from(a.intent_weight)).sum();
    if total_weight <= f64::EPSILON {
        return 0.0;
    }
    let detected_weight: f64 = analyses
        .iter()
        .filter(|a| a.brand.detected)
        .map(|a| f64::from(a.intent_weight))
        .sum();
    detected_weight / total_weight
}

/// Per-query agreement across providers: 1.0 when every provider that
/// answered a query agrees (all detect or all miss), 0.6 otherwise;
/// averaged over queries.
fn consistency(analyses: &[ResponseAnalysis]) -> f64 {
    let mut by_query: BTreeMap<&str, (bool, bool)> = BTreeMap::new();
    for analysis in analyses {
        let entry = by_query
            .entry(analysis.dedupe_key.as_str())
            .or_insert((false, false));
        if analysis.brand.detected {
            entry.0 = true;
        } else {
            entry.1 = true;
        }
    }

    let factors: Vec<f64> = by_query
        .values()
        .map(|&(any_detected, any_missed)| {
            if any_detected && any_missed {
                DISAGREEMENT_PENALTY
            } else {
                1.0
            }
        })
        .collect();

    #[allow(clippy::cast_precision_loss)]
    let count = factors.len() as f64;
    factors.iter().sum::<f64>() / count
}

/// Crowding penalty: starts at 1.0 and decreases with the average number
/// of co-mentioned competitors per analysis, floored at 0.85.
fn density_factor(analyses: &[ResponseAnalysis]) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let avg = analyses
        .iter()
        .map(|a| a.competitor_mention_count() as f64)
        .sum::<f64>()
        / analyses.len() as f64;

    (-DENSITY_SLOPE).mul_add(avg, 1.0).max(DENSITY_FLOOR)
}

/// Position-weighted composite per provider, scaled to 0–100.
fn provider_scores(analyses: &[ResponseAnalysis]) -> BTreeMap<String, f64> {
    let mut sums: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for analysis in analyses {
        let entry = sums.entry(analysis.provider.clone()).or_insert((0.0, 0));
        entry.0 += contribution(analysis);
        entry.1 += 1;
    }

    sums.into_iter()
        .map(|(provider, (sum, count))| {
            #[allow(clippy::cast_precision_loss)]
            let avg = sum / count as f64;
            (provider, (avg * 100.0).clamp(0.0, 100.0))
        })
        .collect()
}
