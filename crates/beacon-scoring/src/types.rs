use std::collections::BTreeMap;

use beacon_detect::BrandDetection;
use serde::{Deserialize, Serialize};

/// Detection result for one tracked competitor within one response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitorDetection {
    pub name: String,
    pub detection: BrandDetection,
}

/// One provider's answer to one query, with all detections attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseAnalysis {
    pub query_text: String,
    /// Dedupe key of the underlying query; groups analyses of the same
    /// query across providers for the consistency metric.
    pub dedupe_key: String,
    pub intent_weight: u8,
    pub provider: String,
    pub response_text: String,
    /// Detection for the target brand.
    pub brand: BrandDetection,
    pub competitors: Vec<CompetitorDetection>,
}

impl ResponseAnalysis {
    /// How many tracked competitors were co-mentioned in this response.
    #[must_use]
    pub fn competitor_mention_count(&self) -> usize {
        self.competitors
            .iter()
            .filter(|c| c.detection.detected)
            .count()
    }
}

/// Composite scoring output for one scan. Derived once, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringBreakdown {
    /// The headline visibility score, clamped to [0, 100].
    pub final_score: f64,
    /// Fraction of analyses with a detected brand mention, in [0, 1].
    pub mention_rate: f64,
    /// Mention rate weighted by the intent weight of the underlying query.
    pub intent_weighted_score: f64,
    /// 1.0 when providers agree per query; penalized on disagreement.
    pub cross_model_consistency: f64,
    /// Dampening for answers crowded with competitors, in [0.85, 1.0].
    pub competitor_density_factor: f64,
    /// Position-weighted sub-score per provider, 0–100.
    pub provider_scores: BTreeMap<String, f64>,
    pub detected_count: usize,
    pub total_analyses: usize,
    pub total_queries: usize,
}

impl ScoringBreakdown {
    /// The all-zero breakdown returned for a scan with no analyses.
    #[must_use]
    pub fn zero(total_queries: usize) -> Self {
        Self {
            final_score: 0.0,
            mention_rate: 0.0,
            intent_weighted_score: 0.0,
            cross_model_consistency: 0.0,
            competitor_density_factor: 0.0,
            provider_scores: BTreeMap::new(),
            detected_count: 0,
            total_analyses: 0,
            total_queries,
        }
    }
}
