//! Post-scoring strategy generation.
//!
//! Asks the first available provider for a short action plan based on the
//! scan's numbers. This is the only prompt that names the brand; buyer
//! queries never do.

use beacon_core::ProductProfile;
use beacon_providers::{AiProvider, ProviderError};
use beacon_scoring::ScoringBreakdown;

pub(crate) fn strategy_prompt(profile: &ProductProfile, breakdown: &ScoringBreakdown) -> String {
    let competitors = profile.all_competitors();
    let competitor_line = if competitors.is_empty() {
        "none tracked".to_string()
    } else {
        competitors.join(", ")
    };

    format!(
        "You are an AI search visibility consultant.\n\
         Brand: {brand}\n\
         Category: {category}\n\
         Current visibility score: {score:.1}/100\n\
         Mention rate across AI answers: {rate:.0}%\n\
         Tracked competitors: {competitor_line}\n\n\
         Write a concrete action plan with 3-5 recommendations to make AI \
         assistants mention and recommend this brand more often. Be specific \
         to the category; no generic SEO advice.",
        brand = profile.brand_name,
        category = profile.category,
        score = breakdown.final_score,
        rate = breakdown.mention_rate * 100.0,
    )
}

pub(crate) async fn generate_strategy(
    provider: &dyn AiProvider,
    profile: &ProductProfile,
    breakdown: &ScoringBreakdown,
) -> Result<String, ProviderError> {
    let prompt = strategy_prompt(profile, breakdown);
    provider.complete(&prompt).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use beacon_scoring::ScoringBreakdown;

    fn profile() -> ProductProfile {
        ProductProfile {
            brand_name: "Acme Scheduler".to_string(),
            name_variations: vec![],
            category: "scheduling software".to_string(),
            target_audience: String::new(),
            features: vec![],
            competitors: vec!["Rival".to_string()],
            inferred_competitors: vec![],
            pricing_model: String::new(),
            unique_selling_points: vec![],
        }
    }

    #[test]
    fn prompt_names_brand_and_score() {
        let mut breakdown = ScoringBreakdown::zero(5);
        breakdown.final_score = 42.5;
        breakdown.mention_rate = 0.6;

        let prompt = strategy_prompt(&profile(), &breakdown);
        assert!(prompt.contains("Acme Scheduler"));
        assert!(prompt.contains("42.5/100"));
        assert!(prompt.contains("60%"));
        assert!(prompt.contains("Rival"));
    }

    #[test]
    fn prompt_handles_no_competitors() {
        let mut p = profile();
        p.competitors.clear();
        let prompt = strategy_prompt(&p, &ScoringBreakdown::zero(5));
        assert!(prompt.contains("none tracked"));
    }
}
