//! Candidate generation from intent templates and profile attributes.

use std::collections::HashSet;

use beacon_core::ProductProfile;

use crate::error::QueryError;
use crate::types::{Intent, Query, QuerySet};
use crate::validator::{dedupe_key, leaks_brand, relevance_score, RELEVANCE_THRESHOLD};

/// Generate the QuerySet for one scan.
///
/// Explicit caller questions are considered first, then template-generated
/// candidates. All candidates pass through the same validation: dedupe by
/// normalized hash, relevance threshold, and the brand-leak filter. The
/// result is ordered by descending intent weight (ties keep generation
/// order) and capped at `max_queries`.
///
/// # Errors
///
/// Returns [`QueryError::EmptyProfile`] if the profile lacks a brand name
/// or category, and [`QueryError::NoUsableQueries`] if no candidate
/// survives filtering — the caller must fail the scan rather than score on
/// zero queries.
pub fn generate_queries(
    profile: &ProductProfile,
    explicit_questions: &[String],
    max_queries: usize,
) -> Result<QuerySet, QueryError> {
    if profile.brand_name.trim().is_empty() {
        return Err(QueryError::EmptyProfile("brand_name".to_string()));
    }
    if profile.category.trim().is_empty() {
        return Err(QueryError::EmptyProfile("category".to_string()));
    }

    let mut seen_keys: HashSet<String> = HashSet::new();
    let mut queries: Vec<Query> = Vec::new();

    let explicit = explicit_questions
        .iter()
        .map(|q| (classify_intent(q), q.clone()));
    let generated = template_candidates(profile);

    for (intent, text) in explicit.chain(generated) {
        let key = dedupe_key(&text);
        if !seen_keys.insert(key.clone()) {
            continue;
        }
        if leaks_brand(&text, profile) {
            tracing::debug!(question = %text, "dropping candidate — names the brand or a competitor");
            continue;
        }
        let relevance = relevance_score(&text, profile);
        if relevance < RELEVANCE_THRESHOLD {
            tracing::debug!(question = %text, relevance, "dropping candidate below relevance threshold");
            continue;
        }
        queries.push(Query {
            text,
            intent,
            intent_weight: intent.weight(),
            relevance,
            dedupe_key: key,
        });
    }

    if queries.is_empty() {
        return Err(QueryError::NoUsableQueries {
            brand: profile.brand_name.clone(),
        });
    }

    // Stable sort keeps generation order within one intent weight.
    queries.sort_by(|a, b| b.intent_weight.cmp(&a.intent_weight));
    queries.truncate(max_queries);

    Ok(QuerySet { queries })
}

/// Candidate questions from intent templates crossed with profile
/// attributes. Templates whose attribute is empty are skipped.
fn template_candidates(profile: &ProductProfile) -> Vec<(Intent, String)> {
    let category = profile.category.trim();
    let audience = profile.target_audience.trim();
    let pricing = profile.pricing_model.trim();

    let mut out: Vec<(Intent, String)> = Vec::new();

    out.push((
        Intent::DirectRecommendation,
        format!("What is the best {category}?"),
    ));
    out.push((
        Intent::DirectRecommendation,
        format!("Which {category} should I use?"),
    ));
    if !audience.is_empty() {
        out.push((
            Intent::DirectRecommendation,
            format!("What {category} would you recommend for {audience}?"),
        ));
    }

    out.push((
        Intent::Comparison,
        format!("How do the top {category} options compare on pros and cons?"),
    ));
    for feature in profile.features.iter().take(2) {
        out.push((
            Intent::Comparison,
            format!("Which {category} is best for {feature}?"),
        ));
    }

    out.push((
        Intent::Alternatives,
        format!("What are good alternatives to the most popular {category}?"),
    ));

    for usp in profile.unique_selling_points.iter().take(2) {
        out.push((
            Intent::UseCase,
            format!("Which {category} offers {usp}?"),
        ));
    }
    if !audience.is_empty() {
        out.push((
            Intent::UseCase,
            format!("What do {audience} use as their {category}?"),
        ));
    }

    out.push((
        Intent::BudgetBased,
        format!("What is the most affordable {category} worth using?"),
    ));
    if !pricing.is_empty() {
        out.push((
            Intent::BudgetBased,
            format!("Which {category} has the best price for a {pricing} model?"),
        ));
    }

    out.push((
        Intent::Troubleshooting,
        format!("What problems should I expect when adopting a {category}?"),
    ));

    out
}

/// Lexically classify a caller-supplied question into an intent bucket.
fn classify_intent(text: &str) -> Intent {
    let lower = text.to_lowercase();
    let has = |terms: &[&str]| terms.iter().any(|t| lower.contains(t));

    if has(&[" vs ", "versus", "compare", "comparison", "difference"]) {
        Intent::Comparison
    } else if has(&["alternative", "instead of", "other than"]) {
        Intent::Alternatives
    } else if has(&["cheap", "afford", "budget", "price", "cost"]) {
        Intent::BudgetBased
    } else if has(&["fix", "problem", "error", "issue", "troubleshoot"]) {
        Intent::Troubleshooting
    } else if has(&["recommend", "best", "should i", "which"]) {
        Intent::DirectRecommendation
    } else {
        Intent::UseCase
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> ProductProfile {
        ProductProfile {
            brand_name: "Lemon Squeezy".to_string(),
            name_variations: vec![],
            category: "payment platform".to_string(),
            target_audience: "indie software founders".to_string(),
            features: vec!["tax handling".to_string()],
            competitors: vec!["Paddle".to_string()],
            inferred_competitors: vec![],
            pricing_model: "percentage fee".to_string(),
            unique_selling_points: vec!["merchant of record".to_string()],
        }
    }

    #[test]
    fn generates_a_capped_ordered_set() {
        let set = generate_queries(&profile(), &[], 5).expect("queries");
        assert_eq!(set.len(), 5);
        // Ordered by descending intent weight.
        for pair in set.queries.windows(2) {
            assert!(pair[0].intent_weight >= pair[1].intent_weight);
        }
        // Highest-weight intent first.
        assert_eq!(set.queries[0].intent, Intent::DirectRecommendation);
    }

    #[test]
    fn dedupe_keys_are_unique_within_set() {
        let set = generate_queries(&profile(), &[], 50).expect("queries");
        let mut keys: Vec<&str> = set.queries.iter().map(|q| q.dedupe_key.as_str()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), set.len());
    }

    #[test]
    fn explicit_questions_are_included_and_classified() {
        let explicit = vec!["What is the cheapest payment platform option?".to_string()];
        let set = generate_queries(&profile(), &explicit, 50).expect("queries");
        let found = set
            .queries
            .iter()
            .find(|q| q.text.contains("cheapest payment platform"))
            .expect("explicit question kept");
        assert_eq!(found.intent, Intent::BudgetBased);
    }

    #[test]
    fn duplicate_explicit_question_is_deduped() {
        let explicit = vec![
            "What is the best payment platform?".to_string(),
            "what is the BEST payment platform".to_string(),
        ];
        let set = generate_queries(&profile(), &explicit, 50).expect("queries");
        let count = set
            .queries
            .iter()
            .filter(|q| q.text.to_lowercase().contains("best payment platform"))
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn brand_leaking_explicit_question_is_dropped() {
        let explicit = vec!["Should I pick Lemon Squeezy over the rest?".to_string()];
        let set = generate_queries(&profile(), &explicit, 50).expect("queries");
        assert!(set
            .queries
            .iter()
            .all(|q| !q.text.contains("Lemon Squeezy")));
    }

    #[test]
    fn empty_brand_name_is_an_explicit_error() {
        let mut p = profile();
        p.brand_name = String::new();
        let result = generate_queries(&p, &[], 10);
        assert!(matches!(result, Err(QueryError::EmptyProfile(_))));
    }

    #[test]
    fn empty_category_is_an_explicit_error() {
        let mut p = profile();
        p.category = "  ".to_string();
        let result = generate_queries(&p, &[], 10);
        assert!(matches!(result, Err(QueryError::EmptyProfile(_))));
    }

    #[test]
    fn intent_weights_follow_purchase_readiness() {
        assert!(Intent::DirectRecommendation.weight() > Intent::Comparison.weight());
        assert!(Intent::Comparison.weight() > Intent::BudgetBased.weight());
        assert!(Intent::BudgetBased.weight() > Intent::Troubleshooting.weight());
    }
}
