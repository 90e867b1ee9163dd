//! Lexical validation: normalization, dedupe keys, relevance scoring,
//! and the brand-leak filter.

use beacon_core::ProductProfile;
use sha2::{Digest, Sha256};

/// Minimum relevance for a candidate to survive filtering.
pub(crate) const RELEVANCE_THRESHOLD: u8 = 4;

const PURCHASE_VERBS: &[&str] = &[
    "best", "buy", "choose", "pick", "recommend", "should", "top", "use", "which", "worth",
];

const COMPARISON_TERMS: &[&str] = &[
    "alternative", "alternatives", "compare", "comparison", "cons", "difference", "options",
    "pros", "versus", "vs",
];

const BUDGET_TERMS: &[&str] = &["affordable", "budget", "cheap", "cheapest", "cost", "price"];

/// Lowercase, strip punctuation, collapse whitespace.
#[must_use]
pub fn normalize_text(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Case/whitespace/punctuation-insensitive hash of a question.
#[must_use]
pub fn dedupe_key(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalize_text(text).as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Score a candidate's relevance 1–10 from lexical cues: purchase-intent
/// verbs, comparison language, budget language, and overlap with the
/// profile's category and audience terms.
#[must_use]
pub fn relevance_score(text: &str, profile: &ProductProfile) -> u8 {
    let normalized = normalize_text(text);
    let words: Vec<&str> = normalized.split(' ').collect();

    let mut score: u8 = 1;

    if words.iter().any(|w| PURCHASE_VERBS.contains(w)) {
        score += 3;
    }
    if words.iter().any(|w| COMPARISON_TERMS.contains(w)) {
        score += 2;
    }
    if words.iter().any(|w| BUDGET_TERMS.contains(w)) {
        score += 1;
    }

    let category = normalize_text(&profile.category);
    if !category.is_empty() && normalized.contains(&category) {
        score += 2;
    }

    let audience = normalize_text(&profile.target_audience);
    if !audience.is_empty()
        && audience
            .split(' ')
            .any(|term| term.len() > 3 && words.contains(&term))
    {
        score += 1;
    }

    score.min(10)
}

/// True when the question names the brand (or a variation) or a declared
/// competitor verbatim — such questions bias the provider's answer and
/// must not be scored.
#[must_use]
pub fn leaks_brand(text: &str, profile: &ProductProfile) -> bool {
    let normalized = format!(" {} ", normalize_text(text));

    let mut guarded: Vec<&str> = vec![profile.brand_name.as_str()];
    guarded.extend(profile.name_variations.iter().map(String::as_str));
    guarded.extend(profile.competitors.iter().map(String::as_str));

    guarded.iter().any(|name| {
        let needle = normalize_text(name);
        !needle.is_empty() && normalized.contains(&format!(" {needle} "))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> ProductProfile {
        ProductProfile {
            brand_name: "Lemon Squeezy".to_string(),
            name_variations: vec!["lemonsqueezy".to_string()],
            category: "payment platform".to_string(),
            target_audience: "indie software founders".to_string(),
            features: vec!["tax handling".to_string()],
            competitors: vec!["Paddle".to_string()],
            inferred_competitors: vec!["Gumroad".to_string()],
            pricing_model: "percentage fee".to_string(),
            unique_selling_points: vec!["merchant of record".to_string()],
        }
    }

    #[test]
    fn normalize_strips_case_punctuation_whitespace() {
        assert_eq!(
            normalize_text("  What's  the BEST tool?! "),
            "what s the best tool"
        );
    }

    #[test]
    fn dedupe_key_is_insensitive_to_formatting() {
        assert_eq!(
            dedupe_key("What is the best payment platform?"),
            dedupe_key("what is the BEST payment platform")
        );
    }

    #[test]
    fn dedupe_key_differs_for_different_questions() {
        assert_ne!(
            dedupe_key("What is the best payment platform?"),
            dedupe_key("What is the cheapest payment platform?")
        );
    }

    #[test]
    fn purchase_intent_scores_higher_than_vague_text() {
        let p = profile();
        let strong = relevance_score("Which payment platform should I choose?", &p);
        let weak = relevance_score("Tell me about payments.", &p);
        assert!(strong > weak, "strong={strong} weak={weak}");
    }

    #[test]
    fn relevance_is_clamped_to_ten() {
        let p = profile();
        let s = relevance_score(
            "Which is the best affordable payment platform for indie software founders, \
             compared on pros and cons vs the top options?",
            &p,
        );
        assert!(s <= 10);
    }

    #[test]
    fn brand_name_leak_is_detected() {
        let p = profile();
        assert!(leaks_brand("Is Lemon Squeezy the best option?", &p));
    }

    #[test]
    fn name_variation_leak_is_detected() {
        let p = profile();
        assert!(leaks_brand("is lemonsqueezy worth it?", &p));
    }

    #[test]
    fn declared_competitor_leak_is_detected() {
        let p = profile();
        assert!(leaks_brand("How does Paddle handle EU tax?", &p));
    }

    #[test]
    fn inferred_competitors_are_not_leak_guarded() {
        // Only declared competitors are filtered; inferred ones come from
        // the profiler and may legitimately appear in category questions.
        let p = profile();
        assert!(!leaks_brand("Is Gumroad-style selling still popular?", &p));
    }

    #[test]
    fn clean_question_does_not_leak() {
        let p = profile();
        assert!(!leaks_brand(
            "What is the best payment platform for indie founders?",
            &p
        ));
    }
}
