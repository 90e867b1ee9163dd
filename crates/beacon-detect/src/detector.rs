//! The three-stage detection cascade: exact regex, alias, fuzzy.

use regex::RegexBuilder;

use crate::aliases::derive_aliases;
use crate::position::position_in_list;
use crate::types::{BrandDetection, DetectionMethod};

/// Minimum brand-name length for the fuzzy stage. Shorter names produce
/// too many accidental near-matches.
const FUZZY_MIN_NAME_LEN: usize = 4;

/// Normalized-Levenshtein similarity cutoff for a fuzzy match.
const FUZZY_SIMILARITY_THRESHOLD: f64 = 0.8;

/// Similarity cutoff for a near-miss against a registered alias.
const ALIAS_FUZZY_THRESHOLD: f64 = 0.85;

const ALIAS_EXACT_CONFIDENCE: f64 = 0.9;
const ALIAS_FUZZY_CONFIDENCE: f64 = 0.7;

/// Generic words that must never fuzzy-match a brand name. Answers are
/// full of these, and a short brand name is often one edit away.
const COMMON_WORDS: &[&str] = &[
    "about", "after", "also", "back", "based", "best", "better", "build", "call", "calls",
    "cheap", "choice", "cost", "costs", "data", "each", "easy", "find", "first", "free", "from",
    "good", "great", "have", "help", "here", "into", "just", "know", "like", "list", "lists",
    "make", "many", "more", "most", "much", "need", "offer", "only", "other", "over", "paid",
    "plan", "plans", "price", "pricing", "setup", "side", "site", "small", "some", "team",
    "teams", "than", "that", "them", "then", "there", "these", "they", "this", "time", "tool",
    "tools", "track", "used", "user", "users", "want", "well", "what", "when", "which", "will",
    "with", "work", "your",
];

/// Run the detection cascade for one (response, brand) pair.
///
/// Stages are tried in precedence order — exact whole-token regex (confidence
/// 1.0), registered/derived alias (0.7–0.9), then edit-distance fuzzy
/// (>0.5) — and the first success wins. Position and snippet are computed
/// from the winning match's offset, independent of the stage.
#[must_use]
pub fn detect(response_text: &str, brand_name: &str, aliases: &[String]) -> BrandDetection {
    let brand_name = brand_name.trim();
    if brand_name.is_empty() || response_text.is_empty() {
        return BrandDetection::miss();
    }

    let hit = exact_match(response_text, brand_name)
        .or_else(|| alias_match(response_text, brand_name, aliases))
        .or_else(|| fuzzy_match(response_text, brand_name));

    match hit {
        Some(hit) => BrandDetection {
            detected: true,
            confidence: hit.confidence,
            method: Some(hit.method),
            position: position_in_list(response_text, hit.offset),
            snippet: Some(snippet_around(response_text, hit.offset, hit.len)),
        },
        None => BrandDetection::miss(),
    }
}

/// Detect each brand independently against the same text.
///
/// Equivalent to calling [`detect`] once per brand with derived aliases;
/// results preserve the input order.
#[must_use]
pub fn detect_all(response_text: &str, brand_names: &[String]) -> Vec<BrandDetection> {
    brand_names
        .iter()
        .map(|name| {
            let aliases = derive_aliases(name);
            detect(response_text, name, &aliases)
        })
        .collect()
}

struct StageHit {
    offset: usize,
    len: usize,
    confidence: f64,
    method: DetectionMethod,
}

/// Whole-token, case-insensitive match of the brand name. Explicit
/// non-word boundaries instead of `\b` so names with leading or trailing
/// punctuation ("Cal.com") still anchor correctly, and markdown emphasis,
/// links, and headings around the name count as boundaries.
fn exact_match(text: &str, brand_name: &str) -> Option<StageHit> {
    let pattern = format!(
        r"(?:^|[^A-Za-z0-9_])({})(?:$|[^A-Za-z0-9_])",
        regex::escape(brand_name)
    );
    let re = RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .ok()?;

    let caps = re.captures(text)?;
    let m = caps.get(1)?;
    Some(StageHit {
        offset: m.start(),
        len: m.len(),
        confidence: 1.0,
        method: DetectionMethod::Regex,
    })
}

/// Match against registered aliases plus derived variants. An exact alias
/// token scores higher than a near-miss.
fn alias_match(text: &str, brand_name: &str, aliases: &[String]) -> Option<StageHit> {
    let mut candidates: Vec<String> = aliases.iter().map(|a| a.to_lowercase()).collect();
    for derived in derive_aliases(brand_name) {
        if !candidates.contains(&derived) {
            candidates.push(derived);
        }
    }
    if candidates.is_empty() {
        return None;
    }

    let mut best: Option<StageHit> = None;
    for (offset, token) in tokens(text) {
        let lower = token.to_lowercase();
        for alias in &candidates {
            let confidence = if lower == *alias {
                ALIAS_EXACT_CONFIDENCE
            } else if lower.len() >= FUZZY_MIN_NAME_LEN
                && strsim::normalized_levenshtein(&lower, alias) >= ALIAS_FUZZY_THRESHOLD
            {
                ALIAS_FUZZY_CONFIDENCE
            } else {
                continue;
            };

            if best.as_ref().is_none_or(|b| confidence > b.confidence) {
                best = Some(StageHit {
                    offset,
                    len: token.len(),
                    confidence,
                    method: DetectionMethod::Alias,
                });
            }
        }
    }
    best
}

/// Edit-distance comparison against text tokens. Only runs for names of at
/// least [`FUZZY_MIN_NAME_LEN`] characters, and never matches a common
/// English word — a generic word one edit away from a short brand name is
/// noise, not a mention.
fn fuzzy_match(text: &str, brand_name: &str) -> Option<StageHit> {
    if brand_name.chars().count() < FUZZY_MIN_NAME_LEN {
        return None;
    }
    let target = brand_name.to_lowercase();
    let word_count = target.split_whitespace().count();

    let toks = tokens(text);
    let mut best: Option<(f64, usize, usize)> = None;

    for window in toks.windows(word_count.max(1)) {
        let candidate = window
            .iter()
            .map(|(_, t)| t.to_lowercase())
            .collect::<Vec<_>>()
            .join(" ");
        if candidate.chars().count() < FUZZY_MIN_NAME_LEN {
            continue;
        }
        if word_count == 1 && COMMON_WORDS.contains(&candidate.as_str()) {
            continue;
        }

        let similarity = strsim::normalized_levenshtein(&candidate, &target);
        if similarity >= FUZZY_SIMILARITY_THRESHOLD
            && best.is_none_or(|(s, _, _)| similarity > s)
        {
            let start = window[0].0;
            let (last_off, last_tok) = window[window.len() - 1];
            best = Some((similarity, start, last_off + last_tok.len() - start));
        }
    }

    best.map(|(similarity, offset, len)| StageHit {
        offset,
        len,
        confidence: fuzzy_confidence(similarity),
        method: DetectionMethod::Fuzzy,
    })
}

/// Map similarity in [threshold, 1.0] onto confidence in (0.5, 0.8].
fn fuzzy_confidence(similarity: f64) -> f64 {
    let span = (similarity - FUZZY_SIMILARITY_THRESHOLD) / (1.0 - FUZZY_SIMILARITY_THRESHOLD);
    0.51 + span.clamp(0.0, 1.0) * 0.29
}

/// Alphanumeric tokens with their byte offsets.
fn tokens(text: &str) -> Vec<(usize, &str)> {
    let mut out = Vec::new();
    let mut start: Option<usize> = None;
    for (idx, ch) in text.char_indices() {
        if ch.is_alphanumeric() {
            if start.is_none() {
                start = Some(idx);
            }
        } else if let Some(s) = start.take() {
            out.push((s, &text[s..idx]));
        }
    }
    if let Some(s) = start {
        out.push((s, &text[s..]));
    }
    out
}

/// A short context window around the match, trimmed to char boundaries.
fn snippet_around(text: &str, offset: usize, len: usize) -> String {
    const WINDOW: usize = 60;
    let mut start = offset.saturating_sub(WINDOW);
    while start > 0 && !text.is_char_boundary(start) {
        start -= 1;
    }
    let mut end = (offset + len + WINDOW).min(text.len());
    while end < text.len() && !text.is_char_boundary(end) {
        end += 1;
    }
    text[start..end].trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect_plain(text: &str, brand: &str) -> BrandDetection {
        detect(text, brand, &[])
    }

    // ------------------------------------------------------------------
    // Regex stage
    // ------------------------------------------------------------------

    #[test]
    fn whole_word_match_is_regex_with_full_confidence() {
        let d = detect_plain("I would recommend Asana for your team.", "Asana");
        assert!(d.detected);
        assert_eq!(d.method, Some(DetectionMethod::Regex));
        assert!((d.confidence - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn match_is_case_insensitive() {
        let d = detect_plain("have you tried ASANA?", "Asana");
        assert!(d.detected);
        assert_eq!(d.method, Some(DetectionMethod::Regex));
    }

    #[test]
    fn short_name_does_not_match_inside_longer_word() {
        let d = detect_plain("You should calculate the total first.", "Cal");
        assert!(!d.detected);
        assert!(d.confidence.abs() < f64::EPSILON);
    }

    #[test]
    fn markdown_emphasis_is_tolerated() {
        let d = detect_plain("Our top pick: **Asana** wins on flexibility.", "Asana");
        assert!(d.detected);
        assert_eq!(d.method, Some(DetectionMethod::Regex));
    }

    #[test]
    fn markdown_link_is_tolerated() {
        let d = detect_plain("See [Asana](https://asana.com) for details.", "Asana");
        assert!(d.detected);
        assert_eq!(d.method, Some(DetectionMethod::Regex));
    }

    #[test]
    fn markdown_heading_is_tolerated() {
        let d = detect_plain("## Asana\nA flexible work manager.", "Asana");
        assert!(d.detected);
        assert_eq!(d.method, Some(DetectionMethod::Regex));
    }

    #[test]
    fn dotted_name_matches_whole_token() {
        let d = detect_plain("Cal.com is an open scheduling platform.", "Cal.com");
        assert!(d.detected);
        assert_eq!(d.method, Some(DetectionMethod::Regex));
    }

    #[test]
    fn name_at_start_and_end_of_text_matches() {
        assert!(detect_plain("Asana is great", "Asana").detected);
        assert!(detect_plain("my favorite is Asana", "Asana").detected);
    }

    // ------------------------------------------------------------------
    // Alias stage
    // ------------------------------------------------------------------

    #[test]
    fn collapsed_alias_detects_with_alias_method() {
        let d = detect_plain("lemonsqueezy handles merchant-of-record billing", "Lemon Squeezy");
        assert!(d.detected);
        assert_eq!(d.method, Some(DetectionMethod::Alias));
        assert!(d.confidence > 0.7);
    }

    #[test]
    fn registered_alias_detects() {
        let aliases = vec!["calcom".to_string()];
        let d = detect("People often write calcom in forums.", "Cal.com", &aliases);
        assert!(d.detected);
        assert_eq!(d.method, Some(DetectionMethod::Alias));
        assert!((d.confidence - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn exact_name_wins_over_alias() {
        // Both forms present: the regex stage has precedence.
        let d = detect_plain("Lemon Squeezy (aka lemonsqueezy)", "Lemon Squeezy");
        assert_eq!(d.method, Some(DetectionMethod::Regex));
        assert!((d.confidence - 1.0).abs() < f64::EPSILON);
    }

    // ------------------------------------------------------------------
    // Fuzzy stage
    // ------------------------------------------------------------------

    #[test]
    fn single_typo_matches_fuzzily() {
        let d = detect_plain("Many teams swear by Asanna these days.", "Asana");
        assert!(d.detected);
        assert_eq!(d.method, Some(DetectionMethod::Fuzzy));
        assert!(d.confidence > 0.5);
        assert!(d.confidence <= 0.8);
    }

    #[test]
    fn short_names_never_fuzzy_match() {
        let d = detect_plain("The cat sat on the mat.", "Cat");
        // "Cat" appears exactly, so use a name that doesn't.
        assert!(d.detected, "exact match still applies to short names");

        let d = detect_plain("A cart of goods.", "Cal");
        assert!(!d.detected, "3-char names must not fuzzy match");
    }

    #[test]
    fn common_words_never_fuzzy_match() {
        // "tools" is one edit from "Toolz"; the stoplist blocks it.
        let d = detect_plain("There are many tools for this.", "Toolz");
        assert!(!d.detected);
    }

    #[test]
    fn dissimilar_text_is_a_miss() {
        let d = detect_plain("Completely unrelated answer.", "Asana");
        assert!(!d.detected);
        assert!(d.confidence.abs() < f64::EPSILON);
        assert_eq!(d.method, None);
        assert_eq!(d.position, None);
    }

    #[test]
    fn empty_inputs_are_a_miss() {
        assert!(!detect_plain("", "Asana").detected);
        assert!(!detect_plain("some text", "").detected);
        assert!(!detect_plain("some text", "   ").detected);
    }

    // ------------------------------------------------------------------
    // Position + snippet
    // ------------------------------------------------------------------

    #[test]
    fn position_extracted_from_numbered_list() {
        let d = detect_plain("1. Monday\n2. Asana\n3. Trello", "Asana");
        assert!(d.detected);
        assert_eq!(d.position, Some(2));
    }

    #[test]
    fn position_is_none_outside_lists() {
        let d = detect_plain("Asana is a fine choice.", "Asana");
        assert_eq!(d.position, None);
    }

    #[test]
    fn snippet_contains_the_match() {
        let d = detect_plain("After much deliberation we picked Asana for tracking.", "Asana");
        assert!(d.snippet.as_deref().is_some_and(|s| s.contains("Asana")));
    }

    // ------------------------------------------------------------------
    // Batch form
    // ------------------------------------------------------------------

    #[test]
    fn detect_all_is_independent_per_brand() {
        let text = "1. Monday\n2. Asana\n3. Trello";
        let brands = vec![
            "Asana".to_string(),
            "Trello".to_string(),
            "ClickUp".to_string(),
        ];
        let results = detect_all(text, &brands);
        assert_eq!(results.len(), 3);
        assert!(results[0].detected);
        assert_eq!(results[0].position, Some(2));
        assert!(results[1].detected);
        assert_eq!(results[1].position, Some(3));
        assert!(!results[2].detected);

        // Symmetric with individual detect calls.
        for (name, batch) in brands.iter().zip(&results) {
            let single = detect(text, name, &derive_aliases(name));
            assert_eq!(single.detected, batch.detected, "brand {name}");
            assert_eq!(single.position, batch.position, "brand {name}");
        }
    }
}
