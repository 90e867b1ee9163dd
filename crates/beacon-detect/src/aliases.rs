/// Derive matchable alias variants from a brand name.
///
/// Covers the common ways answers flatten a product name: the collapsed
/// form without spaces or punctuation ("Lemon Squeezy" → "lemonsqueezy",
/// "Cal.com" → "calcom") and the hyphenated form ("lemon-squeezy").
/// Variants shorter than 3 characters are dropped — they are too ambiguous
/// to match safely. The canonical lowercase name itself is not an alias;
/// the regex stage already covers it.
#[must_use]
pub fn derive_aliases(brand_name: &str) -> Vec<String> {
    let lower = brand_name.to_lowercase();

    let collapsed: String = lower.chars().filter(|c| c.is_alphanumeric()).collect();

    let hyphenated: String = lower
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-')
        .collect();

    let mut out = Vec::new();
    for variant in [collapsed, hyphenated] {
        let alnum_len = variant.chars().filter(|c| c.is_alphanumeric()).count();
        if alnum_len >= 3 && variant != lower && !out.contains(&variant) {
            out.push(variant);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_style_name_collapses() {
        assert_eq!(derive_aliases("Cal.com"), vec!["calcom"]);
    }

    #[test]
    fn spaced_name_collapses_and_hyphenates() {
        assert_eq!(
            derive_aliases("Lemon Squeezy"),
            vec!["lemonsqueezy", "lemon-squeezy"]
        );
    }

    #[test]
    fn single_word_name_yields_no_aliases() {
        assert!(derive_aliases("Asana").is_empty());
    }

    #[test]
    fn short_collapsed_forms_are_dropped() {
        // "A B" collapses to "ab" — too short to match safely.
        assert!(derive_aliases("A B").is_empty());
    }
}
