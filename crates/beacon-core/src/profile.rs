use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Structured product profile driving query generation.
///
/// Produced once per scan by the profiling step (or loaded from a YAML
/// file) and treated as an immutable input from then on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductProfile {
    /// Canonical brand name, e.g. "Lemon Squeezy".
    pub brand_name: String,
    /// Alternate spellings and short forms of the brand name.
    #[serde(default)]
    pub name_variations: Vec<String>,
    /// Product category, e.g. "scheduling software".
    pub category: String,
    /// Who the product is for, e.g. "freelance consultants".
    #[serde(default)]
    pub target_audience: String,
    #[serde(default)]
    pub features: Vec<String>,
    /// Competitors declared by the user.
    #[serde(default)]
    pub competitors: Vec<String>,
    /// Competitors inferred by the profiling step.
    #[serde(default)]
    pub inferred_competitors: Vec<String>,
    /// Pricing model, e.g. "freemium", "per-seat subscription".
    #[serde(default)]
    pub pricing_model: String,
    #[serde(default)]
    pub unique_selling_points: Vec<String>,
}

impl ProductProfile {
    /// Generate a URL-safe slug from the brand name.
    #[must_use]
    pub fn slug(&self) -> String {
        self.brand_name
            .to_lowercase()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' {
                    c
                } else if c == ' ' {
                    '-'
                } else {
                    '\0'
                }
            })
            .filter(|&c| c != '\0')
            .collect::<String>()
            .split('-')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("-")
    }

    /// All competitor names, declared first, deduplicated case-insensitively.
    #[must_use]
    pub fn all_competitors(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.competitors
            .iter()
            .chain(self.inferred_competitors.iter())
            .filter(|name| seen.insert(name.to_lowercase()))
            .cloned()
            .collect()
    }

    /// Validate that the profile carries enough signal to generate queries.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if the brand name or category is
    /// empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.brand_name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "profile brand_name must be non-empty".to_string(),
            ));
        }
        if self.category.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "profile for '{}' has an empty category",
                self.brand_name
            )));
        }
        Ok(())
    }
}

/// Load and validate a product profile from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails
/// validation.
pub fn load_profile(path: &Path) -> Result<ProductProfile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ProfileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let profile: ProductProfile = serde_yaml::from_str(&content)?;
    profile.validate()?;

    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(name: &str, category: &str) -> ProductProfile {
        ProductProfile {
            brand_name: name.to_string(),
            name_variations: vec![],
            category: category.to_string(),
            target_audience: String::new(),
            features: vec![],
            competitors: vec![],
            inferred_competitors: vec![],
            pricing_model: String::new(),
            unique_selling_points: vec![],
        }
    }

    #[test]
    fn slug_lowercases_and_hyphenates() {
        assert_eq!(profile("Lemon Squeezy", "x").slug(), "lemon-squeezy");
    }

    #[test]
    fn slug_drops_punctuation() {
        assert_eq!(profile("Cal.com", "x").slug(), "calcom");
    }

    #[test]
    fn validate_rejects_empty_brand_name() {
        let result = profile("  ", "scheduling").validate();
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_rejects_empty_category() {
        let result = profile("Acme", "").validate();
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn all_competitors_dedupes_case_insensitively() {
        let mut p = profile("Acme", "tools");
        p.competitors = vec!["Asana".to_string(), "Trello".to_string()];
        p.inferred_competitors = vec!["asana".to_string(), "Monday".to_string()];
        assert_eq!(p.all_competitors(), vec!["Asana", "Trello", "Monday"]);
    }

    #[test]
    fn profile_parses_from_yaml() {
        let yaml = "brand_name: Acme\ncategory: project management\nfeatures:\n  - boards\n";
        let p: ProductProfile = serde_yaml::from_str(yaml).expect("parse");
        assert_eq!(p.brand_name, "Acme");
        assert_eq!(p.features, vec!["boards"]);
        assert!(p.competitors.is_empty());
    }
}
