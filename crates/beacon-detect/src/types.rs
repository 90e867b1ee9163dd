use serde::{Deserialize, Serialize};

/// Which cascade stage produced a positive match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionMethod {
    Regex,
    Alias,
    Fuzzy,
}

impl std::fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DetectionMethod::Regex => write!(f, "regex"),
            DetectionMethod::Alias => write!(f, "alias"),
            DetectionMethod::Fuzzy => write!(f, "fuzzy"),
        }
    }
}

/// Result of running the detection cascade for one (response, brand) pair.
///
/// Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandDetection {
    pub detected: bool,
    /// In `[0.0, 1.0]`; 0.0 when not detected.
    pub confidence: f64,
    pub method: Option<DetectionMethod>,
    /// 1-based rank within the ranked list containing the match, if any.
    pub position: Option<u32>,
    /// Short text window around the match.
    pub snippet: Option<String>,
}

impl BrandDetection {
    /// The "not mentioned" result.
    #[must_use]
    pub fn miss() -> Self {
        Self {
            detected: false,
            confidence: 0.0,
            method: None,
            position: None,
            snippet: None,
        }
    }
}
