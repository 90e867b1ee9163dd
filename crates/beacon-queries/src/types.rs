use serde::{Deserialize, Serialize};

/// Purchase-readiness category of a buyer question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// "Which tool should I buy?" — the strongest signal.
    DirectRecommendation,
    /// "How does X compare to the rest?"
    Comparison,
    /// "What else is out there?"
    Alternatives,
    /// "What fits my workflow?"
    UseCase,
    /// "What's the cheapest option?"
    BudgetBased,
    /// "Why doesn't this work?" — weakest buying signal.
    Troubleshooting,
}

impl Intent {
    /// Numeric weight on a 1–10 scale used by the scoring engine.
    #[must_use]
    pub fn weight(self) -> u8 {
        match self {
            Intent::DirectRecommendation => 10,
            Intent::Comparison => 8,
            Intent::Alternatives => 7,
            Intent::UseCase => 6,
            Intent::BudgetBased => 5,
            Intent::Troubleshooting => 3,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Intent::DirectRecommendation => "direct_recommendation",
            Intent::Comparison => "comparison",
            Intent::Alternatives => "alternatives",
            Intent::UseCase => "use_case",
            Intent::BudgetBased => "budget_based",
            Intent::Troubleshooting => "troubleshooting",
        }
    }
}

/// A validated buyer question, ready to be sent to providers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    pub text: String,
    pub intent: Intent,
    /// Copy of the intent's weight, stored alongside the analysis rows.
    pub intent_weight: u8,
    /// Lexical relevance score, 1–10.
    pub relevance: u8,
    /// sha256 of the normalized text; unique within a `QuerySet`.
    pub dedupe_key: String,
}

/// Ordered, capped set of queries for one scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuerySet {
    pub queries: Vec<Query>,
}

impl QuerySet {
    #[must_use]
    pub fn len(&self) -> usize {
        self.queries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }
}
