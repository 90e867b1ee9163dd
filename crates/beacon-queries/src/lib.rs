//! Buyer-question generation and validation.
//!
//! Turns a [`beacon_core::ProductProfile`] into a deduplicated, intent-tagged
//! set of buyer-style questions for the scan pipeline. Candidates come from
//! intent templates combined with profile attributes; the validator dedupes
//! them, scores relevance with lexical heuristics, and removes questions
//! that would bias the provider by naming the brand or its competitors.

pub mod error;
pub mod generator;
pub mod types;
pub mod validator;

pub use error::QueryError;
pub use generator::generate_queries;
pub use types::{Intent, Query, QuerySet};
pub use validator::{dedupe_key, normalize_text};
