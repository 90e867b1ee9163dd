use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("profile is missing the fields needed to generate queries: {0}")]
    EmptyProfile(String),

    #[error("no query survived validation for brand '{brand}'")]
    NoUsableQueries { brand: String },
}
