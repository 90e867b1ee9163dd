//! Brand-mention detection for AI provider responses.
//!
//! Decides whether a brand (or one of its aliases) is mentioned in a block
//! of response text, with a confidence value, the cascade stage that
//! matched, and the 1-based rank when the mention sits inside a ranked
//! list. Detection is pure and synchronous; all I/O lives in the callers.

pub mod aliases;
pub mod detector;
pub mod position;
pub mod types;

pub use aliases::derive_aliases;
pub use detector::{detect, detect_all};
pub use types::{BrandDetection, DetectionMethod};
