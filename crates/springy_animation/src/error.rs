//! Animation error types

use thiserror::Error;

/// Configuration errors raised while building animators and coordinators
///
/// Lifecycle races (a torn-down element, a dropped scheduler) are never
/// reported here; those resolve to no-op writes.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpringError {
    /// Tension and friction must both be finite and strictly positive
    #[error("Invalid spring parameters: tension={tension}, friction={friction}")]
    InvalidParameters { tension: f64, friction: f64 },

    /// Name does not match any animation kind
    #[error("Unknown animation kind: {0}")]
    UnknownKind(String),

    /// Name does not match any entrance style
    #[error("Unknown entrance style: {0}")]
    UnknownStyle(String),
}

/// Result type for animation configuration
pub type Result<T> = std::result::Result<T, SpringError>;
