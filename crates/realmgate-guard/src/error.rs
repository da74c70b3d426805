//! Error types for the guard layer.

/// Errors raised while setting up routing.
///
/// Navigation decisions themselves never fail: every outcome is a
/// [`crate::Decision`].
#[derive(Debug, thiserror::Error)]
pub enum GuardError {
    /// A route table couldn't be parsed.
    #[error("invalid route table: {0}")]
    InvalidRoutes(String),
}
