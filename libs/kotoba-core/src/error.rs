//! Error types for kotoba-core.

use thiserror::Error;

/// Result type alias using StoreError.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors surfaced by the content stores.
///
/// Deserialization failures never appear here: corrupt persisted data is
/// discarded and replaced with a default at load time.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("built-in content at index {index} cannot be deleted")]
    BuiltinProtected { index: usize },

    #[error("index {index} is out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },
}
