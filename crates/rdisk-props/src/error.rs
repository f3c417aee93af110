//! Error types for property tables

/// Errors returned by table and hook operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PropertyError {
    /// Key was empty
    #[error("property key is missing")]
    MissingKey,

    /// Storage could not grow
    #[error("out of memory while growing property storage")]
    NoMemory,
}

impl From<indexmap::TryReserveError> for PropertyError {
    fn from(_: indexmap::TryReserveError) -> Self {
        Self::NoMemory
    }
}

/// Result alias for property operations
pub type PropertyResult<T> = Result<T, PropertyError>;
