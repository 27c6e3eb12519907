//! Error types for task store operations

/// Errors returned by the task store and the timer transitions.
///
/// Both kinds are terminal for the request that caused them. No store
/// operation mutates anything before returning one of these.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The identifier does not resolve to a task.
    #[error("task not found: {0}")]
    NotFound(String),

    /// The operation is not applicable to the task or the input is malformed.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
}

impl StoreError {
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound(id.into())
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidOperation(reason.into())
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
