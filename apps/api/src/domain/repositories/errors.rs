use thiserror::Error;

/// Errors returned by repository implementations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// The addressed row does not exist
    #[error("{0} not found")]
    NotFound(String),
    /// A uniqueness rule or a concurrent write prevented the change
    #[error("{0}")]
    Conflict(String),
    /// Any other storage failure
    #[error("Database error: {0}")]
    Database(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
