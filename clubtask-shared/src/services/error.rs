/// Error taxonomy for the membership and task services

use crate::auth::authentication::AuthFailure;
use crate::store::StoreError;

/// Error returned by service operations
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Missing or duplicate input
    #[error("{0}")]
    Validation(String),

    /// Member name or task id not present in the snapshot
    #[error("{0}")]
    NotFound(String),

    /// Caller is not allowed to perform the operation
    #[error("{0}")]
    Authorization(String),

    /// The store could not be read or written
    #[error("Persistence error: {0}")]
    Persistence(#[from] StoreError),

    /// Credential or account status rejection
    #[error("{0}")]
    Authentication(#[from] AuthFailure),
}

/// Result alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
