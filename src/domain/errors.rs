use thiserror::Error;

use crate::domain::policy::Operation;
use crate::domain::repositories::RepositoryError;
use crate::domain::validation::ValidationErrors;

/// State conflicts detected against the current team data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConflictKind {
    #[error("Team code already exists")]
    DuplicateCode,

    #[error("User is already a member of this team")]
    DuplicateMember,

    #[error("Team has reached its maximum size")]
    CapacityExceeded,

    #[error("Only users with the Employee role can be added as team members")]
    NotEligible,

    #[error("Max size cannot be lower than the current number of members")]
    MaxSizeBelowMembership,

    #[error("Team was changed by another request, reload and try again")]
    ConcurrentModification,
}

/// Errors surfaced by team use cases
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0}")]
    Validation(ValidationErrors),

    #[error("Not permitted to {operation}")]
    PolicyDenied { operation: Operation },

    #[error("{0}")]
    Conflict(ConflictKind),

    #[error("{0}")]
    NotFound(String),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<ValidationErrors> for DomainError {
    fn from(errors: ValidationErrors) -> Self {
        DomainError::Validation(errors)
    }
}

impl From<ConflictKind> for DomainError {
    fn from(kind: ConflictKind) -> Self {
        DomainError::Conflict(kind)
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
