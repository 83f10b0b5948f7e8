//! Error types for the sealing engine

use thiserror::Error;

use crate::domain::ValidationError;

/// Errors that can occur while sealing or querying documents
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SealError {
    /// Malformed, non-numeric or wrongly typed input
    #[error("{0}")]
    InvalidInput(String),

    /// A field failed a shape rule
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The seal breaks a first-seal or subsequent-seal rule
    #[error("{0}")]
    PolicyViolation(String),

    /// The signer is not authorized for this document
    #[error("{0}")]
    Forbidden(String),

    /// The signer has already sealed this document
    #[error("signer {signer} has already sealed this document")]
    DuplicateSigner { signer: String },

    /// Global or per-document seal cap reached
    #[error("{0}")]
    LimitExceeded(String),

    /// Query target absent
    #[error("{0}")]
    NotFound(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

/// Discriminant of [`SealError`], for callers that branch on kind only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SealErrorKind {
    InvalidInput,
    Validation,
    PolicyViolation,
    Forbidden,
    DuplicateSigner,
    LimitExceeded,
    NotFound,
    Internal,
}

impl SealError {
    pub fn kind(&self) -> SealErrorKind {
        match self {
            SealError::InvalidInput(_) => SealErrorKind::InvalidInput,
            SealError::Validation(_) => SealErrorKind::Validation,
            SealError::PolicyViolation(_) => SealErrorKind::PolicyViolation,
            SealError::Forbidden(_) => SealErrorKind::Forbidden,
            SealError::DuplicateSigner { .. } => SealErrorKind::DuplicateSigner,
            SealError::LimitExceeded(_) => SealErrorKind::LimitExceeded,
            SealError::NotFound(_) => SealErrorKind::NotFound,
            SealError::Internal(_) => SealErrorKind::Internal,
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        SealError::InvalidInput(message.into())
    }

    pub fn policy(message: impl Into<String>) -> Self {
        SealError::PolicyViolation(message.into())
    }

    pub fn limit(message: impl Into<String>) -> Self {
        SealError::LimitExceeded(message.into())
    }
}

/// Result type for sealing operations
pub type Result<T> = std::result::Result<T, SealError>;
