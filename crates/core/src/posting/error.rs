//! Errors raised by the posting facade.

use bahi_shared::AppError;
use bahi_shared::types::DocumentId;
use thiserror::Error;

use crate::document::{DocumentStatus, LifecycleError};
use crate::inventory::ValuationError;
use crate::ledger::PostingError;
use crate::repository::StoreError;
use crate::tax::TaxError;

/// Category of a failed transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input or an illegal transition. Rejected before any write.
    Validation,
    /// A posting template produced unequal sides. Internal bug.
    UnbalancedEntry,
    /// Stock-out exceeds the available quantity.
    InsufficientStock,
    /// Optimistic version check failed. Safe to retry.
    ConcurrencyConflict,
    /// A deactivated account was referenced.
    InactiveAccount,
    /// An account or account code does not exist.
    UnknownAccount,
    /// A referenced document or item does not exist.
    NotFound,
    /// Storage backend failure.
    Storage,
}

/// Error returned by document transitions and other facade operations.
///
/// Any error means the whole unit of work was rolled back.
#[derive(Debug, Error)]
pub enum TransitionError {
    /// Ledger registry rejected a posting.
    #[error(transparent)]
    Posting(#[from] PostingError),

    /// Inventory engine rejected a movement.
    #[error(transparent)]
    Valuation(#[from] ValuationError),

    /// The state machine rejected the transition.
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    /// Document lines could not be taxed.
    #[error(transparent)]
    Tax(#[from] TaxError),

    /// Storage failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The document is not in the status the caller expected.
    #[error("Document {document_id} is {actual}, expected {expected}")]
    StatusMismatch {
        /// Document.
        document_id: DocumentId,
        /// Status the caller expected.
        expected: DocumentStatus,
        /// Status found.
        actual: DocumentStatus,
    },

    /// The document does not exist.
    #[error("Document not found: {0}")]
    DocumentNotFound(DocumentId),
}

impl TransitionError {
    /// Classifies the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Posting(err) => match err {
                PostingError::Unbalanced { .. } => ErrorKind::UnbalancedEntry,
                PostingError::UnknownAccount(_) | PostingError::UnknownAccountCode(_) => {
                    ErrorKind::UnknownAccount
                }
                PostingError::InactiveAccount(_) => ErrorKind::InactiveAccount,
                PostingError::InvalidEntry(_) | PostingError::DuplicateAccountCode(_) => {
                    ErrorKind::Validation
                }
                PostingError::Store(store) => store_kind(store),
            },
            Self::Valuation(err) => match err {
                ValuationError::InsufficientStock { .. } => ErrorKind::InsufficientStock,
                ValuationError::ItemNotFound(_) | ValuationError::LayerNotFound(_) => {
                    ErrorKind::NotFound
                }
                ValuationError::Store(store) => store_kind(store),
                _ => ErrorKind::Validation,
            },
            Self::Lifecycle(_) | Self::Tax(_) => ErrorKind::Validation,
            Self::Store(store) => store_kind(store),
            Self::StatusMismatch { .. } => ErrorKind::ConcurrencyConflict,
            Self::DocumentNotFound(_) => ErrorKind::NotFound,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Posting(err) => err.error_code(),
            Self::Valuation(err) => err.error_code(),
            Self::Lifecycle(err) => err.error_code(),
            Self::Tax(err) => err.error_code(),
            Self::Store(err) => err.error_code(),
            Self::StatusMismatch { .. } => "STATUS_MISMATCH",
            Self::DocumentNotFound(_) => "DOCUMENT_NOT_FOUND",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::Posting(err) => err.http_status_code(),
            Self::Valuation(err) => err.http_status_code(),
            Self::Lifecycle(err) => err.http_status_code(),
            Self::Tax(err) => err.http_status_code(),
            Self::Store(err) => err.http_status_code(),
            Self::StatusMismatch { .. } => 409,
            Self::DocumentNotFound(_) => 404,
        }
    }

    /// Returns true if re-running the whole transition may succeed.
    ///
    /// A status mismatch is a conflict but not retryable: the document has
    /// already moved on.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Posting(err) => err.is_retryable(),
            Self::Valuation(err) => err.is_retryable(),
            Self::Store(err) => err.is_retryable(),
            Self::Lifecycle(_)
            | Self::Tax(_)
            | Self::StatusMismatch { .. }
            | Self::DocumentNotFound(_) => false,
        }
    }
}

const fn store_kind(err: &StoreError) -> ErrorKind {
    match err {
        StoreError::VersionConflict { .. } => ErrorKind::ConcurrencyConflict,
        StoreError::Duplicate { .. } => ErrorKind::Validation,
        StoreError::NotFound { .. } => ErrorKind::NotFound,
        StoreError::Backend(_) => ErrorKind::Storage,
    }
}

impl From<TransitionError> for AppError {
    fn from(err: TransitionError) -> Self {
        let message = err.to_string();
        match err.kind() {
            ErrorKind::Validation => Self::Validation(message),
            ErrorKind::UnbalancedEntry => Self::Internal(message),
            ErrorKind::InsufficientStock => Self::BusinessRule(message),
            ErrorKind::ConcurrencyConflict => Self::Conflict(message),
            ErrorKind::InactiveAccount | ErrorKind::UnknownAccount => {
                Self::Configuration(message)
            }
            ErrorKind::NotFound => Self::NotFound(message),
            ErrorKind::Storage => Self::Storage(message),
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
