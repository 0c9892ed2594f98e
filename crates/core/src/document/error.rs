//! Document lifecycle errors.

use bahi_shared::types::{Amount, DocumentId};
use chrono::NaiveDate;
use thiserror::Error;

use super::types::{DocumentKind, DocumentStatus};

/// Errors raised by the document state machine and its guards.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    /// The transition is not in the kind's table.
    #[error("Invalid transition for {kind}: {from} -> {to}")]
    InvalidTransition {
        /// Document kind.
        kind: DocumentKind,
        /// Current status.
        from: DocumentStatus,
        /// Requested status.
        to: DocumentStatus,
    },

    /// Lines can only change in DRAFT.
    #[error("Document {document_id} is {status}; lines can only be edited in DRAFT")]
    NotEditable {
        /// Document.
        document_id: DocumentId,
        /// Current status.
        status: DocumentStatus,
    },

    /// Quotation is past its validity; it can only be cancelled.
    #[error("Quotation {document_id} expired on {valid_until}")]
    Expired {
        /// Document.
        document_id: DocumentId,
        /// Validity end.
        valid_until: NaiveDate,
    },

    /// The document's shape does not fit its kind.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// A settlement would exceed the target's balance due.
    #[error("Settling {amount} against document {document_id} exceeds its balance due of {balance_due}")]
    OverSettlement {
        /// Settled document.
        document_id: DocumentId,
        /// Target's outstanding amount.
        balance_due: Amount,
        /// Amount of the settling document.
        amount: Amount,
    },

    /// Settled documents cannot be cancelled until their settlements are.
    #[error("Document {document_id} has {amount_settled} settled; cancel its receipts, payments or notes first")]
    HasSettlements {
        /// Document.
        document_id: DocumentId,
        /// Amount settled.
        amount_settled: Amount,
    },
}

impl LifecycleError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::NotEditable { .. } => "DOCUMENT_NOT_EDITABLE",
            Self::Expired { .. } => "DOCUMENT_EXPIRED",
            Self::InvalidDocument(_) => "INVALID_DOCUMENT",
            Self::OverSettlement { .. } => "OVER_SETTLEMENT",
            Self::HasSettlements { .. } => "DOCUMENT_HAS_SETTLEMENTS",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidDocument(_) => 400,
            _ => 422,
        }
    }

    /// Lifecycle violations are never retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        false
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
