//! Ledger registry errors.

use bahi_shared::types::{Amount, LedgerAccountId};
use thiserror::Error;

use crate::repository::StoreError;

/// Errors that can occur while applying journal entries to ledger accounts.
#[derive(Debug, Error)]
pub enum PostingError {
    /// Debit and credit totals differ. Always a template bug.
    #[error("Journal entry is not balanced. Debit: {debit}, Credit: {credit}")]
    Unbalanced {
        /// Sum of debit lines.
        debit: Amount,
        /// Sum of credit lines.
        credit: Amount,
    },

    /// A line references an account that does not exist in the organization.
    #[error("Ledger account not found: {0}")]
    UnknownAccount(LedgerAccountId),

    /// A posting role is mapped to a code with no account behind it.
    #[error("No ledger account with code {0}")]
    UnknownAccountCode(String),

    /// A line references a deactivated account.
    #[error("Ledger account {0} is inactive")]
    InactiveAccount(LedgerAccountId),

    /// Structurally invalid entry (no lines, non-positive amount, one-sided).
    #[error("Invalid journal entry: {0}")]
    InvalidEntry(String),

    /// Chart-of-accounts code already in use.
    #[error("Ledger account code already exists: {0}")]
    DuplicateAccountCode(String),

    /// Storage failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl PostingError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unbalanced { .. } => "UNBALANCED_ENTRY",
            Self::UnknownAccount(_) => "UNKNOWN_ACCOUNT",
            Self::UnknownAccountCode(_) => "UNKNOWN_ACCOUNT_CODE",
            Self::InactiveAccount(_) => "INACTIVE_ACCOUNT",
            Self::InvalidEntry(_) => "INVALID_ENTRY",
            Self::DuplicateAccountCode(_) => "DUPLICATE_ACCOUNT_CODE",
            Self::Store(e) => e.error_code(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidEntry(_) => 400,
            Self::UnknownAccount(_) => 404,
            Self::DuplicateAccountCode(_) => 409,
            Self::UnknownAccountCode(_) | Self::InactiveAccount(_) => 422,
            Self::Unbalanced { .. } => 500,
            Self::Store(e) => e.http_status_code(),
        }
    }

    /// Returns true if the whole operation may be retried.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Store(e) => e.is_retryable(),
            _ => false,
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
