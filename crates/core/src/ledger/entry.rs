//! Journal entries and their structural validation.

use bahi_shared::types::{Amount, DocumentId, JournalEntryId, LedgerAccountId, OrganizationId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::error::PostingError;
use super::types::Side;
use crate::document::{DocumentKind, DocumentStatus};

/// Why a journal entry was posted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryPurpose {
    /// The document's own financial effect (revenue, expense, tax, payment).
    Document,
    /// Cost of goods recognized for stock leaving on a sale.
    CostOfGoods,
    /// Direct settlement of a receivable or payable (marking a document paid).
    Settlement,
    /// Mirror image of an earlier entry.
    Reversal,
    /// Hand-built entry (opening balances, corrections).
    Manual,
}

/// A single debit or credit line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLine {
    /// Account the line posts to.
    pub ledger_account_id: LedgerAccountId,
    /// Debit or credit.
    pub side: Side,
    /// Strictly positive amount at [`Amount::SCALE`] precision.
    pub amount: Amount,
    /// Optional line memo.
    pub memo: Option<String>,
}

impl JournalLine {
    /// Creates a debit line.
    #[must_use]
    pub const fn debit(ledger_account_id: LedgerAccountId, amount: Amount) -> Self {
        Self {
            ledger_account_id,
            side: Side::Debit,
            amount,
            memo: None,
        }
    }

    /// Creates a credit line.
    #[must_use]
    pub const fn credit(ledger_account_id: LedgerAccountId, amount: Amount) -> Self {
        Self {
            ledger_account_id,
            side: Side::Credit,
            amount,
            memo: None,
        }
    }

    /// Attaches a memo.
    #[must_use]
    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }
}

/// An immutable, balanced posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Unique identifier.
    pub id: JournalEntryId,
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// Type of the source document, if any.
    pub document_type: Option<DocumentKind>,
    /// Source document, if any.
    pub document_id: Option<DocumentId>,
    /// Target status of the transition that produced the entry.
    pub transition: Option<DocumentStatus>,
    /// Why the entry exists.
    pub purpose: EntryPurpose,
    /// Entry this one mirrors, for reversals.
    pub reverses: Option<JournalEntryId>,
    /// Accounting date.
    pub date: NaiveDate,
    /// Narration.
    pub description: String,
    /// Ordered lines.
    pub lines: Vec<JournalLine>,
    /// When the entry was written.
    pub posted_at: DateTime<Utc>,
}

impl JournalEntry {
    /// Sum of debit lines.
    #[must_use]
    pub fn total_debit(&self) -> Amount {
        side_total(&self.lines, Side::Debit)
    }

    /// Sum of credit lines.
    #[must_use]
    pub fn total_credit(&self) -> Amount {
        side_total(&self.lines, Side::Credit)
    }

    /// Returns true if the entry was posted for `document_id` at `transition` with `purpose`.
    #[must_use]
    pub fn matches_key(
        &self,
        document_id: DocumentId,
        transition: DocumentStatus,
        purpose: EntryPurpose,
    ) -> bool {
        self.document_id == Some(document_id)
            && self.transition == Some(transition)
            && self.purpose == purpose
    }

    /// Signed effect of the entry on one account, relative to the debit side.
    #[must_use]
    pub fn debit_effect_on(&self, account_id: LedgerAccountId) -> Amount {
        self.lines
            .iter()
            .filter(|line| line.ledger_account_id == account_id)
            .map(|line| match line.side {
                Side::Debit => line.amount,
                Side::Credit => -line.amount,
            })
            .sum()
    }
}

fn side_total(lines: &[JournalLine], side: Side) -> Amount {
    lines
        .iter()
        .filter(|line| line.side == side)
        .map(|line| line.amount)
        .sum()
}

/// Validates that a set of journal lines forms a balanced posting.
///
/// # Errors
///
/// Returns `InvalidEntry` for structural problems (no lines, non-positive or
/// over-precise amounts, one-sided entries) and `Unbalanced` when the debit
/// and credit totals differ.
pub fn validate_lines(lines: &[JournalLine]) -> Result<(), PostingError> {
    if lines.is_empty() {
        return Err(PostingError::InvalidEntry(
            "entry must have at least one line".to_string(),
        ));
    }

    let mut debit = Amount::ZERO;
    let mut credit = Amount::ZERO;

    for line in lines {
        if !line.amount.is_positive() {
            return Err(PostingError::InvalidEntry(format!(
                "line amount must be positive, got {}",
                line.amount.value()
            )));
        }
        if line.amount.round() != line.amount {
            return Err(PostingError::InvalidEntry(format!(
                "line amount {} has more than {} decimal places",
                line.amount.value(),
                Amount::SCALE
            )));
        }

        match line.side {
            Side::Debit => debit += line.amount,
            Side::Credit => credit += line.amount,
        }
    }

    if debit.is_zero() || credit.is_zero() {
        return Err(PostingError::InvalidEntry(
            "entry must have both debit and credit lines".to_string(),
        ));
    }

    if debit != credit {
        return Err(PostingError::Unbalanced { debit, credit });
    }

    Ok(())
}

#[cfg(test)]
#[path = "entry_tests.rs"]
mod tests;
