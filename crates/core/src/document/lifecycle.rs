//! Document lifecycle state machine.
//!
//! Each [`DocumentKind`] has an explicit table of `(from, to, origin)` rows.
//! A [`Transition`] can only be constructed from a row of its kind's table,
//! so code holding a `Transition` knows the move is legal.
//!
//! EXPIRED is never stored: a quotation still in DRAFT or PENDING whose
//! `valid_until` is before today reads as EXPIRED and can only be cancelled.

use chrono::NaiveDate;

use super::error::LifecycleError;
use super::types::{Document, DocumentKind, DocumentStatus};

use DocumentStatus::{
    Accepted, Approved, Cancelled, Confirmed, Converted, Draft, Expired, Fulfilled, Overdue,
    Paid, Partial, Pending, Rejected,
};
use TransitionOrigin::{Settlement, User};

/// Who may drive a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOrigin {
    /// Explicit request against the document.
    User,
    /// Side effect of approving or cancelling a settling document.
    Settlement,
}

/// Side effect a transition has on the ledger and stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostingEffect {
    /// Status change only.
    None,
    /// Post the document's template (and stock movements).
    Post,
    /// Settle the remaining balance directly in cash.
    Settle,
    /// Reverse every posted effect of the document.
    Reverse,
}

type Row = (DocumentStatus, DocumentStatus, TransitionOrigin);

const RECEIVABLE_TABLE: &[Row] = &[
    (Draft, Pending, User),
    (Pending, Draft, User),
    (Pending, Approved, User),
    (Approved, Paid, User),
    (Approved, Overdue, User),
    (Partial, Paid, User),
    (Partial, Overdue, User),
    (Overdue, Paid, User),
    (Approved, Partial, Settlement),
    (Approved, Paid, Settlement),
    (Overdue, Partial, Settlement),
    (Overdue, Paid, Settlement),
    (Partial, Paid, Settlement),
    (Partial, Approved, Settlement),
    (Paid, Partial, Settlement),
    (Paid, Approved, Settlement),
    (Draft, Cancelled, User),
    (Pending, Cancelled, User),
    (Approved, Cancelled, User),
    (Partial, Cancelled, User),
    (Overdue, Cancelled, User),
];

const SIMPLE_TABLE: &[Row] = &[
    (Draft, Pending, User),
    (Pending, Draft, User),
    (Pending, Approved, User),
    (Draft, Cancelled, User),
    (Pending, Cancelled, User),
    (Approved, Cancelled, User),
];

const QUOTATION_TABLE: &[Row] = &[
    (Draft, Pending, User),
    (Pending, Draft, User),
    (Pending, Accepted, User),
    (Pending, Rejected, User),
    (Accepted, Converted, User),
    (Draft, Cancelled, User),
    (Pending, Cancelled, User),
    (Accepted, Cancelled, User),
];

const SALES_ORDER_TABLE: &[Row] = &[
    (Draft, Pending, User),
    (Draft, Confirmed, User),
    (Pending, Draft, User),
    (Pending, Confirmed, User),
    (Confirmed, Fulfilled, User),
    (Draft, Cancelled, User),
    (Pending, Cancelled, User),
    (Confirmed, Cancelled, User),
];

const PURCHASE_ORDER_TABLE: &[Row] = &[
    (Draft, Pending, User),
    (Pending, Draft, User),
    (Pending, Approved, User),
    (Approved, Fulfilled, User),
    (Draft, Cancelled, User),
    (Pending, Cancelled, User),
    (Approved, Cancelled, User),
];

/// Returns the transition table of a document kind.
#[must_use]
pub const fn table(kind: DocumentKind) -> &'static [Row] {
    match kind {
        DocumentKind::Invoice | DocumentKind::Bill => RECEIVABLE_TABLE,
        DocumentKind::CreditNote
        | DocumentKind::DebitNote
        | DocumentKind::Receipt
        | DocumentKind::Payment
        | DocumentKind::StockAdjustment => SIMPLE_TABLE,
        DocumentKind::Quotation => QUOTATION_TABLE,
        DocumentKind::SalesOrder => SALES_ORDER_TABLE,
        DocumentKind::PurchaseOrder => PURCHASE_ORDER_TABLE,
    }
}

/// A legal status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    kind: DocumentKind,
    from: DocumentStatus,
    to: DocumentStatus,
    origin: TransitionOrigin,
}

impl Transition {
    /// Builds a user-driven transition.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` if the row is not in the kind's table.
    pub fn new(
        kind: DocumentKind,
        from: DocumentStatus,
        to: DocumentStatus,
    ) -> Result<Self, LifecycleError> {
        Self::lookup(kind, from, to, User)
    }

    /// Builds a settlement-driven transition.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` if the row is not in the kind's table.
    pub fn by_settlement(
        kind: DocumentKind,
        from: DocumentStatus,
        to: DocumentStatus,
    ) -> Result<Self, LifecycleError> {
        Self::lookup(kind, from, to, Settlement)
    }

    fn lookup(
        kind: DocumentKind,
        from: DocumentStatus,
        to: DocumentStatus,
        origin: TransitionOrigin,
    ) -> Result<Self, LifecycleError> {
        if table(kind).contains(&(from, to, origin)) {
            Ok(Self {
                kind,
                from,
                to,
                origin,
            })
        } else {
            Err(LifecycleError::InvalidTransition { kind, from, to })
        }
    }

    /// Document kind.
    #[must_use]
    pub const fn kind(&self) -> DocumentKind {
        self.kind
    }

    /// Status before.
    #[must_use]
    pub const fn from(&self) -> DocumentStatus {
        self.from
    }

    /// Status after.
    #[must_use]
    pub const fn to(&self) -> DocumentStatus {
        self.to
    }

    /// Who drives the transition.
    #[must_use]
    pub const fn origin(&self) -> TransitionOrigin {
        self.origin
    }

    /// Ledger and stock side effect of the transition.
    #[must_use]
    pub const fn effect(&self) -> PostingEffect {
        match (self.kind, self.to, self.origin) {
            (
                DocumentKind::Invoice
                | DocumentKind::Bill
                | DocumentKind::CreditNote
                | DocumentKind::DebitNote
                | DocumentKind::Receipt
                | DocumentKind::Payment
                | DocumentKind::StockAdjustment,
                Approved,
                User,
            ) => PostingEffect::Post,
            (DocumentKind::Invoice | DocumentKind::Bill, Paid, User) => PostingEffect::Settle,
            (_, Cancelled, _) => PostingEffect::Reverse,
            _ => PostingEffect::None,
        }
    }
}

/// Statuses a user may move a document to from `from`.
#[must_use]
pub fn allowed_targets(kind: DocumentKind, from: DocumentStatus) -> Vec<DocumentStatus> {
    table(kind)
        .iter()
        .filter(|(row_from, _, origin)| *row_from == from && *origin == User)
        .map(|(_, to, _)| *to)
        .collect()
}

/// Returns true if the document reads as EXPIRED on `today`.
#[must_use]
pub fn is_expired(document: &Document, today: NaiveDate) -> bool {
    document.kind == DocumentKind::Quotation
        && matches!(document.status, Draft | Pending)
        && document.valid_until.is_some_and(|valid_until| valid_until < today)
}

/// Status as presented to readers on `today`.
#[must_use]
pub fn effective_status(document: &Document, today: NaiveDate) -> DocumentStatus {
    if is_expired(document, today) {
        Expired
    } else {
        document.status
    }
}

/// Checks a user-requested transition against the table and the derived
/// EXPIRED status.
///
/// # Errors
///
/// Returns `Expired` for an expired quotation unless `to` is CANCELLED, and
/// `InvalidTransition` for moves not in the table.
pub fn check_user_transition(
    document: &Document,
    to: DocumentStatus,
    today: NaiveDate,
) -> Result<Transition, LifecycleError> {
    if to != Cancelled && is_expired(document, today) {
        if let Some(valid_until) = document.valid_until {
            return Err(LifecycleError::Expired {
                document_id: document.id,
                valid_until,
            });
        }
    }
    Transition::new(document.kind, document.status, to)
}

/// Ensures the document's lines may be edited.
///
/// # Errors
///
/// Returns `NotEditable` outside DRAFT.
pub fn check_editable(document: &Document) -> Result<(), LifecycleError> {
    if document.status.is_editable() {
        Ok(())
    } else {
        Err(LifecycleError::NotEditable {
            document_id: document.id,
            status: document.status,
        })
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
