//! Property-based tests for the transition tables.

use proptest::prelude::*;

use super::lifecycle::{Transition, allowed_targets, table};
use super::types::{DocumentKind, DocumentStatus};

const KINDS: [DocumentKind; 10] = [
    DocumentKind::Invoice,
    DocumentKind::Bill,
    DocumentKind::SalesOrder,
    DocumentKind::PurchaseOrder,
    DocumentKind::Quotation,
    DocumentKind::CreditNote,
    DocumentKind::DebitNote,
    DocumentKind::Receipt,
    DocumentKind::Payment,
    DocumentKind::StockAdjustment,
];

const STATUSES: [DocumentStatus; 13] = [
    DocumentStatus::Draft,
    DocumentStatus::Pending,
    DocumentStatus::Confirmed,
    DocumentStatus::Approved,
    DocumentStatus::Partial,
    DocumentStatus::Paid,
    DocumentStatus::Overdue,
    DocumentStatus::Accepted,
    DocumentStatus::Rejected,
    DocumentStatus::Expired,
    DocumentStatus::Converted,
    DocumentStatus::Fulfilled,
    DocumentStatus::Cancelled,
];

fn kind_strategy() -> impl Strategy<Value = DocumentKind> {
    prop::sample::select(KINDS.to_vec())
}

fn status_strategy() -> impl Strategy<Value = DocumentStatus> {
    prop::sample::select(STATUSES.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// A transition exists exactly when its row is in the table.
    #[test]
    fn prop_transition_matches_table(
        kind in kind_strategy(),
        from in status_strategy(),
        to in status_strategy(),
    ) {
        let listed = allowed_targets(kind, from).contains(&to);
        prop_assert_eq!(Transition::new(kind, from, to).is_ok(), listed);
    }

    /// CANCELLED is terminal and EXPIRED is never a stored source or target.
    #[test]
    fn prop_terminal_and_derived_states(
        kind in kind_strategy(),
        to in status_strategy(),
    ) {
        prop_assert!(Transition::new(kind, DocumentStatus::Cancelled, to).is_err());
        prop_assert!(Transition::by_settlement(kind, DocumentStatus::Cancelled, to).is_err());
        prop_assert!(Transition::new(kind, DocumentStatus::Expired, to).is_err());
        prop_assert!(Transition::new(kind, to, DocumentStatus::Expired).is_err());
    }

    /// No row is a self-loop.
    #[test]
    fn prop_no_self_loops(kind in kind_strategy(), status in status_strategy()) {
        prop_assert!(Transition::new(kind, status, status).is_err());
        prop_assert!(Transition::by_settlement(kind, status, status).is_err());
    }
}

/// Every status a kind uses is reachable from DRAFT.
#[test]
fn every_status_reachable_from_draft() {
    for kind in KINDS {
        let rows = table(kind);
        let mut reached = vec![DocumentStatus::Draft];
        let mut frontier = vec![DocumentStatus::Draft];
        while let Some(status) = frontier.pop() {
            for (from, to, _) in rows {
                if *from == status && !reached.contains(to) {
                    reached.push(*to);
                    frontier.push(*to);
                }
            }
        }
        for (from, to, _) in rows {
            assert!(reached.contains(from), "{kind}: {from} unreachable");
            assert!(reached.contains(to), "{kind}: {to} unreachable");
        }
    }
}

/// DRAFT can always be cancelled.
#[test]
fn draft_is_always_cancellable() {
    for kind in KINDS {
        assert!(Transition::new(kind, DocumentStatus::Draft, DocumentStatus::Cancelled).is_ok());
    }
}
