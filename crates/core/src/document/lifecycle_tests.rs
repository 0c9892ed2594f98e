use super::*;
use crate::tax::DocumentTotals;
use bahi_shared::types::{Amount, DocumentId, OrganizationId};
use rstest::rstest;

fn quotation(status: DocumentStatus, valid_until: NaiveDate) -> Document {
    Document {
        id: DocumentId::new(),
        organization_id: OrganizationId::new(),
        kind: DocumentKind::Quotation,
        number: "QT-1".to_string(),
        party_id: None,
        date: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
        due_date: None,
        valid_until: Some(valid_until),
        status,
        lines: vec![],
        totals: DocumentTotals::default(),
        amount_settled: Amount::ZERO,
        settles: None,
        version: 0,
    }
}

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 4, day).unwrap()
}

#[rstest]
#[case(DocumentKind::Invoice, Draft, Pending)]
#[case(DocumentKind::Invoice, Pending, Approved)]
#[case(DocumentKind::Invoice, Approved, Paid)]
#[case(DocumentKind::Bill, Overdue, Cancelled)]
#[case(DocumentKind::Quotation, Pending, Accepted)]
#[case(DocumentKind::Quotation, Accepted, Converted)]
#[case(DocumentKind::SalesOrder, Draft, Confirmed)]
#[case(DocumentKind::SalesOrder, Confirmed, Fulfilled)]
#[case(DocumentKind::PurchaseOrder, Approved, Fulfilled)]
#[case(DocumentKind::Receipt, Pending, Approved)]
fn test_valid_user_transitions(
    #[case] kind: DocumentKind,
    #[case] from: DocumentStatus,
    #[case] to: DocumentStatus,
) {
    assert!(Transition::new(kind, from, to).is_ok());
}

#[rstest]
#[case(DocumentKind::Invoice, Draft, Approved)]
#[case(DocumentKind::Invoice, Paid, Cancelled)]
#[case(DocumentKind::Invoice, Cancelled, Draft)]
#[case(DocumentKind::Invoice, Approved, Partial)]
#[case(DocumentKind::Quotation, Draft, Expired)]
#[case(DocumentKind::Quotation, Rejected, Cancelled)]
#[case(DocumentKind::SalesOrder, Fulfilled, Cancelled)]
#[case(DocumentKind::Receipt, Approved, Paid)]
fn test_invalid_user_transitions(
    #[case] kind: DocumentKind,
    #[case] from: DocumentStatus,
    #[case] to: DocumentStatus,
) {
    assert_eq!(
        Transition::new(kind, from, to),
        Err(LifecycleError::InvalidTransition { kind, from, to })
    );
}

#[test]
fn test_partial_is_settlement_only() {
    assert!(Transition::by_settlement(DocumentKind::Invoice, Approved, Partial).is_ok());
    assert!(Transition::by_settlement(DocumentKind::Bill, Partial, Approved).is_ok());
    assert!(Transition::by_settlement(DocumentKind::Receipt, Approved, Partial).is_err());
    assert!(Transition::by_settlement(DocumentKind::Invoice, Paid, Partial).is_ok());
    assert!(Transition::by_settlement(DocumentKind::Bill, Paid, Approved).is_ok());
    assert!(Transition::new(DocumentKind::Invoice, Paid, Partial).is_err());
}

#[test]
fn test_posting_effects() {
    let approve = Transition::new(DocumentKind::Invoice, Pending, Approved).unwrap();
    assert_eq!(approve.effect(), PostingEffect::Post);
    let pay = Transition::new(DocumentKind::Bill, Approved, Paid).unwrap();
    assert_eq!(pay.effect(), PostingEffect::Settle);
    let settled = Transition::by_settlement(DocumentKind::Bill, Approved, Paid).unwrap();
    assert_eq!(settled.effect(), PostingEffect::None);
    let cancel = Transition::new(DocumentKind::Receipt, Approved, Cancelled).unwrap();
    assert_eq!(cancel.effect(), PostingEffect::Reverse);
    let po = Transition::new(DocumentKind::PurchaseOrder, Pending, Approved).unwrap();
    assert_eq!(po.effect(), PostingEffect::None);
}

#[test]
fn test_allowed_targets_exclude_settlement_rows() {
    let targets = allowed_targets(DocumentKind::Invoice, Approved);
    assert_eq!(targets, vec![Paid, Overdue, Cancelled]);
}

#[test]
fn test_expired_is_derived() {
    let doc = quotation(Pending, date(10));
    assert_eq!(effective_status(&doc, date(10)), Pending);
    assert_eq!(effective_status(&doc, date(11)), Expired);
    assert_eq!(doc.status, Pending);

    let accepted = quotation(Accepted, date(10));
    assert_eq!(effective_status(&accepted, date(30)), Accepted);
}

#[test]
fn test_expired_quotation_can_only_be_cancelled() {
    let doc = quotation(Pending, date(10));
    assert!(matches!(
        check_user_transition(&doc, Accepted, date(11)),
        Err(LifecycleError::Expired { .. })
    ));
    assert!(check_user_transition(&doc, Cancelled, date(11)).is_ok());
    assert!(check_user_transition(&doc, Accepted, date(10)).is_ok());
}

#[test]
fn test_only_draft_is_editable() {
    assert!(check_editable(&quotation(Draft, date(10))).is_ok());
    assert!(matches!(
        check_editable(&quotation(Pending, date(10))),
        Err(LifecycleError::NotEditable { .. })
    ));
}
