use super::*;
use bahi_shared::types::{Amount, ItemId, Quantity, WarehouseId};
use rust_decimal_macros::dec;
use uuid::Uuid;

#[test]
fn test_insufficient_stock_maps_to_business_rule() {
    let err = TransitionError::from(ValuationError::InsufficientStock {
        item_id: ItemId::new(),
        warehouse_id: WarehouseId::new(),
        requested: Quantity::units(50),
        available: Quantity::units(12),
    });
    assert_eq!(err.kind(), ErrorKind::InsufficientStock);
    assert!(!err.is_retryable());
    assert!(matches!(AppError::from(err), AppError::BusinessRule(_)));
}

#[test]
fn test_version_conflict_is_retryable() {
    let err = TransitionError::from(PostingError::Store(StoreError::VersionConflict {
        entity: "ledger_account",
        id: Uuid::nil(),
        expected: 1,
        actual: 2,
    }));
    assert_eq!(err.kind(), ErrorKind::ConcurrencyConflict);
    assert!(err.is_retryable());
    assert_eq!(AppError::from(err).status_code(), 409);
}

#[test]
fn test_unbalanced_is_internal() {
    let err = TransitionError::from(PostingError::Unbalanced {
        debit: Amount::new(dec!(100)),
        credit: Amount::new(dec!(99.99)),
    });
    assert_eq!(err.kind(), ErrorKind::UnbalancedEntry);
    assert!(matches!(AppError::from(err), AppError::Internal(_)));
}

#[test]
fn test_status_mismatch() {
    let err = TransitionError::StatusMismatch {
        document_id: DocumentId::new(),
        expected: DocumentStatus::Pending,
        actual: DocumentStatus::Draft,
    };
    assert_eq!(err.error_code(), "STATUS_MISMATCH");
    assert_eq!(err.kind(), ErrorKind::ConcurrencyConflict);
    assert!(!err.is_retryable());
}

#[test]
fn test_inactive_account_is_configuration() {
    let err = TransitionError::from(PostingError::InactiveAccount(
        bahi_shared::types::LedgerAccountId::new(),
    ));
    assert_eq!(err.kind(), ErrorKind::InactiveAccount);
    assert!(matches!(AppError::from(err), AppError::Configuration(_)));
}
