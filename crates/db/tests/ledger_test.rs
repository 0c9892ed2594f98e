//! Ledger registry behaviour against the in-memory store.

mod common;

use bahi_core::ledger::{Balance, JournalLine, LedgerRegistry, PostingError};
use bahi_core::posting::TransitionError;
use bahi_core::repository::{Repository, RepositoryTx};
use bahi_shared::types::Amount;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use common::{Fixture, date};

#[tokio::test]
async fn test_verify_ledger_finds_drifted_cache() {
    let f = Fixture::new().await;
    f.service_invoice(f.local_customer, dec!(200), None).await;

    let cash = f.account("1100");
    {
        let mut tx = f.store.begin().await.unwrap();
        let mut account = tx.lock_account(cash).await.unwrap().unwrap();
        let expected = account.version;
        account.current_balance = Balance::debit(Amount::new(dec!(999)));
        account.version += 1;
        tx.update_account(&account, expected).await.unwrap();
        tx.commit().await.unwrap();
    }

    let discrepancies = f.service.verify_ledger(f.org).await.unwrap();
    assert_eq!(discrepancies.len(), 1);
    assert_eq!(discrepancies[0].account_id, cash);
    assert_eq!(discrepancies[0].recomputed, Balance::debit(Amount::ZERO));

    f.service.recompute_balance(cash).await.unwrap();
    f.assert_ledger_consistent().await;
}

#[tokio::test]
async fn test_duplicate_account_code_rejected() {
    let f = Fixture::new().await;
    let err = f
        .service
        .open_account(bahi_core::ledger::NewLedgerAccount {
            organization_id: f.org,
            code: "1100".to_string(),
            name: "Petty Cash".to_string(),
            nature: bahi_core::ledger::AccountNature::Asset,
            opening_balance: Balance::debit(Amount::ZERO),
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        TransitionError::Posting(PostingError::DuplicateAccountCode(code)) if code == "1100"
    ));
}

#[tokio::test]
async fn test_deactivated_account_keeps_its_balance() {
    let f = Fixture::new().await;
    f.service_invoice(f.local_customer, dec!(200), None).await;
    let account = f.service.deactivate_account(f.account("1200")).await.unwrap();

    assert!(!account.is_active);
    assert_eq!(f.balance("1200").await, Amount::new(dec!(200)));
    let trial = f.service.trial_balance(f.org).await.unwrap();
    assert!(trial.rows.iter().any(|row| row.code == "1200"));
}

#[tokio::test]
async fn test_registry_rolls_back_with_its_transaction() {
    let f = Fixture::new().await;
    {
        let mut tx = f.store.begin().await.unwrap();
        let entry = bahi_core::journal::JournalEngine::post_manual(
            &mut tx,
            f.org,
            date(4, 1),
            "Never committed",
            vec![
                JournalLine::debit(f.account("1100"), Amount::new(dec!(10))),
                JournalLine::credit(f.account("3000"), Amount::new(dec!(10))),
            ],
        )
        .await
        .unwrap();
        assert_eq!(
            LedgerRegistry::get_balance(&mut tx, f.account("1100")).await.unwrap(),
            Balance::debit(Amount::new(dec!(10)))
        );
        assert_eq!(entry.lines.len(), 2);
    }
    assert_eq!(f.balance("1100").await, Amount::ZERO);
}

#[tokio::test]
async fn test_accounts_listed_and_found_by_code() {
    let f = Fixture::new().await;
    let accounts = f.service.list_accounts(f.org).await.unwrap();
    assert_eq!(accounts.len(), common::CHART.len());
    assert!(accounts.windows(2).all(|pair| pair[0].code < pair[1].code));

    let sales = f.service.find_account_by_code(f.org, "4100").await.unwrap();
    assert_eq!(sales.id, f.account("4100"));
    let err = f
        .service
        .find_account_by_code(f.org, "9999")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        TransitionError::Posting(PostingError::UnknownAccountCode(_))
    ));
}

fn amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000).prop_map(|minor| Decimal::new(minor, 2))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Any sequence of balanced manual entries keeps the cache and the journal in agreement.
    #[test]
    fn prop_manual_entries_keep_ledger_consistent(
        entries in prop::collection::vec((0usize..4, 0usize..4, amount()), 1..12)
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        runtime.block_on(async {
            let f = Fixture::new().await;
            let codes = ["1100", "2100", "3000", "5200"];
            let mut cash = Decimal::ZERO;

            for (debit, credit, value) in &entries {
                if debit == credit {
                    continue;
                }
                f.service
                    .post_manual_entry(
                        f.org,
                        date(4, 1),
                        "Random",
                        vec![
                            JournalLine::debit(f.account(codes[*debit]), Amount::new(*value)),
                            JournalLine::credit(f.account(codes[*credit]), Amount::new(*value)),
                        ],
                    )
                    .await
                    .unwrap();
                if *debit == 0 {
                    cash += *value;
                }
                if *credit == 0 {
                    cash -= *value;
                }
            }

            f.assert_ledger_consistent().await;
            assert_eq!(f.balance("1100").await, Amount::new(cash));
        });
    }
}
