//! Property-based tests for balance arithmetic.

use bahi_shared::types::{Amount, LedgerAccountId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::entry::{JournalLine, validate_lines};
use super::registry::apply_lines;
use super::types::{AccountNature, Balance, Side};

/// Strategy to generate a valid positive amount (> 0).
fn positive_amount() -> impl Strategy<Value = Amount> {
    (1i64..100_000_000i64).prop_map(Amount::from_minor)
}

fn signed_amount() -> impl Strategy<Value = Amount> {
    (-100_000_000i64..100_000_000i64).prop_map(Amount::from_minor)
}

fn nature_strategy() -> impl Strategy<Value = AccountNature> {
    prop_oneof![
        Just(AccountNature::Asset),
        Just(AccountNature::Liability),
        Just(AccountNature::Income),
        Just(AccountNature::Expense),
        Just(AccountNature::Equity),
    ]
}

fn side_strategy() -> impl Strategy<Value = Side> {
    prop_oneof![Just(Side::Debit), Just(Side::Credit)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Balances never carry a negative magnitude.
    #[test]
    fn prop_balance_magnitude_non_negative(
        signed in signed_amount(),
        nature in nature_strategy(),
    ) {
        let balance = Balance::from_natural(signed, nature);
        prop_assert!(!balance.amount.is_negative());
        prop_assert_eq!(balance.to_natural(nature), signed);
    }

    /// The boundary DR/CR convention round-trips.
    #[test]
    fn prop_signed_dr_cr_round_trip(signed in signed_amount()) {
        prop_assert_eq!(Balance::from_signed_dr_cr(signed).to_signed_dr_cr(), signed);
    }

    /// Applying lines one at a time equals applying them all at once.
    #[test]
    fn prop_apply_lines_is_incremental(
        nature in nature_strategy(),
        opening in signed_amount(),
        moves in prop::collection::vec((side_strategy(), positive_amount()), 0..20),
    ) {
        let account = LedgerAccountId::new();
        let lines: Vec<JournalLine> = moves
            .iter()
            .map(|(side, amount)| JournalLine {
                ledger_account_id: account,
                side: *side,
                amount: *amount,
                memo: None,
            })
            .collect();

        let start = Balance::from_natural(opening, nature);
        let at_once = apply_lines(start, nature, &lines);
        let stepwise = lines
            .iter()
            .fold(start, |balance, line| apply_lines(balance, nature, [line]));
        prop_assert_eq!(at_once, stepwise);
    }

    /// A line and its mirror cancel out on any account.
    #[test]
    fn prop_mirror_line_cancels(
        nature in nature_strategy(),
        opening in signed_amount(),
        side in side_strategy(),
        amount in positive_amount(),
    ) {
        let account = LedgerAccountId::new();
        let line = JournalLine { ledger_account_id: account, side, amount, memo: None };
        let mirror = JournalLine { side: side.opposite(), ..line.clone() };

        let start = Balance::from_natural(opening, nature);
        let end = apply_lines(start, nature, [&line, &mirror]);
        prop_assert_eq!(end.to_natural(nature), start.to_natural(nature));
    }

    /// A validated entry moves the DR/CR-signed total of all accounts by zero.
    #[test]
    fn prop_balanced_entry_nets_to_zero(
        amounts in prop::collection::vec(positive_amount(), 1..10),
        nature_a in nature_strategy(),
        nature_b in nature_strategy(),
    ) {
        let debit_account = LedgerAccountId::new();
        let credit_account = LedgerAccountId::new();
        let total: Amount = amounts.iter().sum();

        let mut lines: Vec<JournalLine> = amounts
            .iter()
            .map(|amount| JournalLine::debit(debit_account, *amount))
            .collect();
        lines.push(JournalLine::credit(credit_account, total));
        prop_assert!(validate_lines(&lines).is_ok());

        let a = apply_lines(Balance::zero(nature_a), nature_a, lines.iter().filter(|l| l.ledger_account_id == debit_account));
        let b = apply_lines(Balance::zero(nature_b), nature_b, lines.iter().filter(|l| l.ledger_account_id == credit_account));
        prop_assert_eq!(a.to_signed_dr_cr() + b.to_signed_dr_cr(), Amount::ZERO);
    }

    /// Any difference between the two sides is reported as unbalanced.
    #[test]
    fn prop_unbalanced_rejected(
        debit in positive_amount(),
        credit in positive_amount(),
    ) {
        prop_assume!(debit != credit);
        let lines = vec![
            JournalLine::debit(LedgerAccountId::new(), debit),
            JournalLine::credit(LedgerAccountId::new(), credit),
        ];
        let unbalanced = matches!(
            validate_lines(&lines),
            Err(super::error::PostingError::Unbalanced { .. })
        );
        prop_assert!(unbalanced);
    }
}

#[test]
fn zero_balance_sits_on_natural_side() {
    assert_eq!(
        Balance::from_natural(Amount::new(Decimal::ZERO), AccountNature::Income).side,
        Side::Credit
    );
}
