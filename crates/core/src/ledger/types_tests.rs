use super::*;
use rstest::rstest;
use rust_decimal_macros::dec;

#[rstest]
#[case(AccountNature::Asset, Side::Debit)]
#[case(AccountNature::Expense, Side::Debit)]
#[case(AccountNature::Liability, Side::Credit)]
#[case(AccountNature::Income, Side::Credit)]
#[case(AccountNature::Equity, Side::Credit)]
fn test_natural_side(#[case] nature: AccountNature, #[case] side: Side) {
    assert_eq!(nature.natural_side(), side);
    assert_eq!(Balance::zero(nature).side, side);
}

#[test]
fn test_signed_effect() {
    let amount = Amount::new(dec!(100));
    assert_eq!(AccountNature::Asset.signed_effect(Side::Debit, amount), amount);
    assert_eq!(AccountNature::Asset.signed_effect(Side::Credit, amount), -amount);
    assert_eq!(AccountNature::Income.signed_effect(Side::Credit, amount), amount);
    assert_eq!(AccountNature::Income.signed_effect(Side::Debit, amount), -amount);
}

#[test]
fn test_balance_natural_round_trip_flips_side() {
    let overdrawn = Balance::from_natural(Amount::new(dec!(-40)), AccountNature::Asset);
    assert_eq!(overdrawn.side, Side::Credit);
    assert_eq!(overdrawn.amount, Amount::new(dec!(40)));
    assert_eq!(overdrawn.to_natural(AccountNature::Asset), Amount::new(dec!(-40)));
}

#[test]
fn test_signed_dr_cr_boundary() {
    let credit = Balance::credit(Amount::new(dec!(25)));
    assert_eq!(credit.to_signed_dr_cr(), Amount::new(dec!(-25)));
    assert_eq!(Balance::from_signed_dr_cr(Amount::new(dec!(-25))), credit);
    assert_eq!(Balance::from_signed_dr_cr(Amount::ZERO).side, Side::Debit);
}

#[test]
fn test_open_account_starts_at_opening_balance() {
    let account = LedgerAccount::open(NewLedgerAccount {
        organization_id: OrganizationId::new(),
        code: "1100".to_string(),
        name: "Cash".to_string(),
        nature: AccountNature::Asset,
        opening_balance: Balance::debit(Amount::new(dec!(500))),
    });
    assert!(account.is_active);
    assert_eq!(account.current_balance, account.opening_balance);
    assert_eq!(account.natural_balance(), Amount::new(dec!(500)));
}

#[test]
fn test_nature_parse() {
    assert_eq!(AccountNature::parse("asset"), Some(AccountNature::Asset));
    assert_eq!(AccountNature::parse("EQUITY"), Some(AccountNature::Equity));
    assert_eq!(AccountNature::parse("revenue"), None);
}

#[test]
fn test_balance_display() {
    assert_eq!(Balance::credit(Amount::new(dec!(12.5))).to_string(), "12.50 CR");
}
