use super::*;

#[test]
fn test_default_codes() {
    let accounts = PostingAccounts::default();
    assert_eq!(accounts.code(AccountRole::Receivable), "1200");
    assert_eq!(accounts.code(AccountRole::OutputIgst), "2330");
    assert_eq!(accounts.code(AccountRole::CostOfGoodsSold), "5100");
}

#[test]
fn test_tax_roles() {
    assert_eq!(
        AccountRole::output_tax(TaxComponent::Sgst),
        AccountRole::OutputSgst
    );
    assert_eq!(AccountRole::input_tax(TaxComponent::Igst), AccountRole::InputIgst);
}
