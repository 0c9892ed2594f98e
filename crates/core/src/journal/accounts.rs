//! Posting roles and their mapping to the chart of accounts.

use bahi_shared::config::AccountCodes;
use bahi_shared::types::{LedgerAccountId, OrganizationId};

use crate::ledger::{LedgerRegistry, PostingError};
use crate::repository::RepositoryTx;
use crate::tax::TaxComponent;

/// Account a posting template line refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountRole {
    /// Cash / bank.
    Cash,
    /// Accounts receivable.
    Receivable,
    /// Inventory on hand.
    Inventory,
    /// Input CGST recoverable.
    InputCgst,
    /// Input SGST recoverable.
    InputSgst,
    /// Input IGST recoverable.
    InputIgst,
    /// Accounts payable.
    Payable,
    /// Output CGST payable.
    OutputCgst,
    /// Output SGST payable.
    OutputSgst,
    /// Output IGST payable.
    OutputIgst,
    /// Sales revenue.
    Sales,
    /// Sales returns.
    SalesReturns,
    /// Cost of goods sold.
    CostOfGoodsSold,
    /// Non-stock purchases.
    Purchases,
    /// Purchase returns.
    PurchaseReturns,
    /// Stock adjustment gains and losses.
    StockAdjustment,
}

impl AccountRole {
    /// Output (payable) tax account for a component.
    #[must_use]
    pub const fn output_tax(component: TaxComponent) -> Self {
        match component {
            TaxComponent::Cgst => Self::OutputCgst,
            TaxComponent::Sgst => Self::OutputSgst,
            TaxComponent::Igst => Self::OutputIgst,
        }
    }

    /// Input (recoverable) tax account for a component.
    #[must_use]
    pub const fn input_tax(component: TaxComponent) -> Self {
        match component {
            TaxComponent::Cgst => Self::InputCgst,
            TaxComponent::Sgst => Self::InputSgst,
            TaxComponent::Igst => Self::InputIgst,
        }
    }
}

/// Resolves posting roles to ledger accounts through configured codes.
#[derive(Debug, Clone)]
pub struct PostingAccounts {
    codes: AccountCodes,
}

impl PostingAccounts {
    /// Creates a resolver over the given codes.
    #[must_use]
    pub const fn new(codes: AccountCodes) -> Self {
        Self { codes }
    }

    /// Returns the configured code for a role.
    #[must_use]
    pub fn code(&self, role: AccountRole) -> &str {
        let codes = &self.codes;
        match role {
            AccountRole::Cash => &codes.cash,
            AccountRole::Receivable => &codes.receivable,
            AccountRole::Inventory => &codes.inventory,
            AccountRole::InputCgst => &codes.input_cgst,
            AccountRole::InputSgst => &codes.input_sgst,
            AccountRole::InputIgst => &codes.input_igst,
            AccountRole::Payable => &codes.payable,
            AccountRole::OutputCgst => &codes.output_cgst,
            AccountRole::OutputSgst => &codes.output_sgst,
            AccountRole::OutputIgst => &codes.output_igst,
            AccountRole::Sales => &codes.sales,
            AccountRole::SalesReturns => &codes.sales_returns,
            AccountRole::CostOfGoodsSold => &codes.cost_of_goods_sold,
            AccountRole::Purchases => &codes.purchases,
            AccountRole::PurchaseReturns => &codes.purchase_returns,
            AccountRole::StockAdjustment => &codes.stock_adjustment,
        }
    }

    /// Looks up the ledger account for a role.
    ///
    /// # Errors
    ///
    /// Returns `UnknownAccountCode` if no account carries the configured code.
    pub async fn resolve<T: RepositoryTx>(
        &self,
        tx: &mut T,
        organization_id: OrganizationId,
        role: AccountRole,
    ) -> Result<LedgerAccountId, PostingError> {
        LedgerRegistry::find_by_code(tx, organization_id, self.code(role))
            .await
            .map(|account| account.id)
    }
}

impl Default for PostingAccounts {
    fn default() -> Self {
        Self::new(AccountCodes::default())
    }
}

#[cfg(test)]
#[path = "accounts_tests.rs"]
mod tests;
