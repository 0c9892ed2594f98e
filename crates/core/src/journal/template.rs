//! Posting templates.
//!
//! Pure functions from a document's computed figures to the entries it
//! posts. Lines with a zero amount are dropped and entries left without
//! lines are omitted.

use bahi_shared::types::Amount;

use super::accounts::AccountRole;
use crate::document::DocumentKind;
use crate::ledger::{EntryPurpose, Side};
use crate::tax::{DocumentTotals, TaxComponent};

/// One line of a template, before role resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateLine {
    /// Account role.
    pub role: AccountRole,
    /// Debit or credit.
    pub side: Side,
    /// Amount, rounded.
    pub amount: Amount,
}

impl TemplateLine {
    const fn debit(role: AccountRole, amount: Amount) -> Self {
        Self {
            role,
            side: Side::Debit,
            amount,
        }
    }

    const fn credit(role: AccountRole, amount: Amount) -> Self {
        Self {
            role,
            side: Side::Credit,
            amount,
        }
    }
}

/// An entry to post, before role resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryTemplate {
    /// Why the entry exists.
    pub purpose: EntryPurpose,
    /// Narration.
    pub description: String,
    /// Lines.
    pub lines: Vec<TemplateLine>,
}

impl EntryTemplate {
    fn new(purpose: EntryPurpose, description: String, lines: Vec<TemplateLine>) -> Self {
        Self {
            purpose,
            description,
            lines: lines
                .into_iter()
                .filter(|line| !line.amount.is_zero())
                .collect(),
        }
    }

    /// Sum of debit lines.
    #[must_use]
    pub fn total_debit(&self) -> Amount {
        self.side_total(Side::Debit)
    }

    /// Sum of credit lines.
    #[must_use]
    pub fn total_credit(&self) -> Amount {
        self.side_total(Side::Credit)
    }

    fn side_total(&self, side: Side) -> Amount {
        self.lines
            .iter()
            .filter(|line| line.side == side)
            .map(|line| line.amount)
            .sum()
    }
}

/// Figures a template needs besides the document totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostingFigures {
    /// Computed document totals.
    pub totals: DocumentTotals,
    /// Cost of stock issued by the document.
    pub cost_of_goods: Amount,
    /// Value of stock received by a stock adjustment.
    pub adjustment_in: Amount,
    /// Cost of stock removed by a stock adjustment.
    pub adjustment_out: Amount,
}

/// Entries posted when a document is approved.
#[must_use]
pub fn approval_entries(
    kind: DocumentKind,
    number: &str,
    figures: &PostingFigures,
) -> Vec<EntryTemplate> {
    let totals = &figures.totals;
    let mut entries = Vec::new();

    match kind {
        DocumentKind::Invoice => {
            let mut lines = vec![
                TemplateLine::debit(AccountRole::Receivable, totals.total),
                TemplateLine::credit(AccountRole::Sales, totals.subtotal),
            ];
            lines.extend(tax_lines(totals, Side::Credit, AccountRole::output_tax));
            entries.push(EntryTemplate::new(
                EntryPurpose::Document,
                format!("Invoice {number}"),
                lines,
            ));
            entries.push(EntryTemplate::new(
                EntryPurpose::CostOfGoods,
                format!("Cost of goods sold on invoice {number}"),
                vec![
                    TemplateLine::debit(AccountRole::CostOfGoodsSold, figures.cost_of_goods),
                    TemplateLine::credit(AccountRole::Inventory, figures.cost_of_goods),
                ],
            ));
        }
        DocumentKind::Bill => {
            let mut lines = vec![
                TemplateLine::debit(AccountRole::Inventory, totals.stock_subtotal),
                TemplateLine::debit(
                    AccountRole::Purchases,
                    totals.subtotal - totals.stock_subtotal,
                ),
            ];
            lines.extend(tax_lines(totals, Side::Debit, AccountRole::input_tax));
            lines.push(TemplateLine::credit(AccountRole::Payable, totals.total));
            entries.push(EntryTemplate::new(
                EntryPurpose::Document,
                format!("Bill {number}"),
                lines,
            ));
        }
        DocumentKind::CreditNote => {
            let mut lines = vec![TemplateLine::debit(
                AccountRole::SalesReturns,
                totals.subtotal,
            )];
            lines.extend(tax_lines(totals, Side::Debit, AccountRole::output_tax));
            lines.push(TemplateLine::credit(AccountRole::Receivable, totals.total));
            entries.push(EntryTemplate::new(
                EntryPurpose::Document,
                format!("Credit note {number}"),
                lines,
            ));
        }
        DocumentKind::DebitNote => {
            let mut lines = vec![
                TemplateLine::debit(AccountRole::Payable, totals.total),
                TemplateLine::credit(AccountRole::PurchaseReturns, totals.subtotal),
            ];
            lines.extend(tax_lines(totals, Side::Credit, AccountRole::input_tax));
            entries.push(EntryTemplate::new(
                EntryPurpose::Document,
                format!("Debit note {number}"),
                lines,
            ));
        }
        DocumentKind::Receipt => entries.push(EntryTemplate::new(
            EntryPurpose::Document,
            format!("Receipt {number}"),
            vec![
                TemplateLine::debit(AccountRole::Cash, totals.total),
                TemplateLine::credit(AccountRole::Receivable, totals.total),
            ],
        )),
        DocumentKind::Payment => entries.push(EntryTemplate::new(
            EntryPurpose::Document,
            format!("Payment {number}"),
            vec![
                TemplateLine::debit(AccountRole::Payable, totals.total),
                TemplateLine::credit(AccountRole::Cash, totals.total),
            ],
        )),
        DocumentKind::StockAdjustment => entries.push(EntryTemplate::new(
            EntryPurpose::Document,
            format!("Stock adjustment {number}"),
            vec![
                TemplateLine::debit(AccountRole::Inventory, figures.adjustment_in),
                TemplateLine::credit(AccountRole::StockAdjustment, figures.adjustment_in),
                TemplateLine::debit(AccountRole::StockAdjustment, figures.adjustment_out),
                TemplateLine::credit(AccountRole::Inventory, figures.adjustment_out),
            ],
        )),
        DocumentKind::SalesOrder | DocumentKind::PurchaseOrder | DocumentKind::Quotation => {}
    }

    entries.retain(|entry| !entry.lines.is_empty());
    entries
}

/// Entry posted when an invoice or bill is marked paid directly.
#[must_use]
pub fn settlement_entry(kind: DocumentKind, number: &str, amount: Amount) -> Option<EntryTemplate> {
    let lines = match kind {
        DocumentKind::Invoice => vec![
            TemplateLine::debit(AccountRole::Cash, amount),
            TemplateLine::credit(AccountRole::Receivable, amount),
        ],
        DocumentKind::Bill => vec![
            TemplateLine::debit(AccountRole::Payable, amount),
            TemplateLine::credit(AccountRole::Cash, amount),
        ],
        _ => return None,
    };
    let entry = EntryTemplate::new(
        EntryPurpose::Settlement,
        format!("Settlement of {} {number}", kind.as_str().to_lowercase()),
        lines,
    );
    (!entry.lines.is_empty()).then_some(entry)
}

fn tax_lines(
    totals: &DocumentTotals,
    side: Side,
    role: fn(TaxComponent) -> AccountRole,
) -> impl Iterator<Item = TemplateLine> + '_ {
    TaxComponent::ALL.into_iter().map(move |component| TemplateLine {
        role: role(component),
        side,
        amount: totals.tax.component(component),
    })
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;
