//! Business document domain types.

use std::fmt;

use bahi_shared::types::{
    Amount, DocumentId, ItemId, OrganizationId, PartyId, Quantity, WarehouseId,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::inventory::StockDirection;
use crate::tax::DocumentTotals;

/// Type of a business document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentKind {
    /// Sales invoice (receivable).
    Invoice,
    /// Vendor bill (payable).
    Bill,
    /// Customer order.
    SalesOrder,
    /// Order placed with a vendor.
    PurchaseOrder,
    /// Price offer to a customer.
    Quotation,
    /// Reduction of a customer's receivable.
    CreditNote,
    /// Reduction of a vendor payable.
    DebitNote,
    /// Money received from a customer.
    Receipt,
    /// Money paid to a vendor.
    Payment,
    /// Stock count correction.
    StockAdjustment,
}

impl DocumentKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Invoice => "INVOICE",
            Self::Bill => "BILL",
            Self::SalesOrder => "SALES_ORDER",
            Self::PurchaseOrder => "PURCHASE_ORDER",
            Self::Quotation => "QUOTATION",
            Self::CreditNote => "CREDIT_NOTE",
            Self::DebitNote => "DEBIT_NOTE",
            Self::Receipt => "RECEIPT",
            Self::Payment => "PAYMENT",
            Self::StockAdjustment => "STOCK_ADJUSTMENT",
        }
    }

    /// Kind of document this kind may settle, if any.
    #[must_use]
    pub const fn settles(self) -> Option<Self> {
        match self {
            Self::Receipt | Self::CreditNote => Some(Self::Invoice),
            Self::Payment | Self::DebitNote => Some(Self::Bill),
            _ => None,
        }
    }

    /// Stock directions a line of this kind may carry.
    #[must_use]
    pub const fn allows_stock(self, direction: StockDirection) -> bool {
        matches!(
            (self, direction),
            (Self::Invoice, StockDirection::Out)
                | (Self::Bill, StockDirection::In)
                | (Self::StockAdjustment, _)
        )
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a document. Which statuses a kind uses, and how it moves
/// between them, is fixed by the lifecycle tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    /// Being prepared; the only editable status.
    Draft,
    /// Submitted for review.
    Pending,
    /// Sales order confirmed.
    Confirmed,
    /// Approved and posted.
    Approved,
    /// Partially settled.
    Partial,
    /// Fully settled.
    Paid,
    /// Past its due date.
    Overdue,
    /// Quotation accepted by the customer.
    Accepted,
    /// Quotation rejected by the customer.
    Rejected,
    /// Quotation past its validity. Derived at read time, never stored.
    Expired,
    /// Quotation turned into an order or invoice.
    Converted,
    /// Order delivered.
    Fulfilled,
    /// Cancelled; posted effects are reversed.
    Cancelled,
}

impl DocumentStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Approved => "APPROVED",
            Self::Partial => "PARTIAL",
            Self::Paid => "PAID",
            Self::Overdue => "OVERDUE",
            Self::Accepted => "ACCEPTED",
            Self::Rejected => "REJECTED",
            Self::Expired => "EXPIRED",
            Self::Converted => "CONVERTED",
            Self::Fulfilled => "FULFILLED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Parses a status from a string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "DRAFT" => Some(Self::Draft),
            "PENDING" => Some(Self::Pending),
            "CONFIRMED" => Some(Self::Confirmed),
            "APPROVED" => Some(Self::Approved),
            "PARTIAL" => Some(Self::Partial),
            "PAID" => Some(Self::Paid),
            "OVERDUE" => Some(Self::Overdue),
            "ACCEPTED" => Some(Self::Accepted),
            "REJECTED" => Some(Self::Rejected),
            "EXPIRED" => Some(Self::Expired),
            "CONVERTED" => Some(Self::Converted),
            "FULFILLED" => Some(Self::Fulfilled),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Returns true if line items may be edited.
    #[must_use]
    pub const fn is_editable(self) -> bool {
        matches!(self, Self::Draft)
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stock effect of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLine {
    /// Item moved.
    pub item_id: ItemId,
    /// Warehouse moved from or into.
    pub warehouse_id: WarehouseId,
    /// Direction of the movement.
    pub direction: StockDirection,
}

/// A document line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Description.
    pub description: String,
    /// Quantity (fractional units allowed).
    pub quantity: Quantity,
    /// Price per unit before tax.
    pub unit_price: Decimal,
    /// Nominal tax rate in percent, if taxable.
    pub tax_rate: Option<Decimal>,
    /// Physical goods movement, if any.
    pub stock: Option<StockLine>,
}

impl LineItem {
    /// A line without a stock effect.
    #[must_use]
    pub fn service(
        description: impl Into<String>,
        quantity: Quantity,
        unit_price: Decimal,
        tax_rate: Option<Decimal>,
    ) -> Self {
        Self {
            description: description.into(),
            quantity,
            unit_price,
            tax_rate,
            stock: None,
        }
    }

    /// A line that moves stock.
    #[must_use]
    pub fn goods(
        description: impl Into<String>,
        quantity: Quantity,
        unit_price: Decimal,
        tax_rate: Option<Decimal>,
        stock: StockLine,
    ) -> Self {
        Self {
            stock: Some(stock),
            ..Self::service(description, quantity, unit_price, tax_rate)
        }
    }

    /// Line value before tax, unrounded.
    #[must_use]
    pub fn value(&self) -> Amount {
        self.quantity.times(self.unit_price)
    }
}

/// A business document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Unique identifier.
    pub id: DocumentId,
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// Document type.
    pub kind: DocumentKind,
    /// Human-readable number (e.g. `INV-0042`).
    pub number: String,
    /// Customer or vendor. Stock adjustments have none.
    pub party_id: Option<PartyId>,
    /// Document date.
    pub date: NaiveDate,
    /// Payment due date (invoices, bills).
    pub due_date: Option<NaiveDate>,
    /// Validity end (quotations).
    pub valid_until: Option<NaiveDate>,
    /// Stored status. Never `Expired`.
    pub status: DocumentStatus,
    /// Lines.
    pub lines: Vec<LineItem>,
    /// Computed totals.
    pub totals: DocumentTotals,
    /// Amount settled by receipts, payments, notes or direct payment.
    pub amount_settled: Amount,
    /// Invoice or bill this document settles.
    pub settles: Option<DocumentId>,
    /// Row version for optimistic concurrency.
    pub version: u64,
}

impl Document {
    /// Outstanding amount.
    #[must_use]
    pub fn balance_due(&self) -> Amount {
        self.totals.total - self.amount_settled
    }

    /// Lines that move stock, with their stock effect.
    pub fn stock_lines(&self) -> impl Iterator<Item = (&LineItem, StockLine)> {
        self.lines
            .iter()
            .filter_map(|line| line.stock.map(|stock| (line, stock)))
    }
}

/// Input for creating a draft document.
#[derive(Debug, Clone)]
pub struct NewDocument {
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// Document type.
    pub kind: DocumentKind,
    /// Human-readable number.
    pub number: String,
    /// Customer or vendor.
    pub party_id: Option<PartyId>,
    /// Document date.
    pub date: NaiveDate,
    /// Payment due date.
    pub due_date: Option<NaiveDate>,
    /// Validity end.
    pub valid_until: Option<NaiveDate>,
    /// Lines.
    pub lines: Vec<LineItem>,
    /// Invoice or bill this document settles.
    pub settles: Option<DocumentId>,
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
