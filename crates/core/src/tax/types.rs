//! Tax domain types.

use std::fmt;
use std::ops::Add;

use bahi_shared::types::{Amount, PartyId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A tax jurisdiction code (e.g. a GST state code). Compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Jurisdiction(String);

impl Jurisdiction {
    /// Normalizes and wraps a jurisdiction code.
    #[must_use]
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_uppercase())
    }

    /// Returns the normalized code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Jurisdiction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether a supply stays inside one jurisdiction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SupplyType {
    /// Same jurisdiction: CGST + SGST.
    IntraState,
    /// Different jurisdictions: IGST.
    InterState,
}

impl SupplyType {
    /// Classifies a supply between two parties.
    #[must_use]
    pub fn between(seller: &Jurisdiction, buyer: &Jurisdiction) -> Self {
        if seller == buyer {
            Self::IntraState
        } else {
            Self::InterState
        }
    }
}

/// A single tax component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaxComponent {
    /// Central GST.
    Cgst,
    /// State GST.
    Sgst,
    /// Integrated GST.
    Igst,
}

impl TaxComponent {
    /// All components in posting order.
    pub const ALL: [Self; 3] = [Self::Cgst, Self::Sgst, Self::Igst];
}

/// Per-component tax amounts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    /// Central GST.
    pub cgst: Amount,
    /// State GST.
    pub sgst: Amount,
    /// Integrated GST.
    pub igst: Amount,
}

impl TaxBreakdown {
    /// The all-zero breakdown.
    pub const ZERO: Self = Self {
        cgst: Amount::ZERO,
        sgst: Amount::ZERO,
        igst: Amount::ZERO,
    };

    /// Sum of all components.
    #[must_use]
    pub fn total(&self) -> Amount {
        self.cgst + self.sgst + self.igst
    }

    /// Returns the amount of one component.
    #[must_use]
    pub const fn component(&self, component: TaxComponent) -> Amount {
        match component {
            TaxComponent::Cgst => self.cgst,
            TaxComponent::Sgst => self.sgst,
            TaxComponent::Igst => self.igst,
        }
    }

    /// Rounds each component independently.
    #[must_use]
    pub fn round(self) -> Self {
        Self {
            cgst: self.cgst.round(),
            sgst: self.sgst.round(),
            igst: self.igst.round(),
        }
    }

    /// Returns true if every component is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.cgst.is_zero() && self.sgst.is_zero() && self.igst.is_zero()
    }
}

impl Add for TaxBreakdown {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            cgst: self.cgst + rhs.cgst,
            sgst: self.sgst + rhs.sgst,
            igst: self.igst + rhs.igst,
        }
    }
}

/// Computed totals of a document. Never hand-edited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTotals {
    /// Sum of line values before tax.
    pub subtotal: Amount,
    /// Portion of the subtotal carried by stock lines.
    pub stock_subtotal: Amount,
    /// Tax per component.
    pub tax: TaxBreakdown,
    /// Subtotal plus tax.
    pub total: Amount,
}

impl DocumentTotals {
    /// Total tax across components.
    #[must_use]
    pub fn tax_amount(&self) -> Amount {
        self.tax.total()
    }
}

/// Supplies the tax jurisdiction of a customer or vendor.
pub trait PartyDirectory: Send + Sync {
    /// Returns the party's jurisdiction, if known.
    fn jurisdiction(&self, party_id: PartyId) -> Option<Jurisdiction>;
}

/// Tax computation input errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaxError {
    /// Rate outside `0..=100`.
    #[error("Tax rate must be between 0 and 100 percent, got {0}")]
    InvalidRate(Decimal),

    /// Negative taxable amount.
    #[error("Taxable amount cannot be negative, got {0}")]
    NegativeAmount(Amount),

    /// A line has a non-positive quantity or a negative price.
    #[error("Line {line} is invalid: {reason}")]
    InvalidLine {
        /// One-based line number.
        line: usize,
        /// What is wrong with it.
        reason: String,
    },

    /// A taxable line needs the counterparty's jurisdiction.
    #[error("Line {line} is taxable but the party has no tax jurisdiction")]
    MissingJurisdiction {
        /// One-based line number.
        line: usize,
    },
}

impl TaxError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidRate(_) => "INVALID_TAX_RATE",
            Self::NegativeAmount(_) => "NEGATIVE_TAXABLE_AMOUNT",
            Self::InvalidLine { .. } => "INVALID_LINE",
            Self::MissingJurisdiction { .. } => "MISSING_JURISDICTION",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        400
    }

    /// Tax errors are input problems and never retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        false
    }
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
