//! Chart-of-accounts domain types.
//!
//! Balances use explicit polarity internally: an unsigned amount plus the
//! side (debit or credit) it sits on. The legacy "signed number, `>= 0` means
//! debit" convention is only produced or consumed at the boundary through
//! [`Balance::from_signed_dr_cr`] and [`Balance::to_signed_dr_cr`].

use std::fmt;

use bahi_shared::types::{Amount, LedgerAccountId, OrganizationId};
use serde::{Deserialize, Serialize};

/// Side of a journal line, and polarity of a balance.
///
/// In double-entry bookkeeping:
/// - Debits increase asset/expense accounts, decrease liability/equity/income accounts
/// - Credits decrease asset/expense accounts, increase liability/equity/income accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Debit.
    Debit,
    /// Credit.
    Credit,
}

impl Side {
    /// Returns the other side.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Debit => Self::Credit,
            Self::Credit => Self::Debit,
        }
    }

    /// Returns the conventional abbreviation (`DR`/`CR`).
    #[must_use]
    pub const fn abbreviation(self) -> &'static str {
        match self {
            Self::Debit => "DR",
            Self::Credit => "CR",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

/// Accounting nature of a ledger account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccountNature {
    /// Resources owned.
    Asset,
    /// Obligations owed.
    Liability,
    /// Revenue earned.
    Income,
    /// Costs incurred.
    Expense,
    /// Owner's interest.
    Equity,
}

impl AccountNature {
    /// Returns the side that increases an account of this nature.
    ///
    /// - Asset/Expense: debit-increasing
    /// - Liability/Income/Equity: credit-increasing
    #[must_use]
    pub const fn natural_side(self) -> Side {
        match self {
            Self::Asset | Self::Expense => Side::Debit,
            Self::Liability | Self::Income | Self::Equity => Side::Credit,
        }
    }

    /// Effect of a line on a balance measured on this nature's natural side.
    #[must_use]
    pub fn signed_effect(self, side: Side, amount: Amount) -> Amount {
        if side == self.natural_side() {
            amount
        } else {
            -amount
        }
    }

    /// Returns the string representation of the nature.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asset => "ASSET",
            Self::Liability => "LIABILITY",
            Self::Income => "INCOME",
            Self::Expense => "EXPENSE",
            Self::Equity => "EQUITY",
        }
    }

    /// Parses a nature from a string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "ASSET" => Some(Self::Asset),
            "LIABILITY" => Some(Self::Liability),
            "INCOME" => Some(Self::Income),
            "EXPENSE" => Some(Self::Expense),
            "EQUITY" => Some(Self::Equity),
            _ => None,
        }
    }
}

impl fmt::Display for AccountNature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A balance with explicit polarity. `amount` is never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    /// Unsigned magnitude.
    pub amount: Amount,
    /// Side the balance sits on.
    pub side: Side,
}

impl Balance {
    /// A debit balance. Negative input flips to a credit balance.
    #[must_use]
    pub fn debit(amount: Amount) -> Self {
        Self::from_signed(amount, Side::Debit)
    }

    /// A credit balance. Negative input flips to a debit balance.
    #[must_use]
    pub fn credit(amount: Amount) -> Self {
        Self::from_signed(amount, Side::Credit)
    }

    /// A zero balance on the account's natural side.
    #[must_use]
    pub const fn zero(nature: AccountNature) -> Self {
        Self {
            amount: Amount::ZERO,
            side: nature.natural_side(),
        }
    }

    /// Builds a balance from an amount signed relative to the nature's natural side.
    #[must_use]
    pub fn from_natural(signed: Amount, nature: AccountNature) -> Self {
        Self::from_signed(signed, nature.natural_side())
    }

    /// Returns the balance signed relative to the nature's natural side.
    #[must_use]
    pub fn to_natural(self, nature: AccountNature) -> Amount {
        nature.signed_effect(self.side, self.amount)
    }

    /// Converts the boundary convention (`>= 0` is DR, `< 0` is CR).
    #[must_use]
    pub fn from_signed_dr_cr(signed: Amount) -> Self {
        Self::from_signed(signed, Side::Debit)
    }

    /// Produces the boundary convention (`>= 0` is DR, `< 0` is CR).
    #[must_use]
    pub fn to_signed_dr_cr(self) -> Amount {
        match self.side {
            Side::Debit => self.amount,
            Side::Credit => -self.amount,
        }
    }

    /// Returns true if the magnitude is zero.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.amount.is_zero()
    }

    fn from_signed(signed: Amount, positive_side: Side) -> Self {
        if signed.is_negative() {
            Self {
                amount: -signed,
                side: positive_side.opposite(),
            }
        } else {
            Self {
                amount: signed,
                side: positive_side,
            }
        }
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.side)
    }
}

/// A chart-of-accounts entry.
///
/// `current_balance` is a cache of `opening_balance` plus every posted
/// journal line referencing the account. Only the ledger registry mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerAccount {
    /// Unique identifier.
    pub id: LedgerAccountId,
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// Chart-of-accounts code (unique per organization).
    pub code: String,
    /// Display name.
    pub name: String,
    /// Accounting nature.
    pub nature: AccountNature,
    /// Balance at chart-of-accounts setup.
    pub opening_balance: Balance,
    /// Cached running balance.
    pub current_balance: Balance,
    /// Inactive accounts reject new postings; accounts are never hard-deleted.
    pub is_active: bool,
    /// Row version, bumped on every balance change.
    pub version: u64,
}

impl LedgerAccount {
    /// Creates an active account whose current balance equals its opening balance.
    #[must_use]
    pub fn open(input: NewLedgerAccount) -> Self {
        Self {
            id: LedgerAccountId::new(),
            organization_id: input.organization_id,
            code: input.code,
            name: input.name,
            nature: input.nature,
            opening_balance: input.opening_balance,
            current_balance: input.opening_balance,
            is_active: true,
            version: 0,
        }
    }

    /// Current balance signed relative to the natural side.
    #[must_use]
    pub fn natural_balance(&self) -> Amount {
        self.current_balance.to_natural(self.nature)
    }
}

/// Input for opening a new ledger account.
#[derive(Debug, Clone)]
pub struct NewLedgerAccount {
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// Chart-of-accounts code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Accounting nature.
    pub nature: AccountNature,
    /// Opening balance with explicit polarity.
    pub opening_balance: Balance,
}

/// One row of a trial balance.
#[derive(Debug, Clone, Serialize)]
pub struct TrialBalanceRow {
    /// The account.
    pub account_id: LedgerAccountId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Debit column (zero if the balance is on the credit side).
    pub debit: Amount,
    /// Credit column (zero if the balance is on the debit side).
    pub credit: Amount,
}

/// A trial balance across every account of an organization.
#[derive(Debug, Clone, Serialize)]
pub struct TrialBalance {
    /// Rows ordered by account code.
    pub rows: Vec<TrialBalanceRow>,
    /// Sum of the debit column.
    pub total_debit: Amount,
    /// Sum of the credit column.
    pub total_credit: Amount,
}

impl TrialBalance {
    /// Returns true if the two columns agree exactly.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.total_debit == self.total_credit
    }
}

/// An account whose cached balance disagrees with its audit trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceDiscrepancy {
    /// The account.
    pub account_id: LedgerAccountId,
    /// The cached balance.
    pub cached: Balance,
    /// The balance recomputed from the journal.
    pub recomputed: Balance,
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
