//! Double-entry ledger.
//!
//! This module implements the ledger account registry:
//! - Account natures and explicit-polarity balances
//! - Journal entries and their structural validation
//! - The registry, the only mutator of account balances
//! - Balance recomputation, verification and trial balance

pub mod entry;
pub mod error;
pub mod registry;
pub mod types;

#[cfg(test)]
mod registry_props;

pub use entry::{EntryPurpose, JournalEntry, JournalLine, validate_lines};
pub use error::PostingError;
pub use registry::{LedgerRegistry, apply_lines, build_trial_balance, replay};
pub use types::{
    AccountNature, Balance, BalanceDiscrepancy, LedgerAccount, NewLedgerAccount, Side,
    TrialBalance, TrialBalanceRow,
};
