//! Ledger posting and inventory valuation core for Bahi.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Persistence goes through the traits in [`repository`].
//!
//! # Modules
//!
//! - `ledger` - Account registry, balances with explicit polarity, journal entries
//! - `journal` - Posting templates, idempotent posting and reversals
//! - `tax` - CGST/SGST/IGST split and document totals
//! - `inventory` - Cost layers and FIFO/LIFO/weighted-average valuation
//! - `document` - Document types and their lifecycle state machine
//! - `posting` - The facade request handlers call

pub mod clock;
pub mod document;
pub mod inventory;
pub mod journal;
pub mod ledger;
pub mod posting;
pub mod repository;
pub mod tax;
