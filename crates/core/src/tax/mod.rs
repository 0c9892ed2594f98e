//! Tax split engine.
//!
//! Splits a nominal GST rate into CGST+SGST (both parties in the same
//! jurisdiction) or IGST (different jurisdictions). [`compute_totals`] is the
//! single computation behind both a document's displayed totals and the tax
//! lines the journal posts.

pub mod engine;
pub mod types;

pub use engine::{compute_totals, split_line_tax, split_tax};
pub use types::{
    DocumentTotals, Jurisdiction, PartyDirectory, SupplyType, TaxBreakdown, TaxComponent, TaxError,
};
