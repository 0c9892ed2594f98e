//! Journal engine: posting templates, idempotent posting and reversal.

pub mod accounts;
pub mod engine;
pub mod reversal;
pub mod template;

pub use accounts::{AccountRole, PostingAccounts};
pub use engine::JournalEngine;
pub use reversal::{mirror, unreversed};
pub use template::{
    EntryTemplate, PostingFigures, TemplateLine, approval_entries, settlement_entry,
};
