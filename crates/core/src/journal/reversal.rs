//! Mirror entries for cancelled documents.

use bahi_shared::types::JournalEntryId;
use chrono::{NaiveDate, Utc};

use crate::document::DocumentStatus;
use crate::ledger::{EntryPurpose, JournalEntry, JournalLine};

/// Builds the mirror image of a posted entry.
///
/// Every line keeps its account and amount with the side swapped, and its
/// memo is prefixed with `"Reversal: "` (or is just `"Reversal"` if it had
/// none). The mirror is keyed to the CANCELLED transition and points back at
/// the original.
#[must_use]
pub fn mirror(original: &JournalEntry, date: NaiveDate) -> JournalEntry {
    let lines = original
        .lines
        .iter()
        .map(|line| JournalLine {
            ledger_account_id: line.ledger_account_id,
            side: line.side.opposite(),
            amount: line.amount,
            memo: Some(
                line.memo
                    .as_ref()
                    .map_or_else(|| "Reversal".to_string(), |memo| format!("Reversal: {memo}")),
            ),
        })
        .collect();

    JournalEntry {
        id: JournalEntryId::new(),
        organization_id: original.organization_id,
        document_type: original.document_type,
        document_id: original.document_id,
        transition: Some(DocumentStatus::Cancelled),
        purpose: EntryPurpose::Reversal,
        reverses: Some(original.id),
        date,
        description: format!("Reversal of {}", original.description),
        lines,
        posted_at: Utc::now(),
    }
}

/// Entries of a document that still need a mirror.
#[must_use]
pub fn unreversed(entries: &[JournalEntry]) -> Vec<&JournalEntry> {
    entries
        .iter()
        .filter(|entry| entry.purpose != EntryPurpose::Reversal)
        .filter(|entry| {
            !entries
                .iter()
                .any(|other| other.reverses == Some(entry.id))
        })
        .collect()
}

#[cfg(test)]
#[path = "reversal_tests.rs"]
mod tests;
