//! Journal engine.
//!
//! Turns templates into journal entries and hands them to the ledger
//! registry. Posting is idempotent per `(document, transition, purpose)`:
//! a retried transition finds the entry it already wrote and returns it
//! instead of posting twice.

use bahi_shared::types::{DocumentId, JournalEntryId, OrganizationId};
use chrono::{NaiveDate, Utc};
use tracing::{debug, info};

use super::accounts::PostingAccounts;
use super::reversal::{mirror, unreversed};
use super::template::EntryTemplate;
use crate::document::{Document, DocumentStatus};
use crate::ledger::{EntryPurpose, JournalEntry, JournalLine, LedgerRegistry, PostingError};
use crate::repository::RepositoryTx;

/// Stateless journal operations over a repository transaction.
pub struct JournalEngine;

impl JournalEngine {
    /// Posts one template for a document transition.
    ///
    /// Returns the id of the entry that carries the posting, whether it was
    /// written now or by an earlier attempt.
    ///
    /// # Errors
    ///
    /// Returns `UnknownAccountCode` if a role is not in the chart, and any
    /// error from [`LedgerRegistry::apply_entry`].
    pub async fn post_template<T: RepositoryTx>(
        tx: &mut T,
        accounts: &PostingAccounts,
        document: &Document,
        transition: DocumentStatus,
        template: &EntryTemplate,
        date: NaiveDate,
    ) -> Result<JournalEntryId, PostingError> {
        let existing = tx.journal_entries_for_document(document.id).await?;
        if let Some(entry) = existing
            .iter()
            .find(|entry| entry.matches_key(document.id, transition, template.purpose))
        {
            debug!(
                document_id = %document.id,
                entry_id = %entry.id,
                transition = %transition,
                "Entry already posted for transition"
            );
            return Ok(entry.id);
        }

        let mut lines = Vec::with_capacity(template.lines.len());
        for line in &template.lines {
            let ledger_account_id = accounts
                .resolve(tx, document.organization_id, line.role)
                .await?;
            lines.push(JournalLine {
                ledger_account_id,
                side: line.side,
                amount: line.amount,
                memo: None,
            });
        }

        let entry = JournalEntry {
            id: JournalEntryId::new(),
            organization_id: document.organization_id,
            document_type: Some(document.kind),
            document_id: Some(document.id),
            transition: Some(transition),
            purpose: template.purpose,
            reverses: None,
            date,
            description: template.description.clone(),
            lines,
            posted_at: Utc::now(),
        };
        LedgerRegistry::apply_entry(tx, &entry).await?;

        info!(
            document_id = %document.id,
            entry_id = %entry.id,
            purpose = ?entry.purpose,
            amount = %entry.total_debit(),
            "Journal entry posted"
        );
        Ok(entry.id)
    }

    /// Posts the mirror of every entry of a document that is not yet reversed.
    ///
    /// # Errors
    ///
    /// Returns any error from [`LedgerRegistry::apply_entry`], notably
    /// `InactiveAccount` if an account was deactivated since posting.
    pub async fn reverse_document<T: RepositoryTx>(
        tx: &mut T,
        document_id: DocumentId,
        date: NaiveDate,
    ) -> Result<Vec<JournalEntryId>, PostingError> {
        let entries = tx.journal_entries_for_document(document_id).await?;
        let mirrors: Vec<JournalEntry> = unreversed(&entries)
            .into_iter()
            .map(|entry| mirror(entry, date))
            .collect();

        let mut ids = Vec::with_capacity(mirrors.len());
        for reversal in &mirrors {
            LedgerRegistry::apply_entry(tx, reversal).await?;
            ids.push(reversal.id);
        }

        if !ids.is_empty() {
            info!(
                document_id = %document_id,
                reversed = ids.len(),
                "Journal entries reversed"
            );
        }
        Ok(ids)
    }

    /// Posts a hand-built entry that belongs to no document.
    ///
    /// # Errors
    ///
    /// Returns any error from [`LedgerRegistry::apply_entry`].
    pub async fn post_manual<T: RepositoryTx>(
        tx: &mut T,
        organization_id: OrganizationId,
        date: NaiveDate,
        description: impl Into<String>,
        lines: Vec<JournalLine>,
    ) -> Result<JournalEntry, PostingError> {
        let entry = JournalEntry {
            id: JournalEntryId::new(),
            organization_id,
            document_type: None,
            document_id: None,
            transition: None,
            purpose: EntryPurpose::Manual,
            reverses: None,
            date,
            description: description.into(),
            lines,
            posted_at: Utc::now(),
        };
        LedgerRegistry::apply_entry(tx, &entry).await?;

        info!(
            entry_id = %entry.id,
            amount = %entry.total_debit(),
            "Manual journal entry posted"
        );
        Ok(entry)
    }
}
