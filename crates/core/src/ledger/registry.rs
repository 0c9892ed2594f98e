//! Ledger account registry.
//!
//! [`LedgerRegistry::apply_entry`] is the only code path that changes an
//! account balance. It validates the entry, locks every touched account in
//! ascending id order, rejects unknown or inactive accounts, writes the new
//! cached balances and persists the entry, all inside the caller's
//! transaction.

use std::collections::BTreeMap;

use bahi_shared::types::{Amount, LedgerAccountId, OrganizationId};
use tracing::{debug, error, info};

use super::entry::{JournalEntry, JournalLine, validate_lines};
use super::error::PostingError;
use super::types::{
    AccountNature, Balance, BalanceDiscrepancy, LedgerAccount, NewLedgerAccount, Side,
    TrialBalance, TrialBalanceRow,
};
use crate::repository::RepositoryTx;

/// Applies a sequence of lines to a balance.
#[must_use]
pub fn apply_lines<'a>(
    balance: Balance,
    nature: AccountNature,
    lines: impl IntoIterator<Item = &'a JournalLine>,
) -> Balance {
    let natural = lines
        .into_iter()
        .fold(balance.to_natural(nature), |acc, line| {
            acc + nature.signed_effect(line.side, line.amount)
        });
    Balance::from_natural(natural, nature)
}

/// Rebuilds an account balance from its opening balance and the journal.
#[must_use]
pub fn replay<'a>(
    account: &LedgerAccount,
    entries: impl IntoIterator<Item = &'a JournalEntry>,
) -> Balance {
    let lines = entries
        .into_iter()
        .flat_map(|entry| entry.lines.iter())
        .filter(|line| line.ledger_account_id == account.id);
    apply_lines(account.opening_balance, account.nature, lines)
}

/// Stateless registry operations over a repository transaction.
pub struct LedgerRegistry;

impl LedgerRegistry {
    /// Opens a new account.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateAccountCode` if the code is taken, or `InvalidEntry`
    /// for a blank code or name.
    pub async fn open_account<T: RepositoryTx>(
        tx: &mut T,
        input: NewLedgerAccount,
    ) -> Result<LedgerAccount, PostingError> {
        if input.code.trim().is_empty() || input.name.trim().is_empty() {
            return Err(PostingError::InvalidEntry(
                "account code and name are required".to_string(),
            ));
        }
        if tx
            .find_account_by_code(input.organization_id, &input.code)
            .await?
            .is_some()
        {
            return Err(PostingError::DuplicateAccountCode(input.code));
        }

        let account = LedgerAccount::open(input);
        tx.insert_account(&account).await?;

        info!(
            account_id = %account.id,
            code = %account.code,
            nature = %account.nature,
            opening_balance = %account.opening_balance,
            "Ledger account opened"
        );
        Ok(account)
    }

    /// Soft-deactivates an account. Deactivated accounts reject new postings.
    ///
    /// # Errors
    ///
    /// Returns `UnknownAccount` if the account does not exist.
    pub async fn deactivate_account<T: RepositoryTx>(
        tx: &mut T,
        account_id: LedgerAccountId,
    ) -> Result<LedgerAccount, PostingError> {
        let mut account = tx
            .lock_account(account_id)
            .await?
            .ok_or(PostingError::UnknownAccount(account_id))?;
        if !account.is_active {
            return Ok(account);
        }

        let expected = account.version;
        account.is_active = false;
        account.version += 1;
        tx.update_account(&account, expected).await?;

        info!(account_id = %account_id, "Ledger account deactivated");
        Ok(account)
    }

    /// Returns the cached balance of an account.
    ///
    /// # Errors
    ///
    /// Returns `UnknownAccount` if the account does not exist.
    pub async fn get_balance<T: RepositoryTx>(
        tx: &mut T,
        account_id: LedgerAccountId,
    ) -> Result<Balance, PostingError> {
        tx.find_account(account_id)
            .await?
            .map(|account| account.current_balance)
            .ok_or(PostingError::UnknownAccount(account_id))
    }

    /// Looks an account up by its chart-of-accounts code.
    ///
    /// # Errors
    ///
    /// Returns `UnknownAccountCode` if no account of the organization has the code.
    pub async fn find_by_code<T: RepositoryTx>(
        tx: &mut T,
        organization_id: OrganizationId,
        code: &str,
    ) -> Result<LedgerAccount, PostingError> {
        tx.find_account_by_code(organization_id, code)
            .await?
            .ok_or_else(|| PostingError::UnknownAccountCode(code.to_string()))
    }

    /// Every account of an organization, active or not, ordered by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub async fn list_accounts<T: RepositoryTx>(
        tx: &mut T,
        organization_id: OrganizationId,
    ) -> Result<Vec<LedgerAccount>, PostingError> {
        Ok(tx.list_accounts(organization_id).await?)
    }

    /// Applies a journal entry to its accounts and persists it.
    ///
    /// # Errors
    ///
    /// - `Unbalanced` / `InvalidEntry` if the lines do not form a valid posting
    /// - `UnknownAccount` if a line references a missing or foreign account
    /// - `InactiveAccount` if a line references a deactivated account
    pub async fn apply_entry<T: RepositoryTx>(
        tx: &mut T,
        entry: &JournalEntry,
    ) -> Result<(), PostingError> {
        if let Err(err) = validate_lines(&entry.lines) {
            if let PostingError::Unbalanced { debit, credit } = &err {
                error!(
                    entry_id = %entry.id,
                    document_id = ?entry.document_id,
                    debit = %debit,
                    credit = %credit,
                    "Refusing to post unbalanced journal entry"
                );
            }
            return Err(err);
        }

        // BTreeMap keeps lock acquisition in ascending id order.
        let mut touched: BTreeMap<LedgerAccountId, Vec<&JournalLine>> = BTreeMap::new();
        for line in &entry.lines {
            touched.entry(line.ledger_account_id).or_default().push(line);
        }

        let mut updated = Vec::with_capacity(touched.len());
        for (account_id, lines) in touched {
            let account = tx
                .lock_account(account_id)
                .await?
                .filter(|account| account.organization_id == entry.organization_id)
                .ok_or(PostingError::UnknownAccount(account_id))?;
            if !account.is_active {
                return Err(PostingError::InactiveAccount(account_id));
            }

            let new_balance = apply_lines(account.current_balance, account.nature, lines);
            updated.push((account, new_balance));
        }

        for (mut account, new_balance) in updated {
            let expected = account.version;
            debug!(
                account_id = %account.id,
                from = %account.current_balance,
                to = %new_balance,
                "Applying journal lines to account"
            );
            account.current_balance = new_balance;
            account.version += 1;
            tx.update_account(&account, expected).await?;
        }

        tx.insert_journal_entry(entry).await?;
        Ok(())
    }

    /// Recomputes an account's balance from the audit trail and repairs the cache.
    ///
    /// # Errors
    ///
    /// Returns `UnknownAccount` if the account does not exist.
    pub async fn recompute_balance<T: RepositoryTx>(
        tx: &mut T,
        account_id: LedgerAccountId,
    ) -> Result<Balance, PostingError> {
        let mut account = tx
            .lock_account(account_id)
            .await?
            .ok_or(PostingError::UnknownAccount(account_id))?;
        let entries = tx.journal_entries_for_account(account_id).await?;
        let recomputed = replay(&account, &entries);

        if recomputed != account.current_balance {
            info!(
                account_id = %account_id,
                cached = %account.current_balance,
                recomputed = %recomputed,
                "Repairing cached account balance"
            );
            let expected = account.version;
            account.current_balance = recomputed;
            account.version += 1;
            tx.update_account(&account, expected).await?;
        }
        Ok(recomputed)
    }

    /// Reports every account whose cached balance disagrees with the journal.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub async fn verify_ledger<T: RepositoryTx>(
        tx: &mut T,
        organization_id: OrganizationId,
    ) -> Result<Vec<BalanceDiscrepancy>, PostingError> {
        let mut discrepancies = Vec::new();
        for account in tx.list_accounts(organization_id).await? {
            let entries = tx.journal_entries_for_account(account.id).await?;
            let recomputed = replay(&account, &entries);
            if recomputed != account.current_balance {
                discrepancies.push(BalanceDiscrepancy {
                    account_id: account.id,
                    cached: account.current_balance,
                    recomputed,
                });
            }
        }
        Ok(discrepancies)
    }

    /// Builds a trial balance from cached balances.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub async fn trial_balance<T: RepositoryTx>(
        tx: &mut T,
        organization_id: OrganizationId,
    ) -> Result<TrialBalance, PostingError> {
        let accounts = tx.list_accounts(organization_id).await?;
        Ok(build_trial_balance(&accounts))
    }
}

/// Lays balances out in debit and credit columns.
#[must_use]
pub fn build_trial_balance(accounts: &[LedgerAccount]) -> TrialBalance {
    let rows: Vec<TrialBalanceRow> = accounts
        .iter()
        .map(|account| {
            let balance = account.current_balance;
            let (debit, credit) = match balance.side {
                Side::Debit => (balance.amount, Amount::ZERO),
                Side::Credit => (Amount::ZERO, balance.amount),
            };
            TrialBalanceRow {
                account_id: account.id,
                code: account.code.clone(),
                name: account.name.clone(),
                debit,
                credit,
            }
        })
        .collect();

    let total_debit = rows.iter().map(|row| row.debit).sum();
    let total_credit = rows.iter().map(|row| row.credit).sum();
    TrialBalance {
        rows,
        total_debit,
        total_credit,
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
