//! Posting facade.
//!
//! [`PostingService`] is the in-process entry point request handlers call.
//! Every operation opens one repository transaction and commits it only if
//! every step succeeded; any error drops the transaction and leaves the
//! store as it was.
//!
//! A document transition runs, in order: status check, tax computation,
//! stock consumption, journal posting (which updates balances), settlement of
//! the referenced document and finally the status write.

use std::sync::Arc;

use bahi_shared::AppConfig;
use bahi_shared::types::{
    Amount, DocumentId, ItemId, JournalEntryId, LedgerAccountId, OrganizationId, PartyId,
    Quantity, StockMovementId, WarehouseId,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use super::error::{ErrorKind, TransitionError};
use super::retry::RetryPolicy;
use crate::clock::{Clock, SystemClock};
use crate::document::{
    Document, DocumentKind, DocumentStatus, LifecycleError, LineItem, NewDocument, PostingEffect,
    Transition, check_editable, check_user_transition, effective_status,
};
use crate::inventory::{
    InventoryEngine, InventoryItem, ItemValuation, MovementKind, NewInventoryItem, StockDirection,
    StockIn, StockMovement, StockOut,
};
use crate::journal::{
    JournalEngine, PostingAccounts, PostingFigures, approval_entries, settlement_entry,
};
use crate::ledger::{
    Balance, BalanceDiscrepancy, EntryPurpose, JournalEntry, JournalLine, LedgerAccount,
    LedgerRegistry, NewLedgerAccount, PostingError, TrialBalance,
};
use crate::repository::{Repository, RepositoryTx};
use crate::tax::{DocumentTotals, Jurisdiction, PartyDirectory, SupplyType, compute_totals};

/// Outcome of a document transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostingReceipt {
    /// Document moved.
    pub document_id: DocumentId,
    /// Status before.
    pub from: DocumentStatus,
    /// Status after.
    pub to: DocumentStatus,
    /// Journal entries carrying the transition.
    pub journal_entry_ids: Vec<JournalEntryId>,
    /// Stock movements carrying the transition.
    pub stock_movement_ids: Vec<StockMovementId>,
    /// Cost of goods recognized by the transition.
    pub cost_of_goods: Amount,
    /// True if an earlier attempt had already applied the transition.
    pub already_applied: bool,
}

/// In-process facade over the posting core.
pub struct PostingService<R: Repository> {
    repo: R,
    parties: Arc<dyn PartyDirectory>,
    accounts: PostingAccounts,
    home: Jurisdiction,
    clock: Arc<dyn Clock>,
    retry: RetryPolicy,
}

impl<R: Repository> PostingService<R> {
    /// Creates a service from application configuration.
    #[must_use]
    pub fn new(repo: R, parties: Arc<dyn PartyDirectory>, config: &AppConfig) -> Self {
        Self {
            repo,
            parties,
            accounts: PostingAccounts::new(config.ledger.accounts.clone()),
            home: Jurisdiction::new(&config.tax.home_jurisdiction),
            clock: Arc::new(SystemClock),
            retry: RetryPolicy::from(&config.retry),
        }
    }

    /// Replaces the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// The underlying repository.
    pub const fn repository(&self) -> &R {
        &self.repo
    }

    // ========== Document transitions ==========

    /// Moves a document from `from` to `to` and applies every side effect.
    ///
    /// Re-requesting a transition the document already reflects returns the
    /// original receipt with `already_applied` set and writes nothing.
    ///
    /// # Errors
    ///
    /// Any [`TransitionError`]; the document, balances and stock are unchanged.
    pub async fn post_document_transition(
        &self,
        document_id: DocumentId,
        from: DocumentStatus,
        to: DocumentStatus,
    ) -> Result<PostingReceipt, TransitionError> {
        let result = self.run_transition(document_id, from, to).await;
        match &result {
            Ok(receipt) if receipt.already_applied => {
                debug!(
                    document_id = %document_id,
                    to = %to,
                    "Transition already applied"
                );
            }
            Ok(receipt) => {
                info!(
                    document_id = %document_id,
                    from = %from,
                    to = %to,
                    entries = receipt.journal_entry_ids.len(),
                    movements = receipt.stock_movement_ids.len(),
                    cost_of_goods = %receipt.cost_of_goods,
                    "Document transition committed"
                );
            }
            Err(err) if err.kind() != ErrorKind::UnbalancedEntry => {
                warn!(
                    document_id = %document_id,
                    from = %from,
                    to = %to,
                    code = err.error_code(),
                    error = %err,
                    "Document transition rejected"
                );
            }
            Err(_) => {}
        }
        result
    }

    /// Like [`Self::post_document_transition`], retrying concurrency
    /// conflicts with bounded exponential backoff.
    ///
    /// # Errors
    ///
    /// The last error once attempts are exhausted, or the first
    /// non-retryable error.
    pub async fn post_document_transition_with_retry(
        &self,
        document_id: DocumentId,
        from: DocumentStatus,
        to: DocumentStatus,
    ) -> Result<PostingReceipt, TransitionError> {
        let mut attempt = 1;
        loop {
            match self.post_document_transition(document_id, from, to).await {
                Err(err) if err.is_retryable() && self.retry.allows_retry(attempt) => {
                    let delay = self.retry.backoff(attempt);
                    warn!(
                        document_id = %document_id,
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "Retrying conflicting transition"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    async fn run_transition(
        &self,
        document_id: DocumentId,
        from: DocumentStatus,
        to: DocumentStatus,
    ) -> Result<PostingReceipt, TransitionError> {
        let mut tx = self.repo.begin().await?;
        let mut document = tx
            .lock_document(document_id)
            .await?
            .ok_or(TransitionError::DocumentNotFound(document_id))?;

        if document.status == to && from != to {
            Transition::new(document.kind, from, to)?;
            return applied_receipt(&mut tx, &document, from, to).await;
        }
        if document.status != from {
            return Err(TransitionError::StatusMismatch {
                document_id,
                expected: from,
                actual: document.status,
            });
        }

        let today = self.clock.today();
        let transition = check_user_transition(&document, to, today)?;
        let mut receipt = PostingReceipt {
            document_id,
            from,
            to,
            journal_entry_ids: vec![],
            stock_movement_ids: vec![],
            cost_of_goods: Amount::ZERO,
            already_applied: false,
        };

        match transition.effect() {
            PostingEffect::None => {}
            PostingEffect::Post => {
                validate_shape(&document)?;
                document.totals = self.totals_for(&document)?;
                self.post_approval(&mut tx, &document, &mut receipt).await?;
                if let Some(target_id) = document.settles {
                    settle_target(&mut tx, &document, target_id).await?;
                }
            }
            PostingEffect::Settle => {
                let amount = document.balance_due();
                if let Some(template) = settlement_entry(document.kind, &document.number, amount)
                {
                    let id = JournalEngine::post_template(
                        &mut tx,
                        &self.accounts,
                        &document,
                        to,
                        &template,
                        today,
                    )
                    .await?;
                    receipt.journal_entry_ids.push(id);
                }
                document.amount_settled = document.totals.total;
            }
            PostingEffect::Reverse => {
                self.reverse(&mut tx, &document, today, &mut receipt)
                    .await?;
            }
        }

        let expected = document.version;
        document.status = to;
        document.version += 1;
        tx.update_document(&document, expected).await?;
        tx.commit().await?;
        Ok(receipt)
    }

    async fn post_approval(
        &self,
        tx: &mut R::Tx,
        document: &Document,
        receipt: &mut PostingReceipt,
    ) -> Result<(), TransitionError> {
        let mut figures = PostingFigures {
            totals: document.totals,
            ..PostingFigures::default()
        };
        let movement_kind = |direction| match (document.kind, direction) {
            (DocumentKind::StockAdjustment, _) => MovementKind::Adjustment,
            (_, StockDirection::In) => MovementKind::In,
            (_, StockDirection::Out) => MovementKind::Out,
        };

        // Spread the posted stock subtotal over the lines so layers hold
        // exactly what the inventory account is debited.
        let weights: Vec<Decimal> = document
            .stock_lines()
            .map(|(line, _)| line.value().value())
            .collect();
        let line_values = document.totals.stock_subtotal.allocate(&weights);

        for (index, (line, stock)) in document.stock_lines().enumerate() {
            let movement = match stock.direction {
                StockDirection::Out => {
                    InventoryEngine::issue(
                        tx,
                        StockOut {
                            item_id: stock.item_id,
                            warehouse_id: stock.warehouse_id,
                            quantity: line.quantity,
                            date: document.date,
                            reference: Some(document.id),
                            kind: movement_kind(StockDirection::Out),
                        },
                    )
                    .await?
                }
                StockDirection::In => {
                    InventoryEngine::receive(
                        tx,
                        StockIn {
                            item_id: stock.item_id,
                            warehouse_id: stock.warehouse_id,
                            quantity: line.quantity,
                            value: line_values.get(index).copied().unwrap_or(Amount::ZERO),
                            date: document.date,
                            reference: Some(document.id),
                            kind: movement_kind(StockDirection::In),
                        },
                    )
                    .await?
                }
            };

            match (document.kind, movement.direction) {
                (DocumentKind::StockAdjustment, StockDirection::In) => {
                    figures.adjustment_in += movement.value;
                }
                (DocumentKind::StockAdjustment, StockDirection::Out) => {
                    figures.adjustment_out += movement.value;
                }
                (_, StockDirection::Out) => figures.cost_of_goods += movement.value,
                (_, StockDirection::In) => {}
            }
            receipt.stock_movement_ids.push(movement.id);
        }

        for template in approval_entries(document.kind, &document.number, &figures) {
            let id = JournalEngine::post_template(
                tx,
                &self.accounts,
                document,
                receipt.to,
                &template,
                document.date,
            )
            .await?;
            receipt.journal_entry_ids.push(id);
        }
        receipt.cost_of_goods = figures.cost_of_goods;
        Ok(())
    }

    async fn reverse(
        &self,
        tx: &mut R::Tx,
        document: &Document,
        date: NaiveDate,
        receipt: &mut PostingReceipt,
    ) -> Result<(), TransitionError> {
        if document.amount_settled.is_positive() {
            return Err(LifecycleError::HasSettlements {
                document_id: document.id,
                amount_settled: document.amount_settled,
            }
            .into());
        }
        if let (Some(target_id), DocumentStatus::Approved) = (document.settles, document.status) {
            unsettle_target(tx, document, target_id).await?;
        }

        let movements = tx.stock_movements_for_document(document.id).await?;
        for movement in unreversed_movements(&movements).into_iter().rev() {
            let reversal = InventoryEngine::reverse_movement(tx, movement, date).await?;
            receipt.stock_movement_ids.push(reversal.id);
        }

        receipt.journal_entry_ids = JournalEngine::reverse_document(tx, document.id, date).await?;
        Ok(())
    }

    fn supply_for(&self, party_id: Option<PartyId>) -> Option<SupplyType> {
        let jurisdiction = self.parties.jurisdiction(party_id?)?;
        Some(SupplyType::between(&self.home, &jurisdiction))
    }

    fn totals_for(&self, document: &Document) -> Result<DocumentTotals, TransitionError> {
        Ok(compute_totals(
            &document.lines,
            self.supply_for(document.party_id),
        )?)
    }

    /// Reads a document.
    ///
    /// # Errors
    ///
    /// Returns `DocumentNotFound` if it does not exist.
    pub async fn get_document(&self, document_id: DocumentId) -> Result<Document, TransitionError> {
        let mut tx = self.repo.begin().await?;
        tx.find_document(document_id)
            .await?
            .ok_or(TransitionError::DocumentNotFound(document_id))
    }

    /// Status of a document as of today, with EXPIRED derived from `valid_until`.
    ///
    /// # Errors
    ///
    /// Returns `DocumentNotFound` if it does not exist.
    pub async fn document_status(
        &self,
        document_id: DocumentId,
    ) -> Result<DocumentStatus, TransitionError> {
        let document = self.get_document(document_id).await?;
        Ok(effective_status(&document, self.clock.today()))
    }

    // ========== Drafts ==========

    /// Creates a document in DRAFT with computed totals.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDocument` for lines or references that do not fit the
    /// kind, and tax errors for lines that cannot be taxed.
    pub async fn create_draft(&self, input: NewDocument) -> Result<Document, TransitionError> {
        let mut document = Document {
            id: DocumentId::new(),
            organization_id: input.organization_id,
            kind: input.kind,
            number: input.number,
            party_id: input.party_id,
            date: input.date,
            due_date: input.due_date,
            valid_until: input.valid_until,
            status: DocumentStatus::Draft,
            lines: input.lines,
            totals: DocumentTotals::default(),
            amount_settled: Amount::ZERO,
            settles: input.settles,
            version: 0,
        };
        validate_shape(&document)?;
        document.totals = self.totals_for(&document)?;

        let mut tx = self.repo.begin().await?;
        tx.insert_document(&document).await?;
        tx.commit().await?;

        info!(
            document_id = %document.id,
            kind = %document.kind,
            number = %document.number,
            total = %document.totals.total,
            "Draft document created"
        );
        Ok(document)
    }

    /// Replaces the lines of a DRAFT document and recomputes its totals.
    ///
    /// # Errors
    ///
    /// Returns `NotEditable` outside DRAFT, plus the errors of [`Self::create_draft`].
    pub async fn replace_lines(
        &self,
        document_id: DocumentId,
        lines: Vec<LineItem>,
    ) -> Result<Document, TransitionError> {
        let mut tx = self.repo.begin().await?;
        let mut document = tx
            .lock_document(document_id)
            .await?
            .ok_or(TransitionError::DocumentNotFound(document_id))?;
        check_editable(&document)?;

        document.lines = lines;
        validate_shape(&document)?;
        document.totals = self.totals_for(&document)?;

        let expected = document.version;
        document.version += 1;
        tx.update_document(&document, expected).await?;
        tx.commit().await?;

        debug!(
            document_id = %document_id,
            total = %document.totals.total,
            "Document lines replaced"
        );
        Ok(document)
    }

    // ========== Ledger ==========

    /// Opens a ledger account.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateAccountCode` or `InvalidEntry`.
    pub async fn open_account(
        &self,
        input: NewLedgerAccount,
    ) -> Result<LedgerAccount, TransitionError> {
        let mut tx = self.repo.begin().await?;
        let account = LedgerRegistry::open_account(&mut tx, input).await?;
        tx.commit().await?;
        Ok(account)
    }

    /// Soft-deactivates a ledger account.
    ///
    /// # Errors
    ///
    /// Returns `UnknownAccount` if the account does not exist.
    pub async fn deactivate_account(
        &self,
        account_id: LedgerAccountId,
    ) -> Result<LedgerAccount, TransitionError> {
        let mut tx = self.repo.begin().await?;
        let account = LedgerRegistry::deactivate_account(&mut tx, account_id).await?;
        tx.commit().await?;
        Ok(account)
    }

    /// Every ledger account of an organization, ordered by code.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the store cannot be read.
    pub async fn list_accounts(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Vec<LedgerAccount>, TransitionError> {
        let mut tx = self.repo.begin().await?;
        Ok(LedgerRegistry::list_accounts(&mut tx, organization_id).await?)
    }

    /// Looks an account up by its chart-of-accounts code.
    ///
    /// # Errors
    ///
    /// Returns `UnknownAccountCode` if the organization has no such account.
    pub async fn find_account_by_code(
        &self,
        organization_id: OrganizationId,
        code: &str,
    ) -> Result<LedgerAccount, TransitionError> {
        let mut tx = self.repo.begin().await?;
        Ok(LedgerRegistry::find_by_code(&mut tx, organization_id, code).await?)
    }

    /// Balance of an account, signed relative to its natural side.
    ///
    /// # Errors
    ///
    /// Returns `UnknownAccount` if the account does not exist.
    pub async fn get_ledger_balance(
        &self,
        account_id: LedgerAccountId,
    ) -> Result<Amount, TransitionError> {
        let mut tx = self.repo.begin().await?;
        let account = tx
            .find_account(account_id)
            .await?
            .ok_or(PostingError::UnknownAccount(account_id))?;
        Ok(account.natural_balance())
    }

    /// Balance of an account with explicit polarity.
    ///
    /// # Errors
    ///
    /// Returns `UnknownAccount` if the account does not exist.
    pub async fn get_account_balance(
        &self,
        account_id: LedgerAccountId,
    ) -> Result<Balance, TransitionError> {
        let mut tx = self.repo.begin().await?;
        Ok(LedgerRegistry::get_balance(&mut tx, account_id).await?)
    }

    /// Posts a hand-built balanced entry.
    ///
    /// # Errors
    ///
    /// Returns `Unbalanced`, `InvalidEntry`, `UnknownAccount` or `InactiveAccount`.
    pub async fn post_manual_entry(
        &self,
        organization_id: OrganizationId,
        date: NaiveDate,
        description: impl Into<String> + Send,
        lines: Vec<JournalLine>,
    ) -> Result<JournalEntry, TransitionError> {
        let mut tx = self.repo.begin().await?;
        let entry =
            JournalEngine::post_manual(&mut tx, organization_id, date, description, lines).await?;
        tx.commit().await?;
        Ok(entry)
    }

    /// Rebuilds an account's balance from the journal, repairing the cache.
    ///
    /// # Errors
    ///
    /// Returns `UnknownAccount` if the account does not exist.
    pub async fn recompute_balance(
        &self,
        account_id: LedgerAccountId,
    ) -> Result<Balance, TransitionError> {
        let mut tx = self.repo.begin().await?;
        let balance = LedgerRegistry::recompute_balance(&mut tx, account_id).await?;
        tx.commit().await?;
        Ok(balance)
    }

    /// Accounts whose cached balance disagrees with the journal.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the store cannot be read.
    pub async fn verify_ledger(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Vec<BalanceDiscrepancy>, TransitionError> {
        let mut tx = self.repo.begin().await?;
        Ok(LedgerRegistry::verify_ledger(&mut tx, organization_id).await?)
    }

    /// Trial balance from cached balances.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the store cannot be read.
    pub async fn trial_balance(
        &self,
        organization_id: OrganizationId,
    ) -> Result<TrialBalance, TransitionError> {
        let mut tx = self.repo.begin().await?;
        Ok(LedgerRegistry::trial_balance(&mut tx, organization_id).await?)
    }

    // ========== Inventory ==========

    /// Registers a stocked item.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateSku` if the SKU is taken.
    pub async fn register_item(
        &self,
        input: NewInventoryItem,
    ) -> Result<InventoryItem, TransitionError> {
        let mut tx = self.repo.begin().await?;
        let item = InventoryEngine::register_item(&mut tx, input).await?;
        tx.commit().await?;
        Ok(item)
    }

    /// Quantity and value on hand for an item in a warehouse.
    ///
    /// # Errors
    ///
    /// Returns `ItemNotFound` if the item does not exist.
    pub async fn get_item_valuation(
        &self,
        item_id: ItemId,
        warehouse_id: WarehouseId,
    ) -> Result<ItemValuation, TransitionError> {
        let mut tx = self.repo.begin().await?;
        Ok(InventoryEngine::valuation(&mut tx, item_id, warehouse_id).await?)
    }

    /// Moves stock between warehouses at its consumed cost. No ledger effect.
    ///
    /// # Errors
    ///
    /// Returns `SameWarehouse`, `InsufficientStock` or item errors.
    pub async fn transfer_stock(
        &self,
        item_id: ItemId,
        from: WarehouseId,
        to: WarehouseId,
        quantity: Quantity,
    ) -> Result<(StockMovement, StockMovement), TransitionError> {
        let mut tx = self.repo.begin().await?;
        let movements =
            InventoryEngine::transfer(&mut tx, item_id, from, to, quantity, self.clock.today())
                .await?;
        tx.commit().await?;
        Ok(movements)
    }

    /// Stock movements recorded against a pool, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the store cannot be read.
    pub async fn stock_movements(
        &self,
        item_id: ItemId,
        warehouse_id: WarehouseId,
    ) -> Result<Vec<StockMovement>, TransitionError> {
        let mut tx = self.repo.begin().await?;
        Ok(tx.stock_movements_for_pool(item_id, warehouse_id).await?)
    }

    /// Journal entries posted for a document, in posting order.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the store cannot be read.
    pub async fn journal_entries(
        &self,
        document_id: DocumentId,
    ) -> Result<Vec<JournalEntry>, TransitionError> {
        let mut tx = self.repo.begin().await?;
        Ok(tx.journal_entries_for_document(document_id).await?)
    }
}

/// Rebuilds the receipt of a transition the document already reflects.
async fn applied_receipt<T: RepositoryTx>(
    tx: &mut T,
    document: &Document,
    from: DocumentStatus,
    to: DocumentStatus,
) -> Result<PostingReceipt, TransitionError> {
    let entries = tx.journal_entries_for_document(document.id).await?;
    let mine: Vec<&JournalEntry> = entries
        .iter()
        .filter(|entry| entry.transition == Some(to))
        .collect();
    let cost_of_goods = mine
        .iter()
        .filter(|entry| entry.purpose == EntryPurpose::CostOfGoods)
        .map(|entry| entry.total_debit())
        .sum();

    let movements = tx.stock_movements_for_document(document.id).await?;
    let stock_movement_ids = movements
        .iter()
        .filter(|movement| match to {
            DocumentStatus::Approved => movement.reverses.is_none(),
            DocumentStatus::Cancelled => movement.reverses.is_some(),
            _ => false,
        })
        .map(|movement| movement.id)
        .collect();

    Ok(PostingReceipt {
        document_id: document.id,
        from,
        to,
        journal_entry_ids: mine.iter().map(|entry| entry.id).collect(),
        stock_movement_ids,
        cost_of_goods,
        already_applied: true,
    })
}

/// Checks that stock lines and the settlement reference fit the kind.
fn validate_shape(document: &Document) -> Result<(), LifecycleError> {
    for (line, stock) in document.stock_lines() {
        if !document.kind.allows_stock(stock.direction) {
            return Err(LifecycleError::InvalidDocument(format!(
                "{} cannot move stock {:?} (line '{}')",
                document.kind, stock.direction, line.description
            )));
        }
    }
    if document.settles.is_some() && document.kind.settles().is_none() {
        return Err(LifecycleError::InvalidDocument(format!(
            "{} cannot settle another document",
            document.kind
        )));
    }
    Ok(())
}

/// Loads the document a settling document refers to and checks it fits.
async fn settlement_target<T: RepositoryTx>(
    tx: &mut T,
    settling: &Document,
    target_id: DocumentId,
) -> Result<Document, TransitionError> {
    let target = tx
        .lock_document(target_id)
        .await?
        .ok_or(TransitionError::DocumentNotFound(target_id))?;
    if Some(target.kind) != settling.kind.settles()
        || target.organization_id != settling.organization_id
    {
        return Err(LifecycleError::InvalidDocument(format!(
            "{} {} cannot settle {} {}",
            settling.kind, settling.number, target.kind, target.number
        ))
        .into());
    }
    Ok(target)
}

/// Applies an approved settling document to its target.
async fn settle_target<T: RepositoryTx>(
    tx: &mut T,
    settling: &Document,
    target_id: DocumentId,
) -> Result<(), TransitionError> {
    let mut target = settlement_target(tx, settling, target_id).await?;
    let amount = settling.totals.total;
    if amount.is_zero() {
        return Ok(());
    }
    if amount > target.balance_due() {
        return Err(LifecycleError::OverSettlement {
            document_id: target.id,
            balance_due: target.balance_due(),
            amount,
        }
        .into());
    }

    let settled = target.amount_settled + amount;
    let status = if settled == target.totals.total {
        DocumentStatus::Paid
    } else {
        DocumentStatus::Partial
    };
    if status != target.status {
        Transition::by_settlement(target.kind, target.status, status)?;
    }

    let expected = target.version;
    target.amount_settled = settled;
    target.status = status;
    target.version += 1;
    tx.update_document(&target, expected).await?;

    info!(
        document_id = %target.id,
        settled_by = %settling.id,
        amount = %amount,
        balance_due = %target.balance_due(),
        status = %status,
        "Document settled"
    );
    Ok(())
}

/// Withdraws a cancelled settling document from its target.
async fn unsettle_target<T: RepositoryTx>(
    tx: &mut T,
    settling: &Document,
    target_id: DocumentId,
) -> Result<(), TransitionError> {
    let mut target = settlement_target(tx, settling, target_id).await?;
    let amount = settling.totals.total;
    if amount.is_zero() {
        return Ok(());
    }

    let settled = target.amount_settled - amount;
    let status = match target.status {
        DocumentStatus::Paid | DocumentStatus::Partial if settled.is_zero() => {
            DocumentStatus::Approved
        }
        DocumentStatus::Paid => DocumentStatus::Partial,
        other => other,
    };
    if status != target.status {
        Transition::by_settlement(target.kind, target.status, status)?;
    }

    let expected = target.version;
    target.amount_settled = settled;
    target.status = status;
    target.version += 1;
    tx.update_document(&target, expected).await?;

    info!(
        document_id = %target.id,
        released_by = %settling.id,
        amount = %amount,
        balance_due = %target.balance_due(),
        status = %status,
        "Settlement withdrawn"
    );
    Ok(())
}

/// Movements of a document that have not been reversed yet.
fn unreversed_movements(movements: &[StockMovement]) -> Vec<&StockMovement> {
    movements
        .iter()
        .filter(|movement| movement.reverses.is_none())
        .filter(|movement| {
            !movements
                .iter()
                .any(|other| other.reverses == Some(movement.id))
        })
        .collect()
}
