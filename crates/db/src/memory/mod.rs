//! Transactional in-memory store.
//!
//! A transaction holds the store's lock from `begin` until it is committed
//! or dropped, and works on a private copy of every table. `commit` swaps
//! the copy in; dropping the transaction discards it. Transactions are
//! therefore serializable and all-or-nothing, which is what the posting core
//! expects from a relational backend with row locks.

mod state;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use bahi_core::document::Document;
use bahi_core::inventory::{CostLayer, InventoryItem, StockMovement};
use bahi_core::ledger::{JournalEntry, LedgerAccount};
use bahi_core::repository::{Repository, RepositoryTx, StoreError};
use bahi_shared::types::{
    DocumentId, ItemId, LedgerAccountId, OrganizationId, WarehouseId,
};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use state::State;

/// In-memory implementation of [`Repository`].
///
/// Cloning yields another handle to the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
    fail_next_commit: Arc<AtomicBool>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `commit` fail with a backend error, as a crash between
    /// the last write and the commit would.
    pub fn fail_next_commit(&self) {
        self.fail_next_commit.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Repository for MemoryStore {
    type Tx = MemoryTx;

    async fn begin(&self) -> Result<Self::Tx, StoreError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let work = guard.clone();
        Ok(MemoryTx {
            guard,
            work,
            fail_next_commit: Arc::clone(&self.fail_next_commit),
        })
    }
}

/// A transaction on a [`MemoryStore`].
pub struct MemoryTx {
    guard: OwnedMutexGuard<State>,
    work: State,
    fail_next_commit: Arc<AtomicBool>,
}

#[async_trait]
impl RepositoryTx for MemoryTx {
    async fn find_account(
        &mut self,
        id: LedgerAccountId,
    ) -> Result<Option<LedgerAccount>, StoreError> {
        Ok(self.work.accounts.get(&id).cloned())
    }

    async fn lock_account(
        &mut self,
        id: LedgerAccountId,
    ) -> Result<Option<LedgerAccount>, StoreError> {
        Ok(self.work.accounts.get(&id).cloned())
    }

    async fn find_account_by_code(
        &mut self,
        organization_id: OrganizationId,
        code: &str,
    ) -> Result<Option<LedgerAccount>, StoreError> {
        Ok(self
            .work
            .accounts
            .values()
            .find(|account| account.organization_id == organization_id && account.code == code)
            .cloned())
    }

    async fn list_accounts(
        &mut self,
        organization_id: OrganizationId,
    ) -> Result<Vec<LedgerAccount>, StoreError> {
        let mut accounts: Vec<LedgerAccount> = self
            .work
            .accounts
            .values()
            .filter(|account| account.organization_id == organization_id)
            .cloned()
            .collect();
        accounts.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(accounts)
    }

    async fn insert_account(&mut self, account: &LedgerAccount) -> Result<(), StoreError> {
        self.work.insert_account(account)
    }

    async fn update_account(
        &mut self,
        account: &LedgerAccount,
        expected_version: u64,
    ) -> Result<(), StoreError> {
        self.work.update_account(account, expected_version)
    }

    async fn insert_journal_entry(&mut self, entry: &JournalEntry) -> Result<(), StoreError> {
        if self.work.journal.iter().any(|existing| existing.id == entry.id) {
            return Err(StoreError::Duplicate {
                entity: "journal_entry",
                key: entry.id.to_string(),
            });
        }
        self.work.journal.push(entry.clone());
        Ok(())
    }

    async fn journal_entries_for_document(
        &mut self,
        document_id: DocumentId,
    ) -> Result<Vec<JournalEntry>, StoreError> {
        Ok(self
            .work
            .journal
            .iter()
            .filter(|entry| entry.document_id == Some(document_id))
            .cloned()
            .collect())
    }

    async fn journal_entries_for_account(
        &mut self,
        account_id: LedgerAccountId,
    ) -> Result<Vec<JournalEntry>, StoreError> {
        Ok(self
            .work
            .journal
            .iter()
            .filter(|entry| {
                entry
                    .lines
                    .iter()
                    .any(|line| line.ledger_account_id == account_id)
            })
            .cloned()
            .collect())
    }

    async fn find_item(&mut self, id: ItemId) -> Result<Option<InventoryItem>, StoreError> {
        Ok(self.work.items.get(&id).cloned())
    }

    async fn insert_item(&mut self, item: &InventoryItem) -> Result<(), StoreError> {
        self.work.insert_item(item)
    }

    async fn lock_cost_layers(
        &mut self,
        item_id: ItemId,
        warehouse_id: WarehouseId,
    ) -> Result<Vec<CostLayer>, StoreError> {
        Ok(self.work.pool(item_id, warehouse_id))
    }

    async fn upsert_cost_layer(&mut self, layer: &CostLayer) -> Result<(), StoreError> {
        self.work.upsert_cost_layer(layer);
        Ok(())
    }

    async fn insert_stock_movement(&mut self, movement: &StockMovement) -> Result<(), StoreError> {
        self.work.movements.push(movement.clone());
        Ok(())
    }

    async fn stock_movements_for_document(
        &mut self,
        document_id: DocumentId,
    ) -> Result<Vec<StockMovement>, StoreError> {
        Ok(self
            .work
            .movements
            .iter()
            .filter(|movement| movement.reference_document_id == Some(document_id))
            .cloned()
            .collect())
    }

    async fn stock_movements_for_pool(
        &mut self,
        item_id: ItemId,
        warehouse_id: WarehouseId,
    ) -> Result<Vec<StockMovement>, StoreError> {
        Ok(self
            .work
            .movements
            .iter()
            .filter(|movement| {
                movement.item_id == item_id && movement.warehouse_id == warehouse_id
            })
            .cloned()
            .collect())
    }

    async fn find_document(&mut self, id: DocumentId) -> Result<Option<Document>, StoreError> {
        Ok(self.work.documents.get(&id).cloned())
    }

    async fn lock_document(&mut self, id: DocumentId) -> Result<Option<Document>, StoreError> {
        Ok(self.work.documents.get(&id).cloned())
    }

    async fn insert_document(&mut self, document: &Document) -> Result<(), StoreError> {
        self.work.insert_document(document)
    }

    async fn update_document(
        &mut self,
        document: &Document,
        expected_version: u64,
    ) -> Result<(), StoreError> {
        self.work.update_document(document, expected_version)
    }

    async fn commit(self) -> Result<(), StoreError> {
        let Self {
            mut guard,
            work,
            fail_next_commit,
        } = self;
        if fail_next_commit.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Backend("commit failed".to_string()));
        }
        *guard = work;
        debug!("Memory store transaction committed");
        Ok(())
    }
}
