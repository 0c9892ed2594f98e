//! Persistence boundary for the posting core.
//!
//! The core never talks to a database directly. Every mutating operation
//! runs against a [`RepositoryTx`] obtained from [`Repository::begin`]:
//! nothing becomes visible to other readers until [`RepositoryTx::commit`]
//! succeeds, and dropping a transaction without committing rolls it back.
//!
//! `lock_*` reads take a row lock (or the backend's equivalent) that is held
//! until the transaction ends, so concurrent read-modify-write cycles on the
//! same account, cost-layer pool or document serialize.

use bahi_shared::types::{
    DocumentId, ItemId, LedgerAccountId, OrganizationId, WarehouseId,
};
use thiserror::Error;
use uuid::Uuid;

use crate::document::Document;
use crate::inventory::{CostLayer, InventoryItem, StockMovement};
use crate::ledger::{JournalEntry, LedgerAccount};

/// Errors raised by a storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Optimistic version check failed.
    #[error("{entity} {id} was modified concurrently: expected version {expected}, found {actual}")]
    VersionConflict {
        /// Entity name.
        entity: &'static str,
        /// Entity identifier.
        id: Uuid,
        /// Version the writer read.
        expected: u64,
        /// Version currently stored.
        actual: u64,
    },

    /// A uniqueness constraint was violated.
    #[error("{entity} already exists: {key}")]
    Duplicate {
        /// Entity name.
        entity: &'static str,
        /// Conflicting key.
        key: String,
    },

    /// The row to update does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity name.
        entity: &'static str,
        /// Entity identifier.
        id: Uuid,
    },

    /// Backend failure (connection, I/O, commit).
    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::VersionConflict { .. } => "VERSION_CONFLICT",
            Self::Duplicate { .. } => "DUPLICATE",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Backend(_) => "STORAGE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::VersionConflict { .. } | Self::Duplicate { .. } => 409,
            Self::NotFound { .. } => 404,
            Self::Backend(_) => 500,
        }
    }

    /// Returns true if the whole operation may be retried.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::VersionConflict { .. })
    }
}

/// Factory for transactions.
#[async_trait::async_trait]
pub trait Repository: Send + Sync {
    /// Transaction handle type.
    type Tx: RepositoryTx;

    /// Starts a new transaction.
    async fn begin(&self) -> Result<Self::Tx, StoreError>;
}

/// A single all-or-nothing unit of work.
#[async_trait::async_trait]
pub trait RepositoryTx: Send {
    // ========== Ledger accounts ==========

    /// Reads an account without locking it.
    async fn find_account(
        &mut self,
        id: LedgerAccountId,
    ) -> Result<Option<LedgerAccount>, StoreError>;

    /// Reads an account and locks it until the transaction ends.
    async fn lock_account(
        &mut self,
        id: LedgerAccountId,
    ) -> Result<Option<LedgerAccount>, StoreError>;

    /// Looks an account up by its chart-of-accounts code.
    async fn find_account_by_code(
        &mut self,
        organization_id: OrganizationId,
        code: &str,
    ) -> Result<Option<LedgerAccount>, StoreError>;

    /// Lists every account of an organization, ordered by code.
    async fn list_accounts(
        &mut self,
        organization_id: OrganizationId,
    ) -> Result<Vec<LedgerAccount>, StoreError>;

    /// Inserts a new account. Codes are unique per organization.
    async fn insert_account(&mut self, account: &LedgerAccount) -> Result<(), StoreError>;

    /// Overwrites an account if its stored version equals `expected_version`.
    async fn update_account(
        &mut self,
        account: &LedgerAccount,
        expected_version: u64,
    ) -> Result<(), StoreError>;

    // ========== Journal ==========

    /// Appends a journal entry. Entries are immutable once inserted.
    async fn insert_journal_entry(&mut self, entry: &JournalEntry) -> Result<(), StoreError>;

    /// Returns every entry posted for a document, in posting order.
    async fn journal_entries_for_document(
        &mut self,
        document_id: DocumentId,
    ) -> Result<Vec<JournalEntry>, StoreError>;

    /// Returns every entry with at least one line on the account, in posting order.
    async fn journal_entries_for_account(
        &mut self,
        account_id: LedgerAccountId,
    ) -> Result<Vec<JournalEntry>, StoreError>;

    // ========== Inventory ==========

    /// Reads an inventory item.
    async fn find_item(&mut self, id: ItemId) -> Result<Option<InventoryItem>, StoreError>;

    /// Inserts a new inventory item. SKUs are unique per organization.
    async fn insert_item(&mut self, item: &InventoryItem) -> Result<(), StoreError>;

    /// Returns every layer of an item+warehouse pool (including fully consumed
    /// ones) ordered by sequence, and locks the pool until the transaction ends.
    async fn lock_cost_layers(
        &mut self,
        item_id: ItemId,
        warehouse_id: WarehouseId,
    ) -> Result<Vec<CostLayer>, StoreError>;

    /// Inserts or overwrites a cost layer.
    async fn upsert_cost_layer(&mut self, layer: &CostLayer) -> Result<(), StoreError>;

    /// Appends a stock movement.
    async fn insert_stock_movement(&mut self, movement: &StockMovement) -> Result<(), StoreError>;

    /// Returns every movement referencing a document, in insertion order.
    async fn stock_movements_for_document(
        &mut self,
        document_id: DocumentId,
    ) -> Result<Vec<StockMovement>, StoreError>;

    /// Returns every movement of an item+warehouse pool, in insertion order.
    async fn stock_movements_for_pool(
        &mut self,
        item_id: ItemId,
        warehouse_id: WarehouseId,
    ) -> Result<Vec<StockMovement>, StoreError>;

    // ========== Documents ==========

    /// Reads a document without locking it.
    async fn find_document(&mut self, id: DocumentId) -> Result<Option<Document>, StoreError>;

    /// Reads a document and locks it until the transaction ends.
    async fn lock_document(&mut self, id: DocumentId) -> Result<Option<Document>, StoreError>;

    /// Inserts a new document.
    async fn insert_document(&mut self, document: &Document) -> Result<(), StoreError>;

    /// Overwrites a document if its stored version equals `expected_version`.
    async fn update_document(
        &mut self,
        document: &Document,
        expected_version: u64,
    ) -> Result<(), StoreError>;

    // ========== Lifecycle ==========

    /// Makes every write of this transaction visible atomically.
    async fn commit(self) -> Result<(), StoreError>;
}

#[cfg(test)]
#[path = "repository_tests.rs"]
mod tests;
