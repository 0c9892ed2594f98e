//! Tables held by the in-memory store.

use std::collections::{BTreeMap, HashMap};

use bahi_core::document::Document;
use bahi_core::inventory::{CostLayer, InventoryItem, StockMovement};
use bahi_core::ledger::{JournalEntry, LedgerAccount};
use bahi_core::repository::StoreError;
use bahi_shared::types::{DocumentId, ItemId, LedgerAccountId, WarehouseId};

/// One consistent snapshot of every table.
#[derive(Debug, Clone, Default)]
pub(crate) struct State {
    pub accounts: HashMap<LedgerAccountId, LedgerAccount>,
    pub journal: Vec<JournalEntry>,
    pub items: HashMap<ItemId, InventoryItem>,
    pub layers: BTreeMap<(ItemId, WarehouseId), Vec<CostLayer>>,
    pub movements: Vec<StockMovement>,
    pub documents: HashMap<DocumentId, Document>,
}

impl State {
    pub fn insert_account(&mut self, account: &LedgerAccount) -> Result<(), StoreError> {
        let taken = self.accounts.values().any(|existing| {
            existing.id == account.id
                || (existing.organization_id == account.organization_id
                    && existing.code == account.code)
        });
        if taken {
            return Err(StoreError::Duplicate {
                entity: "ledger_account",
                key: account.code.clone(),
            });
        }
        self.accounts.insert(account.id, account.clone());
        Ok(())
    }

    pub fn update_account(
        &mut self,
        account: &LedgerAccount,
        expected_version: u64,
    ) -> Result<(), StoreError> {
        let stored = self
            .accounts
            .get_mut(&account.id)
            .ok_or(StoreError::NotFound {
                entity: "ledger_account",
                id: account.id.into_inner(),
            })?;
        check_version("ledger_account", account.id.into_inner(), stored.version, expected_version)?;
        *stored = account.clone();
        Ok(())
    }

    pub fn insert_item(&mut self, item: &InventoryItem) -> Result<(), StoreError> {
        let taken = self.items.values().any(|existing| {
            existing.id == item.id
                || (existing.organization_id == item.organization_id && existing.sku == item.sku)
        });
        if taken {
            return Err(StoreError::Duplicate {
                entity: "inventory_item",
                key: item.sku.clone(),
            });
        }
        self.items.insert(item.id, item.clone());
        Ok(())
    }

    pub fn pool(&self, item_id: ItemId, warehouse_id: WarehouseId) -> Vec<CostLayer> {
        let mut layers = self
            .layers
            .get(&(item_id, warehouse_id))
            .cloned()
            .unwrap_or_default();
        layers.sort_by_key(|layer| layer.sequence);
        layers
    }

    pub fn upsert_cost_layer(&mut self, layer: &CostLayer) {
        let pool = self
            .layers
            .entry((layer.item_id, layer.warehouse_id))
            .or_default();
        match pool.iter_mut().find(|existing| existing.id == layer.id) {
            Some(existing) => *existing = layer.clone(),
            None => pool.push(layer.clone()),
        }
    }

    pub fn insert_document(&mut self, document: &Document) -> Result<(), StoreError> {
        let taken = self.documents.values().any(|existing| {
            existing.id == document.id
                || (existing.organization_id == document.organization_id
                    && existing.kind == document.kind
                    && existing.number == document.number)
        });
        if taken {
            return Err(StoreError::Duplicate {
                entity: "document",
                key: format!("{} {}", document.kind, document.number),
            });
        }
        self.documents.insert(document.id, document.clone());
        Ok(())
    }

    pub fn update_document(
        &mut self,
        document: &Document,
        expected_version: u64,
    ) -> Result<(), StoreError> {
        let stored = self
            .documents
            .get_mut(&document.id)
            .ok_or(StoreError::NotFound {
                entity: "document",
                id: document.id.into_inner(),
            })?;
        check_version("document", document.id.into_inner(), stored.version, expected_version)?;
        *stored = document.clone();
        Ok(())
    }
}

fn check_version(
    entity: &'static str,
    id: uuid::Uuid,
    actual: u64,
    expected: u64,
) -> Result<(), StoreError> {
    if actual == expected {
        Ok(())
    } else {
        Err(StoreError::VersionConflict {
            entity,
            id,
            expected,
            actual,
        })
    }
}
