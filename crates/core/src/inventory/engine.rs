//! Inventory valuation engine.
//!
//! The single entry point for cost-layer mutation. Every function runs inside
//! the caller's repository transaction and locks the item+warehouse pool
//! before reading it, so two concurrent stock-outs cannot both see the same
//! available quantity.

use bahi_shared::types::{
    Amount, CostLayerId, DocumentId, ItemId, Quantity, StockMovementId, WarehouseId,
};
use chrono::NaiveDate;
use tracing::{debug, info, warn};

use super::error::ValuationError;
use super::types::{
    Consumption, CostLayer, InventoryItem, ItemValuation, LayerAllocation, MovementKind,
    NewInventoryItem, StockDirection, StockMovement, ValuationMethod,
};
use super::valuation::{consume_layers, validate_receipt, value_layers};
use crate::repository::{RepositoryTx, StoreError};

/// An inbound stock event.
#[derive(Debug, Clone)]
pub struct StockIn {
    /// Item received.
    pub item_id: ItemId,
    /// Receiving warehouse.
    pub warehouse_id: WarehouseId,
    /// Quantity received.
    pub quantity: Quantity,
    /// Value posted to the inventory account for the receipt.
    pub value: Amount,
    /// Receipt date.
    pub date: NaiveDate,
    /// Source document.
    pub reference: Option<DocumentId>,
    /// Movement kind to record.
    pub kind: MovementKind,
}

/// An outbound stock event.
#[derive(Debug, Clone)]
pub struct StockOut {
    /// Item issued.
    pub item_id: ItemId,
    /// Issuing warehouse.
    pub warehouse_id: WarehouseId,
    /// Quantity issued.
    pub quantity: Quantity,
    /// Issue date.
    pub date: NaiveDate,
    /// Source document.
    pub reference: Option<DocumentId>,
    /// Movement kind to record.
    pub kind: MovementKind,
}

/// Stateless inventory operations over a repository transaction.
pub struct InventoryEngine;

impl InventoryEngine {
    /// Registers a stocked item.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateSku` if the SKU is already registered.
    pub async fn register_item<T: RepositoryTx>(
        tx: &mut T,
        input: NewInventoryItem,
    ) -> Result<InventoryItem, ValuationError> {
        let item = InventoryItem {
            id: ItemId::new(),
            organization_id: input.organization_id,
            sku: input.sku,
            name: input.name,
            valuation_method: input.valuation_method,
            active: true,
        };
        match tx.insert_item(&item).await {
            Ok(()) => {}
            Err(StoreError::Duplicate { .. }) => {
                return Err(ValuationError::DuplicateSku(item.sku));
            }
            Err(e) => return Err(e.into()),
        }

        info!(
            item_id = %item.id,
            sku = %item.sku,
            method = %item.valuation_method,
            "Inventory item registered"
        );
        Ok(item)
    }

    /// Loads an item and checks it accepts movements.
    ///
    /// # Errors
    ///
    /// Returns `ItemNotFound` or `InactiveItem`.
    pub async fn active_item<T: RepositoryTx>(
        tx: &mut T,
        item_id: ItemId,
    ) -> Result<InventoryItem, ValuationError> {
        let item = tx
            .find_item(item_id)
            .await?
            .ok_or(ValuationError::ItemNotFound(item_id))?;
        if !item.active {
            return Err(ValuationError::InactiveItem(item_id));
        }
        Ok(item)
    }

    /// Creates a cost layer worth `value` for a stock-in event.
    ///
    /// # Errors
    ///
    /// Returns `InvalidQuantity` or `NegativeUnitCost` for bad input.
    pub async fn produce<T: RepositoryTx>(
        tx: &mut T,
        item_id: ItemId,
        warehouse_id: WarehouseId,
        quantity: Quantity,
        value: Amount,
        date: NaiveDate,
        reference: Option<DocumentId>,
    ) -> Result<CostLayer, ValuationError> {
        validate_receipt(quantity, value)?;
        let pool = tx.lock_cost_layers(item_id, warehouse_id).await?;
        let layer = CostLayer::open(
            item_id,
            warehouse_id,
            date,
            next_sequence(&pool),
            quantity,
            value,
            reference,
        );
        tx.upsert_cost_layer(&layer).await?;

        debug!(
            layer_id = %layer.id,
            item_id = %item_id,
            warehouse_id = %warehouse_id,
            quantity = %quantity,
            value = %layer.original_value,
            "Cost layer created"
        );
        Ok(layer)
    }

    /// Consumes stock from a pool and persists the affected layers.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientStock` if the pool holds less than `quantity`;
    /// nothing is written in that case.
    pub async fn consume<T: RepositoryTx>(
        tx: &mut T,
        item_id: ItemId,
        warehouse_id: WarehouseId,
        quantity: Quantity,
        method: ValuationMethod,
    ) -> Result<Consumption, ValuationError> {
        let mut pool = tx.lock_cost_layers(item_id, warehouse_id).await?;
        let before = pool.clone();

        let consumption = match consume_layers(&mut pool, item_id, warehouse_id, quantity, method)
        {
            Ok(consumption) => consumption,
            Err(err) => {
                if let ValuationError::InsufficientStock {
                    requested,
                    available,
                    ..
                } = &err
                {
                    warn!(
                        item_id = %item_id,
                        warehouse_id = %warehouse_id,
                        requested = %requested,
                        available = %available,
                        "Insufficient stock"
                    );
                }
                return Err(err);
            }
        };

        // Weighted-average repricing touches layers that were not consumed.
        for (layer, original) in pool.iter().zip(before.iter()) {
            if layer != original {
                tx.upsert_cost_layer(layer).await?;
            }
        }
        Ok(consumption)
    }

    /// Receives stock: creates a layer and records an inbound movement.
    ///
    /// # Errors
    ///
    /// Returns `ItemNotFound` or `InactiveItem`, and see [`InventoryEngine::produce`].
    pub async fn receive<T: RepositoryTx>(
        tx: &mut T,
        event: StockIn,
    ) -> Result<StockMovement, ValuationError> {
        Self::active_item(tx, event.item_id).await?;
        let layer = Self::produce(
            tx,
            event.item_id,
            event.warehouse_id,
            event.quantity,
            event.value,
            event.date,
            event.reference,
        )
        .await?;

        let movement = StockMovement {
            id: StockMovementId::new(),
            item_id: event.item_id,
            warehouse_id: event.warehouse_id,
            kind: event.kind,
            direction: StockDirection::In,
            quantity: event.quantity,
            date: event.date,
            reference_document_id: event.reference,
            resulting_layers: vec![layer.id],
            allocations: vec![],
            value: layer.original_value,
            reverses: None,
        };
        tx.insert_stock_movement(&movement).await?;
        Ok(movement)
    }

    /// Issues stock per the item's valuation method and records an outbound movement.
    ///
    /// # Errors
    ///
    /// Returns `ItemNotFound`, `InactiveItem` or `InsufficientStock`.
    pub async fn issue<T: RepositoryTx>(
        tx: &mut T,
        event: StockOut,
    ) -> Result<StockMovement, ValuationError> {
        let item = Self::active_item(tx, event.item_id).await?;
        let consumption = Self::consume(
            tx,
            event.item_id,
            event.warehouse_id,
            event.quantity,
            item.valuation_method,
        )
        .await?;

        let movement = StockMovement {
            id: StockMovementId::new(),
            item_id: event.item_id,
            warehouse_id: event.warehouse_id,
            kind: event.kind,
            direction: StockDirection::Out,
            quantity: event.quantity,
            date: event.date,
            reference_document_id: event.reference,
            resulting_layers: vec![],
            allocations: consumption.allocations,
            value: consumption.total_cost,
            reverses: None,
        };
        tx.insert_stock_movement(&movement).await?;
        Ok(movement)
    }

    /// Moves stock between warehouses at its consumed cost.
    ///
    /// Returns the outbound and inbound movements.
    ///
    /// # Errors
    ///
    /// Returns `SameWarehouse`, `InsufficientStock` or item errors.
    pub async fn transfer<T: RepositoryTx>(
        tx: &mut T,
        item_id: ItemId,
        from: WarehouseId,
        to: WarehouseId,
        quantity: Quantity,
        date: NaiveDate,
    ) -> Result<(StockMovement, StockMovement), ValuationError> {
        if from == to {
            return Err(ValuationError::SameWarehouse(item_id));
        }
        // Lock both pools in a fixed order.
        let (first, second) = if from < to { (from, to) } else { (to, from) };
        tx.lock_cost_layers(item_id, first).await?;
        tx.lock_cost_layers(item_id, second).await?;

        let outbound = Self::issue(
            tx,
            StockOut {
                item_id,
                warehouse_id: from,
                quantity,
                date,
                reference: None,
                kind: MovementKind::Transfer,
            },
        )
        .await?;

        let mut resulting_layers = Vec::with_capacity(outbound.allocations.len());
        for allocation in &outbound.allocations {
            let layer = Self::produce(
                tx,
                item_id,
                to,
                allocation.quantity_taken,
                allocation.cost,
                date,
                None,
            )
            .await?;
            resulting_layers.push(layer.id);
        }

        let inbound = StockMovement {
            id: StockMovementId::new(),
            item_id,
            warehouse_id: to,
            kind: MovementKind::Transfer,
            direction: StockDirection::In,
            quantity,
            date,
            reference_document_id: None,
            resulting_layers,
            allocations: vec![],
            value: outbound.value,
            reverses: None,
        };
        tx.insert_stock_movement(&inbound).await?;

        info!(
            item_id = %item_id,
            from = %from,
            to = %to,
            quantity = %quantity,
            value = %outbound.value,
            "Stock transferred"
        );
        Ok((outbound, inbound))
    }

    /// Undoes a recorded movement and records the compensating movement.
    ///
    /// Outbound quantities go back into the layer they came from when its
    /// unit cost is unchanged, otherwise into a new layer at the allocation
    /// cost. Inbound layers are withdrawn only if they are untouched.
    ///
    /// # Errors
    ///
    /// Returns `LayerInUse` if an inbound layer was consumed or repriced.
    pub async fn reverse_movement<T: RepositoryTx>(
        tx: &mut T,
        movement: &StockMovement,
        date: NaiveDate,
    ) -> Result<StockMovement, ValuationError> {
        let mut pool = tx
            .lock_cost_layers(movement.item_id, movement.warehouse_id)
            .await?;

        let mut reversal = StockMovement {
            id: StockMovementId::new(),
            item_id: movement.item_id,
            warehouse_id: movement.warehouse_id,
            kind: reversal_kind(movement.kind),
            direction: movement.direction.opposite(),
            quantity: movement.quantity,
            date,
            reference_document_id: movement.reference_document_id,
            resulting_layers: vec![],
            allocations: vec![],
            value: movement.value,
            reverses: Some(movement.id),
        };

        match movement.direction {
            StockDirection::Out => {
                for allocation in &movement.allocations {
                    let layer_id =
                        restore_allocation(tx, &mut pool, allocation, date, movement).await?;
                    reversal.resulting_layers.push(layer_id);
                }
            }
            StockDirection::In => {
                for layer_id in &movement.resulting_layers {
                    let layer = pool
                        .iter_mut()
                        .find(|layer| layer.id == *layer_id)
                        .ok_or(ValuationError::LayerNotFound(*layer_id))?;
                    if !layer.is_untouched() {
                        return Err(ValuationError::LayerInUse(*layer_id));
                    }
                    reversal.allocations.push(LayerAllocation {
                        layer_id: layer.id,
                        quantity_taken: layer.remaining_quantity,
                        unit_cost: layer.unit_cost,
                        cost: layer.remaining_value,
                    });
                    layer.remaining_quantity = Quantity::ZERO;
                    layer.remaining_value = Amount::ZERO;
                    tx.upsert_cost_layer(layer).await?;
                }
            }
        }

        tx.insert_stock_movement(&reversal).await?;
        debug!(
            movement_id = %movement.id,
            reversal_id = %reversal.id,
            "Stock movement reversed"
        );
        Ok(reversal)
    }

    /// Returns quantity and value on hand for an item in a warehouse.
    ///
    /// # Errors
    ///
    /// Returns `ItemNotFound` if the item does not exist.
    pub async fn valuation<T: RepositoryTx>(
        tx: &mut T,
        item_id: ItemId,
        warehouse_id: WarehouseId,
    ) -> Result<ItemValuation, ValuationError> {
        let item = tx
            .find_item(item_id)
            .await?
            .ok_or(ValuationError::ItemNotFound(item_id))?;
        let pool = tx.lock_cost_layers(item_id, warehouse_id).await?;
        Ok(value_layers(&pool, item.valuation_method))
    }
}

async fn restore_allocation<T: RepositoryTx>(
    tx: &mut T,
    pool: &mut Vec<CostLayer>,
    allocation: &LayerAllocation,
    date: NaiveDate,
    movement: &StockMovement,
) -> Result<CostLayerId, ValuationError> {
    if let Some(layer) = pool
        .iter_mut()
        .find(|layer| layer.id == allocation.layer_id && layer.unit_cost == allocation.unit_cost)
    {
        layer.remaining_quantity += allocation.quantity_taken;
        layer.remaining_value += allocation.cost;
        tx.upsert_cost_layer(layer).await?;
        return Ok(layer.id);
    }

    let mut layer = CostLayer::open(
        movement.item_id,
        movement.warehouse_id,
        date,
        next_sequence(pool),
        allocation.quantity_taken,
        allocation.cost,
        movement.reference_document_id,
    );
    layer.unit_cost = allocation.unit_cost;
    layer.acquisition_cost = allocation.unit_cost;
    tx.upsert_cost_layer(&layer).await?;
    let id = layer.id;
    pool.push(layer);
    Ok(id)
}

fn next_sequence(pool: &[CostLayer]) -> u64 {
    pool.iter().map(|layer| layer.sequence).max().map_or(1, |max| max + 1)
}

const fn reversal_kind(kind: MovementKind) -> MovementKind {
    match kind {
        MovementKind::In => MovementKind::Out,
        MovementKind::Out => MovementKind::In,
        other => other,
    }
}

/// Net quantity of a pool according to its movement history.
#[must_use]
pub fn net_movement_quantity(movements: &[StockMovement]) -> Quantity {
    movements.iter().map(StockMovement::signed_quantity).sum()
}
