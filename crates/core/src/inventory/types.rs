//! Inventory domain types.

use std::fmt;

use bahi_shared::types::{
    Amount, CostLayerId, DocumentId, ItemId, OrganizationId, Quantity, StockMovementId,
    WarehouseId,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Inventory costing policy of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValuationMethod {
    /// Oldest layer first.
    Fifo,
    /// Newest layer first.
    Lifo,
    /// All layers form one pool at the average cost.
    WeightedAverage,
}

impl ValuationMethod {
    /// Returns the string representation of the method.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fifo => "FIFO",
            Self::Lifo => "LIFO",
            Self::WeightedAverage => "WEIGHTED_AVG",
        }
    }

    /// Parses a method from a string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "FIFO" => Some(Self::Fifo),
            "LIFO" => Some(Self::Lifo),
            "WEIGHTED_AVG" | "WEIGHTED_AVERAGE" | "AVG" => Some(Self::WeightedAverage),
            _ => None,
        }
    }
}

impl fmt::Display for ValuationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a stock line or movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StockDirection {
    /// Stock enters the warehouse.
    In,
    /// Stock leaves the warehouse.
    Out,
}

impl StockDirection {
    /// Returns the other direction.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::In => Self::Out,
            Self::Out => Self::In,
        }
    }
}

/// A stocked item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    /// Unique identifier.
    pub id: ItemId,
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// Stock keeping unit, unique per organization.
    pub sku: String,
    /// Display name.
    pub name: String,
    /// Costing policy used when stock leaves.
    pub valuation_method: ValuationMethod,
    /// Inactive items reject new movements.
    pub active: bool,
}

/// Input for registering an item.
#[derive(Debug, Clone)]
pub struct NewInventoryItem {
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// Stock keeping unit.
    pub sku: String,
    /// Display name.
    pub name: String,
    /// Costing policy.
    pub valuation_method: ValuationMethod,
}

/// A quantity acquired at one unit cost.
///
/// `remaining_quantity` only decreases through consumption and never drops
/// below zero. Fully consumed layers are kept for the audit trail.
///
/// The layer's value is carried in whole cents (`remaining_value`), not
/// derived from `unit_cost`, so the pool's value always equals what was
/// posted to the inventory account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostLayer {
    /// Unique identifier.
    pub id: CostLayerId,
    /// Item.
    pub item_id: ItemId,
    /// Warehouse.
    pub warehouse_id: WarehouseId,
    /// Date the stock was acquired.
    pub acquisition_date: NaiveDate,
    /// Insertion order within the item+warehouse pool; breaks date ties.
    pub sequence: u64,
    /// Quantity at creation.
    pub original_quantity: Quantity,
    /// Quantity not yet consumed.
    pub remaining_quantity: Quantity,
    /// Value at creation, in cents.
    pub original_value: Amount,
    /// Value of the remaining quantity, in cents.
    pub remaining_value: Amount,
    /// Nominal unit cost, unrounded.
    pub unit_cost: Decimal,
    /// Unit cost at creation; differs from `unit_cost` after weighted-average repricing.
    pub acquisition_cost: Decimal,
    /// Document that created the layer.
    pub reference: Option<DocumentId>,
}

impl CostLayer {
    /// Opens a layer holding `quantity` worth `value`.
    ///
    /// `value` is rounded to cents; the unit cost is derived from it.
    #[must_use]
    pub fn open(
        item_id: ItemId,
        warehouse_id: WarehouseId,
        acquisition_date: NaiveDate,
        sequence: u64,
        quantity: Quantity,
        value: Amount,
        reference: Option<DocumentId>,
    ) -> Self {
        let value = value.round();
        let unit_cost = if quantity.is_zero() {
            Decimal::ZERO
        } else {
            value.value() / quantity.value()
        };
        Self {
            id: CostLayerId::new(),
            item_id,
            warehouse_id,
            acquisition_date,
            sequence,
            original_quantity: quantity,
            remaining_quantity: quantity,
            original_value: value,
            remaining_value: value,
            unit_cost,
            acquisition_cost: unit_cost,
            reference,
        }
    }

    /// Returns true if any quantity remains.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.remaining_quantity.is_positive()
    }

    /// Returns true if the layer has neither been consumed nor repriced.
    #[must_use]
    pub fn is_untouched(&self) -> bool {
        self.remaining_quantity == self.original_quantity
            && self.remaining_value == self.original_value
            && self.unit_cost == self.acquisition_cost
    }
}

/// Quantity taken from one layer by an outbound movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerAllocation {
    /// Layer consumed.
    pub layer_id: CostLayerId,
    /// Quantity taken.
    pub quantity_taken: Quantity,
    /// Layer's unit cost when it was consumed.
    pub unit_cost: Decimal,
    /// Value removed from the layer, in cents.
    pub cost: Amount,
}

/// Result of consuming stock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Consumption {
    /// Layers charged, in consumption order.
    pub allocations: Vec<LayerAllocation>,
    /// Sum of the allocation costs.
    pub total_cost: Amount,
}

/// Kind of stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MovementKind {
    /// Purchase receipt or production.
    In,
    /// Sale or consumption.
    Out,
    /// Move between warehouses.
    Transfer,
    /// Stock count correction.
    Adjustment,
}

/// A recorded change to an item+warehouse pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    /// Unique identifier.
    pub id: StockMovementId,
    /// Item.
    pub item_id: ItemId,
    /// Warehouse whose pool changed.
    pub warehouse_id: WarehouseId,
    /// Kind.
    pub kind: MovementKind,
    /// Whether stock entered or left `warehouse_id`.
    pub direction: StockDirection,
    /// Positive quantity moved.
    pub quantity: Quantity,
    /// Movement date.
    pub date: NaiveDate,
    /// Source document, if any.
    pub reference_document_id: Option<DocumentId>,
    /// Layers created (inbound movements).
    pub resulting_layers: Vec<CostLayerId>,
    /// Layers consumed (outbound movements).
    pub allocations: Vec<LayerAllocation>,
    /// Total value moved, rounded.
    pub value: Amount,
    /// Movement this one undoes, for cancellations.
    pub reverses: Option<StockMovementId>,
}

impl StockMovement {
    /// Quantity signed by direction (inbound positive).
    #[must_use]
    pub fn signed_quantity(&self) -> Quantity {
        match self.direction {
            StockDirection::In => self.quantity,
            StockDirection::Out => Quantity::ZERO - self.quantity,
        }
    }
}

/// On-hand quantity and value of an item+warehouse pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemValuation {
    /// Quantity on hand.
    pub quantity: Quantity,
    /// Value on hand, rounded.
    pub total_value: Amount,
    /// Item's costing policy.
    pub method: ValuationMethod,
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
