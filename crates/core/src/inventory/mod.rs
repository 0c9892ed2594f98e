//! Inventory valuation engine.
//!
//! Maintains per-item, per-warehouse cost layers and computes the cost of
//! stock leaving under FIFO, LIFO or weighted-average policies.

pub mod engine;
pub mod error;
pub mod types;
pub mod valuation;

#[cfg(test)]
mod valuation_props;

pub use engine::{InventoryEngine, StockIn, StockOut, net_movement_quantity};
pub use error::ValuationError;
pub use types::{
    Consumption, CostLayer, InventoryItem, ItemValuation, LayerAllocation, MovementKind,
    NewInventoryItem, StockDirection, StockMovement, ValuationMethod,
};
pub use valuation::{available, consume_layers, value_layers, weighted_average_cost};
