//! Inventory valuation errors.

use bahi_shared::types::{CostLayerId, ItemId, Quantity, WarehouseId};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::repository::StoreError;

/// Errors that can occur while moving or valuing stock.
#[derive(Debug, Error)]
pub enum ValuationError {
    /// Requested more than the pool holds. Nothing is consumed.
    #[error(
        "Insufficient stock for item {item_id} in warehouse {warehouse_id}: requested {requested}, available {available}"
    )]
    InsufficientStock {
        /// Item.
        item_id: ItemId,
        /// Warehouse.
        warehouse_id: WarehouseId,
        /// Quantity asked for.
        requested: Quantity,
        /// Quantity on hand.
        available: Quantity,
    },

    /// Quantities must be strictly positive.
    #[error("Quantity must be positive, got {0}")]
    InvalidQuantity(Quantity),

    /// Unit costs cannot be negative.
    #[error("Unit cost cannot be negative, got {0}")]
    NegativeUnitCost(Decimal),

    /// Item does not exist.
    #[error("Inventory item not found: {0}")]
    ItemNotFound(ItemId),

    /// Item is deactivated.
    #[error("Inventory item {0} is inactive")]
    InactiveItem(ItemId),

    /// SKU already registered.
    #[error("SKU already exists: {0}")]
    DuplicateSku(String),

    /// Source and destination warehouse are the same.
    #[error("Cannot transfer item {0} to the warehouse it is already in")]
    SameWarehouse(ItemId),

    /// A layer created by a document was consumed or repriced after creation.
    #[error("Cost layer {0} has already been consumed or repriced and cannot be withdrawn")]
    LayerInUse(CostLayerId),

    /// A referenced layer is missing from its pool.
    #[error("Cost layer not found: {0}")]
    LayerNotFound(CostLayerId),

    /// Storage failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ValuationError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            Self::InvalidQuantity(_) => "INVALID_QUANTITY",
            Self::NegativeUnitCost(_) => "NEGATIVE_UNIT_COST",
            Self::ItemNotFound(_) => "ITEM_NOT_FOUND",
            Self::InactiveItem(_) => "ITEM_INACTIVE",
            Self::DuplicateSku(_) => "DUPLICATE_SKU",
            Self::SameWarehouse(_) => "SAME_WAREHOUSE",
            Self::LayerInUse(_) => "COST_LAYER_IN_USE",
            Self::LayerNotFound(_) => "COST_LAYER_NOT_FOUND",
            Self::Store(e) => e.error_code(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidQuantity(_) | Self::NegativeUnitCost(_) | Self::SameWarehouse(_) => 400,
            Self::ItemNotFound(_) => 404,
            Self::DuplicateSku(_) => 409,
            Self::InsufficientStock { .. } | Self::InactiveItem(_) | Self::LayerInUse(_) => 422,
            Self::LayerNotFound(_) => 500,
            Self::Store(e) => e.http_status_code(),
        }
    }

    /// Returns true if the whole operation may be retried.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Store(e) => e.is_retryable(),
            _ => false,
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
