//! Cost-layer arithmetic for FIFO, LIFO and weighted-average valuation.
//!
//! Everything here is pure: functions take the layers of a single
//! item+warehouse pool and either mutate them in place or report an error
//! without touching them.
//!
//! Layer values are whole cents. An issue removes a share of a layer's value
//! rounded once, and the last unit out takes what is left, so the cost of
//! every issue plus the value still on hand always equals what came in.

use bahi_shared::types::{Amount, ItemId, Quantity, WarehouseId};
use rust_decimal::Decimal;
use tracing::debug;

use super::error::ValuationError;
use super::types::{Consumption, CostLayer, ItemValuation, LayerAllocation, ValuationMethod};

/// Total remaining quantity across layers.
#[must_use]
pub fn available(layers: &[CostLayer]) -> Quantity {
    layers.iter().map(|layer| layer.remaining_quantity).sum()
}

/// Total remaining value across layers.
#[must_use]
pub fn pool_value(layers: &[CostLayer]) -> Amount {
    layers.iter().map(|layer| layer.remaining_value).sum()
}

/// Average unit cost of the open layers, unrounded. `None` for an empty pool.
#[must_use]
pub fn weighted_average_cost(layers: &[CostLayer]) -> Option<Decimal> {
    let quantity = available(layers);
    if !quantity.is_positive() {
        return None;
    }
    Some(pool_value(layers).value() / quantity.value())
}

/// Indices of open layers in the order the method consumes them.
#[must_use]
pub fn consumption_order(layers: &[CostLayer], method: ValuationMethod) -> Vec<usize> {
    let mut order: Vec<usize> = (0..layers.len())
        .filter(|&index| layers[index].is_open())
        .collect();
    order.sort_by_key(|&index| (layers[index].acquisition_date, layers[index].sequence));
    if method == ValuationMethod::Lifo {
        order.reverse();
    }
    order
}

/// Part of `value` carried by `part` of `whole`, in cents.
fn share(value: Amount, part: Quantity, whole: Quantity) -> Amount {
    if part >= whole {
        value
    } else {
        Amount::new(value.value() * part.value() / whole.value()).round()
    }
}

/// Consumes `quantity` from the pool according to `method`.
///
/// For [`ValuationMethod::WeightedAverage`] every open layer is first repriced
/// to the pool average, so the pool behaves as one effective layer.
///
/// # Errors
///
/// Returns `InvalidQuantity` for a non-positive quantity and
/// `InsufficientStock` if the pool holds less than requested. On error the
/// layers are left unchanged.
pub fn consume_layers(
    layers: &mut [CostLayer],
    item_id: ItemId,
    warehouse_id: WarehouseId,
    quantity: Quantity,
    method: ValuationMethod,
) -> Result<Consumption, ValuationError> {
    if !quantity.is_positive() {
        return Err(ValuationError::InvalidQuantity(quantity));
    }
    let on_hand = available(layers);
    if on_hand < quantity {
        return Err(ValuationError::InsufficientStock {
            item_id,
            warehouse_id,
            requested: quantity,
            available: on_hand,
        });
    }

    let order = consumption_order(layers, method);
    let allocations = match method {
        ValuationMethod::WeightedAverage => consume_pooled(layers, &order, quantity, on_hand),
        ValuationMethod::Fifo | ValuationMethod::Lifo => consume_in_order(layers, &order, quantity),
    };
    for allocation in &allocations {
        debug!(
            layer_id = %allocation.layer_id,
            quantity_taken = %allocation.quantity_taken,
            unit_cost = %allocation.unit_cost,
            cost = %allocation.cost,
            "Consumed cost layer"
        );
    }

    let total_cost = allocations.iter().map(|allocation| allocation.cost).sum();
    Ok(Consumption {
        allocations,
        total_cost,
    })
}

/// Walks the layers in `order`, charging each its own value share.
fn consume_in_order(
    layers: &mut [CostLayer],
    order: &[usize],
    quantity: Quantity,
) -> Vec<LayerAllocation> {
    let mut outstanding = quantity;
    let mut allocations = Vec::new();
    for &index in order {
        if outstanding.is_zero() {
            break;
        }
        let layer = &mut layers[index];
        let taken = outstanding.min(layer.remaining_quantity);
        let cost = share(layer.remaining_value, taken, layer.remaining_quantity);
        layer.remaining_quantity -= taken;
        layer.remaining_value -= cost;
        outstanding -= taken;

        allocations.push(LayerAllocation {
            layer_id: layer.id,
            quantity_taken: taken,
            unit_cost: layer.unit_cost,
            cost,
        });
    }
    allocations
}

/// Charges the pool's value share, then spreads what is left over the
/// layers still open.
fn consume_pooled(
    layers: &mut [CostLayer],
    order: &[usize],
    quantity: Quantity,
    on_hand: Quantity,
) -> Vec<LayerAllocation> {
    let value = pool_value(layers);
    let charge = share(value, quantity, on_hand);
    let average = value.value() / on_hand.value();

    let mut outstanding = quantity;
    let mut taken = Vec::new();
    for &index in order {
        let layer = &mut layers[index];
        layer.unit_cost = average;
        if outstanding.is_zero() {
            continue;
        }
        let quantity_taken = outstanding.min(layer.remaining_quantity);
        layer.remaining_quantity -= quantity_taken;
        outstanding -= quantity_taken;
        taken.push((index, quantity_taken));
    }

    let weights: Vec<Decimal> = taken.iter().map(|(_, quantity)| quantity.value()).collect();
    let allocations = taken
        .iter()
        .zip(charge.allocate(&weights))
        .map(|(&(index, quantity_taken), cost)| LayerAllocation {
            layer_id: layers[index].id,
            quantity_taken,
            unit_cost: average,
            cost,
        })
        .collect();

    let open: Vec<usize> = order
        .iter()
        .copied()
        .filter(|&index| layers[index].is_open())
        .collect();
    let weights: Vec<Decimal> = open
        .iter()
        .map(|&index| layers[index].remaining_quantity.value())
        .collect();
    let rest = (value - charge).allocate(&weights);
    for &index in order {
        layers[index].remaining_value = Amount::ZERO;
    }
    for (&index, part) in open.iter().zip(rest) {
        layers[index].remaining_value = part;
    }
    allocations
}

/// Returns quantity and value on hand for the pool.
#[must_use]
pub fn value_layers(layers: &[CostLayer], method: ValuationMethod) -> ItemValuation {
    ItemValuation {
        quantity: available(layers),
        total_value: pool_value(layers),
        method,
    }
}

/// Validates the inputs of a stock-in event.
///
/// # Errors
///
/// Returns `InvalidQuantity` or `NegativeUnitCost`.
pub fn validate_receipt(quantity: Quantity, value: Amount) -> Result<(), ValuationError> {
    if !quantity.is_positive() {
        return Err(ValuationError::InvalidQuantity(quantity));
    }
    if value.is_negative() {
        return Err(ValuationError::NegativeUnitCost(
            value.value() / quantity.value(),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[path = "valuation_tests.rs"]
mod tests;
