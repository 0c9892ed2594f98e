//! Property-based tests for cost-layer consumption.

use bahi_shared::types::{Amount, ItemId, Quantity, WarehouseId};
use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::error::ValuationError;
use super::types::{CostLayer, ValuationMethod};
use super::valuation::{available, consume_layers, value_layers};

fn method_strategy() -> impl Strategy<Value = ValuationMethod> {
    prop_oneof![
        Just(ValuationMethod::Fifo),
        Just(ValuationMethod::Lifo),
        Just(ValuationMethod::WeightedAverage),
    ]
}

/// Layers with quantities 0.0001..=1000 and unit costs 0.01..=10,000.
fn layers_strategy() -> impl Strategy<Value = Vec<CostLayer>> {
    prop::collection::vec((1i64..10_000_000i64, 1i64..1_000_000i64, 1u32..28), 1..8).prop_map(
        |specs| {
            specs
                .into_iter()
                .enumerate()
                .map(|(index, (quantity, cost, day))| {
                    let quantity = Quantity::new(Decimal::new(quantity, 4));
                    CostLayer::open(
                        ItemId::new(),
                        WarehouseId::new(),
                        NaiveDate::from_ymd_opt(2024, 4, day).unwrap_or_default(),
                        index as u64,
                        quantity,
                        quantity.times(Decimal::new(cost, 2)),
                        None,
                    )
                })
                .collect()
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Allocations always add up to the requested quantity and the pool
    /// shrinks by exactly that much.
    #[test]
    fn prop_allocations_sum_to_request(
        mut layers in layers_strategy(),
        method in method_strategy(),
        fraction in 1u32..=100,
    ) {
        let on_hand = available(&layers);
        let requested = Quantity::new(
            (on_hand.value() * Decimal::from(fraction) / Decimal::ONE_HUNDRED)
                .round_dp(4)
                .max(Decimal::new(1, 4)),
        );
        prop_assume!(requested <= on_hand);

        let result = consume_layers(&mut layers, ItemId::new(), WarehouseId::new(), requested, method)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;

        let taken: Quantity = result.allocations.iter().map(|a| a.quantity_taken).sum();
        prop_assert_eq!(taken, requested);
        prop_assert_eq!(available(&layers), on_hand - requested);
    }

    /// Remaining quantities stay within `0..=original_quantity`.
    #[test]
    fn prop_remaining_within_bounds(
        mut layers in layers_strategy(),
        method in method_strategy(),
        requests in prop::collection::vec(1i64..5_000_000i64, 1..6),
    ) {
        for request in requests {
            let _ = consume_layers(
                &mut layers,
                ItemId::new(),
                WarehouseId::new(),
                Quantity::new(Decimal::new(request, 4)),
                method,
            );
            for layer in &layers {
                prop_assert!(!layer.remaining_quantity.is_negative());
                prop_assert!(layer.remaining_quantity <= layer.original_quantity);
            }
        }
    }

    /// Over-consumption fails and leaves every layer untouched.
    #[test]
    fn prop_over_consumption_is_atomic(
        mut layers in layers_strategy(),
        method in method_strategy(),
        extra in 1i64..1_000_000i64,
    ) {
        let before = layers.clone();
        let requested = available(&layers) + Quantity::new(Decimal::new(extra, 4));
        let result = consume_layers(&mut layers, ItemId::new(), WarehouseId::new(), requested, method);
        let insufficient = matches!(result, Err(ValuationError::InsufficientStock { .. }));
        prop_assert!(insufficient);
        prop_assert_eq!(layers, before);
    }

    /// Consuming everything costs the whole pool value, whatever the method.
    #[test]
    fn prop_full_consumption_costs_pool_value(
        mut layers in layers_strategy(),
        method in method_strategy(),
    ) {
        let pool_value = value_layers(&layers, method).total_value;
        let everything = available(&layers);
        let result = consume_layers(&mut layers, ItemId::new(), WarehouseId::new(), everything, method)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;

        prop_assert_eq!(result.total_cost, pool_value);
        prop_assert!(available(&layers).is_zero());
    }

    /// Issued cost plus the value still on hand always equals the value
    /// received, to the cent, and layer values stay whole cents.
    #[test]
    fn prop_issues_conserve_pool_value(
        mut layers in layers_strategy(),
        method in method_strategy(),
        requests in prop::collection::vec(1i64..5_000_000i64, 1..8),
    ) {
        let received = value_layers(&layers, method).total_value;
        let mut issued = Amount::ZERO;
        for request in requests {
            if let Ok(result) = consume_layers(
                &mut layers,
                ItemId::new(),
                WarehouseId::new(),
                Quantity::new(Decimal::new(request, 4)),
                method,
            ) {
                issued += result.total_cost;
            }
            prop_assert_eq!(issued + value_layers(&layers, method).total_value, received);
            for layer in &layers {
                prop_assert_eq!(layer.remaining_value, layer.remaining_value.round());
                prop_assert!(!layer.remaining_value.is_negative());
            }
        }
    }

    /// FIFO never charges more than LIFO when costs rise with acquisition order.
    #[test]
    fn prop_fifo_cheaper_on_rising_costs(
        quantities in prop::collection::vec(1i64..1_000i64, 2..6),
        take in 1i64..1_000i64,
    ) {
        let layers: Vec<CostLayer> = quantities
            .iter()
            .enumerate()
            .map(|(index, quantity)| {
                let quantity = Quantity::units(*quantity);
                CostLayer::open(
                    ItemId::new(),
                    WarehouseId::new(),
                    NaiveDate::from_ymd_opt(2024, 4, 1).unwrap_or_default(),
                    index as u64,
                    quantity,
                    quantity.times(Decimal::from(index as i64 + 1)),
                    None,
                )
            })
            .collect();
        let requested = Quantity::units(take);
        prop_assume!(requested <= available(&layers));

        let mut fifo_layers = layers.clone();
        let mut lifo_layers = layers;
        let fifo = consume_layers(&mut fifo_layers, ItemId::new(), WarehouseId::new(), requested, ValuationMethod::Fifo)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        let lifo = consume_layers(&mut lifo_layers, ItemId::new(), WarehouseId::new(), requested, ValuationMethod::Lifo)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert!(fifo.total_cost <= lifo.total_cost);
    }
}
