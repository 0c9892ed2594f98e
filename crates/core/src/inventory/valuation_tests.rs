use super::*;
use chrono::NaiveDate;
use rust_decimal_macros::dec;

fn layer(day: u32, sequence: u64, quantity: i64, unit_cost: Decimal) -> CostLayer {
    valued(day, sequence, quantity, Quantity::units(quantity).times(unit_cost))
}

fn valued(day: u32, sequence: u64, quantity: i64, value: Amount) -> CostLayer {
    CostLayer::open(
        ItemId::new(),
        WarehouseId::new(),
        NaiveDate::from_ymd_opt(2024, 4, day).unwrap(),
        sequence,
        Quantity::units(quantity),
        value,
        None,
    )
}

fn pool() -> Vec<CostLayer> {
    vec![layer(1, 1, 10, dec!(5)), layer(2, 2, 10, dec!(6))]
}

fn consume(
    layers: &mut [CostLayer],
    quantity: i64,
    method: ValuationMethod,
) -> Result<Consumption, ValuationError> {
    consume_layers(
        layers,
        ItemId::new(),
        WarehouseId::new(),
        Quantity::units(quantity),
        method,
    )
}

#[test]
fn test_fifo_consumes_oldest_first() {
    let mut layers = pool();
    let result = consume(&mut layers, 15, ValuationMethod::Fifo).unwrap();
    assert_eq!(result.total_cost, Amount::new(dec!(80)));
    assert_eq!(result.allocations.len(), 2);
    assert_eq!(layers[0].remaining_quantity, Quantity::ZERO);
    assert_eq!(layers[1].remaining_quantity, Quantity::units(5));
    assert_eq!(layers[1].unit_cost, dec!(6));
}

#[test]
fn test_lifo_consumes_newest_first() {
    let mut layers = pool();
    let result = consume(&mut layers, 15, ValuationMethod::Lifo).unwrap();
    assert_eq!(result.total_cost, Amount::new(dec!(85)));
    assert_eq!(layers[0].remaining_quantity, Quantity::units(5));
    assert_eq!(layers[0].unit_cost, dec!(5));
    assert_eq!(layers[1].remaining_quantity, Quantity::ZERO);
}

#[test]
fn test_weighted_average_pools_cost() {
    let mut layers = pool();
    assert_eq!(weighted_average_cost(&layers), Some(dec!(5.5)));
    let result = consume(&mut layers, 15, ValuationMethod::WeightedAverage).unwrap();
    assert_eq!(result.total_cost, Amount::new(dec!(82.50)));
    assert!(result.allocations.iter().all(|a| a.unit_cost == dec!(5.5)));
    assert_eq!(available(&layers), Quantity::units(5));
    let valuation = value_layers(&layers, ValuationMethod::WeightedAverage);
    assert_eq!(valuation.total_value, Amount::new(dec!(27.50)));
}

#[test]
fn test_same_date_breaks_ties_by_sequence() {
    let mut layers = vec![layer(1, 2, 10, dec!(7)), layer(1, 1, 10, dec!(3))];
    let result = consume(&mut layers, 5, ValuationMethod::Fifo).unwrap();
    assert_eq!(result.total_cost, Amount::new(dec!(15)));
}

#[test]
fn test_insufficient_stock_leaves_layers_unchanged() {
    let mut layers = pool();
    let before = layers.clone();
    let err = consume(&mut layers, 21, ValuationMethod::WeightedAverage).unwrap_err();
    match err {
        ValuationError::InsufficientStock {
            requested,
            available,
            ..
        } => {
            assert_eq!(requested, Quantity::units(21));
            assert_eq!(available, Quantity::units(20));
        }
        other => panic!("expected InsufficientStock, got {other:?}"),
    }
    assert_eq!(layers, before);
}

#[test]
fn test_fully_consumed_layers_are_skipped() {
    let mut layers = pool();
    consume(&mut layers, 10, ValuationMethod::Fifo).unwrap();
    let result = consume(&mut layers, 2, ValuationMethod::Fifo).unwrap();
    assert_eq!(result.allocations[0].layer_id, layers[1].id);
    assert_eq!(consumption_order(&layers, ValuationMethod::Fifo), vec![1]);
}

#[test]
fn test_fractional_quantities() {
    let mut layers = vec![layer(1, 1, 1, dec!(120))];
    let result = consume_layers(
        &mut layers,
        ItemId::new(),
        WarehouseId::new(),
        Quantity::new(dec!(0.25)),
        ValuationMethod::Fifo,
    )
    .unwrap();
    assert_eq!(result.total_cost, Amount::new(dec!(30)));
    assert_eq!(layers[0].remaining_quantity, Quantity::new(dec!(0.75)));
}

#[test]
fn test_zero_quantity_rejected() {
    let mut layers = pool();
    assert!(matches!(
        consume(&mut layers, 0, ValuationMethod::Fifo),
        Err(ValuationError::InvalidQuantity(_))
    ));
}

#[test]
fn test_sub_cent_fifo_layer_empties_exactly() {
    let mut layers = vec![valued(1, 1, 3, Amount::new(dec!(1.01)))];
    let costs: Vec<Amount> = (0..3)
        .map(|_| consume(&mut layers, 1, ValuationMethod::Fifo).unwrap().total_cost)
        .collect();

    assert_eq!(costs, vec![
        Amount::new(dec!(0.34)),
        Amount::new(dec!(0.34)),
        Amount::new(dec!(0.33)),
    ]);
    assert_eq!(layers[0].remaining_value, Amount::ZERO);
}

#[test]
fn test_sub_cent_average_charges_whole_pool() {
    let mut layers = vec![
        valued(1, 1, 1, Amount::new(dec!(1))),
        valued(2, 2, 2, Amount::new(dec!(4))),
    ];
    let mut charged = Amount::ZERO;
    for _ in 0..3 {
        let result = consume(&mut layers, 1, ValuationMethod::WeightedAverage).unwrap();
        charged += result.total_cost;
        assert_eq!(charged + pool_value(&layers), Amount::new(dec!(5)));
    }
    assert_eq!(charged, Amount::new(dec!(5)));
    assert!(available(&layers).is_zero());
}

#[test]
fn test_average_leaves_layer_values_in_cents() {
    let mut layers = vec![
        valued(1, 1, 3, Amount::new(dec!(10))),
        valued(2, 2, 3, Amount::new(dec!(11))),
    ];
    consume(&mut layers, 2, ValuationMethod::WeightedAverage).unwrap();
    for layer in &layers {
        assert_eq!(layer.remaining_value, layer.remaining_value.round());
    }
    assert_eq!(pool_value(&layers), Amount::new(dec!(14)));
}

#[test]
fn test_validate_receipt() {
    assert!(validate_receipt(Quantity::units(1), Amount::ZERO).is_ok());
    assert!(validate_receipt(Quantity::units(1), Amount::new(dec!(-1))).is_err());
    assert!(validate_receipt(Quantity::ZERO, Amount::new(dec!(1))).is_err());
}
