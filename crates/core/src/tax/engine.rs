//! Tax split and document totals.

use bahi_shared::types::Amount;
use rust_decimal::Decimal;

use super::types::{DocumentTotals, Jurisdiction, SupplyType, TaxBreakdown, TaxError};
use crate::document::LineItem;

const TWO: Decimal = Decimal::TWO;

/// Splits tax on `amount` at `rate_percent` for the given supply type.
///
/// The result is not rounded. A missing or zero rate yields
/// [`TaxBreakdown::ZERO`].
///
/// # Errors
///
/// Returns `InvalidRate` if the rate is outside `0..=100` and
/// `NegativeAmount` if the amount is negative.
pub fn split_tax(
    amount: Amount,
    rate_percent: Option<Decimal>,
    supply: SupplyType,
) -> Result<TaxBreakdown, TaxError> {
    let Some(rate) = rate_percent else {
        return Ok(TaxBreakdown::ZERO);
    };
    validate_rate(rate)?;
    if amount.is_negative() {
        return Err(TaxError::NegativeAmount(amount));
    }
    if rate.is_zero() {
        return Ok(TaxBreakdown::ZERO);
    }

    Ok(match supply {
        SupplyType::IntraState => {
            let half = amount.percent(rate / TWO);
            TaxBreakdown {
                cgst: half,
                sgst: half,
                igst: Amount::ZERO,
            }
        }
        SupplyType::InterState => TaxBreakdown {
            cgst: Amount::ZERO,
            sgst: Amount::ZERO,
            igst: amount.percent(rate),
        },
    })
}

/// Splits tax on one line amount between two parties.
///
/// # Errors
///
/// See [`split_tax`].
pub fn split_line_tax(
    amount: Amount,
    rate_percent: Option<Decimal>,
    seller: &Jurisdiction,
    buyer: &Jurisdiction,
) -> Result<TaxBreakdown, TaxError> {
    split_tax(amount, rate_percent, SupplyType::between(seller, buyer))
}

/// Computes a document's totals from its lines.
///
/// Line values and line taxes are summed unrounded; the subtotal and each
/// tax component are rounded once, and the total is their exact sum. This is
/// the only place document totals are computed.
///
/// `supply` may be `None` when the counterparty has no known jurisdiction;
/// that is only an error if some line actually carries tax.
///
/// # Errors
///
/// - `InvalidLine` for a non-positive quantity or a negative unit price
/// - `InvalidRate` for a rate outside `0..=100`
/// - `MissingJurisdiction` for a taxable line without a supply type
pub fn compute_totals(
    lines: &[LineItem],
    supply: Option<SupplyType>,
) -> Result<DocumentTotals, TaxError> {
    let mut subtotal = Amount::ZERO;
    let mut stock_subtotal = Amount::ZERO;
    let mut tax = TaxBreakdown::ZERO;

    for (index, line) in lines.iter().enumerate() {
        let number = index + 1;
        if !line.quantity.is_positive() {
            return Err(TaxError::InvalidLine {
                line: number,
                reason: format!("quantity must be positive, got {}", line.quantity),
            });
        }
        if line.unit_price < Decimal::ZERO {
            return Err(TaxError::InvalidLine {
                line: number,
                reason: format!("unit price cannot be negative, got {}", line.unit_price),
            });
        }

        let value = line.value();
        subtotal += value;
        if line.stock.is_some() {
            stock_subtotal += value;
        }

        let taxable = line.tax_rate.is_some_and(|rate| !rate.is_zero());
        let line_tax = match supply {
            Some(supply) => split_tax(value, line.tax_rate, supply)?,
            None if taxable => {
                if let Some(rate) = line.tax_rate {
                    validate_rate(rate)?;
                }
                return Err(TaxError::MissingJurisdiction { line: number });
            }
            None => TaxBreakdown::ZERO,
        };
        tax = tax + line_tax;
    }

    let subtotal = subtotal.round();
    let tax = tax.round();
    Ok(DocumentTotals {
        subtotal,
        stock_subtotal: stock_subtotal.round(),
        tax,
        total: subtotal + tax.total(),
    })
}

fn validate_rate(rate: Decimal) -> Result<(), TaxError> {
    if rate < Decimal::ZERO || rate > Decimal::ONE_HUNDRED {
        return Err(TaxError::InvalidRate(rate));
    }
    Ok(())
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
