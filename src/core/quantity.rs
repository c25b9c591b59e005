//! Stock quantity calculations.
//!
//! Every chemical row stores two derived figures: the total amount received
//! (`sku * quantity`) and the stock still on the shelf
//! (`total - consumed`, never below zero). They are recomputed here before
//! every write and are never taken from caller input.

use crate::core::form::{FormValue, number_or_zero};
use serde::Serialize;

/// Derived stock figures for one chemical row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StockLevels {
    /// `sku * quantity`
    pub total_quantity: f64,
    /// `max(0, total_quantity - consumed)`
    pub actual_stock: f64,
}

/// Computes the derived stock figures from unit size, unit count and consumption.
#[must_use]
pub fn compute(sku: f64, quantity: f64, consumed: f64) -> StockLevels {
    let total_quantity = sku * quantity;
    StockLevels {
        total_quantity,
        actual_stock: (total_quantity - consumed).max(0.0),
    }
}

/// Same as [`compute`] for raw form values; anything unparseable counts as zero.
#[must_use]
pub fn compute_from_form(
    sku: Option<&FormValue>,
    quantity: Option<&FormValue>,
    consumed: Option<&FormValue>,
) -> StockLevels {
    compute(
        number_or_zero(sku),
        number_or_zero(quantity),
        number_or_zero(consumed),
    )
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_compute_stock_levels() {
        let levels = compute(500.0, 3.0, 700.0);
        assert_eq!(levels.total_quantity, 1500.0);
        assert_eq!(levels.actual_stock, 800.0);
    }

    #[test]
    fn test_actual_stock_never_negative() {
        let levels = compute(100.0, 2.0, 250.0);
        assert_eq!(levels.total_quantity, 200.0);
        assert_eq!(levels.actual_stock, 0.0);
    }

    #[test]
    fn test_zero_quantity_is_allowed() {
        let levels = compute(250.0, 0.0, 0.0);
        assert_eq!(levels.total_quantity, 0.0);
        assert_eq!(levels.actual_stock, 0.0);
    }

    #[test]
    fn test_unparseable_inputs_count_as_zero() {
        let sku = FormValue::from("abc");
        let quantity = FormValue::from(5.0);
        let levels = compute_from_form(Some(&sku), Some(&quantity), None);
        assert_eq!(levels.total_quantity, 0.0);
        assert_eq!(levels.actual_stock, 0.0);
    }

    #[test]
    fn test_text_inputs_are_parsed() {
        let sku = FormValue::from("500");
        let quantity = FormValue::from("3");
        let consumed = FormValue::from("");
        let levels = compute_from_form(Some(&sku), Some(&quantity), Some(&consumed));
        assert_eq!(levels.total_quantity, 1500.0);
        assert_eq!(levels.actual_stock, 1500.0);
    }

    #[test]
    fn test_stock_invariant_over_grid() {
        for sku in [0.0, 0.5, 1.0, 25.0, 500.0] {
            for quantity in [0.0, 1.0, 3.0, 12.0] {
                for consumed in [0.0, 10.0, 600.0, 1e6] {
                    let levels = compute(sku, quantity, consumed);
                    assert_eq!(levels.total_quantity, sku * quantity);
                    assert!(levels.actual_stock >= 0.0);
                    assert_eq!(
                        levels.actual_stock,
                        (sku * quantity - consumed).max(0.0)
                    );
                }
            }
        }
    }
}
