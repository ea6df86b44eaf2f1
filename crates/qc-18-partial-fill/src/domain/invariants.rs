//! # Domain Invariants
//!
//! Amount rules and partial-order id format.

use super::errors::FillError;

/// Tolerance for `sum(partials) == total`.
pub const AMOUNT_TOLERANCE: f64 = 1e-6;

const PARTIAL_SEPARATOR: &str = "_partial_";

/// Invariant: amounts are finite, positive and sum to the total.
pub fn invariant_amounts_balance(
    total_amount: f64,
    partial_amounts: &[f64],
    tolerance: f64,
) -> Result<(), FillError> {
    if !total_amount.is_finite() || total_amount <= 0.0 {
        return Err(FillError::InvalidAmount(format!(
            "total amount {total_amount} must be finite and positive"
        )));
    }
    if partial_amounts.is_empty() {
        return Err(FillError::InvalidAmount(
            "at least one partial amount is required".into(),
        ));
    }
    if let Some(bad) = partial_amounts
        .iter()
        .find(|a| !a.is_finite() || **a <= 0.0)
    {
        return Err(FillError::InvalidAmount(format!(
            "partial amount {bad} must be finite and positive"
        )));
    }

    let sum: f64 = partial_amounts.iter().sum();
    if (sum - total_amount).abs() > tolerance {
        return Err(FillError::AmountMismatch {
            expected: total_amount,
            actual: sum,
        });
    }
    Ok(())
}

/// `{orderId}_partial_{index}`
pub fn partial_order_id(order_id: &str, index: usize) -> String {
    format!("{order_id}{PARTIAL_SEPARATOR}{index}")
}

/// Split a partial-order id into its order id and index.
pub fn parse_partial_order_id(partial_order_id: &str) -> Option<(&str, usize)> {
    let (order_id, index) = partial_order_id.rsplit_once(PARTIAL_SEPARATOR)?;
    if order_id.is_empty() {
        return None;
    }
    Some((order_id, index.parse().ok()?))
}
