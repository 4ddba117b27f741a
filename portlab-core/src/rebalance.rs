//! Rebalance simulator — holdings + target weights → minimal order list.
//!
//! Only symbols whose deviation from target exceeds the tolerance band
//! trade, and only by a whole number of lots. Symbols with a zero target
//! never trade: this simulator does not emit liquidation orders for
//! positions the targets no longer mention.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Order;

/// Current holdings: symbol → quantity (or weight, in the same unit as the
/// targets). Absent symbols count as zero.
pub type Holdings = HashMap<String, f64>;

/// One target allocation entry.
///
/// Targets travel as an ordered list rather than a map so the emitted order
/// list is deterministic in both content and sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetWeight {
    pub symbol: String,
    pub weight: f64,
}

impl TargetWeight {
    pub fn new(symbol: impl Into<String>, weight: f64) -> Self {
        Self {
            symbol: symbol.into(),
            weight,
        }
    }
}

/// Errors from a rebalance simulation.
#[derive(Debug, Error, PartialEq)]
pub enum RebalanceError {
    #[error("tolerance must be finite and non-negative, got {0}")]
    InvalidTolerance(f64),
}

/// Round a quantity toward zero to the nearest multiple of `lot`.
///
/// `lot <= 0` disables rounding.
pub fn lot_sized(quantity: f64, lot: f64) -> f64 {
    if lot <= 0.0 {
        return quantity;
    }
    (quantity / lot).trunc() * lot
}

/// Simulate a rebalance: one pass over `targets`, in their given order.
///
/// Per target:
/// - weight exactly 0 → skipped;
/// - `diff = target - current`, `band = |diff| / target`;
/// - `band < tolerance` → inside the no-trade zone, no order;
/// - otherwise `diff` is lot-rounded toward zero and emitted if non-zero.
pub fn simulate(
    holdings: &Holdings,
    targets: &[TargetWeight],
    tolerance: f64,
    lot: f64,
) -> Result<Vec<Order>, RebalanceError> {
    if !tolerance.is_finite() || tolerance < 0.0 {
        return Err(RebalanceError::InvalidTolerance(tolerance));
    }

    let mut orders = Vec::new();
    for target in targets {
        if target.weight == 0.0 {
            continue;
        }
        let current = holdings.get(&target.symbol).copied().unwrap_or(0.0);
        let diff = target.weight - current;
        let band = diff.abs() / target.weight;
        if band < tolerance {
            continue;
        }
        let quantity = lot_sized(diff, lot);
        if quantity != 0.0 {
            orders.push(Order::new(target.symbol.clone(), quantity));
        }
    }
    Ok(orders)
}
