//! Order — a signed rebalance instruction for a single symbol.

use serde::{Deserialize, Serialize};

/// Direction of an order, derived from the sign of its quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

/// A lot-sized order produced by the rebalance simulator.
///
/// Quantity is signed: positive buys, negative sells. Zero-quantity orders
/// are never emitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub symbol: String,
    pub quantity: f64,
}

impl Order {
    pub fn new(symbol: impl Into<String>, quantity: f64) -> Self {
        Self {
            symbol: symbol.into(),
            quantity,
        }
    }

    pub fn side(&self) -> OrderSide {
        if self.quantity >= 0.0 {
            OrderSide::Buy
        } else {
            OrderSide::Sell
        }
    }
}
