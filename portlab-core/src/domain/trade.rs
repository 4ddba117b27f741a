//! Trade — a completed round-trip produced by a backtest adapter.

use serde::{Deserialize, Serialize};

/// A complete round-trip trade: entry bar → exit bar.
///
/// `net_pnl` is already net of the cost charge taken at entry; the raw move
/// is `(exit_price - entry_price) * quantity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub entry_bar: usize,
    pub exit_bar: usize,
    pub quantity: f64,
    pub entry_price: f64,
    pub exit_price: f64,
    pub net_pnl: f64,
}

impl Trade {
    /// Return on the trade as a fraction of entry cost.
    pub fn return_pct(&self) -> f64 {
        if self.entry_price == 0.0 || self.quantity == 0.0 {
            return 0.0;
        }
        self.net_pnl / (self.entry_price * self.quantity)
    }

    pub fn is_winner(&self) -> bool {
        self.net_pnl > 0.0
    }

    /// Bars between entry and exit.
    pub fn bars_held(&self) -> usize {
        self.exit_bar - self.entry_bar
    }
}
