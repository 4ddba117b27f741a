//! Vectorized adapter — pairs trades over the signal index sets.
//!
//! Instead of walking every bar, this substrate collects the indices where
//! each signal fires and pairs them with a two-pointer merge: the exit for
//! an entry is the first exit candidate strictly after it, and the next
//! entry is the first candidate strictly after that exit. Work is
//! proportional to the number of signals, not the number of bars, and the
//! outcome is identical to the bar-by-bar substrate by construction.

use crate::domain::{Bar, Trade};
use crate::engine::adapter::BacktestAdapter;
use crate::engine::result::{assemble_result, BacktestResult};
use crate::risk::{CostModel, RiskModel};
use crate::signal::{SignalError, SignalSeries, Strategy};

/// Signal-driven batch execution substrate.
#[derive(Debug, Clone, Copy, Default)]
pub struct VectorizedAdapter;

impl BacktestAdapter for VectorizedAdapter {
    fn name(&self) -> &str {
        "vectorized"
    }

    fn run(
        &self,
        strategy: &dyn Strategy,
        bars: &[Bar],
        cost: &CostModel,
        risk: &RiskModel,
        init_cash: f64,
    ) -> Result<BacktestResult, SignalError> {
        let signals = SignalSeries::from_strategy(strategy, bars)?;
        let trades = pair_trades(bars, &signals, cost, risk.position_size());
        Ok(assemble_result(bars.len(), init_cash, trades))
    }
}

/// Merge entry and exit candidate indices into a trade list.
fn pair_trades(bars: &[Bar], signals: &SignalSeries, cost: &CostModel, size: f64) -> Vec<Trade> {
    if bars.is_empty() {
        return Vec::new();
    }
    let entry_idx: Vec<usize> = indices_of(&signals.entries);
    let exit_idx: Vec<usize> = indices_of(&signals.exits);
    let last_bar = bars.len() - 1;

    let mut trades = Vec::new();
    let mut e = 0;
    let mut x = 0;
    while e < entry_idx.len() {
        let entry_bar = entry_idx[e];
        // The exit must come strictly after the entry bar.
        while x < exit_idx.len() && exit_idx[x] <= entry_bar {
            x += 1;
        }
        // No exit left: the position is liquidated on the final bar.
        let exit_bar = exit_idx.get(x).copied().unwrap_or(last_bar);

        let entry_price = bars[entry_bar].close;
        let exit_price = bars[exit_bar].close;
        let raw_pnl = (exit_price - entry_price) * size;
        trades.push(Trade {
            entry_bar,
            exit_bar,
            quantity: size,
            entry_price,
            exit_price,
            net_pnl: raw_pnl - cost.charge(entry_price, size),
        });

        // Entries up to and including the exit bar belong to the closed
        // position and are ignored.
        e += 1;
        while e < entry_idx.len() && entry_idx[e] <= exit_bar {
            e += 1;
        }
    }
    trades
}

fn indices_of(flags: &[bool]) -> Vec<usize> {
    flags
        .iter()
        .enumerate()
        .filter_map(|(i, &f)| f.then_some(i))
        .collect()
}
