//! Backtest result — three parallel series indexed to the bar series.

use serde::{Deserialize, Serialize};

use crate::domain::Trade;

/// Result of a complete backtest run.
///
/// `pnl`, `equity_curve`, and the bar indices inside `trades` share one
/// index space with the input bar series. The series may be shorter than
/// the input when a drawdown stop truncated the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Realized pnl booked at each bar (non-zero only on exit bars).
    pub pnl: Vec<f64>,
    /// Equity value at each bar close; starts at the initial cash.
    pub equity_curve: Vec<f64>,
    /// Completed round-trip trades in exit order.
    pub trades: Vec<Trade>,
}

impl BacktestResult {
    /// Flat result: no trades, equity pinned at `init_cash` for every bar.
    pub fn flat(bar_count: usize, init_cash: f64) -> Self {
        Self {
            pnl: vec![0.0; bar_count],
            equity_curve: vec![init_cash; bar_count],
            trades: Vec::new(),
        }
    }

    pub fn final_equity(&self) -> Option<f64> {
        self.equity_curve.last().copied()
    }

    /// Truncate all series to `0..=stop_index` and drop trades exiting later.
    pub fn truncate_at(&mut self, stop_index: usize) {
        self.pnl.truncate(stop_index + 1);
        self.equity_curve.truncate(stop_index + 1);
        self.trades.retain(|t| t.exit_bar <= stop_index);
    }
}

/// Build the pnl and equity series from a trade list.
///
/// Equity is a step function: it starts at `init_cash` and steps to the new
/// cash level on each trade's exit bar, holding there until the next exit.
/// Trades must be ordered by exit bar (adapters produce them that way).
pub(crate) fn assemble_result(
    bar_count: usize,
    init_cash: f64,
    trades: Vec<Trade>,
) -> BacktestResult {
    let mut pnl = vec![0.0; bar_count];
    let mut equity_curve = vec![init_cash; bar_count];
    let mut cash = init_cash;
    for trade in &trades {
        pnl[trade.exit_bar] += trade.net_pnl;
        cash += trade.net_pnl;
        for eq in equity_curve.iter_mut().skip(trade.exit_bar) {
            *eq = cash;
        }
    }
    BacktestResult {
        pnl,
        equity_curve,
        trades,
    }
}
