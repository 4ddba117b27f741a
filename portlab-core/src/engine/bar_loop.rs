//! Bar-by-bar adapter — walks the series once, tracking the open position.

use crate::domain::{Bar, Trade};
use crate::engine::adapter::BacktestAdapter;
use crate::engine::result::{assemble_result, BacktestResult};
use crate::risk::{CostModel, RiskModel};
use crate::signal::{SignalError, SignalSeries, Strategy};

/// Native-loop execution substrate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BarLoopAdapter;

impl BacktestAdapter for BarLoopAdapter {
    fn name(&self) -> &str {
        "bar_loop"
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
        let size = risk.position_size();
        let mut trades: Vec<Trade> = Vec::new();
        let mut open: Option<(usize, f64)> = None; // (entry bar, entry price)

        for (i, bar) in bars.iter().enumerate() {
            match open {
                None if signals.entries[i] => {
                    open = Some((i, bar.close));
                }
                Some((entry_bar, entry_price)) if signals.exits[i] => {
                    trades.push(close_trade(
                        entry_bar,
                        entry_price,
                        i,
                        bar.close,
                        size,
                        cost,
                    ));
                    open = None;
                }
                _ => {}
            }
        }

        // Forced liquidation of a position left open at series end.
        if let (Some((entry_bar, entry_price)), Some(last)) = (open, bars.last()) {
            trades.push(close_trade(
                entry_bar,
                entry_price,
                bars.len() - 1,
                last.close,
                size,
                cost,
            ));
        }

        Ok(assemble_result(bars.len(), init_cash, trades))
    }
}

fn close_trade(
    entry_bar: usize,
    entry_price: f64,
    exit_bar: usize,
    exit_price: f64,
    size: f64,
    cost: &CostModel,
) -> Trade {
    let raw_pnl = (exit_price - entry_price) * size;
    Trade {
        entry_bar,
        exit_bar,
        quantity: size,
        entry_price,
        exit_price,
        net_pnl: raw_pnl - cost.charge(entry_price, size),
    }
}
