//! Adapter contract — a concrete execution substrate for one backtest run.

use crate::domain::Bar;
use crate::engine::result::BacktestResult;
use crate::risk::{CostModel, RiskModel};
use crate::signal::{SignalError, Strategy};

/// Trait for backtest adapters.
///
/// Every adapter translates the same inputs — strategy signals, cost model,
/// risk caps, initial cash — into the same outputs over its own execution
/// substrate. Adapters must be interchangeable: identical inputs produce
/// identical trade lists, pnl, and equity curves regardless of which
/// adapter ran.
///
/// Shared fill semantics:
/// - At most one open position; entries while a position is open are ignored.
/// - A bar's entry wish is considered before its exit wish, gated on being
///   flat — so a bar carrying both signals opens when flat and closes when
///   already long.
/// - Fills happen at the bar's close; size is `risk.position_size()`.
/// - The cost charge is taken once per trade at the entry price.
/// - A position still open after the final bar is liquidated at the final
///   close.
pub trait BacktestAdapter: Send + Sync {
    /// Human-readable name (e.g., "bar_loop").
    fn name(&self) -> &str;

    /// Run the strategy over the bar series.
    fn run(
        &self,
        strategy: &dyn Strategy,
        bars: &[Bar],
        cost: &CostModel,
        risk: &RiskModel,
        init_cash: f64,
    ) -> Result<BacktestResult, SignalError>;
}
