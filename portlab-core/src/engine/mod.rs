//! Backtest engine — adapter delegation plus uniform risk post-processing.
//!
//! The engine owns the price series and the active adapter. Each `run`:
//! 1. delegates trade generation entirely to the adapter;
//! 2. applies the drawdown-stop truncation, if configured, identically
//!    regardless of which adapter produced the result.

pub mod adapter;
pub mod bar_loop;
pub mod result;
pub mod vectorized;

pub use adapter::BacktestAdapter;
pub use bar_loop::BarLoopAdapter;
pub use result::BacktestResult;
pub use vectorized::VectorizedAdapter;

use thiserror::Error;

use crate::domain::{validate_series, Bar};
use crate::risk::{CostModel, RiskModel};
use crate::signal::{SignalError, Strategy};

/// Errors from engine construction or a run.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("bar dates must be strictly increasing (violation at index {0})")]
    UnorderedSeries(usize),

    #[error(transparent)]
    Signal(#[from] SignalError),
}

/// High-level engine delegating execution to an adapter.
///
/// Stateless across runs: every call owns its inputs and produces a fresh
/// result, so identical strategy/cost/risk arguments always yield the same
/// output.
pub struct BacktestEngine {
    bars: Vec<Bar>,
    adapter: Box<dyn BacktestAdapter>,
    init_cash: f64,
}

impl std::fmt::Debug for BacktestEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BacktestEngine")
            .field("bars", &self.bars.len())
            .field("adapter", &self.adapter.name())
            .field("init_cash", &self.init_cash)
            .finish()
    }
}

impl BacktestEngine {
    /// Build an engine over a validated price series.
    pub fn new(
        bars: Vec<Bar>,
        adapter: Box<dyn BacktestAdapter>,
        init_cash: f64,
    ) -> Result<Self, EngineError> {
        validate_series(&bars).map_err(EngineError::UnorderedSeries)?;
        Ok(Self {
            bars,
            adapter,
            init_cash,
        })
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn adapter_name(&self) -> &str {
        self.adapter.name()
    }

    /// Run a strategy under the given cost and risk constraints.
    ///
    /// If the risk model carries a drawdown stop and the equity curve
    /// breaches it, every series is cut at the first breaching index —
    /// trading after that point never happened.
    pub fn run(
        &self,
        strategy: &dyn Strategy,
        cost: &CostModel,
        risk: &RiskModel,
    ) -> Result<BacktestResult, EngineError> {
        let mut result = self
            .adapter
            .run(strategy, &self.bars, cost, risk, self.init_cash)?;
        if let Some(stop_index) = risk.first_breach(&result.equity_curve) {
            result.truncate_at(stop_index);
        }
        Ok(result)
    }
}
