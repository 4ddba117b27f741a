//! Backtest runner — wires together config, engine, and statistics.
//!
//! Two entry points:
//! - `run_single_backtest()`: one config, one bar series, one summary.
//! - `run_batch()`: independent configs evaluated in parallel; each call
//!   owns its inputs, so rayon can fan them out without coordination.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use portlab_core::{Bar, BacktestEngine, EngineError, Trade};

use crate::config::{RunConfig, RunId};
use crate::deflated_sharpe::{deflated_sharpe_ratio, DeflatedSharpeError};
use crate::metrics::{periodic_returns, PerformanceMetrics};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
}

/// Current schema version for persisted summaries.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of a single backtest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: RunId,
    pub strategy: String,
    pub adapter: String,
    pub init_cash: f64,
    pub bar_count: usize,
    pub metrics: PerformanceMetrics,
    /// Probability the observed Sharpe is not luck; None when the run is
    /// too short to estimate (fewer than three bars of equity).
    pub deflated_sharpe: Option<f64>,
    pub trades: Vec<Trade>,
    pub pnl: Vec<f64>,
    pub equity_curve: Vec<f64>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Run a single backtest described by `config` over `bars`.
pub fn run_single_backtest(config: &RunConfig, bars: &[Bar]) -> Result<RunSummary, RunError> {
    let strategy = config.build_strategy();
    let adapter = config.build_adapter();
    let adapter_name = adapter.name().to_string();

    let engine = BacktestEngine::new(bars.to_vec(), adapter, config.init_cash)?;
    let result = engine.run(strategy.as_ref(), &config.cost, &config.risk)?;

    let metrics = PerformanceMetrics::compute(&result.equity_curve, &result.trades);
    let returns = periodic_returns(&result.equity_curve);
    let deflated_sharpe = match deflated_sharpe_ratio(&returns, 1) {
        Ok(p) => Some(p),
        Err(DeflatedSharpeError::TooFewObservations(_)) => None,
        Err(DeflatedSharpeError::ZeroTrials) => unreachable!("trials is fixed at 1"),
    };

    Ok(RunSummary {
        schema_version: SCHEMA_VERSION,
        run_id: config.run_id(),
        strategy: strategy.name().to_string(),
        adapter: adapter_name,
        init_cash: config.init_cash,
        bar_count: bars.len(),
        metrics,
        deflated_sharpe,
        trades: result.trades,
        pnl: result.pnl,
        equity_curve: result.equity_curve,
    })
}

/// Run many independent configs over the same series, in parallel.
///
/// Results come back in config order regardless of scheduling.
pub fn run_batch(configs: &[RunConfig], bars: &[Bar]) -> Vec<Result<RunSummary, RunError>> {
    configs
        .par_iter()
        .map(|config| run_single_backtest(config, bars))
        .collect()
}
