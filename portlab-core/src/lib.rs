//! PortLab Core — backtest engine, rebalance simulator, domain types.
//!
//! This crate contains the pure computational heart of the system:
//! - Domain types (bars, trades, orders)
//! - Strategy trait with entry/exit signal series
//! - Cost and risk models
//! - Two interchangeable backtest adapters (bar loop, vectorized) behind
//!   one contract, orchestrated by an engine that applies the drawdown
//!   stop uniformly
//! - Tolerance-band, lot-sized rebalance simulation
//!
//! No I/O happens here; loading, orchestration, and dispatch live in
//! `portlab-runner`.

pub mod domain;
pub mod engine;
pub mod rebalance;
pub mod risk;
pub mod signal;

pub use domain::{Bar, Order, OrderSide, Trade};
pub use engine::{
    BacktestAdapter, BacktestEngine, BacktestResult, BarLoopAdapter, EngineError,
    VectorizedAdapter,
};
pub use rebalance::{lot_sized, simulate, Holdings, RebalanceError, TargetWeight};
pub use risk::{CostModel, RiskModel};
pub use signal::{BuyAndHold, MaCrossover, SignalError, SignalSeries, SignalTable, Strategy};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: core types are Send + Sync, so independent
    /// backtest and rebalance calls can run on worker threads freely.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<Bar>();
        require_sync::<Bar>();
        require_send::<Trade>();
        require_sync::<Trade>();
        require_send::<Order>();
        require_sync::<Order>();
        require_send::<CostModel>();
        require_sync::<CostModel>();
        require_send::<RiskModel>();
        require_sync::<RiskModel>();
        require_send::<BacktestResult>();
        require_sync::<BacktestResult>();
        require_send::<SignalSeries>();
        require_sync::<SignalSeries>();
        require_send::<TargetWeight>();
        require_sync::<TargetWeight>();
        require_send::<BacktestEngine>();
        require_sync::<BacktestEngine>();
    }
}
