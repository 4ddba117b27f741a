//! PortLab Runner — orchestration on top of `portlab-core`.
//!
//! This crate provides:
//! - Serializable run configuration with content-addressed run ids
//! - CSV and synthetic price-series loading
//! - Performance metrics and the deflated Sharpe ratio estimator
//! - Single-run and parallel batch backtest entry points
//! - The time-boxed rebalance application boundary with injectable
//!   executor/publisher/queue collaborators

pub mod config;
pub mod data_loader;
pub mod deflated_sharpe;
pub mod dispatch;
pub mod export;
pub mod metrics;
pub mod runner;

pub use config::{AdapterConfig, ConfigError, RunConfig, RunId, StrategyConfig};
pub use data_loader::{load_csv, synthetic_series, LoadError};
pub use deflated_sharpe::{
    deflated_sharpe_ratio, normal_cdf, normal_ppf, DeflatedSharpeError,
};
pub use dispatch::{
    ApplyOutcome, ApplyRequest, Clock, DispatchError, EventPublisher, NoopExecutor,
    NoopPublisher, NoopQueue, OrderExecutor, QueueDispatcher, RebalanceDispatcher, SystemClock,
    DEFAULT_BUDGET, ORDERS_APPLIED_TOPIC,
};
pub use export::{write_summary_json, write_trades_csv};
pub use metrics::PerformanceMetrics;
pub use runner::{run_batch, run_single_backtest, RunError, RunSummary, SCHEMA_VERSION};
