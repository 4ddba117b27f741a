//! Serializable run configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use portlab_core::{
    BacktestAdapter, BarLoopAdapter, BuyAndHold, CostModel, MaCrossover, RiskModel, SignalTable,
    Strategy, VectorizedAdapter,
};

/// Unique identifier for a run (content-addressable hash).
pub type RunId = String;

/// Errors from loading or decoding a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Serializable configuration for a single backtest run.
///
/// Captures everything needed to reproduce the run: strategy, adapter,
/// cost and risk parameters, and initial cash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunConfig {
    pub strategy: StrategyConfig,
    #[serde(default)]
    pub adapter: AdapterConfig,
    #[serde(default)]
    pub cost: CostModel,
    #[serde(default)]
    pub risk: RiskModel,
    #[serde(default = "default_init_cash")]
    pub init_cash: f64,
}

fn default_init_cash() -> f64 {
    100.0
}

impl RunConfig {
    /// Parse a TOML config file.
    pub fn from_toml_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    /// Deterministic content-addressed id for this configuration.
    ///
    /// Two runs with identical configs share a RunId, which makes results
    /// directly comparable across sessions.
    pub fn run_id(&self) -> RunId {
        let json = serde_json::to_string(self).expect("RunConfig serialization failed");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }

    /// Instantiate the configured strategy.
    pub fn build_strategy(&self) -> Box<dyn Strategy> {
        match &self.strategy {
            StrategyConfig::MaCrossover { short, long } => {
                Box::new(MaCrossover::new(*short, *long))
            }
            StrategyConfig::BuyAndHold => Box::new(BuyAndHold),
            StrategyConfig::Table { entries, exits } => {
                Box::new(SignalTable::new(entries.clone(), exits.clone()))
            }
        }
    }

    /// Instantiate the configured adapter.
    pub fn build_adapter(&self) -> Box<dyn BacktestAdapter> {
        match self.adapter {
            AdapterConfig::BarLoop => Box::new(BarLoopAdapter),
            AdapterConfig::Vectorized => Box::new(VectorizedAdapter),
        }
    }
}

/// Strategy configuration (serializable enum).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StrategyConfig {
    /// Moving average crossover: short SMA crosses the long SMA.
    MaCrossover { short: usize, long: usize },

    /// Always long from the first bar.
    BuyAndHold,

    /// Precomputed entry/exit signal table.
    Table { entries: Vec<bool>, exits: Vec<bool> },
}

/// Which execution substrate runs the backtest.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AdapterConfig {
    #[default]
    BarLoop,
    Vectorized,
}
