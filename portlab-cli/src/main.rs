//! PortLab CLI — backtest, rebalance, and statistics commands.
//!
//! Commands:
//! - `backtest` — run a strategy from a TOML config over a CSV price series
//! - `rebalance` — simulate tolerance-band orders, optionally apply them
//! - `dsr` — deflated Sharpe ratio for a return series

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use portlab_core::rebalance::{simulate, TargetWeight};
use portlab_runner::dispatch::{ApplyRequest, RebalanceDispatcher};
use portlab_runner::{
    deflated_sharpe_ratio, load_csv, run_single_backtest, synthetic_series, write_summary_json,
    write_trades_csv, RunConfig,
};

#[derive(Parser)]
#[command(name = "portlab", about = "PortLab CLI — strategy backtesting and rebalancing")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a backtest from a TOML config file over a CSV price series.
    Backtest {
        /// Path to a TOML run config.
        #[arg(long)]
        config: PathBuf,

        /// CSV price series (date,open,high,low,close,volume).
        #[arg(long)]
        data: Option<PathBuf>,

        /// Use a seeded synthetic series instead of a CSV file.
        #[arg(long)]
        synthetic: Option<u64>,

        /// Number of synthetic bars to generate.
        #[arg(long, default_value_t = 504)]
        bars: usize,

        /// Directory for result artifacts (summary JSON + trades CSV).
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Simulate a rebalance; optionally apply the resulting orders.
    Rebalance {
        /// JSON file: {"SYMBOL": quantity, ...}.
        #[arg(long)]
        holdings: PathBuf,

        /// JSON file: [{"symbol": "...", "weight": ...}, ...].
        #[arg(long)]
        targets: PathBuf,

        /// No-trade band as a fraction of the target weight.
        #[arg(long, default_value_t = 0.05)]
        tolerance: f64,

        /// Minimum tradable increment (0 disables rounding).
        #[arg(long, default_value_t = 0.0)]
        lot: f64,

        /// Apply the simulated orders through the dispatch boundary.
        #[arg(long, default_value_t = false)]
        apply: bool,

        /// Wall-clock budget for a synchronous apply, in milliseconds.
        #[arg(long, default_value_t = 9000)]
        budget_ms: u64,
    },
    /// Deflated Sharpe ratio for a return series.
    Dsr {
        /// File with one return per line.
        #[arg(long)]
        returns: PathBuf,

        /// Number of strategy variations that were tried.
        #[arg(long, default_value_t = 1)]
        trials: u32,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Backtest {
            config,
            data,
            synthetic,
            bars,
            out,
        } => run_backtest_cmd(&config, data.as_deref(), synthetic, bars, out.as_deref()),
        Commands::Rebalance {
            holdings,
            targets,
            tolerance,
            lot,
            apply,
            budget_ms,
        } => run_rebalance_cmd(&holdings, &targets, tolerance, lot, apply, budget_ms),
        Commands::Dsr { returns, trials } => run_dsr_cmd(&returns, trials),
    }
}

fn run_backtest_cmd(
    config_path: &std::path::Path,
    data: Option<&std::path::Path>,
    synthetic: Option<u64>,
    bar_count: usize,
    out: Option<&std::path::Path>,
) -> Result<()> {
    let config = RunConfig::from_toml_file(config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;

    let bars = match (data, synthetic) {
        (Some(path), None) => {
            load_csv(path).with_context(|| format!("loading bars from {}", path.display()))?
        }
        (None, Some(seed)) => synthetic_series(seed, bar_count),
        (Some(_), Some(_)) => bail!("--data and --synthetic are mutually exclusive"),
        (None, None) => bail!("either --data or --synthetic is required"),
    };

    let summary = run_single_backtest(&config, &bars)?;

    if let Some(dir) = out {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating output directory {}", dir.display()))?;
        write_summary_json(&dir.join(format!("{}.json", summary.run_id)), &summary)?;
        write_trades_csv(&dir.join(format!("{}_trades.csv", summary.run_id)), &summary.trades)?;
    }

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn run_rebalance_cmd(
    holdings_path: &std::path::Path,
    targets_path: &std::path::Path,
    tolerance: f64,
    lot: f64,
    apply: bool,
    budget_ms: u64,
) -> Result<()> {
    let holdings: HashMap<String, f64> = serde_json::from_str(
        &std::fs::read_to_string(holdings_path)
            .with_context(|| format!("reading {}", holdings_path.display()))?,
    )
    .context("holdings must be a JSON object of symbol -> quantity")?;
    let targets: Vec<TargetWeight> = serde_json::from_str(
        &std::fs::read_to_string(targets_path)
            .with_context(|| format!("reading {}", targets_path.display()))?,
    )
    .context("targets must be a JSON array of {symbol, weight} records")?;

    let orders = simulate(&holdings, &targets, tolerance, lot)?;

    if apply {
        let dispatcher = RebalanceDispatcher::new(
            Duration::from_millis(budget_ms),
            Box::new(portlab_runner::NoopExecutor),
            Box::new(portlab_runner::NoopPublisher),
            Box::new(portlab_runner::NoopQueue),
        );
        let outcome = dispatcher.apply(&ApplyRequest { orders })?;
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&orders)?);
    }
    Ok(())
}

fn run_dsr_cmd(returns_path: &std::path::Path, trials: u32) -> Result<()> {
    let text = std::fs::read_to_string(returns_path)
        .with_context(|| format!("reading {}", returns_path.display()))?;
    let returns: Vec<f64> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            line.parse::<f64>()
                .with_context(|| format!("invalid return value: {line}"))
        })
        .collect::<Result<_>>()?;

    let probability = deflated_sharpe_ratio(&returns, trials)?;
    println!(
        "{}",
        serde_json::json!({
            "observations": returns.len(),
            "trials": trials,
            "deflated_sharpe": probability,
        })
    );
    Ok(())
}
