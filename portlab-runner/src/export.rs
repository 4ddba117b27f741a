//! Result export (CSV/JSON) for tabular and report consumers.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::runner::RunSummary;
use portlab_core::Trade;

/// Write the trade table as CSV.
pub fn write_trades_csv(path: &Path, trades: &[Trade]) -> Result<()> {
    let mut file = File::create(path)
        .with_context(|| format!("failed to create trades CSV {}", path.display()))?;

    writeln!(
        file,
        "entry_bar,exit_bar,quantity,entry_price,exit_price,net_pnl,return_pct"
    )?;
    for trade in trades {
        writeln!(
            file,
            "{},{},{},{:.6},{:.6},{:.6},{:.6}",
            trade.entry_bar,
            trade.exit_bar,
            trade.quantity,
            trade.entry_price,
            trade.exit_price,
            trade.net_pnl,
            trade.return_pct()
        )?;
    }
    Ok(())
}

/// Write the full run summary as pretty JSON.
pub fn write_summary_json(path: &Path, summary: &RunSummary) -> Result<()> {
    let json = serde_json::to_string_pretty(summary).context("failed to serialize summary")?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write summary JSON {}", path.display()))?;
    Ok(())
}
