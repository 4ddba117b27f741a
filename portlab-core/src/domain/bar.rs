//! Bar — the fundamental market data unit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// OHLCV bar for a single trading day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Bar {
    /// Bar with all four OHLC fields at the same price (close-only series).
    pub fn flat(date: NaiveDate, price: f64, volume: u64) -> Self {
        Self {
            date,
            open: price,
            high: price,
            low: price,
            close: price,
            volume,
        }
    }

    /// Basic OHLC sanity check: high >= low, high bounds open/close, prices positive.
    pub fn is_sane(&self) -> bool {
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.open > 0.0
            && self.close > 0.0
            && self.open.is_finite()
            && self.close.is_finite()
    }
}

/// Series-level invariant: dates strictly increasing.
///
/// Returns the index of the first offending bar on violation.
pub fn validate_series(bars: &[Bar]) -> Result<(), usize> {
    for i in 1..bars.len() {
        if bars[i].date <= bars[i - 1].date {
            return Err(i);
        }
    }
    Ok(())
}

/// Extract the close column from a bar series.
pub fn closes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}
