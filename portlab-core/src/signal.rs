//! Strategy contract and signal series.
//!
//! A strategy sees only the price series — never portfolio or position
//! state — and emits two boolean sequences aligned to it: entry wishes and
//! exit wishes. Adapters decide what a wish becomes given the position
//! state at that bar.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Bar;

/// Errors from deriving signals.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignalError {
    #[error("strategy '{strategy}' produced {series} signals of length {got}, expected {expected}")]
    Misaligned {
        strategy: String,
        series: &'static str,
        got: usize,
        expected: usize,
    },
}

/// Entry and exit signal sequences aligned to a bar series.
///
/// `entries[i]` and `exits[i]` may both be true on the same bar; whether
/// that opens or closes depends on the position state when the bar is
/// reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalSeries {
    pub entries: Vec<bool>,
    pub exits: Vec<bool>,
}

impl SignalSeries {
    /// Run a strategy over a bar series, validating alignment.
    pub fn from_strategy(strategy: &dyn Strategy, bars: &[Bar]) -> Result<Self, SignalError> {
        let entries = strategy.entries(bars);
        if entries.len() != bars.len() {
            return Err(SignalError::Misaligned {
                strategy: strategy.name().to_string(),
                series: "entry",
                got: entries.len(),
                expected: bars.len(),
            });
        }
        let exits = strategy.exits(bars);
        if exits.len() != bars.len() {
            return Err(SignalError::Misaligned {
                strategy: strategy.name().to_string(),
                series: "exit",
                got: exits.len(),
                expected: bars.len(),
            });
        }
        Ok(Self { entries, exits })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Trait for strategies.
///
/// Both methods must return one flag per input bar, computed only from bars
/// up to and including that index.
pub trait Strategy: Send + Sync {
    /// Human-readable name (e.g., "ma_crossover").
    fn name(&self) -> &str;

    /// One entry flag per bar.
    fn entries(&self, bars: &[Bar]) -> Vec<bool>;

    /// One exit flag per bar.
    fn exits(&self, bars: &[Bar]) -> Vec<bool>;
}

/// Precomputed signal table — entries and exits supplied up front.
///
/// The vehicle for externally-generated signals (and for tests that pin
/// exact entry/exit bars).
#[derive(Debug, Clone)]
pub struct SignalTable {
    entries: Vec<bool>,
    exits: Vec<bool>,
}

impl SignalTable {
    pub fn new(entries: Vec<bool>, exits: Vec<bool>) -> Self {
        Self { entries, exits }
    }

    /// Table with signals at exactly the given bar indices.
    pub fn from_indices(len: usize, entry_bars: &[usize], exit_bars: &[usize]) -> Self {
        let mut entries = vec![false; len];
        let mut exits = vec![false; len];
        for &i in entry_bars {
            entries[i] = true;
        }
        for &i in exit_bars {
            exits[i] = true;
        }
        Self { entries, exits }
    }
}

impl Strategy for SignalTable {
    fn name(&self) -> &str {
        "signal_table"
    }

    fn entries(&self, _bars: &[Bar]) -> Vec<bool> {
        self.entries.clone()
    }

    fn exits(&self, _bars: &[Bar]) -> Vec<bool> {
        self.exits.clone()
    }
}

/// Moving-average crossover: enter when the short SMA crosses above the
/// long SMA, exit when it crosses back below.
#[derive(Debug, Clone)]
pub struct MaCrossover {
    pub short: usize,
    pub long: usize,
}

impl MaCrossover {
    pub fn new(short: usize, long: usize) -> Self {
        Self { short, long }
    }

    /// Rolling mean over `period` bars; None until the window is full.
    fn sma(closes: &[f64], period: usize) -> Vec<Option<f64>> {
        let mut out = vec![None; closes.len()];
        if period == 0 || closes.len() < period {
            return out;
        }
        let mut sum: f64 = closes[..period].iter().sum();
        out[period - 1] = Some(sum / period as f64);
        for i in period..closes.len() {
            sum += closes[i] - closes[i - period];
            out[i] = Some(sum / period as f64);
        }
        out
    }

    /// Cross flags: true where the short SMA crosses the long SMA, upward
    /// or downward.
    fn crosses(&self, bars: &[Bar], upward: bool) -> Vec<bool> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let short = Self::sma(&closes, self.short);
        let long = Self::sma(&closes, self.long);
        let mut out = vec![false; bars.len()];
        for i in 1..bars.len() {
            let (Some(s0), Some(l0), Some(s1), Some(l1)) =
                (short[i - 1], long[i - 1], short[i], long[i])
            else {
                continue;
            };
            out[i] = if upward {
                s0 <= l0 && s1 > l1
            } else {
                s0 >= l0 && s1 < l1
            };
        }
        out
    }
}

impl Strategy for MaCrossover {
    fn name(&self) -> &str {
        "ma_crossover"
    }

    fn entries(&self, bars: &[Bar]) -> Vec<bool> {
        self.crosses(bars, true)
    }

    fn exits(&self, bars: &[Bar]) -> Vec<bool> {
        self.crosses(bars, false)
    }
}

/// Buy on the first bar, never exit (the adapter liquidates at series end).
#[derive(Debug, Clone, Copy, Default)]
pub struct BuyAndHold;

impl Strategy for BuyAndHold {
    fn name(&self) -> &str {
        "buy_and_hold"
    }

    fn entries(&self, bars: &[Bar]) -> Vec<bool> {
        let mut out = vec![false; bars.len()];
        if let Some(first) = out.first_mut() {
            *first = true;
        }
        out
    }

    fn exits(&self, bars: &[Bar]) -> Vec<bool> {
        vec![false; bars.len()]
    }
}
