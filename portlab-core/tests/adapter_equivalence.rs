//! Property tests: the two adapters are interchangeable.
//!
//! For any price series and any pair of signal vectors, the bar-loop and
//! vectorized substrates must produce identical trade lists, pnl series,
//! and equity curves.

use chrono::NaiveDate;
use proptest::prelude::*;

use portlab_core::{
    Bar, BacktestAdapter, BarLoopAdapter, CostModel, RiskModel, SignalTable, VectorizedAdapter,
};

fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
    let base = NaiveDate::from_ymd_opt(2018, 1, 1).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| Bar::flat(base + chrono::Duration::days(i as i64), c, 1000))
        .collect()
}

fn arb_closes() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0..500.0_f64, 1..80)
}

fn arb_signals(len: usize) -> impl Strategy<Value = (Vec<bool>, Vec<bool>)> {
    (
        prop::collection::vec(any::<bool>(), len),
        prop::collection::vec(any::<bool>(), len),
    )
}

proptest! {
    #[test]
    fn adapters_agree_on_random_inputs(
        (closes, entries, exits) in arb_closes().prop_flat_map(|closes| {
            let len = closes.len();
            (Just(closes), arb_signals(len)).prop_map(|(c, (en, ex))| (c, en, ex))
        }),
        commission in 0.0..2.0_f64,
        slippage in 0.0..0.05_f64,
        allocation in 0.05..1.0_f64,
    ) {
        let bars = bars_from_closes(&closes);
        let table = SignalTable::new(entries, exits);
        let cost = CostModel::new(commission, slippage);
        let risk = RiskModel::new(1.0, allocation, None);

        let loop_result = BarLoopAdapter
            .run(&table, &bars, &cost, &risk, 1000.0)
            .unwrap();
        let vec_result = VectorizedAdapter
            .run(&table, &bars, &cost, &risk, 1000.0)
            .unwrap();

        prop_assert_eq!(&loop_result.trades, &vec_result.trades);
        prop_assert_eq!(loop_result.pnl.len(), vec_result.pnl.len());
        for (a, b) in loop_result.pnl.iter().zip(vec_result.pnl.iter()) {
            prop_assert!((a - b).abs() < 1e-9, "pnl diverged: {} vs {}", a, b);
        }
        for (a, b) in loop_result
            .equity_curve
            .iter()
            .zip(vec_result.equity_curve.iter())
        {
            prop_assert!((a - b).abs() < 1e-9, "equity diverged: {} vs {}", a, b);
        }
    }

    /// Trades are well-formed regardless of substrate: exits never precede
    /// entries, and consecutive trades never overlap.
    #[test]
    fn trades_are_ordered_and_disjoint(
        (closes, entries, exits) in arb_closes().prop_flat_map(|closes| {
            let len = closes.len();
            (Just(closes), arb_signals(len)).prop_map(|(c, (en, ex))| (c, en, ex))
        }),
    ) {
        let bars = bars_from_closes(&closes);
        let table = SignalTable::new(entries, exits);
        let result = VectorizedAdapter
            .run(&table, &bars, &CostModel::frictionless(), &RiskModel::default(), 1000.0)
            .unwrap();

        for trade in &result.trades {
            prop_assert!(trade.exit_bar >= trade.entry_bar);
        }
        for pair in result.trades.windows(2) {
            prop_assert!(pair[1].entry_bar > pair[0].exit_bar);
        }
    }
}
