//! Integration tests for the engine: end-to-end runs, drawdown truncation,
//! and strategy-driven signals through both adapters.

use chrono::NaiveDate;
use portlab_core::{
    BacktestAdapter, BacktestEngine, BarLoopAdapter, BuyAndHold, CostModel, MaCrossover,
    RiskModel, SignalTable, VectorizedAdapter,
};

fn bars_from_closes(closes: &[f64]) -> Vec<portlab_core::Bar> {
    let base = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| portlab_core::Bar::flat(base + chrono::Duration::days(i as i64), c, 1000))
        .collect()
}

// ──────────────────────────────────────────────
// End-to-end reference run
// ──────────────────────────────────────────────

#[test]
fn reference_run_close_series_one_to_five() {
    // Closes [1,2,3,4,5], entry at bar 1, exit at bar 3, commission 0.1,
    // initial cash 100 → one trade, pnl 1.9, final equity 101.9.
    for adapter in adapters() {
        let engine =
            BacktestEngine::new(bars_from_closes(&[1.0, 2.0, 3.0, 4.0, 5.0]), adapter, 100.0)
                .unwrap();
        let table = SignalTable::from_indices(5, &[1], &[3]);
        let result = engine
            .run(&table, &CostModel::new(0.1, 0.0), &RiskModel::default())
            .unwrap();

        assert_eq!(result.trades.len(), 1);
        assert!((result.trades[0].net_pnl - 1.9).abs() < 1e-10);
        assert!((result.final_equity().unwrap() - 101.9).abs() < 1e-10);
        // pnl is booked on the exit bar only
        assert_eq!(result.pnl[3], result.trades[0].net_pnl);
        assert!(result.pnl.iter().enumerate().all(|(i, &p)| i == 3 || p == 0.0));
        // equity steps at the exit bar and holds
        assert_eq!(result.equity_curve[0], 100.0);
        assert_eq!(result.equity_curve[2], 100.0);
        assert!((result.equity_curve[3] - 101.9).abs() < 1e-10);
        assert!((result.equity_curve[4] - 101.9).abs() < 1e-10);
    }
}

fn adapters() -> Vec<Box<dyn BacktestAdapter>> {
    vec![Box::new(BarLoopAdapter), Box::new(VectorizedAdapter)]
}

#[test]
fn slippage_scales_with_trade_value() {
    let engine = BacktestEngine::new(
        bars_from_closes(&[100.0, 200.0, 300.0]),
        Box::new(BarLoopAdapter),
        1000.0,
    )
    .unwrap();
    let table = SignalTable::from_indices(3, &[0], &[2]);
    // charge = 1.0 + 100 * 1.0 * 0.01 = 2.0; pnl = 200 - 2 = 198
    let result = engine
        .run(&table, &CostModel::new(1.0, 0.01), &RiskModel::default())
        .unwrap();
    assert!((result.trades[0].net_pnl - 198.0).abs() < 1e-10);
}

// ──────────────────────────────────────────────
// Drawdown stop
// ──────────────────────────────────────────────

#[test]
fn drawdown_stop_cuts_series_at_first_breach() {
    // Two trades: +20 then -40. Equity [100,120,120,80,80,80]; the second
    // exit is a 33% drawdown from the 120 peak.
    let closes = [10.0, 30.0, 50.0, 10.0, 20.0, 30.0];
    let table = SignalTable::from_indices(6, &[0, 2], &[1, 3]);
    let risk = RiskModel::new(1.0, 1.0, Some(0.10));

    for adapter in adapters() {
        let engine = BacktestEngine::new(bars_from_closes(&closes), adapter, 100.0).unwrap();
        let result = engine.run(&table, &CostModel::frictionless(), &risk).unwrap();

        assert_eq!(result.equity_curve.len(), 4);
        assert_eq!(result.pnl.len(), 4);
        assert!(result.trades.iter().all(|t| t.exit_bar <= 3));
        assert!((result.final_equity().unwrap() - 80.0).abs() < 1e-10);
    }
}

#[test]
fn no_breach_leaves_series_full_length() {
    let closes = [10.0, 11.0, 12.0, 11.5, 13.0];
    let table = SignalTable::from_indices(5, &[0], &[4]);
    let risk = RiskModel::new(1.0, 1.0, Some(0.50));
    let engine =
        BacktestEngine::new(bars_from_closes(&closes), Box::new(VectorizedAdapter), 100.0)
            .unwrap();
    let result = engine.run(&table, &CostModel::frictionless(), &risk).unwrap();
    assert_eq!(result.equity_curve.len(), 5);
    assert_eq!(result.trades.len(), 1);
}

#[test]
fn breach_index_respects_running_peak_not_initial_cash() {
    // Equity rises to 130 first; a fall to 110 is only -15.4% from the peak
    // but would be +10% from initial cash. The stop keys off the peak.
    let closes = [10.0, 40.0, 20.0, 10.0, 10.0];
    let table = SignalTable::from_indices(5, &[0, 2], &[1, 3]);
    let risk = RiskModel::new(1.0, 1.0, Some(0.08));
    let engine =
        BacktestEngine::new(bars_from_closes(&closes), Box::new(BarLoopAdapter), 100.0).unwrap();
    let result = engine.run(&table, &CostModel::frictionless(), &risk).unwrap();
    // Equity [100,130,130,120,120]: (120-130)/130 = -7.7% — no breach at 0.08
    assert_eq!(result.equity_curve.len(), 5);

    let tighter = RiskModel::new(1.0, 1.0, Some(0.05));
    let result = engine
        .run(&table, &CostModel::frictionless(), &tighter)
        .unwrap();
    assert_eq!(result.equity_curve.len(), 4);
}

// ──────────────────────────────────────────────
// Strategy-driven runs
// ──────────────────────────────────────────────

#[test]
fn buy_and_hold_rides_the_whole_series() {
    let closes = [100.0, 101.0, 99.0, 105.0, 110.0];
    for adapter in adapters() {
        let engine = BacktestEngine::new(bars_from_closes(&closes), adapter, 1000.0).unwrap();
        let result = engine
            .run(&BuyAndHold, &CostModel::frictionless(), &RiskModel::default())
            .unwrap();
        assert_eq!(result.trades.len(), 1);
        assert_eq!(result.trades[0].entry_bar, 0);
        assert_eq!(result.trades[0].exit_bar, 4);
        assert!((result.trades[0].net_pnl - 10.0).abs() < 1e-10);
    }
}

#[test]
fn ma_crossover_produces_identical_results_on_both_adapters() {
    // A wavy series long enough for 3/8 SMAs to cross a few times.
    let closes: Vec<f64> = (0..60)
        .map(|i| 100.0 + 10.0 * (i as f64 * 0.4).sin() + i as f64 * 0.1)
        .collect();
    let strat = MaCrossover::new(3, 8);
    let cost = CostModel::new(0.05, 0.001);

    let run = |adapter: Box<dyn BacktestAdapter>| {
        BacktestEngine::new(bars_from_closes(&closes), adapter, 10_000.0)
            .unwrap()
            .run(&strat, &cost, &RiskModel::new(0.9, 0.5, None))
            .unwrap()
    };
    let loop_result = run(Box::new(BarLoopAdapter));
    let vec_result = run(Box::new(VectorizedAdapter));

    assert!(!loop_result.trades.is_empty(), "expected the MAs to cross");
    assert_eq!(loop_result, vec_result);
}

#[test]
fn strategy_with_no_entries_yields_flat_equity() {
    let closes = [5.0, 4.0, 3.0, 2.0];
    for adapter in adapters() {
        let engine = BacktestEngine::new(bars_from_closes(&closes), adapter, 500.0).unwrap();
        let table = SignalTable::from_indices(4, &[], &[0, 1, 2, 3]);
        let result = engine
            .run(&table, &CostModel::new(1.0, 0.01), &RiskModel::default())
            .unwrap();
        assert!(result.trades.is_empty());
        assert_eq!(result.equity_curve, vec![500.0; 4]);
        assert_eq!(result.pnl, vec![0.0; 4]);
    }
}
