//! Cost and risk models applied to every simulated trade.

use serde::{Deserialize, Serialize};

/// Transaction cost model: flat commission plus proportional slippage.
///
/// `charge = commission + price * size * slippage`, taken once per trade at
/// the entry fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostModel {
    /// Flat commission per trade.
    pub commission: f64,
    /// Slippage as a proportion of trade value.
    pub slippage: f64,
}

impl CostModel {
    pub fn new(commission: f64, slippage: f64) -> Self {
        Self {
            commission,
            slippage,
        }
    }

    pub fn frictionless() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Cost of a fill at `price` for `size` units.
    pub fn charge(&self, price: f64, size: f64) -> f64 {
        self.commission + price * size * self.slippage
    }
}

impl Default for CostModel {
    fn default() -> Self {
        Self::frictionless()
    }
}

/// Risk constraints limiting exposure.
///
/// Per-trade size is `min(max_exposure, allocation_limit)` as a fraction of
/// equity. The optional drawdown stop is enforced by the engine after the
/// adapter runs, not during trade generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskModel {
    /// Fraction of equity that can be invested at once, in (0, 1].
    pub max_exposure: f64,
    /// Fraction of equity per trade, in (0, 1].
    pub allocation_limit: f64,
    /// Maximum tolerated drawdown fraction before forced liquidation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drawdown_stop: Option<f64>,
}

impl RiskModel {
    pub fn new(max_exposure: f64, allocation_limit: f64, drawdown_stop: Option<f64>) -> Self {
        Self {
            max_exposure,
            allocation_limit,
            drawdown_stop,
        }
    }

    /// Position size for a single trade.
    pub fn position_size(&self) -> f64 {
        self.max_exposure.min(self.allocation_limit)
    }

    /// First index where the equity curve breaches the drawdown stop.
    ///
    /// Single linear scan over the running peak; a drawdown exactly equal to
    /// the stop counts as a breach. None when no stop is configured or the
    /// curve never breaches it.
    pub fn first_breach(&self, equity_curve: &[f64]) -> Option<usize> {
        let stop = self.drawdown_stop?;
        let mut peak = f64::NEG_INFINITY;
        for (i, &eq) in equity_curve.iter().enumerate() {
            if eq > peak {
                peak = eq;
            }
            if peak > 0.0 {
                let drawdown = (eq - peak) / peak;
                if drawdown <= -stop {
                    return Some(i);
                }
            }
        }
        None
    }
}

impl Default for RiskModel {
    fn default() -> Self {
        Self {
            max_exposure: 1.0,
            allocation_limit: 1.0,
            drawdown_stop: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frictionless_charges_nothing() {
        assert_eq!(CostModel::frictionless().charge(100.0, 50.0), 0.0);
    }

    #[test]
    fn charge_combines_commission_and_slippage() {
        let cost = CostModel::new(1.0, 0.001);
        // 1.0 + 200 * 10 * 0.001 = 3.0
        assert!((cost.charge(200.0, 10.0) - 3.0).abs() < 1e-10);
    }

    #[test]
    fn position_size_takes_the_tighter_cap() {
        let risk = RiskModel::new(0.8, 0.25, None);
        assert!((risk.position_size() - 0.25).abs() < 1e-10);
        let risk = RiskModel::new(0.1, 0.5, None);
        assert!((risk.position_size() - 0.1).abs() < 1e-10);
    }

    #[test]
    fn default_risk_is_fully_invested_no_stop() {
        let risk = RiskModel::default();
        assert_eq!(risk.position_size(), 1.0);
        assert_eq!(risk.drawdown_stop, None);
    }

    #[test]
    fn no_stop_never_breaches() {
        let risk = RiskModel::default();
        assert_eq!(risk.first_breach(&[100.0, 10.0, 1.0]), None);
    }

    #[test]
    fn first_breach_finds_first_index() {
        let risk = RiskModel::new(1.0, 1.0, Some(0.10));
        // Peak 110 → 98 is a 10.9% drawdown at index 3
        let eq = vec![100.0, 110.0, 105.0, 98.0, 97.0];
        assert_eq!(risk.first_breach(&eq), Some(3));
    }

    #[test]
    fn breach_on_exact_boundary() {
        let risk = RiskModel::new(1.0, 1.0, Some(0.10));
        // Exactly -10% from the peak of 100
        let eq = vec![100.0, 95.0, 90.0];
        assert_eq!(risk.first_breach(&eq), Some(2));
    }

    #[test]
    fn shallow_drawdown_is_tolerated() {
        let risk = RiskModel::new(1.0, 1.0, Some(0.20));
        let eq = vec![100.0, 110.0, 100.0, 105.0];
        assert_eq!(risk.first_breach(&eq), None);
    }

    #[test]
    fn risk_serialization_roundtrip() {
        let risk = RiskModel::new(0.9, 0.3, Some(0.15));
        let json = serde_json::to_string(&risk).unwrap();
        let deser: RiskModel = serde_json::from_str(&json).unwrap();
        assert_eq!(risk, deser);
    }
}
