//! Deflated Sharpe Ratio — probability that an observed Sharpe reflects
//! skill rather than sampling luck.
//!
//! Implements from first principles:
//! - Standard normal CDF via a rational erf approximation
//! - Inverse standard normal CDF (Acklam's rational approximation)
//! - Adjusted sample skewness and excess kurtosis
//! - The deflated Sharpe estimate itself
//!
//! Statistical caveat: the multiple-trials correction assumes the trials
//! were independent, which strategy variations rarely are. Treat the output
//! as a ranking probability, not a literal false-positive rate.

use thiserror::Error;

/// Errors from the estimator.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeflatedSharpeError {
    #[error("deflated Sharpe requires at least two finite observations, got {0}")]
    TooFewObservations(usize),

    #[error("trials must be at least 1")]
    ZeroTrials,
}

// ─── Math primitives ─────────────────────────────────────────────────

/// Error function via the Abramowitz–Stegun rational approximation
/// (maximum absolute error ~1.5e-7).
fn erf(x: f64) -> f64 {
    const A1: f64 = 0.254829592;
    const A2: f64 = -0.284496736;
    const A3: f64 = 1.421413741;
    const A4: f64 = -1.453152027;
    const A5: f64 = 1.061405429;
    const P: f64 = 0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();

    let t = 1.0 / (1.0 + P * x);
    let poly = ((((A5 * t + A4) * t + A3) * t + A2) * t + A1) * t;
    sign * (1.0 - poly * (-x * x).exp())
}

/// Standard normal CDF: P(Z <= x).
pub fn normal_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / std::f64::consts::SQRT_2))
}

/// Inverse standard normal CDF via Acklam's rational approximation
/// (relative error < 1.15e-9 over the open unit interval).
///
/// Returns ±infinity at the endpoints and NaN outside [0, 1].
pub fn normal_ppf(p: f64) -> f64 {
    #[allow(clippy::excessive_precision)]
    const A: [f64; 6] = [
        -3.969683028665376e+01,
        2.209460984245205e+02,
        -2.759285104469687e+02,
        1.383577518672690e+02,
        -3.066479806614716e+01,
        2.506628277459239e+00,
    ];
    #[allow(clippy::excessive_precision)]
    const B: [f64; 5] = [
        -5.447609879822406e+01,
        1.615858368580409e+02,
        -1.556989798598866e+02,
        6.680131188771972e+01,
        -1.328068155288572e+01,
    ];
    #[allow(clippy::excessive_precision)]
    const C: [f64; 6] = [
        -7.784894002430293e-03,
        -3.223964580411365e-01,
        -2.400758277161838e+00,
        -2.549732539343734e+00,
        4.374664141464968e+00,
        2.938163982698783e+00,
    ];
    #[allow(clippy::excessive_precision)]
    const D: [f64; 4] = [
        7.784695709041462e-03,
        3.224671290700398e-01,
        2.445134137142996e+00,
        3.754408661907416e+00,
    ];
    const P_LOW: f64 = 0.02425;

    if !(0.0..=1.0).contains(&p) {
        return f64::NAN;
    }
    if p == 0.0 {
        return f64::NEG_INFINITY;
    }
    if p == 1.0 {
        return f64::INFINITY;
    }

    if p < P_LOW {
        // Lower tail
        let q = (-2.0 * p.ln()).sqrt();
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    } else if p <= 1.0 - P_LOW {
        // Central region
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        // Upper tail: mirror the lower tail
        let q = (-2.0 * (1.0 - p).ln()).sqrt();
        -((((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0))
    }
}

// ─── Sample moments ──────────────────────────────────────────────────

/// Adjusted sample skewness: `g1 * sqrt(n(n-1)) / (n-2)`.
///
/// None for n < 3 or a zero-variance sample.
fn sample_skewness(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 3 {
        return None;
    }
    let n_f = n as f64;
    let mean = values.iter().sum::<f64>() / n_f;
    let m2 = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n_f;
    if m2 < 1e-30 {
        return None;
    }
    let m3 = values.iter().map(|v| (v - mean).powi(3)).sum::<f64>() / n_f;
    let g1 = m3 / m2.powf(1.5);
    Some(g1 * (n_f * (n_f - 1.0)).sqrt() / (n_f - 2.0))
}

/// Adjusted sample excess kurtosis: `((n+1) g2 + 6) * (n-1) / ((n-2)(n-3))`.
///
/// None for n < 4 or a zero-variance sample.
fn sample_excess_kurtosis(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 4 {
        return None;
    }
    let n_f = n as f64;
    let mean = values.iter().sum::<f64>() / n_f;
    let m2 = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n_f;
    if m2 < 1e-30 {
        return None;
    }
    let m4 = values.iter().map(|v| (v - mean).powi(4)).sum::<f64>() / n_f;
    let g2 = m4 / (m2 * m2) - 3.0;
    Some(((n_f + 1.0) * g2 + 6.0) * (n_f - 1.0) / ((n_f - 2.0) * (n_f - 3.0)))
}

// ─── Estimator ───────────────────────────────────────────────────────

/// Compute the Deflated Sharpe Ratio for a return series.
///
/// Non-finite observations are dropped up front. `trials` is the number of
/// independent strategy variations that were attempted; a higher count
/// lowers the resulting probability. The output is always within [0, 1].
///
/// Steps:
/// 1. `sr = mean / std(sample) * sqrt(n)` (zero for a constant series)
/// 2. `sr_adj = sr * (1 + skew*sr/6 - (kurt - 3)*sr^2/24)` with skew and
///    excess kurtosis from the adjusted sample estimators; samples too
///    small for an estimator contribute no adjustment
/// 3. `sigma_sr = sqrt((1 - sr_adj^2) / (n - 1))`, variance floored at a
///    small positive epsilon
/// 4. `z = ppf(1 - 1/trials)` for trials > 1, else 0
/// 5. `cdf((sr - (sr_adj + sigma_sr * z)) / sigma_sr)`
pub fn deflated_sharpe_ratio(
    returns: &[f64],
    trials: u32,
) -> Result<f64, DeflatedSharpeError> {
    if trials == 0 {
        return Err(DeflatedSharpeError::ZeroTrials);
    }
    let series: Vec<f64> = returns.iter().copied().filter(|r| r.is_finite()).collect();
    let n = series.len();
    if n < 2 {
        return Err(DeflatedSharpeError::TooFewObservations(n));
    }
    let n_f = n as f64;

    let mean = series.iter().sum::<f64>() / n_f;
    let variance =
        series.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n_f - 1.0);
    let std = variance.sqrt();
    let sr = if std < 1e-15 {
        0.0
    } else {
        mean / std * n_f.sqrt()
    };

    let skew = sample_skewness(&series).unwrap_or(0.0);
    let kurt = sample_excess_kurtosis(&series).unwrap_or(3.0);
    let sr_adj = sr * (1.0 + skew * sr / 6.0 - (kurt - 3.0) * sr * sr / 24.0);

    let var_sr = ((1.0 - sr_adj * sr_adj) / (n_f - 1.0)).max(1e-12);
    let sigma_sr = var_sr.sqrt();

    let z = if trials > 1 {
        normal_ppf(1.0 - 1.0 / f64::from(trials))
    } else {
        0.0
    };
    let sr_max = sr_adj + sigma_sr * z;

    Ok(normal_cdf((sr - sr_max) / sigma_sr))
}
