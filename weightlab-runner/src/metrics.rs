//! Performance metrics: pure functions over an equity curve.
//!
//! Every metric is a pure function: equity curve in, scalar out. Returns are
//! per-period (one period per simulated step) and annualized with
//! [`PERIODS_PER_YEAR`]. The risk-free rate is zero.

use serde::{Deserialize, Serialize};

/// Trading periods per year used for annualization.
pub const PERIODS_PER_YEAR: f64 = 252.0;

/// Aggregate performance metrics for a single equity curve.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub total_return: f64,
    pub cagr: f64,
    pub sharpe: f64,
    pub sortino: f64,
    pub calmar: f64,
    /// Negative fraction, e.g. -0.15 for a 15% drawdown.
    pub max_drawdown: f64,
    pub periods: usize,
}

impl PerformanceMetrics {
    pub fn compute(equity_curve: &[f64]) -> Self {
        Self {
            total_return: total_return(equity_curve),
            cagr: cagr(equity_curve),
            sharpe: sharpe_ratio(equity_curve),
            sortino: sortino_ratio(equity_curve),
            calmar: calmar_ratio(equity_curve),
            max_drawdown: max_drawdown(equity_curve),
            periods: equity_curve.len(),
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Total return as a fraction: (final - initial) / initial.
pub fn total_return(equity_curve: &[f64]) -> f64 {
    match endpoints(equity_curve) {
        Some((first, last)) if first > 0.0 => (last - first) / first,
        _ => 0.0,
    }
}

/// Compound annual growth rate.
///
/// Years are the number of points over 252, not the number of periods
/// between them. Returns 0.0 for fewer than two points or a non-positive endpoint.
pub fn cagr(equity_curve: &[f64]) -> f64 {
    let Some((first, last)) = endpoints(equity_curve) else {
        return 0.0;
    };
    if first <= 0.0 || last <= 0.0 {
        return 0.0;
    }
    let years = equity_curve.len() as f64 / PERIODS_PER_YEAR;
    (last / first).powf(years.recip()) - 1.0
}

/// Annualized Sharpe ratio: mean / sample std of period returns * sqrt(252).
pub fn sharpe_ratio(equity_curve: &[f64]) -> f64 {
    let returns = period_returns(equity_curve);
    if returns.len() < 2 {
        return 0.0;
    }
    let std = std_dev(&returns);
    if std < 1e-15 {
        return 0.0;
    }
    mean(&returns) / std * PERIODS_PER_YEAR.sqrt()
}

/// Annualized Sortino ratio: mean / downside deviation * sqrt(252).
///
/// Downside deviation is the root mean square of negative returns over all
/// periods. Returns 0.0 when there is no downside.
pub fn sortino_ratio(equity_curve: &[f64]) -> f64 {
    let returns = period_returns(equity_curve);
    if returns.len() < 2 {
        return 0.0;
    }
    let downside: f64 = returns.iter().filter(|r| **r < 0.0).map(|r| r * r).sum();
    let downside_dev = (downside / returns.len() as f64).sqrt();
    if downside_dev < 1e-15 {
        return 0.0;
    }
    mean(&returns) / downside_dev * PERIODS_PER_YEAR.sqrt()
}

/// Calmar ratio: CAGR / |max drawdown|. Zero without a drawdown or growth.
pub fn calmar_ratio(equity_curve: &[f64]) -> f64 {
    let growth = cagr(equity_curve);
    let dd = max_drawdown(equity_curve);
    if dd >= 0.0 || growth <= 0.0 {
        return 0.0;
    }
    growth / -dd
}

/// Maximum peak-to-trough decline as a negative fraction.
pub fn max_drawdown(equity_curve: &[f64]) -> f64 {
    drawdown_series(equity_curve)
        .into_iter()
        .fold(0.0_f64, f64::min)
}

/// Drawdown from the running peak at every point (0.0 at new highs).
pub fn drawdown_series(equity_curve: &[f64]) -> Vec<f64> {
    let mut peak = f64::NEG_INFINITY;
    equity_curve
        .iter()
        .map(|&value| {
            peak = peak.max(value);
            if peak > 0.0 {
                (value - peak) / peak
            } else {
                0.0
            }
        })
        .collect()
}

// ─── Helpers ────────────────────────────────────────────────────────

/// Simple returns between consecutive points; 0.0 after a non-positive value.
pub fn period_returns(equity_curve: &[f64]) -> Vec<f64> {
    equity_curve
        .windows(2)
        .map(|w| if w[0] > 0.0 { w[1] / w[0] - 1.0 } else { 0.0 })
        .collect()
}

fn endpoints(equity_curve: &[f64]) -> Option<(f64, f64)> {
    if equity_curve.len() < 2 {
        return None;
    }
    Some((*equity_curve.first()?, *equity_curve.last()?))
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator).
pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-10;

    #[test]
    fn short_curves_yield_zero() {
        let m = PerformanceMetrics::compute(&[100.0]);
        assert_eq!(m, PerformanceMetrics { periods: 1, ..Default::default() });
        assert_eq!(PerformanceMetrics::compute(&[]).periods, 0);
    }

    #[test]
    fn total_return_and_drawdown() {
        let curve = [100.0, 120.0, 90.0, 110.0];
        assert!((total_return(&curve) - 0.10).abs() < EPS);
        assert!((max_drawdown(&curve) + 0.25).abs() < EPS);

        let dd = drawdown_series(&curve);
        assert_eq!(dd[0], 0.0);
        assert_eq!(dd[1], 0.0);
        assert!((dd[3] - (110.0 / 120.0 - 1.0)).abs() < EPS);
    }

    #[test]
    fn one_year_of_growth_matches_total_return() {
        let curve: Vec<f64> = (0..252).map(|i| 100.0 + i as f64 * (10.0 / 251.0)).collect();
        assert!((cagr(&curve) - 0.10).abs() < 1e-9);
    }

    #[test]
    fn constant_curve_has_no_risk_adjusted_return() {
        let curve = [100.0; 20];
        assert_eq!(sharpe_ratio(&curve), 0.0);
        assert_eq!(sortino_ratio(&curve), 0.0);
        assert_eq!(calmar_ratio(&curve), 0.0);
        assert_eq!(max_drawdown(&curve), 0.0);
    }

    #[test]
    fn sharpe_sign_follows_mean_return() {
        let up = [100.0, 101.0, 101.5, 103.0, 102.8, 104.0];
        let down: Vec<f64> = up.iter().rev().copied().collect();
        assert!(sharpe_ratio(&up) > 0.0);
        assert!(sharpe_ratio(&down) < 0.0);
        assert!(sortino_ratio(&up) > 0.0);
        assert!(calmar_ratio(&up) > 0.0);
    }

    #[test]
    fn std_dev_uses_sample_denominator() {
        assert!((std_dev(&[1.0, 2.0, 3.0, 4.0]) - 1.2909944487358056).abs() < EPS);
    }

    mod props {
        use super::super::*;
        use proptest::prelude::*;

        fn arb_curve() -> impl Strategy<Value = Vec<f64>> {
            prop::collection::vec(1.0..1_000.0_f64, 2..300)
        }

        proptest! {
            #[test]
            fn drawdown_is_bounded(curve in arb_curve()) {
                let dd = max_drawdown(&curve);
                prop_assert!((-1.0..=0.0).contains(&dd));
                prop_assert!(drawdown_series(&curve).iter().all(|d| *d <= 0.0 && *d >= dd));
            }

            #[test]
            fn metrics_are_finite(curve in arb_curve()) {
                let m = PerformanceMetrics::compute(&curve);
                prop_assert!(m.total_return.is_finite());
                prop_assert!(m.sharpe.is_finite());
                prop_assert!(m.sortino.is_finite());
                prop_assert_eq!(m.periods, curve.len());
            }
        }
    }
}
