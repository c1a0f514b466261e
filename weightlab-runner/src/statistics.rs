//! Tearsheet statistics collector.

use crate::metrics::{drawdown_series, PerformanceMetrics};
use weightlab_core::domain::{to_f64, PortfolioHistory};
use weightlab_core::engine::{StatisticsCollector, StatisticsSummary};

/// Computes headline metrics from the portfolio's equity curve.
#[derive(Debug, Clone, Default)]
pub struct TearsheetStatistics {
    equity_curve: Vec<f64>,
    metrics: PerformanceMetrics,
}

impl TearsheetStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn equity_curve(&self) -> &[f64] {
        &self.equity_curve
    }

    pub fn metrics(&self) -> &PerformanceMetrics {
        &self.metrics
    }

    pub fn drawdowns(&self) -> Vec<f64> {
        drawdown_series(&self.equity_curve)
    }
}

impl StatisticsCollector for TearsheetStatistics {
    fn collect(&mut self, history: &PortfolioHistory) {
        self.equity_curve = history.equity_curve().into_iter().map(to_f64).collect();
        self.metrics = PerformanceMetrics::compute(&self.equity_curve);
    }

    fn get_results(&self) -> StatisticsSummary {
        StatisticsSummary {
            sharpe: self.metrics.sharpe,
            sortino: self.metrics.sortino,
            max_drawdown_pct: self.metrics.max_drawdown.abs(),
            total_return: self.metrics.total_return,
            cagr: self.metrics.cagr,
            calmar: self.metrics.calmar,
            final_value: self.equity_curve.last().copied().unwrap_or_default(),
            periods: self.metrics.periods,
        }
    }
}
