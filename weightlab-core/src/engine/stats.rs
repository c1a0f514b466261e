//! Statistics collector contract.

use crate::domain::PortfolioHistory;
use serde::{Deserialize, Serialize};

/// Headline performance figures for a finished run.
///
/// Ratios are annualized; percentages are fractions (0.12 = 12%).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticsSummary {
    pub sharpe: f64,
    pub sortino: f64,
    pub max_drawdown_pct: f64,
    pub total_return: f64,
    pub cagr: f64,
    pub calmar: f64,
    pub final_value: f64,
    pub periods: usize,
}

/// Receives the portfolio history once the run ends.
pub trait StatisticsCollector: Send {
    fn collect(&mut self, history: &PortfolioHistory);

    fn get_results(&self) -> StatisticsSummary;
}
