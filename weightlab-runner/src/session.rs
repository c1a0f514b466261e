//! Trading session: wires a configured backtest together and runs it.

use crate::config::{BacktestConfig, ConfigError, RunId};
use crate::data_loader::{load_price_csv, LoadError};
use crate::statistics::TearsheetStatistics;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::info;
use weightlab_core::data::{DataError, HistoricalPriceSource, PriceObservation};
use weightlab_core::domain::{PortfolioHistory, Position};
use weightlab_core::engine::{EngineError, PortfolioHandler, StatisticsSummary};
use weightlab_core::execution::SimulatedExecutionHandler;
use weightlab_core::sizers::TargetWeightSizer;
use weightlab_core::strategy::ConstantMixStrategy;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("load error: {0}")]
    Load(#[from] LoadError),
    #[error("data error: {0}")]
    Data(#[from] DataError),
    #[error("backtest aborted: {0}")]
    Engine(#[from] EngineError),
    #[error("no observations for the configured universe inside the date window")]
    NoData,
    #[error("failed to serialize report: {0}")]
    Report(#[from] serde_json::Error),
}

/// Everything a finished run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    pub run_id: RunId,
    pub strategy: String,
    pub steps: usize,
    pub initial_cash: Decimal,
    pub final_value: Decimal,
    pub cash: Decimal,
    pub realized_pnl: Decimal,
    pub total_commission: Decimal,
    pub results: StatisticsSummary,
    pub history: PortfolioHistory,
    pub positions: Vec<Position>,
}

impl SessionReport {
    pub fn to_json(&self) -> Result<String, RunError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// A validated config plus the price data it runs over.
#[derive(Debug)]
pub struct TradingSession {
    config: BacktestConfig,
    source: HistoricalPriceSource,
}

impl TradingSession {
    /// Build a session from a config and raw observations.
    ///
    /// Observations outside the date window or the strategy's universe are
    /// dropped before the price source is built.
    pub fn from_config(
        config: BacktestConfig,
        observations: Vec<PriceObservation>,
    ) -> Result<Self, RunError> {
        config.validate()?;
        let universe = config.universe();

        let in_scope: Vec<PriceObservation> = observations
            .into_iter()
            .filter(|obs| config.in_window(obs.timestamp) && universe.contains(&obs.ticker))
            .collect();
        if in_scope.is_empty() {
            return Err(RunError::NoData);
        }

        let source = HistoricalPriceSource::new(universe, in_scope)?;
        Ok(Self { config, source })
    }

    /// Load the config from TOML and prices from CSV, then build a session.
    pub fn from_files(config_path: &Path, prices_path: &Path) -> Result<Self, RunError> {
        let config = BacktestConfig::from_file(config_path)?;
        let observations = load_price_csv(prices_path)?;
        Self::from_config(config, observations)
    }

    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }

    pub fn run(self) -> Result<SessionReport, RunError> {
        let run_id = self.config.run_id()?;
        info!(%run_id, timestamps = self.source.calendar().len(), "starting session");

        let strategy = ConstantMixStrategy::new(
            self.config.strategy.weights.clone(),
            self.config.strategy.rebalance,
        );
        let mut handler = PortfolioHandler::new(
            self.config.backtest.initial_cash,
            self.source,
            Box::new(strategy),
            Box::new(TargetWeightSizer),
            Box::new(SimulatedExecutionHandler::new(self.config.commission)),
            Box::new(TearsheetStatistics::new()),
        );

        let summary = handler.run()?;
        let portfolio = handler.into_portfolio();

        Ok(SessionReport {
            run_id,
            strategy: "constant_mix".to_string(),
            steps: summary.steps,
            initial_cash: portfolio.initial_cash(),
            final_value: summary.final_value,
            cash: portfolio.cash(),
            realized_pnl: portfolio.realized_pnl(),
            total_commission: portfolio.total_commission(),
            results: summary.results,
            history: portfolio.history().clone(),
            positions: portfolio.positions().values().cloned().collect(),
        })
    }
}
