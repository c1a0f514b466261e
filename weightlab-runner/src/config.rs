//! Serializable backtest configuration.
//!
//! ```toml
//! [backtest]
//! initial_cash = 1000000.0
//! start_date = "2020-01-01"
//! end_date = "2020-12-31"
//!
//! [strategy]
//! rebalance = "month_end"
//! [strategy.weights]
//! SPY = 0.6
//! AGG = 0.4
//!
//! [commission]
//! per_share = 0.005
//! ```

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use weightlab_core::domain::Ticker;
use weightlab_core::execution::CommissionSchedule;
use weightlab_core::strategy::RebalanceSchedule;

/// Unique identifier for a backtest run (content-addressable hash).
pub type RunId = String;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("initial_cash must be positive, got {0}")]
    NonPositiveCash(Decimal),

    #[error("strategy.weights must name at least one ticker")]
    NoWeights,

    #[error("strategy.weights contains an empty ticker")]
    EmptyTicker,

    #[error("commission.{field} must be non-negative, got {value}")]
    NegativeCommission { field: &'static str, value: Decimal },

    #[error("start_date {start} is after end_date {end}")]
    InvertedWindow { start: NaiveDate, end: NaiveDate },
}

/// Run-level parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BacktestSection {
    pub initial_cash: Decimal,
    /// Inclusive lower bound on loaded observations.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper bound on loaded observations.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

/// Constant-mix strategy parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StrategySection {
    #[serde(default)]
    pub rebalance: RebalanceSchedule,
    pub weights: BTreeMap<Ticker, Decimal>,
}

/// Complete configuration for one backtest run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BacktestConfig {
    pub backtest: BacktestSection,
    pub strategy: StrategySection,
    #[serde(default)]
    pub commission: CommissionSchedule,
}

impl BacktestConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backtest.initial_cash <= Decimal::ZERO {
            return Err(ConfigError::NonPositiveCash(self.backtest.initial_cash));
        }
        if self.strategy.weights.is_empty() {
            return Err(ConfigError::NoWeights);
        }
        if self.strategy.weights.keys().any(|t| t.trim().is_empty()) {
            return Err(ConfigError::EmptyTicker);
        }

        let c = &self.commission;
        for (field, value) in [
            ("per_share", c.per_share),
            ("minimum", c.minimum),
            ("max_notional_fraction", c.max_notional_fraction),
        ] {
            if value < Decimal::ZERO {
                return Err(ConfigError::NegativeCommission { field, value });
            }
        }

        if let (Some(start), Some(end)) = (self.backtest.start_date, self.backtest.end_date) {
            if start > end {
                return Err(ConfigError::InvertedWindow { start, end });
            }
        }
        Ok(())
    }

    /// Tickers the strategy trades.
    pub fn universe(&self) -> Vec<Ticker> {
        self.strategy.weights.keys().cloned().collect()
    }

    /// Whether `date` falls inside the configured window.
    pub fn in_window(&self, date: NaiveDate) -> bool {
        self.backtest.start_date.map_or(true, |start| date >= start)
            && self.backtest.end_date.map_or(true, |end| date <= end)
    }

    /// Deterministic hash of the configuration.
    ///
    /// Two identical configs share a run id.
    pub fn run_id(&self) -> Result<RunId, ConfigError> {
        let json = serde_json::to_vec(self)?;
        Ok(blake3::hash(&json).to_hex().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const SAMPLE: &str = r#"
[backtest]
initial_cash = 1000000.0
start_date = "2020-01-01"
end_date = "2020-12-31"

[strategy]
rebalance = "every_step"

[strategy.weights]
SPY = 0.6
AGG = 0.4
"#;

    #[test]
    fn parses_full_config() {
        let config = BacktestConfig::from_toml(SAMPLE).unwrap();
        assert_eq!(config.backtest.initial_cash, dec!(1000000));
        assert_eq!(config.strategy.rebalance, RebalanceSchedule::EveryStep);
        assert_eq!(config.strategy.weights["SPY"], dec!(0.6));
        assert_eq!(config.universe(), vec!["AGG".to_string(), "SPY".to_string()]);
        assert_eq!(config.commission, CommissionSchedule::default());
    }

    #[test]
    fn defaults_rebalance_and_window() {
        let config = BacktestConfig::from_toml(
            r#"
[backtest]
initial_cash = 5000.0

[strategy.weights]
QQQ = 1.0
"#,
        )
        .unwrap();
        assert_eq!(config.strategy.rebalance, RebalanceSchedule::MonthEnd);
        assert!(config.in_window(NaiveDate::from_ymd_opt(1990, 1, 1).unwrap()));
    }

    #[test]
    fn window_is_inclusive() {
        let config = BacktestConfig::from_toml(SAMPLE).unwrap();
        assert!(config.in_window(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()));
        assert!(config.in_window(NaiveDate::from_ymd_opt(2020, 12, 31).unwrap()));
        assert!(!config.in_window(NaiveDate::from_ymd_opt(2021, 1, 1).unwrap()));
    }

    #[test]
    fn rejects_invalid_values() {
        let no_cash = SAMPLE.replace("initial_cash = 1000000.0", "initial_cash = 0.0");
        assert!(matches!(
            BacktestConfig::from_toml(&no_cash),
            Err(ConfigError::NonPositiveCash(_))
        ));

        let inverted = SAMPLE.replace("2020-12-31", "2019-12-31");
        assert!(matches!(
            BacktestConfig::from_toml(&inverted),
            Err(ConfigError::InvertedWindow { .. })
        ));

        let negative_fee = format!("{SAMPLE}\n[commission]\nminimum = -1.0\n");
        assert!(matches!(
            BacktestConfig::from_toml(&negative_fee),
            Err(ConfigError::NegativeCommission { field: "minimum", .. })
        ));

        let no_weights = "[backtest]\ninitial_cash = 1.0\n[strategy.weights]\n";
        assert!(matches!(
            BacktestConfig::from_toml(no_weights),
            Err(ConfigError::NoWeights)
        ));

        assert!(matches!(
            BacktestConfig::from_toml("not toml ["),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn run_id_is_deterministic() {
        let a = BacktestConfig::from_toml(SAMPLE).unwrap();
        let b = BacktestConfig::from_toml(SAMPLE).unwrap();
        assert_eq!(a.run_id().unwrap(), b.run_id().unwrap());
        assert_eq!(a.run_id().unwrap().len(), 64);

        let mut c = a.clone();
        c.strategy.rebalance = RebalanceSchedule::MonthEnd;
        assert_ne!(a.run_id().unwrap(), c.run_id().unwrap());
    }
}
