//! WeightLab Runner: configured backtest sessions on top of `weightlab-core`.
//!
//! This crate provides:
//! - TOML backtest configuration with validation and content-addressed run ids
//! - CSV price loading
//! - Performance metrics and the tearsheet statistics collector
//! - `TradingSession`, which wires a run together and returns a report

pub mod config;
pub mod data_loader;
pub mod metrics;
pub mod session;
pub mod statistics;

pub use config::{BacktestConfig, ConfigError, RunId};
pub use data_loader::{load_price_csv, read_price_csv, LoadError};
pub use metrics::PerformanceMetrics;
pub use session::{RunError, SessionReport, TradingSession};
pub use statistics::TearsheetStatistics;
