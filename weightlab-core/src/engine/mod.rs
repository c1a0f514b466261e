//! Backtesting engine: the event-pool dispatch loop and its contracts.
//!
//! One queue carries pools of every kind. Each simulated step flows:
//!
//! 1. Price pool → strategy → target-weight pool
//! 2. Target-weight pool → sizer → order pool
//! 3. Order pool → execution → fills applied to the portfolio
//!
//! The portfolio is revalued after every dequeued pool. The run ends when
//! the queue is empty and the price source is exhausted.

pub mod error;
pub mod handler;
pub mod stats;

pub use error::{EngineError, Stage};
pub use handler::{PortfolioHandler, RunSummary};
pub use stats::{StatisticsCollector, StatisticsSummary};
