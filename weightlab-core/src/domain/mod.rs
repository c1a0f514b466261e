//! Domain types for WeightLab: tickers, trade actions, positions, portfolio state.

pub mod action;
pub mod history;
pub mod money;
pub mod portfolio;
pub mod position;

pub use action::Action;
pub use history::{HoldingRecord, PortfolioHistory, ValueRecord};
pub use money::{round_price, running_mean, to_f64, PRICE_SCALE};
pub use portfolio::{Portfolio, PortfolioError};
pub use position::Position;

use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

/// Ticker type alias
pub type Ticker = String;

/// Simulation clock. One price observation per ticker per timestamp.
pub type Timestamp = chrono::NaiveDate;

/// Read-only access to the most recent close per ticker.
///
/// This is the only view of market data the portfolio, sizer and execution
/// stages get. `None` means no close was observed for the current step.
pub trait Quotes {
    fn last_close(&self, ticker: &str) -> Option<Decimal>;
}

impl Quotes for BTreeMap<Ticker, Decimal> {
    fn last_close(&self, ticker: &str) -> Option<Decimal> {
        self.get(ticker).copied()
    }
}

impl Quotes for HashMap<Ticker, Decimal> {
    fn last_close(&self, ticker: &str) -> Option<Decimal> {
        self.get(ticker).copied()
    }
}
