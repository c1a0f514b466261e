//! Price data: the price-source contract and an in-memory historical source.

pub mod historical;

pub use historical::{HistoricalPriceSource, PriceObservation};

use crate::domain::{Quotes, Ticker, Timestamp};
use crate::events::{EventPool, PriceEvent};
use rust_decimal::Decimal;

/// Supplies one price pool per simulated timestamp.
///
/// # Contract
/// - `stream_next` returns pools whose timestamps strictly advance, and
///   `None` once the calendar is exhausted.
/// - `last_close` (from [`Quotes`]) reports the close observed at the most
///   recently streamed timestamp; tickers without a row that step report
///   `None`.
pub trait PriceSource: Quotes + Send {
    /// Called once before the first pool is requested.
    fn initialize(&mut self) -> Result<(), DataError> {
        Ok(())
    }

    /// Universe of tickers this source can quote.
    fn tickers(&self) -> &[Ticker];

    fn stream_next(&mut self) -> Option<EventPool<PriceEvent>>;

    fn continue_backtest(&self) -> bool;

    fn current_timestamp(&self) -> Option<Timestamp>;
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DataError {
    #[error("price universe is empty")]
    EmptyUniverse,

    #[error("duplicate observation for '{ticker}' at {timestamp}")]
    DuplicateObservation { ticker: Ticker, timestamp: Timestamp },

    #[error("non-positive close {close} for '{ticker}' at {timestamp}")]
    NonPositivePrice {
        ticker: Ticker,
        timestamp: Timestamp,
        close: Decimal,
    },

    #[error("observation for '{ticker}' at {timestamp} is outside the universe")]
    UnknownTicker { ticker: Ticker, timestamp: Timestamp },
}
