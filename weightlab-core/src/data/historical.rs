//! In-memory price source replaying pre-loaded daily observations.

use super::{DataError, PriceSource};
use crate::domain::{Quotes, Ticker, Timestamp};
use crate::events::{EventPool, PriceEvent};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// One close observation for one ticker on one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceObservation {
    pub timestamp: Timestamp,
    pub ticker: Ticker,
    pub close: Decimal,
    pub adj_close: Decimal,
}

impl PriceObservation {
    pub fn new(
        timestamp: Timestamp,
        ticker: impl Into<Ticker>,
        close: Decimal,
        adj_close: Decimal,
    ) -> Self {
        Self {
            timestamp,
            ticker: ticker.into(),
            close,
            adj_close,
        }
    }
}

/// Replays observations one timestamp at a time.
///
/// The calendar is the sorted set of observed timestamps. A ticker with no
/// row on a calendar date is simply absent from that step's pool and has no
/// close for that step.
#[derive(Debug, Clone)]
pub struct HistoricalPriceSource {
    universe: Vec<Ticker>,
    calendar: Vec<Timestamp>,
    rows: BTreeMap<Timestamp, Vec<PriceEvent>>,
    cursor: usize,
    current: Option<EventPool<PriceEvent>>,
}

impl HistoricalPriceSource {
    /// Build a source over an explicit universe.
    ///
    /// Every observation must belong to the universe, carry a positive close,
    /// and be unique per (timestamp, ticker).
    pub fn new(
        universe: impl IntoIterator<Item = Ticker>,
        observations: impl IntoIterator<Item = PriceObservation>,
    ) -> Result<Self, DataError> {
        let mut universe: Vec<Ticker> = universe.into_iter().collect();
        universe.sort();
        universe.dedup();
        if universe.is_empty() {
            return Err(DataError::EmptyUniverse);
        }

        let mut by_date: BTreeMap<Timestamp, BTreeMap<Ticker, PriceEvent>> = BTreeMap::new();
        for obs in observations {
            if universe.binary_search(&obs.ticker).is_err() {
                return Err(DataError::UnknownTicker {
                    ticker: obs.ticker,
                    timestamp: obs.timestamp,
                });
            }
            if obs.close <= Decimal::ZERO {
                return Err(DataError::NonPositivePrice {
                    ticker: obs.ticker,
                    timestamp: obs.timestamp,
                    close: obs.close,
                });
            }
            let day = by_date.entry(obs.timestamp).or_default();
            if day.contains_key(&obs.ticker) {
                return Err(DataError::DuplicateObservation {
                    ticker: obs.ticker,
                    timestamp: obs.timestamp,
                });
            }
            day.insert(
                obs.ticker.clone(),
                PriceEvent::new(obs.ticker, obs.close, obs.adj_close),
            );
        }

        let calendar: Vec<Timestamp> = by_date.keys().copied().collect();
        let rows = by_date
            .into_iter()
            .map(|(ts, day)| (ts, day.into_values().collect()))
            .collect();

        debug!(
            tickers = universe.len(),
            timestamps = calendar.len(),
            "historical price source loaded"
        );

        Ok(Self {
            universe,
            calendar,
            rows,
            cursor: 0,
            current: None,
        })
    }

    /// Build a source whose universe is every ticker that appears in the data.
    pub fn from_observations(observations: Vec<PriceObservation>) -> Result<Self, DataError> {
        let universe: Vec<Ticker> = observations.iter().map(|o| o.ticker.clone()).collect();
        Self::new(universe, observations)
    }

    pub fn calendar(&self) -> &[Timestamp] {
        &self.calendar
    }

    /// Number of timestamps not yet streamed.
    pub fn remaining(&self) -> usize {
        self.calendar.len().saturating_sub(self.cursor)
    }
}

impl Quotes for HistoricalPriceSource {
    fn last_close(&self, ticker: &str) -> Option<Decimal> {
        self.current
            .as_ref()
            .and_then(|pool| pool.get(ticker))
            .map(|event| event.close)
    }
}

impl PriceSource for HistoricalPriceSource {
    fn tickers(&self) -> &[Ticker] {
        &self.universe
    }

    fn stream_next(&mut self) -> Option<EventPool<PriceEvent>> {
        let timestamp = *self.calendar.get(self.cursor)?;
        self.cursor += 1;

        let events = self.rows.get(&timestamp).cloned().unwrap_or_default();
        let pool = EventPool::from_events(timestamp, events);
        trace!(%timestamp, quoted = pool.len(), "streamed price pool");
        self.current = Some(pool.clone());
        Some(pool)
    }

    fn continue_backtest(&self) -> bool {
        self.cursor < self.calendar.len()
    }

    fn current_timestamp(&self) -> Option<Timestamp> {
        self.current.as_ref().map(EventPool::timestamp)
    }
}
