//! Event pools: one timestamp, one kind, one event per ticker.

use super::{Event, EventKind, FillEvent, OrderEvent, PriceEvent, TargetWeightEvent};
use crate::domain::{Ticker, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::btree_map::{self, BTreeMap};

/// Ticker-keyed batch of same-kind events for a single timestamp.
///
/// The kind is fixed by the event type and the timestamp belongs to the pool,
/// so every member shares both by construction. Iteration is in ticker order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventPool<E> {
    timestamp: Timestamp,
    events: BTreeMap<Ticker, E>,
}

impl<E: Event> EventPool<E> {
    pub fn new(timestamp: Timestamp) -> Self {
        Self {
            timestamp,
            events: BTreeMap::new(),
        }
    }

    /// Build a pool from events; a later event for the same ticker wins.
    pub fn from_events(timestamp: Timestamp, events: impl IntoIterator<Item = E>) -> Self {
        let mut pool = Self::new(timestamp);
        for event in events {
            pool.insert(event);
        }
        pool
    }

    pub fn kind(&self) -> EventKind {
        E::KIND
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Insert an event keyed by its ticker, returning any event it replaced.
    pub fn insert(&mut self, event: E) -> Option<E> {
        self.events.insert(event.ticker().to_string(), event)
    }

    pub fn get(&self, ticker: &str) -> Option<&E> {
        self.events.get(ticker)
    }

    pub fn contains(&self, ticker: &str) -> bool {
        self.events.contains_key(ticker)
    }

    pub fn iter(&self) -> btree_map::Values<'_, Ticker, E> {
        self.events.values()
    }

    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.events.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl<'a, E: Event> IntoIterator for &'a EventPool<E> {
    type Item = &'a E;
    type IntoIter = btree_map::Values<'a, Ticker, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl EventPool<TargetWeightEvent> {
    /// Pool holding one target weight per ticker.
    pub fn from_weights<'a>(
        timestamp: Timestamp,
        weights: impl IntoIterator<Item = (&'a Ticker, &'a Decimal)>,
    ) -> Self {
        Self::from_events(
            timestamp,
            weights
                .into_iter()
                .map(|(ticker, weight)| TargetWeightEvent::new(ticker.clone(), *weight)),
        )
    }

    pub fn weights(&self) -> BTreeMap<Ticker, Decimal> {
        self.events
            .iter()
            .map(|(ticker, event)| (ticker.clone(), event.weight))
            .collect()
    }
}

/// A pool in flight on the dispatch queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Pool {
    Price(EventPool<PriceEvent>),
    TargetWeight(EventPool<TargetWeightEvent>),
    Order(EventPool<OrderEvent>),
    Fill(EventPool<FillEvent>),
}

impl Pool {
    pub fn kind(&self) -> EventKind {
        match self {
            Pool::Price(_) => EventKind::Price,
            Pool::TargetWeight(_) => EventKind::TargetWeight,
            Pool::Order(_) => EventKind::Order,
            Pool::Fill(_) => EventKind::Fill,
        }
    }

    pub fn timestamp(&self) -> Timestamp {
        match self {
            Pool::Price(p) => p.timestamp(),
            Pool::TargetWeight(p) => p.timestamp(),
            Pool::Order(p) => p.timestamp(),
            Pool::Fill(p) => p.timestamp(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Pool::Price(p) => p.len(),
            Pool::TargetWeight(p) => p.len(),
            Pool::Order(p) => p.len(),
            Pool::Fill(p) => p.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<EventPool<PriceEvent>> for Pool {
    fn from(pool: EventPool<PriceEvent>) -> Self {
        Pool::Price(pool)
    }
}

impl From<EventPool<TargetWeightEvent>> for Pool {
    fn from(pool: EventPool<TargetWeightEvent>) -> Self {
        Pool::TargetWeight(pool)
    }
}

impl From<EventPool<OrderEvent>> for Pool {
    fn from(pool: EventPool<OrderEvent>) -> Self {
        Pool::Order(pool)
    }
}

impl From<EventPool<FillEvent>> for Pool {
    fn from(pool: EventPool<FillEvent>) -> Self {
        Pool::Fill(pool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Action;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn ts() -> Timestamp {
        NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()
    }

    #[test]
    fn pool_is_keyed_by_ticker() {
        let mut pool = EventPool::new(ts());
        pool.insert(PriceEvent::new("SPY", dec!(100), dec!(99)));
        let replaced = pool.insert(PriceEvent::new("SPY", dec!(101), dec!(100)));

        assert_eq!(pool.len(), 1);
        assert_eq!(replaced.unwrap().close, dec!(100));
        assert_eq!(pool.get("SPY").unwrap().close, dec!(101));
        assert_eq!(pool.kind(), EventKind::Price);
    }

    #[test]
    fn iteration_is_in_ticker_order() {
        let pool = EventPool::from_events(
            ts(),
            vec![
                OrderEvent::new("QQQ", Action::Buy, 1),
                OrderEvent::new("AGG", Action::Sell, 2),
                OrderEvent::skip("SPY"),
            ],
        );
        let tickers: Vec<_> = pool.tickers().collect();
        assert_eq!(tickers, vec!["AGG", "QQQ", "SPY"]);
    }

    #[test]
    fn weights_roundtrip_through_pool() {
        let mut weights = BTreeMap::new();
        weights.insert("A".to_string(), dec!(0.4));
        weights.insert("B".to_string(), dec!(0.6));
        let pool = EventPool::from_weights(ts(), &weights);
        assert_eq!(pool.weights(), weights);
    }

    #[test]
    fn envelope_reports_kind_and_timestamp() {
        let pool: Pool = EventPool::<FillEvent>::new(ts()).into();
        assert_eq!(pool.kind(), EventKind::Fill);
        assert_eq!(pool.timestamp(), ts());
        assert!(pool.is_empty());
    }
}
