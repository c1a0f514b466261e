//! Event model: typed per-ticker events and the same-kind pools that carry
//! them through the dispatch queue.
//!
//! A single event never travels on its own. Producers build an
//! [`EventPool`] keyed by ticker for one timestamp, and the dispatch queue
//! moves [`Pool`] values, a sum type tagged by [`EventKind`].

pub mod pool;

pub use pool::{EventPool, Pool};

use crate::domain::{Action, Ticker};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind tag shared by an event type and the pools that carry it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    Price,
    TargetWeight,
    Order,
    Fill,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::Price => "PRICE",
            EventKind::TargetWeight => "TARGET_WEIGHT",
            EventKind::Order => "ORDER",
            EventKind::Fill => "FILL",
        };
        f.write_str(name)
    }
}

/// A per-ticker event that can live in an [`EventPool`].
pub trait Event {
    const KIND: EventKind;

    fn ticker(&self) -> &str;
}

/// Close and adjusted close observed for a ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceEvent {
    pub ticker: Ticker,
    pub close: Decimal,
    pub adj_close: Decimal,
}

impl PriceEvent {
    pub fn new(ticker: impl Into<Ticker>, close: Decimal, adj_close: Decimal) -> Self {
        Self {
            ticker: ticker.into(),
            close,
            adj_close,
        }
    }
}

impl Event for PriceEvent {
    const KIND: EventKind = EventKind::Price;

    fn ticker(&self) -> &str {
        &self.ticker
    }
}

/// Desired fraction of equity for a ticker. Negative targets are shorts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetWeightEvent {
    pub ticker: Ticker,
    pub weight: Decimal,
}

impl TargetWeightEvent {
    pub fn new(ticker: impl Into<Ticker>, weight: Decimal) -> Self {
        Self {
            ticker: ticker.into(),
            weight,
        }
    }
}

impl Event for TargetWeightEvent {
    const KIND: EventKind = EventKind::TargetWeight;

    fn ticker(&self) -> &str {
        &self.ticker
    }
}

/// Share order for a ticker.
///
/// An order with neither action nor quantity is a *skip*: the sizer could
/// not price the ticker this step. That is distinct from an order whose
/// quantity floored to zero shares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderEvent {
    pub ticker: Ticker,
    pub action: Option<Action>,
    pub quantity: Option<u64>,
}

impl OrderEvent {
    pub fn new(ticker: impl Into<Ticker>, action: Action, quantity: u64) -> Self {
        Self {
            ticker: ticker.into(),
            action: Some(action),
            quantity: Some(quantity),
        }
    }

    /// Placeholder recording that the ticker was skipped this step.
    pub fn skip(ticker: impl Into<Ticker>) -> Self {
        Self {
            ticker: ticker.into(),
            action: None,
            quantity: None,
        }
    }

    pub fn is_skip(&self) -> bool {
        self.action.is_none()
    }

    /// Whether the order would trade at least one share.
    pub fn is_executable(&self) -> bool {
        self.action.is_some() && self.quantity.is_some_and(|q| q > 0)
    }
}

impl Event for OrderEvent {
    const KIND: EventKind = EventKind::Order;

    fn ticker(&self) -> &str {
        &self.ticker
    }
}

/// Executed trade. Valid only when both action and quantity are present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillEvent {
    pub ticker: Ticker,
    pub action: Option<Action>,
    pub quantity: Option<u64>,
    pub price: Decimal,
    pub commission: Decimal,
}

impl FillEvent {
    pub fn new(
        ticker: impl Into<Ticker>,
        action: Action,
        quantity: u64,
        price: Decimal,
        commission: Decimal,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            action: Some(action),
            quantity: Some(quantity),
            price,
            commission,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.action.is_some() && self.quantity.is_some()
    }
}

impl Event for FillEvent {
    const KIND: EventKind = EventKind::Fill;

    fn ticker(&self) -> &str {
        &self.ticker
    }
}
