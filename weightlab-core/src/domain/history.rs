//! Time-indexed portfolio histories handed to the statistics collector.

use super::{Ticker, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Portfolio value and cash at one timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueRecord {
    pub timestamp: Timestamp,
    pub total_mkt_value: Decimal,
    pub cash: Decimal,
}

/// Net quantity and weight of one ticker at one timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingRecord {
    pub timestamp: Timestamp,
    pub ticker: Ticker,
    pub quantity: i64,
    pub weight: Decimal,
}

/// Value/cash series plus the (timestamp, ticker)-indexed holdings table.
///
/// Several valuation passes can run within one timestamp. The latest pass
/// replaces the rows of earlier ones, so each timestamp appears once in
/// `values` and once per known ticker in `holdings`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioHistory {
    values: Vec<ValueRecord>,
    holdings: Vec<HoldingRecord>,
}

impl PortfolioHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one valuation pass, replacing any rows already stored for the
    /// same timestamp.
    pub fn record(&mut self, value: ValueRecord, holdings: Vec<HoldingRecord>) {
        let timestamp = value.timestamp;
        if self.values.last().is_some_and(|v| v.timestamp == timestamp) {
            self.values.pop();
        }
        self.values.push(value);

        while self.holdings.last().is_some_and(|h| h.timestamp == timestamp) {
            self.holdings.pop();
        }
        self.holdings.extend(holdings);
    }

    pub fn values(&self) -> &[ValueRecord] {
        &self.values
    }

    pub fn holdings(&self) -> &[HoldingRecord] {
        &self.holdings
    }

    /// Holdings rows for a single timestamp.
    pub fn holdings_at(&self, timestamp: Timestamp) -> impl Iterator<Item = &HoldingRecord> {
        self.holdings.iter().filter(move |h| h.timestamp == timestamp)
    }

    /// Total market value per recorded timestamp.
    pub fn equity_curve(&self) -> Vec<Decimal> {
        self.values.iter().map(|v| v.total_mkt_value).collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
