//! Constant-mix strategy: fixed target weights on a rebalance schedule.

use super::Strategy;
use crate::domain::{Ticker, Timestamp};
use crate::events::{EventPool, PriceEvent, TargetWeightEvent};
use chrono::Datelike;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// When a constant-mix strategy re-emits its weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RebalanceSchedule {
    /// Last calendar day of each month.
    #[default]
    MonthEnd,
    EveryStep,
}

impl RebalanceSchedule {
    pub fn is_rebalance_date(self, timestamp: Timestamp) -> bool {
        match self {
            RebalanceSchedule::MonthEnd => is_month_end(timestamp),
            RebalanceSchedule::EveryStep => true,
        }
    }
}

/// True when `date` is the last calendar day of its month.
///
/// Calendar, not trading calendar: a month whose last trading day falls
/// before its last calendar day never rebalances.
pub fn is_month_end(date: Timestamp) -> bool {
    date.succ_opt().map_or(true, |next| next.month() != date.month())
}

#[derive(Debug, Clone)]
pub struct ConstantMixStrategy {
    weights: BTreeMap<Ticker, Decimal>,
    schedule: RebalanceSchedule,
}

impl ConstantMixStrategy {
    pub fn new(weights: BTreeMap<Ticker, Decimal>, schedule: RebalanceSchedule) -> Self {
        Self { weights, schedule }
    }

    pub fn weights(&self) -> &BTreeMap<Ticker, Decimal> {
        &self.weights
    }

    pub fn schedule(&self) -> RebalanceSchedule {
        self.schedule
    }
}

impl Strategy for ConstantMixStrategy {
    fn initialize(&mut self, universe: &[Ticker]) {
        for ticker in self.weights.keys() {
            if !universe.contains(ticker) {
                warn!(%ticker, "target ticker is not in the price universe");
            }
        }
    }

    fn calculate_signals(
        &mut self,
        prices: &EventPool<PriceEvent>,
    ) -> Option<EventPool<TargetWeightEvent>> {
        let timestamp = prices.timestamp();
        if !self.schedule.is_rebalance_date(timestamp) {
            return None;
        }
        debug!(%timestamp, targets = self.weights.len(), "rebalancing");
        Some(EventPool::from_weights(timestamp, &self.weights))
    }

    fn name(&self) -> &str {
        "constant_mix"
    }
}
