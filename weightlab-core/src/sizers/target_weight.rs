//! Target-weight sizer.
//!
//! `shares = trunc((target - current) * equity / last_close)`, with the sign
//! selecting BUY or SELL.

use super::PositionSizer;
use crate::domain::{Action, Portfolio, Quotes};
use crate::engine::{EngineError, Stage};
use crate::events::{EventPool, OrderEvent, TargetWeightEvent};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::{trace, warn};

/// Sizes orders that move each ticker from its current weight to its target.
///
/// - A zero delta produces no order entry.
/// - A missing or non-positive close produces a skip order.
/// - A non-zero delta smaller than one share produces a zero-quantity order.
#[derive(Debug, Clone, Copy, Default)]
pub struct TargetWeightSizer;

impl TargetWeightSizer {
    pub fn new() -> Self {
        Self
    }
}

impl PositionSizer for TargetWeightSizer {
    fn size_order(
        &self,
        weights: &EventPool<TargetWeightEvent>,
        portfolio: &Portfolio,
        quotes: &dyn Quotes,
    ) -> Result<EventPool<OrderEvent>, EngineError> {
        let timestamp = weights.timestamp();
        let current = portfolio
            .current_weights()
            .map_err(|source| EngineError::Portfolio {
                stage: Stage::Sizing,
                source,
            })?;
        let equity = portfolio.total_mkt_value();

        let mut orders = EventPool::new(timestamp);
        for target in weights {
            let ticker = &target.ticker;
            let delta = target.weight - current.get(ticker).copied().unwrap_or(Decimal::ZERO);
            if delta.is_zero() {
                continue;
            }

            let price = match quotes.last_close(ticker) {
                Some(price) if price > Decimal::ZERO => price,
                _ => {
                    warn!(%ticker, %timestamp, "no close; skipping ticker this step");
                    orders.insert(OrderEvent::skip(ticker.clone()));
                    continue;
                }
            };

            let overflow = || EngineError::QuantityOverflow {
                ticker: ticker.clone(),
                timestamp,
            };
            let shares = delta
                .checked_mul(equity)
                .and_then(|dollars| dollars.checked_div(price))
                .ok_or_else(overflow)?
                .trunc();
            let quantity = shares.abs().to_i64().ok_or_else(overflow)?.unsigned_abs();
            let action = if delta > Decimal::ZERO {
                Action::Buy
            } else {
                Action::Sell
            };

            trace!(%ticker, %delta, %price, quantity, %action, "sized order");
            orders.insert(OrderEvent::new(ticker.clone(), action, quantity));
        }
        Ok(orders)
    }

    fn name(&self) -> &str {
        "target_weight"
    }
}
