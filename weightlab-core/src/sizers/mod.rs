//! Position Sizers: translate target weights into share orders
//!
//! Sizers compare each target weight against the portfolio's current weight
//! and convert the difference into a whole number of shares at the last close.

pub mod target_weight;

pub use target_weight::TargetWeightSizer;

use crate::domain::{Portfolio, Quotes};
use crate::engine::EngineError;
use crate::events::{EventPool, OrderEvent, TargetWeightEvent};

/// Position sizing logic
///
/// # Responsibilities
/// - Convert target weights + portfolio equity + last closes → share orders
/// - Mark tickers it cannot price as skipped (no action, no quantity)
/// - Never oversize: quantities round toward zero
///
/// # Non-Responsibilities
/// - Sizers do NOT decide targets (that's the strategy's job)
/// - Sizers do NOT price fills or charge commission (that's execution's job)
pub trait PositionSizer: Send + Sync {
    /// Size one order per ticker whose target differs from its current weight.
    ///
    /// The returned pool carries the weight pool's timestamp.
    fn size_order(
        &self,
        weights: &EventPool<TargetWeightEvent>,
        portfolio: &Portfolio,
        quotes: &dyn Quotes,
    ) -> Result<EventPool<OrderEvent>, EngineError>;

    /// Sizer name for logging
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Action;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    struct DummySizer;

    impl PositionSizer for DummySizer {
        fn size_order(
            &self,
            weights: &EventPool<TargetWeightEvent>,
            _portfolio: &Portfolio,
            _quotes: &dyn Quotes,
        ) -> Result<EventPool<OrderEvent>, EngineError> {
            Ok(EventPool::from_events(
                weights.timestamp(),
                weights.iter().map(|w| OrderEvent::new(w.ticker.clone(), Action::Buy, 100)),
            ))
        }

        fn name(&self) -> &str {
            "dummy"
        }
    }

    #[test]
    fn test_sizer_trait_compiles() {
        let sizer: Box<dyn PositionSizer> = Box::new(DummySizer);
        let ts = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let weights = EventPool::from_events(ts, vec![TargetWeightEvent::new("SPY", dec!(1))]);
        let quotes: BTreeMap<String, Decimal> = BTreeMap::new();

        let orders = sizer
            .size_order(&weights, &Portfolio::new(dec!(1000)), &quotes)
            .unwrap();
        assert_eq!(orders.get("SPY").unwrap().quantity, Some(100));
        assert_eq!(sizer.name(), "dummy");
    }
}
