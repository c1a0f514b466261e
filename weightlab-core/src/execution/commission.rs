//! Commission schedule: per-share fee with a floor and a notional cap.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// `commission = min(max_notional_fraction * price * qty, max(minimum, per_share * qty))`
///
/// Defaults: half a cent per share, one currency unit minimum, capped at half
/// the notional.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommissionSchedule {
    pub per_share: Decimal,
    pub minimum: Decimal,
    pub max_notional_fraction: Decimal,
}

impl Default for CommissionSchedule {
    fn default() -> Self {
        Self {
            per_share: dec!(0.005),
            minimum: dec!(1.0),
            max_notional_fraction: dec!(0.5),
        }
    }
}

impl CommissionSchedule {
    pub fn new(per_share: Decimal, minimum: Decimal, max_notional_fraction: Decimal) -> Self {
        Self {
            per_share,
            minimum,
            max_notional_fraction,
        }
    }

    pub fn free() -> Self {
        Self::new(Decimal::ZERO, Decimal::ZERO, Decimal::ZERO)
    }

    /// Commission for a fill of `quantity` shares at `price`.
    pub fn commission(&self, price: Decimal, quantity: u64) -> Decimal {
        let shares = Decimal::from(quantity);
        let cap = self.max_notional_fraction * price * shares;
        let fee = self.minimum.max(self.per_share * shares);
        cap.min(fee)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_schedule_charges_nothing() {
        assert_eq!(CommissionSchedule::free().commission(dec!(100), 50), Decimal::ZERO);
    }

    #[test]
    fn minimum_applies_to_small_orders() {
        let schedule = CommissionSchedule::default();
        // 0.005 * 100 = 0.5 -> floor of 1.0
        assert_eq!(schedule.commission(dec!(100), 100), dec!(1.0));
    }

    #[test]
    fn per_share_applies_to_large_orders() {
        let schedule = CommissionSchedule::default();
        assert_eq!(schedule.commission(dec!(100), 4000), dec!(20.000));
    }

    #[test]
    fn capped_at_half_notional() {
        let schedule = CommissionSchedule::default();
        // notional 1.00, cap 0.50 beats the 1.0 minimum
        assert_eq!(schedule.commission(dec!(0.5), 2), dec!(0.50));
    }

    #[test]
    fn partial_toml_style_override_keeps_defaults() {
        let parsed: CommissionSchedule = serde_json::from_str(r#"{"minimum": 2.5}"#).unwrap();
        assert_eq!(parsed.minimum, dec!(2.5));
        assert_eq!(parsed.per_share, dec!(0.005));
    }
}
