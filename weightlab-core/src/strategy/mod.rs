//! Strategy contract: turn a price pool into target weights.

pub mod constant_mix;

pub use constant_mix::{is_month_end, ConstantMixStrategy, RebalanceSchedule};

use crate::domain::Ticker;
use crate::events::{EventPool, PriceEvent, TargetWeightEvent};

/// Signal generation.
///
/// # Responsibilities
/// - Inspect the current price pool and decide whether to rebalance
/// - Emit a target-weight pool stamped with the price pool's timestamp
///
/// # Non-Responsibilities
/// - Strategies do NOT size orders or see the portfolio (that's the sizer's job)
pub trait Strategy: Send {
    /// Called once with the price universe before the first pool.
    fn initialize(&mut self, _universe: &[Ticker]) {}

    /// `None` means no rebalance this step.
    fn calculate_signals(
        &mut self,
        prices: &EventPool<PriceEvent>,
    ) -> Option<EventPool<TargetWeightEvent>>;

    /// Strategy name for logging and reports
    fn name(&self) -> &str;
}
