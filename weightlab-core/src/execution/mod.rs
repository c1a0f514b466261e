//! Execution: turn order pools into fill pools.
//!
//! Fills happen at the last observed close with zero latency and zero
//! slippage; the only friction is the commission schedule.

pub mod commission;
pub mod simulated;

pub use commission::CommissionSchedule;
pub use simulated::SimulatedExecutionHandler;

use crate::domain::Quotes;
use crate::events::{EventPool, FillEvent, OrderEvent};

/// Order execution
///
/// Skip orders and zero-quantity orders never become fills. The returned
/// pool carries the order pool's timestamp.
pub trait ExecutionHandler: Send + Sync {
    fn execute_order(&self, orders: &EventPool<OrderEvent>, quotes: &dyn Quotes)
        -> EventPool<FillEvent>;

    /// Handler name for logging
    fn name(&self) -> &str;
}
