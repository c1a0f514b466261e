//! Simulated execution at the last close.

use super::{CommissionSchedule, ExecutionHandler};
use crate::domain::Quotes;
use crate::events::{EventPool, FillEvent, OrderEvent};
use tracing::{trace, warn};

#[derive(Debug, Clone, Default)]
pub struct SimulatedExecutionHandler {
    commission: CommissionSchedule,
}

impl SimulatedExecutionHandler {
    pub fn new(commission: CommissionSchedule) -> Self {
        Self { commission }
    }

    pub fn commission_schedule(&self) -> &CommissionSchedule {
        &self.commission
    }
}

impl ExecutionHandler for SimulatedExecutionHandler {
    fn execute_order(
        &self,
        orders: &EventPool<OrderEvent>,
        quotes: &dyn Quotes,
    ) -> EventPool<FillEvent> {
        let timestamp = orders.timestamp();
        let mut fills = EventPool::new(timestamp);

        for order in orders {
            let (Some(action), Some(quantity)) = (order.action, order.quantity) else {
                trace!(ticker = %order.ticker, "dropping skip order");
                continue;
            };
            if quantity == 0 {
                trace!(ticker = %order.ticker, "dropping zero-quantity order");
                continue;
            }
            let Some(price) = quotes.last_close(&order.ticker) else {
                warn!(ticker = %order.ticker, %timestamp, "no close; order not filled");
                continue;
            };

            let commission = self.commission.commission(price, quantity);
            trace!(
                ticker = %order.ticker,
                %action,
                quantity,
                %price,
                %commission,
                "filled order"
            );
            fills.insert(FillEvent::new(
                order.ticker.clone(),
                action,
                quantity,
                price,
                commission,
            ));
        }
        fills
    }

    fn name(&self) -> &str {
        "simulated"
    }
}
