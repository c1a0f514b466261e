//! Position: per-ticker share accounting.
//!
//! Tracks cumulative buys and sells, the blended average open price, cost
//! basis and realized/unrealized P&L. Invariants held after every call:
//!
//! - `net == buys - sells`
//! - `cost_basis == net * avg_price`
//! - `total_pnl == realized_pnl + unrealized_pnl`
//!
//! Realized P&L only moves on trades that reduce or reverse the open
//! position. The commission on such a trade is charged entirely against the
//! realization; on opening/increasing trades it is folded into the cost basis.

use super::action::Action;
use super::money::{round_price, running_mean};
use super::Ticker;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Share position for a single ticker.
///
/// Created on the first fill for a ticker and never removed; a position
/// netted to zero keeps its realized P&L history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    ticker: Ticker,
    buys: u64,
    sells: u64,
    net: i64,
    avg_bot: Decimal,
    avg_sld: Decimal,
    avg_price: Decimal,
    cost_basis: Decimal,
    realized_pnl: Decimal,
    unrealized_pnl: Decimal,
    total_pnl: Decimal,
    market_value: Decimal,
    total_bot: Decimal,
    total_sld: Decimal,
    total_commission: Decimal,
    net_total: Decimal,
    net_incl_comm: Decimal,
    last_mark: Option<Decimal>,
}

impl Position {
    /// Empty position with no history.
    pub fn new(ticker: impl Into<Ticker>) -> Self {
        Self {
            ticker: ticker.into(),
            buys: 0,
            sells: 0,
            net: 0,
            avg_bot: Decimal::ZERO,
            avg_sld: Decimal::ZERO,
            avg_price: Decimal::ZERO,
            cost_basis: Decimal::ZERO,
            realized_pnl: Decimal::ZERO,
            unrealized_pnl: Decimal::ZERO,
            total_pnl: Decimal::ZERO,
            market_value: Decimal::ZERO,
            total_bot: Decimal::ZERO,
            total_sld: Decimal::ZERO,
            total_commission: Decimal::ZERO,
            net_total: Decimal::ZERO,
            net_incl_comm: Decimal::ZERO,
            last_mark: None,
        }
    }

    /// Open a position with an initial fill.
    pub fn open(
        ticker: impl Into<Ticker>,
        action: Action,
        quantity: u64,
        price: Decimal,
        commission: Decimal,
    ) -> Self {
        let mut position = Self::new(ticker);
        position.transact(Some(action), quantity, price, commission);
        position
    }

    /// Net quantity after a trade, or `None` if the share counters would
    /// overflow.
    pub fn net_after(&self, action: Action, quantity: u64) -> Option<i64> {
        let signed = action.signed(quantity)?;
        let counter = match action {
            Action::Buy => self.buys,
            Action::Sell => self.sells,
        };
        counter.checked_add(quantity)?;
        self.net.checked_add(signed)
    }

    /// Apply a fill to the position.
    ///
    /// A missing action, a zero quantity or a quantity that would overflow
    /// the share counters leaves the position untouched.
    /// After the bookkeeping update the position is marked at the fill price;
    /// callers revalue at market with [`Position::update_market_value`].
    pub fn transact(
        &mut self,
        action: Option<Action>,
        quantity: u64,
        price: Decimal,
        commission: Decimal,
    ) {
        let Some(action) = action else {
            return;
        };
        if quantity == 0 {
            return;
        }
        let Some(new_net) = self.net_after(action, quantity) else {
            return;
        };
        let signed = new_net - self.net;

        self.total_commission += commission;

        match action {
            Action::Buy => {
                self.avg_bot = running_mean(self.avg_bot, self.buys, price, quantity);
                self.buys += quantity;
                self.total_bot = Decimal::from(self.buys) * self.avg_bot;
            }
            Action::Sell => {
                self.avg_sld = running_mean(self.avg_sld, self.sells, price, quantity);
                self.sells += quantity;
                self.total_sld = Decimal::from(self.sells) * self.avg_sld;
            }
        }

        let reduces = self.net != 0 && self.net.signum() != signed.signum();

        if reduces {
            let closed = quantity.min(self.net.unsigned_abs());
            let per_share = match action {
                Action::Sell => price - self.avg_price,
                Action::Buy => self.avg_price - price,
            };
            self.realized_pnl += Decimal::from(closed) * per_share - commission;

            if new_net == 0 {
                self.avg_price = Decimal::ZERO;
            } else if new_net.signum() != self.net.signum() {
                // Reversal: the remainder opens fresh at the trade price,
                // commission was already consumed by the realization.
                self.avg_price = round_price(price);
            }
            // Partial close keeps the average open price.
        } else {
            // Opening or increasing: commission is a signed cash outflow on
            // top of the traded notional. new_net is non-zero here.
            let basis = self.avg_price * Decimal::from(self.net)
                + Decimal::from(signed) * price
                + commission;
            self.avg_price = round_price(basis / Decimal::from(new_net));
        }

        self.net = new_net;
        self.cost_basis = Decimal::from(self.net) * self.avg_price;
        self.net_total = self.total_sld - self.total_bot;
        self.net_incl_comm = self.net_total - self.total_commission;

        self.update_market_value(price, price);
    }

    /// Revalue at the bid/ask midpoint and refresh P&L.
    pub fn update_market_value(&mut self, bid: Decimal, ask: Decimal) {
        let midpoint = (bid + ask) / Decimal::TWO;
        self.market_value = Decimal::from(self.net) * midpoint;
        self.unrealized_pnl = self.market_value - self.cost_basis;
        self.total_pnl = self.unrealized_pnl + self.realized_pnl;
        self.last_mark = Some(midpoint);
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn buys(&self) -> u64 {
        self.buys
    }

    pub fn sells(&self) -> u64 {
        self.sells
    }

    /// Signed share count: positive long, negative short.
    pub fn net(&self) -> i64 {
        self.net
    }

    pub fn avg_bot(&self) -> Decimal {
        self.avg_bot
    }

    pub fn avg_sld(&self) -> Decimal {
        self.avg_sld
    }

    pub fn avg_price(&self) -> Decimal {
        self.avg_price
    }

    pub fn cost_basis(&self) -> Decimal {
        self.cost_basis
    }

    pub fn realized_pnl(&self) -> Decimal {
        self.realized_pnl
    }

    pub fn unrealized_pnl(&self) -> Decimal {
        self.unrealized_pnl
    }

    pub fn total_pnl(&self) -> Decimal {
        self.total_pnl
    }

    pub fn market_value(&self) -> Decimal {
        self.market_value
    }

    pub fn total_bot(&self) -> Decimal {
        self.total_bot
    }

    pub fn total_sld(&self) -> Decimal {
        self.total_sld
    }

    pub fn total_commission(&self) -> Decimal {
        self.total_commission
    }

    /// Sale proceeds minus purchase cost, before commission.
    pub fn net_total(&self) -> Decimal {
        self.net_total
    }

    pub fn net_incl_comm(&self) -> Decimal {
        self.net_incl_comm
    }

    /// Price used by the most recent valuation.
    pub fn last_mark(&self) -> Option<Decimal> {
        self.last_mark
    }

    pub fn is_long(&self) -> bool {
        self.net > 0
    }

    pub fn is_short(&self) -> bool {
        self.net < 0
    }

    pub fn is_flat(&self) -> bool {
        self.net == 0
    }
}
