//! Portfolio: aggregate state of cash plus every position ever traded.

use super::action::Action;
use super::history::{HoldingRecord, PortfolioHistory, ValueRecord};
use super::position::Position;
use super::{Quotes, Ticker, Timestamp};
use crate::events::FillEvent;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{trace, warn};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PortfolioError {
    /// Total market value is zero or negative, so weights are undefined.
    #[error("portfolio value {value} is not positive at {timestamp:?}; weights are undefined")]
    DegenerateValue {
        timestamp: Option<Timestamp>,
        value: Decimal,
    },
    #[error("no position for ticker '{0}'")]
    UnknownTicker(Ticker),
    /// The trade would overflow the position's share counters.
    #[error("quantity {quantity} for '{ticker}' overflows the position")]
    QuantityOverflow { ticker: Ticker, quantity: u64 },
}

/// Aggregate portfolio state.
///
/// The valuation identity `total_mkt_value == initial_cash + Σ total_pnl`
/// holds after every [`Portfolio::update_portfolio`] call.
#[derive(Debug, Clone)]
pub struct Portfolio {
    initial_cash: Decimal,
    cash: Decimal,
    total_mkt_value: Decimal,
    positions: BTreeMap<Ticker, Position>,
    history: PortfolioHistory,
    last_update: Option<Timestamp>,
}

impl Portfolio {
    pub fn new(initial_cash: Decimal) -> Self {
        Self {
            initial_cash,
            cash: initial_cash,
            total_mkt_value: initial_cash,
            positions: BTreeMap::new(),
            history: PortfolioHistory::new(),
            last_update: None,
        }
    }

    /// Apply a fill event. Fills missing an action or quantity are ignored.
    pub fn apply_fill<Q: Quotes + ?Sized>(
        &mut self,
        fill: &FillEvent,
        timestamp: Timestamp,
        quotes: &Q,
    ) -> Result<(), PortfolioError> {
        match (fill.action, fill.quantity) {
            (Some(action), Some(quantity)) => self.transact_position(
                timestamp,
                action,
                &fill.ticker,
                quantity,
                fill.price,
                fill.commission,
                quotes,
            ),
            _ => {
                trace!(ticker = %fill.ticker, "ignoring incomplete fill");
                Ok(())
            }
        }
    }

    /// Book a trade: adjust cash, create or update the position, then revalue.
    ///
    /// A zero quantity books nothing, commission included.
    #[allow(clippy::too_many_arguments)]
    pub fn transact_position<Q: Quotes + ?Sized>(
        &mut self,
        timestamp: Timestamp,
        action: Action,
        ticker: &str,
        quantity: u64,
        price: Decimal,
        commission: Decimal,
        quotes: &Q,
    ) -> Result<(), PortfolioError> {
        if quantity == 0 {
            trace!(%ticker, %action, "ignoring zero-quantity trade");
            return Ok(());
        }
        let fits = match self.positions.get(ticker) {
            Some(position) => position.net_after(action, quantity).is_some(),
            None => action.signed(quantity).is_some(),
        };
        if !fits {
            return Err(PortfolioError::QuantityOverflow {
                ticker: ticker.to_string(),
                quantity,
            });
        }

        let notional = Decimal::from(quantity) * price;
        match action {
            Action::Buy => self.cash -= notional + commission,
            Action::Sell => self.cash += notional - commission,
        }

        self.positions
            .entry(ticker.to_string())
            .or_insert_with(|| Position::new(ticker))
            .transact(Some(action), quantity, price, commission);

        trace!(%ticker, %action, quantity, %price, %commission, cash = %self.cash, "transaction booked");

        self.update_portfolio(timestamp, quotes)
    }

    /// Revalue every position at its last close and append a history row.
    ///
    /// Bid and ask are both taken as the close. A ticker with no close on
    /// this step is carried at its last mark (or its average price if it was
    /// never marked).
    pub fn update_portfolio<Q: Quotes + ?Sized>(
        &mut self,
        timestamp: Timestamp,
        quotes: &Q,
    ) -> Result<(), PortfolioError> {
        self.last_update = Some(timestamp);

        let mut total = self.initial_cash;
        for (ticker, position) in self.positions.iter_mut() {
            let close = match quotes.last_close(ticker) {
                Some(close) => close,
                None => {
                    let carried = position.last_mark().unwrap_or(position.avg_price());
                    if !position.is_flat() {
                        warn!(%ticker, %timestamp, price = %carried, "no close; carrying last mark");
                    }
                    carried
                }
            };
            position.update_market_value(close, close);
            total += position.total_pnl();
        }
        self.total_mkt_value = total;

        let weights = self.current_weights()?;
        let holdings = self
            .positions
            .iter()
            .map(|(ticker, position)| HoldingRecord {
                timestamp,
                ticker: ticker.clone(),
                quantity: position.net(),
                weight: weights.get(ticker).copied().unwrap_or(Decimal::ZERO),
            })
            .collect();

        self.history.record(
            ValueRecord {
                timestamp,
                total_mkt_value: self.total_mkt_value,
                cash: self.cash,
            },
            holdings,
        );
        Ok(())
    }

    /// Weight of every known ticker: `market_value / total_mkt_value`.
    pub fn current_weights(&self) -> Result<BTreeMap<Ticker, Decimal>, PortfolioError> {
        if self.positions.is_empty() {
            return Ok(BTreeMap::new());
        }
        let total = self.positive_total()?;
        Ok(self
            .positions
            .iter()
            .map(|(ticker, position)| (ticker.clone(), position.market_value() / total))
            .collect())
    }

    /// Weight of a single ticker.
    pub fn current_weight(&self, ticker: &str) -> Result<Decimal, PortfolioError> {
        let position = self
            .positions
            .get(ticker)
            .ok_or_else(|| PortfolioError::UnknownTicker(ticker.to_string()))?;
        let total = self.positive_total()?;
        Ok(position.market_value() / total)
    }

    fn positive_total(&self) -> Result<Decimal, PortfolioError> {
        if self.total_mkt_value <= Decimal::ZERO {
            return Err(PortfolioError::DegenerateValue {
                timestamp: self.last_update,
                value: self.total_mkt_value,
            });
        }
        Ok(self.total_mkt_value)
    }

    pub fn initial_cash(&self) -> Decimal {
        self.initial_cash
    }

    pub fn cash(&self) -> Decimal {
        self.cash
    }

    /// Portfolio equity as of the last valuation pass.
    pub fn total_mkt_value(&self) -> Decimal {
        self.total_mkt_value
    }

    pub fn positions(&self) -> &BTreeMap<Ticker, Position> {
        &self.positions
    }

    pub fn position(&self, ticker: &str) -> Option<&Position> {
        self.positions.get(ticker)
    }

    pub fn history(&self) -> &PortfolioHistory {
        &self.history
    }

    pub fn realized_pnl(&self) -> Decimal {
        self.positions.values().map(Position::realized_pnl).sum()
    }

    pub fn unrealized_pnl(&self) -> Decimal {
        self.positions.values().map(Position::unrealized_pnl).sum()
    }

    pub fn total_commission(&self) -> Decimal {
        self.positions.values().map(Position::total_commission).sum()
    }

    /// Cash plus the market value of all positions.
    ///
    /// Agrees with `total_mkt_value` up to the rounding of average prices.
    pub fn net_liquidation_value(&self) -> Decimal {
        self.cash + self.positions.values().map(Position::market_value).sum::<Decimal>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> Timestamp {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn quotes(pairs: &[(&str, Decimal)]) -> BTreeMap<Ticker, Decimal> {
        pairs.iter().map(|(t, p)| (t.to_string(), *p)).collect()
    }

    #[test]
    fn new_portfolio_is_all_cash() {
        let portfolio = Portfolio::new(dec!(100000));
        assert_eq!(portfolio.cash(), dec!(100000));
        assert_eq!(portfolio.total_mkt_value(), dec!(100000));
        assert!(portfolio.current_weights().unwrap().is_empty());
    }

    #[test]
    fn buy_debits_cash_and_commission() {
        let mut portfolio = Portfolio::new(dec!(100000));
        let q = quotes(&[("SPY", dec!(100))]);
        portfolio
            .transact_position(day(1), Action::Buy, "SPY", 100, dec!(100), dec!(1), &q)
            .unwrap();

        assert_eq!(portfolio.cash(), dec!(89999));
        assert_eq!(portfolio.position("SPY").unwrap().net(), 100);
        // 100000 + (10000 - 10001)
        assert_eq!(portfolio.total_mkt_value(), dec!(99999));
    }

    #[test]
    fn sell_credits_cash_net_of_commission() {
        let mut portfolio = Portfolio::new(dec!(100000));
        let q = quotes(&[("SPY", dec!(100))]);
        portfolio
            .transact_position(day(1), Action::Sell, "SPY", 10, dec!(100), dec!(1), &q)
            .unwrap();
        assert_eq!(portfolio.cash(), dec!(100999));
        assert!(portfolio.position("SPY").unwrap().is_short());
    }

    #[test]
    fn valuation_identity_after_price_move() {
        let mut portfolio = Portfolio::new(dec!(100000));
        let q = quotes(&[("SPY", dec!(100)), ("AGG", dec!(50))]);
        portfolio
            .transact_position(day(1), Action::Buy, "SPY", 100, dec!(100), dec!(1), &q)
            .unwrap();
        portfolio
            .transact_position(day(1), Action::Buy, "AGG", 200, dec!(50), dec!(1), &q)
            .unwrap();

        let moved = quotes(&[("SPY", dec!(110)), ("AGG", dec!(45))]);
        portfolio.update_portfolio(day(2), &moved).unwrap();

        let pnl: Decimal = portfolio.positions().values().map(Position::total_pnl).sum();
        assert_eq!(portfolio.total_mkt_value(), portfolio.initial_cash() + pnl);
        assert_eq!(portfolio.total_mkt_value(), portfolio.net_liquidation_value());
        // 100000 + (1000 - 1) + (-1000 - 1)
        assert_eq!(portfolio.total_mkt_value(), dec!(99998));
    }

    #[test]
    fn weights_are_market_value_over_total() {
        let mut portfolio = Portfolio::new(dec!(10000));
        let q = quotes(&[("SPY", dec!(100))]);
        portfolio
            .transact_position(day(1), Action::Buy, "SPY", 50, dec!(100), Decimal::ZERO, &q)
            .unwrap();
        assert_eq!(portfolio.current_weight("SPY").unwrap(), dec!(0.5));
        assert_eq!(portfolio.current_weights().unwrap()["SPY"], dec!(0.5));
    }

    #[test]
    fn unknown_ticker_weight_is_error() {
        let portfolio = Portfolio::new(dec!(10000));
        assert_eq!(
            portfolio.current_weight("XYZ"),
            Err(PortfolioError::UnknownTicker("XYZ".into()))
        );
    }

    #[test]
    fn degenerate_value_fails_fast() {
        let mut portfolio = Portfolio::new(dec!(1000));
        let q = quotes(&[("SPY", dec!(100))]);
        portfolio
            .transact_position(day(1), Action::Buy, "SPY", 10, dec!(100), Decimal::ZERO, &q)
            .unwrap();

        let crashed = quotes(&[("SPY", dec!(0))]);
        let err = portfolio.update_portfolio(day(2), &crashed).unwrap_err();
        assert_eq!(
            err,
            PortfolioError::DegenerateValue {
                timestamp: Some(day(2)),
                value: Decimal::ZERO,
            }
        );
    }

    #[test]
    fn missing_close_carries_last_mark() {
        let mut portfolio = Portfolio::new(dec!(10000));
        let q = quotes(&[("SPY", dec!(100))]);
        portfolio
            .transact_position(day(1), Action::Buy, "SPY", 10, dec!(100), Decimal::ZERO, &q)
            .unwrap();
        portfolio.update_portfolio(day(2), &quotes(&[("SPY", dec!(120))])).unwrap();
        portfolio.update_portfolio(day(3), &quotes(&[])).unwrap();

        assert_eq!(portfolio.position("SPY").unwrap().market_value(), dec!(1200));
        assert_eq!(portfolio.total_mkt_value(), dec!(10200));
    }

    #[test]
    fn flat_position_is_kept_with_realized_pnl() {
        let mut portfolio = Portfolio::new(dec!(10000));
        let q = quotes(&[("SPY", dec!(100))]);
        portfolio
            .transact_position(day(1), Action::Buy, "SPY", 10, dec!(100), Decimal::ZERO, &q)
            .unwrap();
        let up = quotes(&[("SPY", dec!(110))]);
        portfolio
            .transact_position(day(2), Action::Sell, "SPY", 10, dec!(110), Decimal::ZERO, &up)
            .unwrap();

        let pos = portfolio.position("SPY").unwrap();
        assert!(pos.is_flat());
        assert_eq!(pos.realized_pnl(), dec!(100));
        assert_eq!(portfolio.realized_pnl(), dec!(100));
        assert_eq!(portfolio.cash(), dec!(10100));
        assert_eq!(portfolio.total_mkt_value(), dec!(10100));
    }

    #[test]
    fn history_has_one_row_per_timestamp() {
        let mut portfolio = Portfolio::new(dec!(10000));
        let q = quotes(&[("SPY", dec!(100)), ("AGG", dec!(50))]);
        portfolio
            .transact_position(day(1), Action::Buy, "SPY", 10, dec!(100), Decimal::ZERO, &q)
            .unwrap();
        portfolio
            .transact_position(day(1), Action::Buy, "AGG", 10, dec!(50), Decimal::ZERO, &q)
            .unwrap();
        portfolio.update_portfolio(day(1), &q).unwrap();
        portfolio.update_portfolio(day(2), &q).unwrap();

        let history = portfolio.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history.holdings().len(), 4);
        let day_one: Vec<_> = history.holdings_at(day(1)).collect();
        assert_eq!(day_one.len(), 2);
        assert_eq!(day_one[0].ticker, "AGG");
        assert_eq!(day_one[1].quantity, 10);
    }

    #[test]
    fn zero_quantity_fill_charges_nothing() {
        let mut portfolio = Portfolio::new(dec!(10000));
        let q = quotes(&[("SPY", dec!(100))]);
        let fill = FillEvent::new("SPY", Action::Buy, 0, dec!(100), dec!(1));
        portfolio.apply_fill(&fill, day(1), &q).unwrap();

        assert_eq!(portfolio.cash(), dec!(10000));
        assert_eq!(portfolio.total_commission(), Decimal::ZERO);
        assert_eq!(portfolio.net_liquidation_value(), portfolio.total_mkt_value());
        assert_eq!(portfolio.total_mkt_value(), dec!(10000));
    }

    #[test]
    fn oversized_trade_is_rejected_before_cash_moves() {
        let mut portfolio = Portfolio::new(dec!(10000));
        let q = quotes(&[("SPY", dec!(100))]);
        let err = portfolio
            .transact_position(day(1), Action::Buy, "SPY", u64::MAX, dec!(1), Decimal::ZERO, &q)
            .unwrap_err();
        assert_eq!(
            err,
            PortfolioError::QuantityOverflow {
                ticker: "SPY".into(),
                quantity: u64::MAX,
            }
        );
        assert_eq!(portfolio.cash(), dec!(10000));
        assert!(portfolio.position("SPY").is_none());

        portfolio
            .transact_position(day(1), Action::Buy, "SPY", 10, dec!(100), Decimal::ZERO, &q)
            .unwrap();
        let huge = i64::MAX as u64;
        assert!(portfolio
            .transact_position(day(1), Action::Buy, "SPY", huge, dec!(1), Decimal::ZERO, &q)
            .is_err());
        assert_eq!(portfolio.position("SPY").unwrap().net(), 10);
    }

    #[test]
    fn incomplete_fill_is_noop() {
        let mut portfolio = Portfolio::new(dec!(10000));
        let fill = FillEvent {
            ticker: "SPY".into(),
            action: None,
            quantity: Some(10),
            price: dec!(100),
            commission: dec!(1),
        };
        portfolio.apply_fill(&fill, day(1), &quotes(&[])).unwrap();
        assert!(portfolio.positions().is_empty());
        assert_eq!(portfolio.cash(), dec!(10000));
    }
}
