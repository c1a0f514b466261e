//! Portfolio handler: owns the event queue and drives the dispatch loop.

use super::error::{EngineError, Stage};
use super::stats::{StatisticsCollector, StatisticsSummary};
use crate::data::PriceSource;
use crate::domain::{Portfolio, Timestamp};
use crate::events::{EventKind, EventPool, Pool, PriceEvent};
use crate::execution::ExecutionHandler;
use crate::sizers::PositionSizer;
use crate::strategy::Strategy;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, info};

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Price pools processed.
    pub steps: usize,
    pub final_value: Decimal,
    pub results: StatisticsSummary,
}

/// Wires a price source, strategy, sizer and execution handler around one
/// portfolio and a FIFO queue of event pools.
///
/// The handler holds no trading state of its own; it mutates only the queue
/// and the simulation clock, and is the sole writer of the portfolio.
pub struct PortfolioHandler<P: PriceSource> {
    price_source: P,
    strategy: Box<dyn Strategy>,
    sizer: Box<dyn PositionSizer>,
    execution: Box<dyn ExecutionHandler>,
    statistics: Box<dyn StatisticsCollector>,
    portfolio: Portfolio,
    queue: VecDeque<Pool>,
    cur_time: Option<Timestamp>,
    steps: usize,
    initialized: bool,
}

impl<P: PriceSource> PortfolioHandler<P> {
    pub fn new(
        initial_cash: Decimal,
        price_source: P,
        strategy: Box<dyn Strategy>,
        sizer: Box<dyn PositionSizer>,
        execution: Box<dyn ExecutionHandler>,
        statistics: Box<dyn StatisticsCollector>,
    ) -> Self {
        Self {
            price_source,
            strategy,
            sizer,
            execution,
            statistics,
            portfolio: Portfolio::new(initial_cash),
            queue: VecDeque::new(),
            cur_time: None,
            steps: 0,
            initialized: false,
        }
    }

    /// Push a pool onto the back of the queue.
    pub fn enqueue(&mut self, pool: impl Into<Pool>) {
        self.queue.push_back(pool.into());
    }

    /// Run until the queue is drained and the price source is exhausted.
    pub fn run(&mut self) -> Result<RunSummary, EngineError> {
        info!(
            strategy = self.strategy.name(),
            sizer = self.sizer.name(),
            execution = self.execution.name(),
            initial_cash = %self.portfolio.initial_cash(),
            "starting backtest"
        );

        while self.step()? {}

        self.statistics.collect(self.portfolio.history());
        let summary = RunSummary {
            steps: self.steps,
            final_value: self.portfolio.total_mkt_value(),
            results: self.statistics.get_results(),
        };

        info!(
            steps = summary.steps,
            final_value = %summary.final_value,
            realized_pnl = %self.portfolio.realized_pnl(),
            commission = %self.portfolio.total_commission(),
            "backtest complete"
        );
        Ok(summary)
    }

    /// Dispatch one pool, pulling the next price pool if the queue is empty.
    ///
    /// Returns `Ok(false)` once there is nothing left to do.
    pub fn step(&mut self) -> Result<bool, EngineError> {
        self.ensure_initialized()?;

        if self.queue.is_empty() && !self.poll_prices()? {
            return Ok(false);
        }
        let Some(pool) = self.queue.pop_front() else {
            return Ok(false);
        };

        let timestamp = pool.timestamp();
        self.dispatch(pool)?;

        self.portfolio
            .update_portfolio(timestamp, &self.price_source)
            .map_err(|source| EngineError::Portfolio {
                stage: Stage::Valuation,
                source,
            })?;
        Ok(true)
    }

    fn ensure_initialized(&mut self) -> Result<(), EngineError> {
        if !self.initialized {
            self.price_source.initialize()?;
            self.strategy.initialize(self.price_source.tickers());
            self.initialized = true;
        }
        Ok(())
    }

    /// Request the next price pool and enqueue it. `false` when exhausted.
    fn poll_prices(&mut self) -> Result<bool, EngineError> {
        if !self.price_source.continue_backtest() {
            return Ok(false);
        }
        let Some(prices) = self.price_source.stream_next() else {
            return Ok(false);
        };

        let next = prices.timestamp();
        if let Some(previous) = self.cur_time {
            if next <= previous {
                return Err(EngineError::NonMonotonicTimestamp { previous, next });
            }
        }
        self.cur_time = Some(next);
        self.steps += 1;
        self.queue.push_back(prices.into());
        Ok(true)
    }

    fn dispatch(&mut self, pool: Pool) -> Result<(), EngineError> {
        debug!(
            kind = %pool.kind(),
            timestamp = %pool.timestamp(),
            events = pool.len(),
            "dispatching pool"
        );

        match pool {
            Pool::Price(prices) => self.on_prices(&prices),
            Pool::TargetWeight(weights) => {
                let orders = self
                    .sizer
                    .size_order(&weights, &self.portfolio, &self.price_source)?;
                self.check_timestamp(Stage::Sizing, orders.timestamp())?;
                if !orders.is_empty() {
                    self.queue.push_back(orders.into());
                }
                Ok(())
            }
            Pool::Order(orders) => {
                let fills = self.execution.execute_order(&orders, &self.price_source);
                self.check_timestamp(Stage::Execution, fills.timestamp())?;
                for fill in &fills {
                    self.portfolio
                        .apply_fill(fill, fills.timestamp(), &self.price_source)
                        .map_err(|source| EngineError::Portfolio {
                            stage: Stage::Portfolio,
                            source,
                        })?;
                }
                Ok(())
            }
            Pool::Fill(fills) => Err(EngineError::UnroutableEvent {
                kind: EventKind::Fill,
                timestamp: fills.timestamp(),
            }),
        }
    }

    fn on_prices(&mut self, prices: &EventPool<PriceEvent>) -> Result<(), EngineError> {
        if let Some(weights) = self.strategy.calculate_signals(prices) {
            self.check_timestamp(Stage::Strategy, weights.timestamp())?;
            self.queue.push_back(weights.into());
        }
        Ok(())
    }

    fn check_timestamp(&self, stage: Stage, found: Timestamp) -> Result<(), EngineError> {
        match self.cur_time {
            Some(expected) if expected != found => Err(EngineError::PoolTimestampMismatch {
                stage,
                expected,
                found,
            }),
            _ => Ok(()),
        }
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    pub fn price_source(&self) -> &P {
        &self.price_source
    }

    /// Timestamp of the most recent price pool.
    pub fn cur_time(&self) -> Option<Timestamp> {
        self.cur_time
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Consume the handler, keeping the final portfolio.
    pub fn into_portfolio(self) -> Portfolio {
        self.portfolio
    }
}
