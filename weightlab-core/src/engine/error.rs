//! Fatal engine errors. Each names the stage and the ticker or timestamp
//! that triggered it.

use crate::data::DataError;
use crate::domain::{PortfolioError, Ticker, Timestamp};
use crate::events::EventKind;
use std::fmt;
use thiserror::Error;

/// Pipeline stage an error originated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Dispatch,
    Strategy,
    Sizing,
    Execution,
    Portfolio,
    Valuation,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Dispatch => "dispatch",
            Stage::Strategy => "strategy",
            Stage::Sizing => "sizing",
            Stage::Execution => "execution",
            Stage::Portfolio => "portfolio",
            Stage::Valuation => "valuation",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    /// A pool kind with no route reached the dispatcher. This is a wiring bug.
    #[error("dispatch: no route for {kind} pool at {timestamp}")]
    UnroutableEvent {
        kind: EventKind,
        timestamp: Timestamp,
    },

    #[error("dispatch: price pool at {next} does not advance past {previous}")]
    NonMonotonicTimestamp {
        previous: Timestamp,
        next: Timestamp,
    },

    #[error("{stage}: produced a pool for {found} while the clock is at {expected}")]
    PoolTimestampMismatch {
        stage: Stage,
        expected: Timestamp,
        found: Timestamp,
    },

    #[error("sizing: order quantity for '{ticker}' at {timestamp} overflows a share count")]
    QuantityOverflow { ticker: Ticker, timestamp: Timestamp },

    #[error("{stage}: {source}")]
    Portfolio {
        stage: Stage,
        #[source]
        source: PortfolioError,
    },

    #[error("price source: {0}")]
    Data(#[from] DataError),
}

impl EngineError {
    pub fn stage(&self) -> Stage {
        match self {
            EngineError::UnroutableEvent { .. } | EngineError::NonMonotonicTimestamp { .. } => {
                Stage::Dispatch
            }
            EngineError::PoolTimestampMismatch { stage, .. }
            | EngineError::Portfolio { stage, .. } => *stage,
            EngineError::QuantityOverflow { .. } => Stage::Sizing,
            EngineError::Data(_) => Stage::Dispatch,
        }
    }
}
