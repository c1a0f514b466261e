//! WeightLab Core: event pools, position accounting, sizing, execution, dispatch loop.
//!
//! This crate contains the heart of the backtesting engine:
//! - Domain types (actions, positions, portfolio, history)
//! - Typed events and ticker-keyed event pools
//! - Price-source and strategy contracts, with in-memory implementations
//! - Target-weight position sizing
//! - Simulated execution with a commission schedule
//! - The `PortfolioHandler` dispatch loop

pub mod data;
pub mod domain;
pub mod engine;
pub mod events;
pub mod execution;
pub mod sizers;
pub mod strategy;
