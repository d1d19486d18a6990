//! Simulated market
//!
//! - PriceGenerator: random-walk prices, one published trade per tick
//! - MarketScheduler: fixed-rate driver for the generator
//! - TradeSink: collects trades delivered to a watcher queue

pub mod generator;
pub mod scheduler;
pub mod sink;

pub use generator::{next_price, PriceGenerator};
pub use scheduler::MarketScheduler;
pub use sink::TradeSink;
