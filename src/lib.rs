//! Simulated stock market feed
//!
//! A price generator random-walks a fixed set of symbols and publishes one
//! trade per tick to a topic exchange. Watchers bound to the exchange collect
//! the trades they receive.

pub mod bus;
pub mod core;
pub mod engine;
pub mod infrastructure;
pub mod market;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types
pub use infrastructure::config::{ApiConfig, BrokerConfig, Config, MarketConfig, WatcherConfig};

use thiserror::Error;

/// Main error type for the market simulator
#[derive(Error, Debug)]
pub enum MarketError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Publish error: {0}")]
    Publish(#[from] bus::PublishError),

    #[error("Bind error: {0}")]
    Bind(#[from] bus::BindError),

    #[error("Symbol error: {0}")]
    Symbol(#[from] core::SymbolError),

    #[error("API server error: {0}")]
    Api(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, MarketError>;
