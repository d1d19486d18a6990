//! Simulated trade

use super::Symbol;
use serde::{Deserialize, Serialize};

/// One simulated price observation for a symbol
///
/// Serialized as `{"stockName": .., "price": ..}` on the exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// Instrument the price belongs to
    #[serde(rename = "stockName")]
    pub symbol: Symbol,
    /// Trade price, strictly positive
    pub price: f64,
}

impl Trade {
    #[inline(always)]
    pub fn new(symbol: Symbol, price: f64) -> Self {
        Self { symbol, price }
    }
}
