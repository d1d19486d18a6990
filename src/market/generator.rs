//! Random-walk price generator
//!
//! Owns the last trade of every configured symbol. Each tick picks one symbol
//! uniformly at random, scales its price by a factor drawn from [0.5, 1.5)
//! and publishes the resulting trade with the symbol as routing key.
//!
//! The multiplier never reaches zero, so a positive price stays positive.
//! There is deliberately no floor or ceiling.

use crate::bus::{PublishError, Publisher};
use crate::core::{Symbol, Trade};
use crate::{MarketError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

/// Seed prices are `SEED_BASE_PRICE + U(0,1)`
pub const SEED_BASE_PRICE: f64 = 100.0;

/// Lower bound of the per-tick multiplier, upper bound is `+ 1.0`
pub const MIN_STEP_FACTOR: f64 = 0.5;

/// Apply one random-walk step: `price * (u + 0.5)` for `u` in [0, 1)
#[inline(always)]
pub fn next_price(price: f64, u: f64) -> f64 {
    price * (u + MIN_STEP_FACTOR)
}

/// Simulated market for a fixed symbol set
pub struct PriceGenerator<P, R = StdRng> {
    symbols: Vec<Symbol>,
    /// Last trade per symbol, same order as `symbols`
    last_trade: Vec<Trade>,
    rng: R,
    publisher: P,
    exchange: String,
}

impl<P: Publisher> PriceGenerator<P, StdRng> {
    /// Create generator seeded from OS entropy
    pub fn new(symbols: Vec<Symbol>, publisher: P, exchange: impl Into<String>) -> Result<Self> {
        Self::with_rng(symbols, publisher, exchange, StdRng::from_entropy())
    }

    /// Create generator with a reproducible price series
    pub fn seeded(
        symbols: Vec<Symbol>,
        publisher: P,
        exchange: impl Into<String>,
        seed: u64,
    ) -> Result<Self> {
        Self::with_rng(symbols, publisher, exchange, StdRng::seed_from_u64(seed))
    }
}

impl<P: Publisher, R: Rng> PriceGenerator<P, R> {
    /// Create generator drawing from `rng`
    ///
    /// Seed prices are drawn in symbol order.
    /// # Errors
    /// Empty or duplicated symbol list.
    pub fn with_rng(
        symbols: Vec<Symbol>,
        publisher: P,
        exchange: impl Into<String>,
        mut rng: R,
    ) -> Result<Self> {
        if symbols.is_empty() {
            return Err(MarketError::Config("price generator needs at least one symbol".into()));
        }
        let mut seen = HashSet::with_capacity(symbols.len());
        if let Some(dup) = symbols.iter().find(|s| !seen.insert(*s)) {
            return Err(MarketError::Config(format!("duplicate symbol {}", dup)));
        }

        let last_trade = symbols
            .iter()
            .map(|s| Trade::new(s.clone(), SEED_BASE_PRICE + rng.gen::<f64>()))
            .collect();

        Ok(Self {
            symbols,
            last_trade,
            rng,
            publisher,
            exchange: exchange.into(),
        })
    }

    /// Generate and publish one trade
    ///
    /// The price state is updated before publishing, so a failed publish
    /// leaves the walk intact and the next tick continues from the new price.
    pub fn tick(&mut self) -> std::result::Result<Trade, PublishError> {
        let trade = self.step();
        self.publisher
            .publish(&self.exchange, trade.symbol.as_str(), &trade)?;
        Ok(trade)
    }

    /// Advance the walk for one random symbol without publishing
    fn step(&mut self) -> Trade {
        let idx = self.rng.gen_range(0..self.symbols.len());
        let u = self.rng.gen::<f64>();

        let slot = &mut self.last_trade[idx];
        *slot = Trade::new(slot.symbol.clone(), next_price(slot.price, u));
        slot.clone()
    }

    /// Configured symbols, in order
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Exchange trades are published to
    pub fn exchange(&self) -> &str {
        &self.exchange
    }

    /// Last trade for `symbol`, `None` if not configured
    pub fn last_trade(&self, symbol: &Symbol) -> Option<&Trade> {
        self.last_trade.iter().find(|t| &t.symbol == symbol)
    }

    /// Snapshot of all last trades, in symbol order
    pub fn last_trades(&self) -> Vec<Trade> {
        self.last_trade.clone()
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }
}
