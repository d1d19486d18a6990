//! Trade watcher
//!
//! Append-only collector of every trade delivered to it. Listener tasks may
//! deliver concurrently, appends are serialized by a mutex.

use crate::bus::Subscriber;
use crate::core::Trade;
use parking_lot::Mutex;

/// Collects delivered trades in arrival order
#[derive(Debug, Default)]
pub struct TradeSink {
    trades: Mutex<Vec<Trade>>,
}

impl TradeSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept a delivered trade; never rejects, never deduplicates
    #[inline]
    pub fn on_trade(&self, trade: Trade) {
        self.trades.lock().push(trade);
    }

    /// Snapshot of all trades received so far
    pub fn trades(&self) -> Vec<Trade> {
        self.trades.lock().clone()
    }

    /// Snapshot of trades for one symbol, in arrival order
    pub fn trades_for(&self, symbol: &str) -> Vec<Trade> {
        self.trades
            .lock()
            .iter()
            .filter(|t| t.symbol.as_str() == symbol)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.trades.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.lock().is_empty()
    }
}

impl Subscriber<Trade> for TradeSink {
    #[inline]
    fn on_message(&self, payload: Trade) {
        self.on_trade(payload);
    }
}
