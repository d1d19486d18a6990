//! Test utilities shared across modules

use crate::bus::{PublishError, Publisher};
use crate::core::{Symbol, Trade};
use crate::market::TradeSink;
use parking_lot::Mutex;
use serde::Serialize;
use std::time::Duration;

/// The three symbols the simulator ships with
pub fn symbols() -> Vec<Symbol> {
    Symbol::parse_all(&["ATT", "SBUX", "ZOOM"]).unwrap()
}

pub fn trade(symbol: &str, price: f64) -> Trade {
    Trade::new(Symbol::new(symbol).unwrap(), price)
}

/// One captured publish call
#[derive(Debug, Clone)]
pub struct Published {
    pub exchange: String,
    pub routing_key: String,
    pub payload: serde_json::Value,
}

impl Published {
    pub fn trade(&self) -> Trade {
        serde_json::from_value(self.payload.clone()).unwrap()
    }
}

/// Publisher that records every call and always succeeds
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    published: Mutex<Vec<Published>>,
}

impl RecordingPublisher {
    pub fn published(&self) -> Vec<Published> {
        self.published.lock().clone()
    }
}

impl Publisher for RecordingPublisher {
    fn publish<T: Serialize>(
        &self,
        exchange: &str,
        routing_key: &str,
        payload: &T,
    ) -> Result<(), PublishError> {
        let payload = serde_json::to_value(payload).map_err(PublishError::Encode)?;
        self.published.lock().push(Published {
            exchange: exchange.to_string(),
            routing_key: routing_key.to_string(),
            payload,
        });
        Ok(())
    }
}

/// Publisher whose queue is always full
#[derive(Debug, Default)]
pub struct FailingPublisher;

impl Publisher for FailingPublisher {
    fn publish<T: Serialize>(
        &self,
        _exchange: &str,
        _routing_key: &str,
        _payload: &T,
    ) -> Result<(), PublishError> {
        Err(PublishError::QueueFull {
            queue: "amq.gen-test".to_string(),
        })
    }
}

/// Poll until `sink` holds at least `len` trades
///
/// Panics after `timeout` so a lost delivery fails the test instead of hanging it.
pub async fn wait_for_len(sink: &TradeSink, len: usize, timeout: Duration) {
    let polled = tokio::time::timeout(timeout, async {
        while sink.len() < len {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    assert!(
        polled.is_ok(),
        "sink has {} trades, expected {}",
        sink.len(),
        len
    );
}
