//! Metrics collection for system monitoring
//!
//! Lock-free counters updated by the scheduler and the broker,
//! exported as snapshots through the API.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Instant, SystemTime};

/// System metrics collector
pub struct MetricsCollector {
    /// Generator ticks executed
    ticks: AtomicU64,
    /// Ticks whose publish did not complete
    publish_failures: AtomicU64,
    /// Messages enqueued, counted once per receiving queue
    routed_messages: AtomicU64,
    /// Published messages no binding matched
    unroutable_messages: AtomicU64,
    /// Messages handed to subscribers
    delivered_messages: AtomicU64,
    /// Messages dropped because the body did not decode
    decode_failures: AtomicU64,
    /// Last tick timestamp (Unix millis)
    last_tick_time: AtomicU64,
    /// Start time for uptime calculation
    start_time: Instant,
}

/// Metrics snapshot for API export
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub ticks: u64,
    pub publish_failures: u64,
    pub routed_messages: u64,
    pub unroutable_messages: u64,
    pub delivered_messages: u64,
    pub decode_failures: u64,
    pub tick_rate: f64, // ticks per second
    pub last_tick_ms: u64,
    pub uptime_seconds: u64,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            ticks: AtomicU64::new(0),
            publish_failures: AtomicU64::new(0),
            routed_messages: AtomicU64::new(0),
            unroutable_messages: AtomicU64::new(0),
            delivered_messages: AtomicU64::new(0),
            decode_failures: AtomicU64::new(0),
            last_tick_time: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record one generator tick
    #[inline]
    pub fn record_tick(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        self.last_tick_time.store(now, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_publish_failure(&self) {
        self.publish_failures.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_routed(&self, queues: u64) {
        self.routed_messages.fetch_add(queues, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_unroutable(&self) {
        self.unroutable_messages.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_delivered(&self) {
        self.delivered_messages.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_decode_failure(&self) {
        self.decode_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current snapshot of metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        let ticks = self.ticks.load(Ordering::Relaxed);
        let uptime = self.start_time.elapsed().as_secs();
        let rate = if uptime > 0 {
            ticks as f64 / uptime as f64
        } else {
            0.0
        };

        MetricsSnapshot {
            ticks,
            publish_failures: self.publish_failures.load(Ordering::Relaxed),
            routed_messages: self.routed_messages.load(Ordering::Relaxed),
            unroutable_messages: self.unroutable_messages.load(Ordering::Relaxed),
            delivered_messages: self.delivered_messages.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            tick_rate: rate,
            last_tick_ms: self.last_tick_time.load(Ordering::Relaxed),
            uptime_seconds: uptime,
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}
