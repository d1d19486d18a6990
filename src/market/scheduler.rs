//! Fixed-rate tick scheduler
//!
//! Drives `PriceGenerator::tick` from a single task. Ticks never overlap:
//! when one overruns the period the next is delayed instead of bunched up.
//! A failed publish is logged and counted, the walk keeps going.

use crate::bus::Publisher;
use crate::infrastructure::metrics::MetricsCollector;
use crate::market::PriceGenerator;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::Level;

/// Periodic driver for a price generator
pub struct MarketScheduler {
    period: Duration,
    metrics: Arc<MetricsCollector>,
}

impl MarketScheduler {
    pub fn new(period: Duration, metrics: Arc<MetricsCollector>) -> Self {
        Self { period, metrics }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Tick `generator` every period
    ///
    /// Runs until `max_ticks` ticks have executed, or forever when `None`.
    /// The first tick fires immediately. Returns the generator so its final
    /// state can be inspected.
    pub async fn run<P, R>(
        &self,
        mut generator: PriceGenerator<P, R>,
        max_ticks: Option<u64>,
    ) -> PriceGenerator<P, R>
    where
        P: Publisher,
        R: Rng,
    {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        crate::log_market!(
            Level::INFO,
            symbols = generator.symbols().len(),
            exchange = generator.exchange(),
            "Price generator running every {:?}",
            self.period
        );

        let mut executed = 0u64;
        while max_ticks.map_or(true, |max| executed < max) {
            ticker.tick().await;
            executed += 1;
            self.metrics.record_tick();

            match generator.tick() {
                Ok(trade) => {
                    crate::log_market!(
                        Level::DEBUG,
                        symbol = %trade.symbol,
                        price = trade.price,
                        "Published trade"
                    );
                }
                Err(e) => {
                    self.metrics.record_publish_failure();
                    crate::log_market!(Level::WARN, "Tick publish failed, continuing: {}", e);
                }
            }
        }

        generator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{symbols, FailingPublisher, RecordingPublisher};

    fn scheduler(ms: u64) -> (MarketScheduler, Arc<MetricsCollector>) {
        let metrics = Arc::new(MetricsCollector::new());
        (MarketScheduler::new(Duration::from_millis(ms), metrics.clone()), metrics)
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_requested_ticks() {
        let (scheduler, metrics) = scheduler(500);
        let market =
            PriceGenerator::seeded(symbols(), RecordingPublisher::default(), "stock-market", 1)
                .unwrap();

        let start = tokio::time::Instant::now();
        let market = scheduler.run(market, Some(5)).await;

        // First tick is immediate, four more at 500ms spacing
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(2000), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(2500), "{elapsed:?}");
        assert_eq!(market.publisher().published().len(), 5);
        assert_eq!(metrics.snapshot().ticks, 5);
        assert_eq!(metrics.snapshot().publish_failures, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_publish_failures_do_not_stop_ticking() {
        let (scheduler, metrics) = scheduler(500);
        let market =
            PriceGenerator::seeded(symbols(), FailingPublisher, "stock-market", 2).unwrap();
        let seeds = market.last_trades();

        let market = scheduler.run(market, Some(10)).await;

        let snap = metrics.snapshot();
        assert_eq!(snap.ticks, 10);
        assert_eq!(snap.publish_failures, 10);
        assert_ne!(market.last_trades(), seeds);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_ticks() {
        let (scheduler, metrics) = scheduler(500);
        let market =
            PriceGenerator::seeded(symbols(), RecordingPublisher::default(), "stock-market", 3)
                .unwrap();

        let market = scheduler.run(market, Some(0)).await;
        assert!(market.publisher().published().is_empty());
        assert_eq!(metrics.snapshot().ticks, 0);
    }
}
