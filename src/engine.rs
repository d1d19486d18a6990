//! Application Engine
//!
//! Wires the market together by explicit construction:
//! broker → exchange → watcher queue → listener → sink,
//! then the price generator on its own scheduler task.

use crate::bus::{Broker, ListenerHandle, QueueOptions};
use crate::core::Trade;
use crate::infrastructure::metrics::MetricsCollector;
use crate::market::{MarketScheduler, PriceGenerator, TradeSink};
use crate::{Config, Result};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Owns every long-lived component and the tasks driving them
pub struct AppEngine {
    config: Config,
    broker: Arc<Broker>,
    sink: Arc<TradeSink>,
    metrics: Arc<MetricsCollector>,
    listener: Option<ListenerHandle>,
    scheduler: Option<JoinHandle<()>>,
}

impl AppEngine {
    /// Build components; nothing runs until `start`
    pub fn new(config: Config, metrics: Arc<MetricsCollector>) -> Self {
        let broker = Arc::new(Broker::new(config.broker.queue_capacity, metrics.clone()));
        Self {
            config,
            broker,
            sink: Arc::new(TradeSink::new()),
            metrics,
            listener: None,
            scheduler: None,
        }
    }

    pub fn broker(&self) -> Arc<Broker> {
        self.broker.clone()
    }

    /// Trades collected by the watcher
    pub fn sink(&self) -> Arc<TradeSink> {
        self.sink.clone()
    }

    pub fn metrics(&self) -> Arc<MetricsCollector> {
        self.metrics.clone()
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_some()
    }

    /// Declare the exchange, subscribe the watcher and start ticking
    ///
    /// The config is validated before anything is declared or spawned.
    /// The watcher is bound before the first tick so no trade is missed.
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) -> Result<()> {
        if self.is_running() {
            return Ok(());
        }
        self.config.validate()?;

        let market = &self.config.market;
        let symbols = market.parsed_symbols()?;

        self.broker.declare_exchange(&market.exchange);

        let options = match &self.config.watcher.queue {
            Some(name) => QueueOptions::Named(name.clone()),
            None => QueueOptions::Anonymous,
        };
        let queue = self
            .broker
            .bind(&market.exchange, &self.config.watcher.binding_key, options)?;
        tracing::info!(
            "Watcher queue {} bound to {} with '{}'",
            queue.name(),
            market.exchange,
            self.config.watcher.binding_key
        );
        let listener = self.broker.listen::<Trade, _>(
            queue,
            self.sink.clone(),
            self.config.broker.consumers,
        );

        let generator = match market.seed {
            Some(seed) => {
                PriceGenerator::seeded(symbols, self.broker.clone(), market.exchange.as_str(), seed)?
            }
            None => PriceGenerator::new(symbols, self.broker.clone(), market.exchange.as_str())?,
        };

        let scheduler = MarketScheduler::new(market.interval(), self.metrics.clone());
        let handle = tokio::spawn(async move {
            scheduler.run(generator, None).await;
        });

        self.listener = Some(listener);
        self.scheduler = Some(handle);
        tracing::info!("Engine started");
        Ok(())
    }

    /// Stop ticking and delivery
    pub fn stop(&mut self) {
        if let Some(handle) = self.scheduler.take() {
            handle.abort();
        }
        if let Some(listener) = self.listener.take() {
            listener.abort();
        }
        tracing::info!("Engine stopped");
    }
}

impl Drop for AppEngine {
    fn drop(&mut self) {
        if self.is_running() {
            self.stop();
        }
    }
}
