//! Simulated stock market
//!
//! # Architecture
//! - **core**: Value types (Symbol, Trade)
//! - **market**: Price generator, tick scheduler, trade watcher
//! - **bus**: In-process topic exchange and queue listeners
//! - **engine**: Explicit wiring of the above
//! - **infrastructure**: Cold path (logging, metrics, config, api)

use std::sync::Arc;
use stock_market::engine::AppEngine;
use stock_market::infrastructure::{logging, start_server, AppState, MetricsCollector};
use stock_market::{Config, MarketError, Result};

/// Main application state
pub struct MarketApp {
    config: Config,
}

impl MarketApp {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run until ctrl-c
    pub async fn run(self) -> Result<()> {
        tracing::info!("Starting stock market simulator...");

        // 1. Core components
        let metrics = Arc::new(MetricsCollector::new());
        let mut engine = AppEngine::new(self.config.clone(), metrics.clone());

        // 2. Watcher subscription and price generator
        engine.start()?;
        tracing::info!(
            "Publishing {:?} to '{}' every {}ms",
            self.config.market.symbols,
            self.config.market.exchange,
            self.config.market.interval_ms
        );

        // 3. API Server (Cold Path)
        if self.config.api.enabled {
            let state = AppState {
                sink: engine.sink(),
                metrics,
            };
            let port = self.config.api.port;
            tokio::spawn(async move {
                if let Err(e) = start_server(state, port).await {
                    tracing::error!("API Server failed: {}", e);
                }
            });
        }

        // 4. Run for the process lifetime
        tokio::signal::ctrl_c().await?;
        tracing::info!("Shutdown requested");
        engine.stop();

        let sink = engine.sink();
        tracing::info!("Watcher collected {} trades", sink.len());
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().map_err(MarketError::from)?;

    // Keep guards alive so buffered log lines are flushed on exit
    let _guards = logging::init_logging(&config.logging)?;

    MarketApp::new(config).run().await
}
