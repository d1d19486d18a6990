//! Infrastructure - cold path only
//!
//! This module contains code off the tick path:
//! - Logging and metrics
//! - Configuration management
//! - Inspection API

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;

pub use api::{start_server, AppState};
pub use metrics::{MetricsCollector, MetricsSnapshot};
