//! Centralized file-based logging system
//!
//! Writes logs to files under the configured directory, separated by log type:
//! - main/ - All logs, JSON
//! - error/ - Error and warning logs only
//! - market/ - Price generator and scheduler
//! - bus/ - Exchanges, queues, listeners
//! - api/ - API server

use super::config::LoggingConfig;
use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
    EnvFilter,
};

/// Log file categories, one subdirectory each
pub const LOG_TYPES: [&str; 5] = ["main", "error", "market", "bus", "api"];

/// Initialize centralized file logging
///
/// Creates the log directory tree and sets up file appenders for each log type.
/// The returned guards must be kept alive for the duration of the program.
pub fn init_logging(config: &LoggingConfig) -> std::io::Result<Vec<WorkerGuard>> {
    create_log_dirs(&config.dir)?;

    let mut guards = Vec::new();
    let mut appender = |name: &str| {
        let (writer, guard) = create_appender(&config.dir.join(name), name);
        guards.push(guard);
        writer
    };

    let main_appender = appender("main");
    let error_appender = appender("error");
    let market_appender = appender("market");
    let bus_appender = appender("bus");
    let api_appender = appender("api");

    let main_layer = tracing_subscriber::fmt::layer()
        .with_writer(main_appender)
        .with_ansi(false)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .json();

    let error_layer = tracing_subscriber::fmt::layer()
        .with_writer(error_appender)
        .with_ansi(false)
        .with_target(true)
        .with_level(true)
        .with_filter(tracing_subscriber::filter::LevelFilter::WARN);

    let market_layer = tracing_subscriber::fmt::layer()
        .with_writer(market_appender)
        .with_ansi(false)
        .with_target(true)
        .with_level(true)
        .with_filter(category_filter("market"));

    let bus_layer = tracing_subscriber::fmt::layer()
        .with_writer(bus_appender)
        .with_ansi(false)
        .with_target(true)
        .with_level(true)
        .with_filter(category_filter("bus"));

    let api_layer = tracing_subscriber::fmt::layer()
        .with_writer(api_appender)
        .with_ansi(false)
        .with_target(true)
        .with_level(true)
        .with_filter(category_filter("api"));

    // Console layer for development
    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_level(true);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    tracing_subscriber::registry()
        .with(filter)
        .with(main_layer)
        .with(error_layer)
        .with(market_layer)
        .with(bus_layer)
        .with(api_layer)
        .with(console_layer)
        .init();

    tracing::info!("Logging system initialized. Log files in {}", config.dir.display());

    Ok(guards)
}

/// Pass only events logged through the matching `log_*!` macro
fn category_filter(
    category: &'static str,
) -> tracing_subscriber::filter::FilterFn<impl Fn(&tracing::Metadata<'_>) -> bool> {
    tracing_subscriber::filter::filter_fn(move |metadata| in_category(metadata.target(), category))
}

/// Category targets are exact; module paths like `stock_market::market::...` never match
#[inline]
fn in_category(target: &str, category: &str) -> bool {
    target == category
}

/// Create the log root and one subdirectory per log type
fn create_log_dirs(root: &Path) -> std::io::Result<()> {
    for log_type in LOG_TYPES {
        fs::create_dir_all(root.join(log_type))?;
    }
    Ok(())
}

/// Create a daily rolling, non-blocking file appender
fn create_appender(dir: &Path, name: &str) -> (NonBlocking, WorkerGuard) {
    let appender = RollingFileAppender::new(Rotation::DAILY, dir, name);
    tracing_appender::non_blocking(appender)
}

/// Log macro helpers for specific log types
#[macro_export]
macro_rules! log_market {
    ($level:expr, $($arg:tt)+) => {
        tracing::event!(target: "market", $level, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_bus {
    ($level:expr, $($arg:tt)+) => {
        tracing::event!(target: "bus", $level, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_api {
    ($level:expr, $($arg:tt)+) => {
        tracing::event!(target: "api", $level, $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_directory_creation() {
        let root = std::env::temp_dir().join(format!("stock_market_logs_{}", std::process::id()));
        if root.exists() {
            fs::remove_dir_all(&root).ok();
        }

        create_log_dirs(&root).unwrap();
        for log_type in LOG_TYPES {
            assert!(root.join(log_type).is_dir());
        }

        // Second call is a no-op
        create_log_dirs(&root).unwrap();

        fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn test_category_targets_are_exact() {
        assert!(in_category("market", "market"));
        assert!(in_category("bus", "bus"));
        assert!(in_category("api", "api"));

        // Module-path targets of plain tracing events stay in main/error only
        assert!(!in_category("stock_market::engine", "market"));
        assert!(!in_category("stock_market::market::scheduler", "market"));
        assert!(!in_category("stock_market::bus::broker", "bus"));
        assert!(!in_category("stock_market::infrastructure::api", "api"));
    }
}
