//! Configuration management
//!
//! Loads configuration from config.toml at startup.
//! Every section falls back to defaults when absent.

use crate::core::{Symbol, SymbolError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Price generator settings
    #[serde(default)]
    pub market: MarketConfig,

    /// Message broker settings
    #[serde(default)]
    pub broker: BrokerConfig,

    /// Trade watcher subscription
    #[serde(default)]
    pub watcher: WatcherConfig,

    /// API server settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Price generator configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MarketConfig {
    /// Symbols to simulate, fixed for the process lifetime
    #[serde(default = "default_symbols")]
    pub symbols: Vec<String>,

    /// Tick period in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Exchange trades are published on
    #[serde(default = "default_exchange")]
    pub exchange: String,

    /// RNG seed for reproducible runs; entropy when unset
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Broker configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BrokerConfig {
    /// Messages a queue buffers before publishes to it fail
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Listener tasks per queue
    #[serde(default = "default_consumers")]
    pub consumers: usize,
}

/// Trade watcher configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WatcherConfig {
    /// Topic pattern the watcher queue is bound with
    #[serde(default = "default_binding_key")]
    pub binding_key: String,

    /// Queue name; an anonymous `amq.gen-` queue when unset
    #[serde(default)]
    pub queue: Option<String>,
}

/// API server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_enabled")]
    pub enabled: bool,

    /// Port for HTTP API server
    #[serde(default = "default_api_port")]
    pub port: u16,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Directory for rolling log files
    #[serde(default = "default_log_dir")]
    pub dir: PathBuf,

    /// Default filter directive, overridden by RUST_LOG
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            symbols: default_symbols(),
            interval_ms: default_interval_ms(),
            exchange: default_exchange(),
            seed: None,
        }
    }
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            consumers: default_consumers(),
        }
    }
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            binding_key: default_binding_key(),
            queue: None,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enabled: default_api_enabled(),
            port: default_api_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            level: default_log_level(),
        }
    }
}

fn default_symbols() -> Vec<String> {
    vec!["ATT".to_string(), "SBUX".to_string(), "ZOOM".to_string()]
}

fn default_interval_ms() -> u64 {
    500
}

fn default_exchange() -> String {
    "stock-market".to_string()
}

fn default_queue_capacity() -> usize {
    1024
}

fn default_consumers() -> usize {
    1
}

fn default_binding_key() -> String {
    "*".to_string()
}

fn default_api_enabled() -> bool {
    true
}

fn default_api_port() -> u16 {
    5000
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from config.toml (or `CONFIG_PATH`)
    ///
    /// If the file doesn't exist, returns default configuration.
    /// # Errors
    /// Returns error if file exists but cannot be parsed or fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());

        match std::fs::read_to_string(&config_path) {
            Ok(contents) => Self::from_toml(&contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // File not found - use defaults
                Ok(Config::default())
            }
            Err(e) => Err(ConfigError::IoError(e)),
        }
    }

    /// Parse and validate TOML text
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Config =
            toml::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check values serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.market.parsed_symbols()?;
        if self.market.interval_ms == 0 {
            return Err(ConfigError::Invalid("market.interval_ms must be > 0".into()));
        }
        if self.market.exchange.is_empty() {
            return Err(ConfigError::Invalid("market.exchange must not be empty".into()));
        }
        if self.broker.queue_capacity == 0 {
            return Err(ConfigError::Invalid("broker.queue_capacity must be > 0".into()));
        }
        if self.broker.consumers == 0 {
            return Err(ConfigError::Invalid("broker.consumers must be > 0".into()));
        }
        if let Some(queue) = &self.watcher.queue {
            if queue.is_empty() || queue.starts_with("amq.") {
                return Err(ConfigError::Invalid(format!(
                    "watcher.queue '{}' must be non-empty and not start with 'amq.'",
                    queue
                )));
            }
        }
        Ok(())
    }
}

impl MarketConfig {
    /// Tick period
    #[inline(always)]
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Validated, de-duplicated symbol list in configured order
    pub fn parsed_symbols(&self) -> Result<Vec<Symbol>, ConfigError> {
        if self.symbols.is_empty() {
            return Err(ConfigError::Invalid("market.symbols must not be empty".into()));
        }
        let symbols = Symbol::parse_all(self.symbols.as_slice()).map_err(ConfigError::Symbol)?;
        let mut seen = HashSet::new();
        for symbol in &symbols {
            if !seen.insert(symbol) {
                return Err(ConfigError::Invalid(format!("duplicate symbol {}", symbol)));
            }
        }
        Ok(symbols)
    }
}

/// Configuration loading errors
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading file
    IoError(std::io::Error),
    /// Parse error (invalid TOML)
    ParseError(String),
    /// Symbol not usable as a routing key
    Symbol(SymbolError),
    /// Value out of range
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "Failed to read config file: {}", e),
            ConfigError::ParseError(e) => write!(f, "Failed to parse config: {}", e),
            ConfigError::Symbol(e) => write!(f, "Invalid symbol in config: {}", e),
            ConfigError::Invalid(e) => write!(f, "Invalid config: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError(e) => Some(e),
            ConfigError::Symbol(e) => Some(e),
            ConfigError::ParseError(_) | ConfigError::Invalid(_) => None,
        }
    }
}

impl From<ConfigError> for crate::MarketError {
    fn from(e: ConfigError) -> Self {
        crate::MarketError::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.market.symbols, vec!["ATT", "SBUX", "ZOOM"]);
        assert_eq!(config.market.interval_ms, 500);
        assert_eq!(config.market.exchange, "stock-market");
        assert_eq!(config.market.seed, None);
        assert_eq!(config.broker.queue_capacity, 1024);
        assert_eq!(config.broker.consumers, 1);
        assert_eq!(config.watcher.binding_key, "*");
        assert_eq!(config.watcher.queue, None);
        assert!(config.api.enabled);
        assert_eq!(config.api.port, 5000);
        assert_eq!(config.logging.dir, PathBuf::from("logs"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_interval() {
        let config = Config::default();
        assert_eq!(config.market.interval(), Duration::from_millis(500));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = Config::from_toml(
            r#"
            [market]
            symbols = ["AAPL", "MSFT"]
            seed = 7

            [watcher]
            queue = "trade-watcher"

            [api]
            enabled = false
            "#,
        )
        .unwrap();

        assert_eq!(config.market.symbols, vec!["AAPL", "MSFT"]);
        assert_eq!(config.market.seed, Some(7));
        assert_eq!(config.watcher.queue.as_deref(), Some("trade-watcher"));
        assert_eq!(config.watcher.binding_key, "*");
        assert_eq!(config.market.interval_ms, 500);
        assert!(!config.api.enabled);
        assert_eq!(config.api.port, 5000);
        assert_eq!(config.broker.queue_capacity, 1024);
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            Config::from_toml("market = 3"),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_rejects_bad_symbols() {
        let err = Config::from_toml("[market]\nsymbols = [\"BRK.B\"]").unwrap_err();
        assert!(matches!(err, ConfigError::Symbol(_)));

        let err = Config::from_toml("[market]\nsymbols = []").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = Config::from_toml("[market]\nsymbols = [\"ATT\", \"ATT\"]").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_reserved_watcher_queue() {
        for toml in ["[watcher]\nqueue = \"\"", "[watcher]\nqueue = \"amq.gen-x\""] {
            assert!(
                matches!(Config::from_toml(toml), Err(ConfigError::Invalid(_))),
                "{toml} should be rejected"
            );
        }
    }

    #[test]
    fn test_rejects_zero_values() {
        for toml in [
            "[market]\ninterval_ms = 0",
            "[broker]\nqueue_capacity = 0",
            "[broker]\nconsumers = 0",
        ] {
            assert!(
                matches!(Config::from_toml(toml), Err(ConfigError::Invalid(_))),
                "{toml} should be rejected"
            );
        }
    }

    #[test]
    fn test_parsed_symbols_keep_order() {
        let symbols = MarketConfig::default().parsed_symbols().unwrap();
        let names: Vec<&str> = symbols.iter().map(|s| s.as_str()).collect();
        assert_eq!(names, ["ATT", "SBUX", "ZOOM"]);
    }
}
