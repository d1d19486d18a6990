//! In-process message bus
//!
//! AMQP-style delivery between producers and consumers:
//! - Named topic exchanges
//! - Anonymous or named bounded queues bound by topic patterns
//! - Listener tasks that decode messages and hand them to subscribers

pub mod broker;
pub mod message;
pub mod routing;
pub mod traits;

pub use broker::{Broker, ListenerHandle, Queue, QueueOptions};
pub use message::{JsonConverter, Message};
pub use routing::BindingKey;
pub use traits::{Publisher, Subscriber};

use thiserror::Error;

/// Publish failures surfaced to the caller of `publish`
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("exchange not found: {0}")]
    ExchangeNotFound(String),

    #[error("queue {queue} is full")]
    QueueFull { queue: String },

    #[error("failed to encode payload: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Queue binding failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    #[error("exchange not found: {0}")]
    ExchangeNotFound(String),

    #[error("queue capacity must be greater than zero")]
    ZeroCapacity,

    #[error("queue already exists: {0}")]
    QueueExists(String),

    #[error("invalid queue name '{0}': must be non-empty and not start with 'amq.'")]
    InvalidQueueName(String),
}
