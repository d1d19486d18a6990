//! Publish/subscribe capabilities
//!
//! Producers depend on `Publisher`, consumers implement `Subscriber`.
//! Generics keep the publish call monomorphized, no dynamic dispatch.

use super::PublishError;
use serde::Serialize;
use std::sync::Arc;

/// Capability to publish a payload on a named exchange
pub trait Publisher: Send + Sync {
    /// Publish `payload` to `exchange`, routed by `routing_key`
    ///
    /// Must not block: a full queue is reported as an error, never waited on.
    fn publish<T: Serialize>(
        &self,
        exchange: &str,
        routing_key: &str,
        payload: &T,
    ) -> Result<(), PublishError>;
}

impl<P: Publisher> Publisher for Arc<P> {
    #[inline]
    fn publish<T: Serialize>(
        &self,
        exchange: &str,
        routing_key: &str,
        payload: &T,
    ) -> Result<(), PublishError> {
        (**self).publish(exchange, routing_key, payload)
    }
}

/// Receiver of decoded payloads from a queue listener
pub trait Subscriber<T>: Send + Sync + 'static {
    fn on_message(&self, payload: T);
}
