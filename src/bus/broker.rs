//! Topic exchange broker
//!
//! Exchanges hold bindings from topic patterns to bounded queues. Publishing
//! never blocks: every matching queue gets the message via `try_send`, a full
//! queue is reported back to the publisher. Queues whose listeners are gone
//! are auto-deleted on the next publish that hits them.

use super::message::{JsonConverter, Message};
use super::routing::BindingKey;
use super::traits::{Publisher, Subscriber};
use super::{BindError, PublishError};
use crate::infrastructure::metrics::MetricsCollector;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::Level;

/// Prefix for server-named queues
const ANONYMOUS_QUEUE_PREFIX: &str = "amq.gen-";

/// Names under this prefix are reserved for the broker
const RESERVED_QUEUE_PREFIX: &str = "amq.";

/// How `Broker::bind` names the new queue
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum QueueOptions {
    /// Server-named `amq.gen-<uuid>` queue
    #[default]
    Anonymous,
    /// Caller-named queue, unique across the broker
    Named(String),
}

/// A queue bound to an exchange
struct Binding {
    key: BindingKey,
    queue: String,
    sender: mpsc::Sender<Message>,
}

/// Topic exchange: a named set of bindings
#[derive(Default)]
struct TopicExchange {
    bindings: Vec<Binding>,
}

/// Consumer side of a bound queue
///
/// Hand it to `Broker::listen` to start delivery.
pub struct Queue {
    name: String,
    exchange: String,
    receiver: mpsc::Receiver<Message>,
}

impl Queue {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn exchange(&self) -> &str {
        &self.exchange
    }
}

/// Running listener tasks for one queue
pub struct ListenerHandle {
    queue: String,
    handles: Vec<JoinHandle<()>>,
}

impl ListenerHandle {
    pub fn queue(&self) -> &str {
        &self.queue
    }

    /// Number of consumer tasks
    pub fn consumers(&self) -> usize {
        self.handles.len()
    }

    /// Stop all consumers; the queue is deleted on the next publish that hits it
    pub fn abort(&self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}

/// In-process message broker
pub struct Broker {
    exchanges: RwLock<HashMap<String, TopicExchange>>,
    queue_capacity: usize,
    metrics: Arc<MetricsCollector>,
}

impl Broker {
    /// Create broker whose queues hold up to `queue_capacity` messages
    pub fn new(queue_capacity: usize, metrics: Arc<MetricsCollector>) -> Self {
        Self {
            exchanges: RwLock::new(HashMap::new()),
            queue_capacity,
            metrics,
        }
    }

    /// Declare a topic exchange (idempotent)
    pub fn declare_exchange(&self, name: &str) {
        let mut exchanges = self.exchanges.write();
        if !exchanges.contains_key(name) {
            exchanges.insert(name.to_string(), TopicExchange::default());
            crate::log_bus!(Level::INFO, exchange = name, "Declared topic exchange");
        }
    }

    /// Names of all declared exchanges, sorted
    pub fn exchanges(&self) -> Vec<String> {
        let mut names: Vec<String> = self.exchanges.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Names of queues bound to `exchange`, in binding order
    pub fn queue_names(&self, exchange: &str) -> Vec<String> {
        self.exchanges
            .read()
            .get(exchange)
            .map(|ex| ex.bindings.iter().map(|b| b.queue.clone()).collect())
            .unwrap_or_default()
    }

    /// Bind a new queue to `exchange` with a topic pattern
    ///
    /// A named queue must not collide with a live queue on any exchange.
    /// A previous queue of the same name whose consumer side was dropped is
    /// deleted first.
    pub fn bind(
        &self,
        exchange: &str,
        binding_key: &str,
        options: QueueOptions,
    ) -> Result<Queue, BindError> {
        if self.queue_capacity == 0 {
            return Err(BindError::ZeroCapacity);
        }

        let mut exchanges = self.exchanges.write();
        if !exchanges.contains_key(exchange) {
            return Err(BindError::ExchangeNotFound(exchange.to_string()));
        }

        let name = match options {
            QueueOptions::Anonymous => {
                format!("{}{}", ANONYMOUS_QUEUE_PREFIX, uuid::Uuid::new_v4().simple())
            }
            QueueOptions::Named(name) => {
                if name.is_empty() || name.starts_with(RESERVED_QUEUE_PREFIX) {
                    return Err(BindError::InvalidQueueName(name));
                }
                for ex in exchanges.values_mut() {
                    ex.bindings.retain(|b| b.queue != name || !b.sender.is_closed());
                }
                let taken = exchanges
                    .values()
                    .flat_map(|ex| ex.bindings.iter())
                    .any(|b| b.queue == name);
                if taken {
                    return Err(BindError::QueueExists(name));
                }
                name
            }
        };

        let ex = exchanges
            .get_mut(exchange)
            .ok_or_else(|| BindError::ExchangeNotFound(exchange.to_string()))?;

        let (sender, receiver) = mpsc::channel(self.queue_capacity);
        ex.bindings.push(Binding {
            key: BindingKey::parse(binding_key),
            queue: name.clone(),
            sender,
        });

        crate::log_bus!(
            Level::INFO,
            exchange,
            queue = %name,
            binding_key,
            "Bound queue"
        );

        Ok(Queue {
            name,
            exchange: exchange.to_string(),
            receiver,
        })
    }

    /// Start `consumers` listener tasks draining `queue` into `subscriber`
    ///
    /// Must be called from within a tokio runtime. With one consumer,
    /// messages reach the subscriber in publish order.
    pub fn listen<T, S>(&self, queue: Queue, subscriber: Arc<S>, consumers: usize) -> ListenerHandle
    where
        T: DeserializeOwned + Send + 'static,
        S: Subscriber<T>,
    {
        let Queue { name, receiver, .. } = queue;
        let receiver = Arc::new(tokio::sync::Mutex::new(receiver));
        let consumers = consumers.max(1);

        let handles = (0..consumers)
            .map(|worker| {
                let receiver = receiver.clone();
                let subscriber = subscriber.clone();
                let metrics = self.metrics.clone();
                let queue = name.clone();

                tokio::spawn(async move {
                    crate::log_bus!(Level::DEBUG, queue = %queue, worker, "Listener started");
                    loop {
                        // Lock only while waiting, so other consumers can dispatch concurrently
                        let next = { receiver.lock().await.recv().await };
                        let Some(message) = next else {
                            break;
                        };

                        match JsonConverter::from_message::<T>(&message) {
                            Ok(payload) => {
                                subscriber.on_message(payload);
                                metrics.record_delivered();
                            }
                            Err(e) => {
                                metrics.record_decode_failure();
                                crate::log_bus!(
                                    Level::WARN,
                                    queue = %queue,
                                    routing_key = %message.routing_key,
                                    "Dropping undecodable message: {}",
                                    e
                                );
                            }
                        }
                    }
                    crate::log_bus!(Level::DEBUG, queue = %queue, worker, "Listener stopped");
                })
            })
            .collect();

        ListenerHandle {
            queue: name,
            handles,
        }
    }

    /// Route an already encoded message
    pub fn publish_message(&self, exchange: &str, message: Message) -> Result<(), PublishError> {
        let mut routed = 0u64;
        let mut failure = None;
        let mut closed = Vec::new();

        {
            let exchanges = self.exchanges.read();
            let ex = exchanges
                .get(exchange)
                .ok_or_else(|| PublishError::ExchangeNotFound(exchange.to_string()))?;

            for binding in ex.bindings.iter().filter(|b| b.key.matches(&message.routing_key)) {
                match binding.sender.try_send(message.clone()) {
                    Ok(()) => routed += 1,
                    Err(TrySendError::Full(_)) => {
                        crate::log_bus!(Level::WARN, queue = %binding.queue, "Queue full, message dropped");
                        failure.get_or_insert_with(|| PublishError::QueueFull {
                            queue: binding.queue.clone(),
                        });
                    }
                    Err(TrySendError::Closed(_)) => closed.push(binding.queue.clone()),
                }
            }
        }

        if !closed.is_empty() {
            self.delete_queues(exchange, &closed);
        }

        self.metrics.record_routed(routed);
        if routed == 0 && failure.is_none() {
            self.metrics.record_unroutable();
            crate::log_bus!(
                Level::DEBUG,
                exchange,
                routing_key = %message.routing_key,
                "Message unroutable"
            );
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn delete_queues(&self, exchange: &str, queues: &[String]) {
        let mut exchanges = self.exchanges.write();
        if let Some(ex) = exchanges.get_mut(exchange) {
            ex.bindings.retain(|b| !queues.contains(&b.queue));
        }
        for queue in queues {
            crate::log_bus!(Level::INFO, exchange, queue = %queue, "Deleted queue without listeners");
        }
    }
}

impl Publisher for Broker {
    fn publish<T: Serialize>(
        &self,
        exchange: &str,
        routing_key: &str,
        payload: &T,
    ) -> Result<(), PublishError> {
        let message = JsonConverter::to_message(routing_key, payload)?;
        self.publish_message(exchange, message)
    }
}
