//! In-process event bus shared by deployed services.
//!
//! The bus carries JSON payloads between adapters and application code,
//! addressed by string topic. Each address is backed by a broadcast channel:
//! every live subscriber sees every event published after it subscribed, and
//! slow subscribers lag rather than block publishers.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::broadcast;

use crate::error::{Error, Result};

/// Default per-address buffer when none is configured.
pub const DEFAULT_CAPACITY: usize = 256;

/// An event delivered through the bus.
#[derive(Debug, Clone)]
pub struct Event {
    address: Arc<str>,
    payload: serde_json::Value,
    published_at: DateTime<Utc>,
}

impl Event {
    fn new(address: &str, payload: serde_json::Value) -> Self {
        Self {
            address: Arc::from(address),
            payload,
            published_at: Utc::now(),
        }
    }

    /// The address this event was published on.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// The JSON payload.
    #[must_use]
    pub fn payload(&self) -> &serde_json::Value {
        &self.payload
    }

    /// When the event was published.
    #[must_use]
    pub fn published_at(&self) -> DateTime<Utc> {
        self.published_at
    }

    /// Deserialize the payload into a typed value.
    ///
    /// # Errors
    ///
    /// Returns a JSON error if the payload does not match the target type.
    pub fn payload_as<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.payload.clone())?)
    }
}

struct BusInner {
    capacity: usize,
    topics: RwLock<HashMap<String, broadcast::Sender<Event>>>,
}

type Topics = HashMap<String, broadcast::Sender<Event>>;

impl BusInner {
    fn read_topics(&self) -> RwLockReadGuard<'_, Topics> {
        self.topics.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_topics(&self) -> RwLockWriteGuard<'_, Topics> {
        self.topics.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Address-based publish/subscribe bus.
///
/// Cloning is cheap; all clones share the same addresses. A
/// [`DeploymentGroup`](crate::deployment::DeploymentGroup) hands the same
/// bus to every adapter it starts.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl EventBus {
    /// Create a bus whose addresses buffer `capacity` events each.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(BusInner {
                capacity: capacity.max(1),
                topics: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// The per-address buffer size.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Publish a payload to an address.
    ///
    /// Returns how many subscribers the event was delivered to. Publishing
    /// to an address with no live subscribers is not an error; the event is
    /// dropped and `0` is returned.
    ///
    /// # Errors
    ///
    /// Returns a JSON error if the payload cannot be serialized.
    pub fn publish<T: Serialize>(&self, address: &str, payload: &T) -> Result<usize> {
        let value = serde_json::to_value(payload)?;
        let event = Event::new(address, value);

        let mut topics = self.inner.write_topics();
        let Some(tx) = topics.get(address) else {
            tracing::trace!(address = %address, "publish on address with no subscribers");
            return Ok(0);
        };

        if tx.receiver_count() == 0 {
            // All subscriptions were dropped; reclaim the address.
            topics.remove(address);
            return Ok(0);
        }

        match tx.send(event) {
            Ok(delivered) => {
                tracing::trace!(address = %address, delivered, "event published");
                Ok(delivered)
            }
            // Last receiver dropped between the count check and the send.
            Err(_) => Ok(0),
        }
    }

    /// Subscribe to an address.
    ///
    /// The subscription sees every event published to the address after this
    /// call. Dropping the subscription unsubscribes.
    #[must_use]
    pub fn subscribe(&self, address: &str) -> Subscription {
        let mut topics = self.inner.write_topics();
        let tx = topics
            .entry(address.to_string())
            .or_insert_with(|| broadcast::channel(self.inner.capacity).0);
        tracing::debug!(address = %address, "subscribed");
        Subscription {
            address: Arc::from(address),
            receiver: tx.subscribe(),
        }
    }

    /// How many live subscribers an address currently has.
    #[must_use]
    pub fn subscriber_count(&self, address: &str) -> usize {
        self.inner
            .read_topics()
            .get(address)
            .map_or(0, broadcast::Sender::receiver_count)
    }

    /// Addresses that currently have at least one live subscriber, sorted.
    #[must_use]
    pub fn addresses(&self) -> Vec<String> {
        let topics = self.inner.read_topics();
        let mut addresses: Vec<String> = topics
            .iter()
            .filter(|(_, tx)| tx.receiver_count() > 0)
            .map(|(address, _)| address.clone())
            .collect();
        addresses.sort();
        addresses
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("capacity", &self.inner.capacity)
            .field("addresses", &self.inner.read_topics().len())
            .finish()
    }
}

/// A live subscription to one bus address.
pub struct Subscription {
    address: Arc<str>,
    receiver: broadcast::Receiver<Event>,
}

impl Subscription {
    /// The address this subscription listens on.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Receive the next event, waiting if none is buffered.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BusClosed`] when the bus itself has been dropped, or
    /// [`Error::BusLagged`] when this subscriber fell behind and events were
    /// skipped. After a lag error the subscription remains usable and
    /// resumes at the oldest retained event.
    pub async fn recv(&mut self) -> Result<Event> {
        match self.receiver.recv().await {
            Ok(event) => Ok(event),
            Err(broadcast::error::RecvError::Closed) => Err(Error::BusClosed {
                address: self.address.to_string(),
            }),
            Err(broadcast::error::RecvError::Lagged(skipped)) => Err(Error::BusLagged {
                address: self.address.to_string(),
                skipped,
            }),
        }
    }

    /// Receive the next event if one is already buffered.
    ///
    /// # Errors
    ///
    /// Same error cases as [`Subscription::recv`]; an empty buffer is
    /// `Ok(None)`, not an error.
    pub fn try_recv(&mut self) -> Result<Option<Event>> {
        match self.receiver.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(broadcast::error::TryRecvError::Empty) => Ok(None),
            Err(broadcast::error::TryRecvError::Closed) => Err(Error::BusClosed {
                address: self.address.to_string(),
            }),
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => Err(Error::BusLagged {
                address: self.address.to_string(),
                skipped,
            }),
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("address", &self.address)
            .finish()
    }
}
