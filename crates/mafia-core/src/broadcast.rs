//! One-shot broadcast channels for game events
//!
//! Each match carries two of these: the game-start signal and the
//! phase-execution signal. A subscriber registers a handle, waits on it
//! elsewhere (never under a match lock), and receives at most one delivery.
//! The subscriber list and the closed gate live behind a single mutex, so
//! registration and broadcast are linearizable with respect to each other:
//! a handle registered before a broadcast is delivered to, one registered
//! after is not.

use tokio::sync::{oneshot, Mutex};

/// Why a channel refuses new subscribers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Closed {
    /// The one-shot event already fired
    Delivered,
    /// The match owning the channel was destroyed
    Abandoned,
}

struct Inner<T> {
    closed: Option<Closed>,
    subscribers: Vec<oneshot::Sender<T>>,
}

/// A one-shot fan-out channel with a dynamic subscriber list
///
/// Delivery is exactly-once per handle: broadcasting consumes every
/// registered sender and empties the list. Handles whose receiver was
/// dropped (a cancelled waiter) are discarded at the same moment.
pub struct Broadcast<T> {
    inner: Mutex<Inner<T>>,
}

impl<T: Clone> Broadcast<T> {
    /// Create an open channel with no subscribers
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                closed: None,
                subscribers: Vec::new(),
            }),
        }
    }

    /// Register a new subscriber handle
    ///
    /// Returns the receiving half to wait on, or the reason the channel no
    /// longer accepts subscribers.
    pub async fn subscribe(&self) -> std::result::Result<oneshot::Receiver<T>, Closed> {
        let mut inner = self.inner.lock().await;
        if let Some(closed) = inner.closed {
            return Err(closed);
        }
        let (sender, receiver) = oneshot::channel();
        inner.subscribers.push(sender);
        Ok(receiver)
    }

    /// Deliver `value` to every registered subscriber, in registration
    /// order, and clear the list
    ///
    /// When `close_after` is set the channel refuses subscribers from then
    /// on. Returns how many handles were delivered to; handles whose waiter
    /// already went away are dropped silently.
    pub async fn broadcast(&self, value: T, close_after: bool) -> usize {
        let mut inner = self.inner.lock().await;
        if close_after {
            inner.closed = Some(Closed::Delivered);
        }
        let subscribers = std::mem::take(&mut inner.subscribers);
        let mut delivered = 0;
        for subscriber in subscribers {
            if subscriber.send(value.clone()).is_ok() {
                delivered += 1;
            }
        }
        delivered
    }

    /// Drop every undelivered handle and refuse subscribers from then on
    ///
    /// Pending waiters observe their receiver closing. Returns how many
    /// handles were still outstanding.
    pub async fn abandon(&self) -> usize {
        let mut inner = self.inner.lock().await;
        inner.closed = Some(Closed::Abandoned);
        let subscribers = std::mem::take(&mut inner.subscribers);
        subscribers.len()
    }

    /// Number of currently registered handles
    pub async fn subscriber_count(&self) -> usize {
        self.inner.lock().await.subscribers.len()
    }
}

impl<T: Clone> Default for Broadcast<T> {
    fn default() -> Self {
        Self::new()
    }
}
