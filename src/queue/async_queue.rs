//! Producer-side queue handle
//!
//! `AsyncQueue` is a cheaply cloneable handle; every clone refers to the same
//! buffer. Any number of producers may post through it concurrently, while at
//! most one [`QueueConsumer`] is attached at a time.

use crate::core::sync::lock_or_recover;
use crate::queue::consumer::QueueConsumer;
use crate::queue::error::{QueueError, QueueResult};
use crate::queue::internal::QueueState;
use crate::queue::types::{Delivery, PostOutcome, QueueOptions};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

static NEXT_QUEUE_ID: AtomicU64 = AtomicU64::new(1);

/// State shared between the queue handles and the consumer
pub(crate) struct Shared<T> {
    id: u64,
    state: Mutex<QueueState<T>>,
}

impl<T> Shared<T> {
    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, QueueState<T>> {
        lock_or_recover(&self.state, "queue state")
    }
}

/// Single-consumer, multi-producer item queue with pull-based consumption
///
/// # Example
///
/// ```rust
/// # use asyncqueue::queue::{AsyncQueue, Delivery};
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let queue = AsyncQueue::new();
/// queue.post("hello", Delivery::Always);
/// queue.post("world", Delivery::Always);
/// queue.stop();
///
/// let mut consumer = queue.consume()?;
/// while let Some(item) = consumer.next().await {
///     println!("{}", item?);
/// }
/// # Ok(())
/// # }
/// ```
pub struct AsyncQueue<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for AsyncQueue<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> Default for AsyncQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for AsyncQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.lock();
        f.debug_struct("AsyncQueue")
            .field("id", &self.shared.id)
            .field("length", &state.len())
            .field("capacity", &state.capacity())
            .field("active", &state.is_active())
            .field("stopped", &state.is_stopped())
            .finish()
    }
}

impl<T> AsyncQueue<T> {
    /// Create an unbounded queue
    pub fn new() -> Self {
        Self::with_options(QueueOptions::default())
    }

    /// Create a queue holding at most `capacity` buffered items (0 = unbounded)
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_options(QueueOptions { capacity })
    }

    pub fn with_options(options: QueueOptions) -> Self {
        let id = NEXT_QUEUE_ID.fetch_add(1, Ordering::Relaxed);
        log::trace!("Queue {} created (capacity {})", id, options.capacity);
        Self {
            shared: Arc::new(Shared {
                id,
                state: Mutex::new(QueueState::new(options.capacity)),
            }),
        }
    }

    /// Process-unique identifier, used in log output
    pub fn id(&self) -> u64 {
        self.shared.id
    }

    /// Append an item and wake the consumer
    ///
    /// Dropped silently (reported only through the outcome) when the queue is
    /// stopped, or when `delivery` is [`Delivery::LiveOnly`] and no consumer is
    /// attached. A bounded queue evicts its oldest items to make room.
    pub fn post(&self, value: T, delivery: Delivery) -> PostOutcome {
        let outcome = self.shared.lock().post(value, delivery);
        match outcome {
            PostOutcome::Queued { evicted: 0 } => {}
            PostOutcome::Queued { evicted } => {
                log::trace!("Queue {} evicted {} item(s) at capacity", self.id(), evicted)
            }
            dropped => log::trace!("Queue {} dropped post: {:?}", self.id(), dropped),
        }
        outcome
    }

    /// Request a graceful stop
    ///
    /// Buffered items are kept for a later consumer. An in-flight batch is cut
    /// short and its undelivered items are put back in front of the buffer.
    pub fn stop(&self) {
        self.shared.lock().stop(None);
        log::trace!("Queue {} stop requested", self.id());
    }

    /// Request a stop that the consumer observes as `error` on its next wake-up
    pub fn stop_with_error(&self, error: QueueError) {
        log::trace!("Queue {} stop requested with error: {}", self.id(), error);
        self.shared.lock().stop(Some(error));
    }

    /// Drop all buffered items; an in-flight batch is discarded but consumption continues
    pub fn clear(&self) {
        self.shared.lock().clear();
        log::trace!("Queue {} cleared", self.id());
    }

    /// Number of items not yet fully delivered (buffered plus in flight)
    pub fn len(&self) -> usize {
        self.shared.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of items ever handed to a consumer
    pub fn processed(&self) -> u64 {
        self.shared.lock().processed()
    }

    pub fn capacity(&self) -> usize {
        self.shared.lock().capacity()
    }

    /// True while a consumer is attached
    pub fn is_active(&self) -> bool {
        self.shared.lock().is_active()
    }

    /// True after a stop request until a consumer re-arms the queue
    pub fn is_stopped(&self) -> bool {
        self.shared.lock().is_stopped()
    }

    /// Attach the consumer and start a consumption cycle
    ///
    /// Re-arms a stopped queue. Fails with [`QueueError::ConsumerActive`] if a
    /// consumer is already attached.
    pub fn consume(&self) -> QueueResult<QueueConsumer<T>> {
        self.shared.lock().attach()?;
        log::debug!("Queue {} consumer attached", self.id());
        Ok(QueueConsumer::new(Arc::clone(&self.shared)))
    }
}

impl<T: Clone> AsyncQueue<T> {
    /// Snapshot of the buffered (not in-flight) items, oldest first
    pub fn pending_items(&self) -> Vec<T> {
        self.shared.lock().pending().iter().cloned().collect()
    }
}
