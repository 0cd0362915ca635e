//! SubscriberMap implementation

use crate::core::sync::lock_or_recover;
use crate::queue::api::{AsyncQueue, Delivery, QueueOptions};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Mutex;

/// Map-wide options applied to every subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SubscriberOptions {
    /// Passed to each queue's `post` as the "deliver only to an attached
    /// consumer" flag, so `true` drops values for subscribers that are not
    /// currently consuming
    pub lossless: bool,
    /// Capacity of each subscription queue, 0 for unbounded
    pub capacity: usize,
}

impl SubscriberOptions {
    fn delivery(&self) -> Delivery {
        Delivery::live_only(self.lossless)
    }
}

/// Subject-keyed publish/subscribe over item queues
///
/// Every `subscribe` creates a fresh queue for the caller to consume.
/// Publishing to a subject posts a clone of the value to each of its queues.
///
/// # Example
///
/// ```rust
/// # use asyncqueue::subscribers::api::SubscriberMap;
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let map = SubscriberMap::new();
/// let queue = map.subscribe("metrics");
/// let mut consumer = queue.consume()?;
///
/// assert_eq!(map.post("metrics", 5), 1);
/// assert_eq!(consumer.next().await.transpose()?, Some(5));
///
/// map.shutdown();
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SubscriberMap<T> {
    options: SubscriberOptions,
    subjects: Mutex<HashMap<String, Vec<AsyncQueue<T>>>>,
}

impl<T> Default for SubscriberMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SubscriberMap<T> {
    pub fn new() -> Self {
        Self::with_options(SubscriberOptions::default())
    }

    pub fn with_options(options: SubscriberOptions) -> Self {
        Self {
            options,
            subjects: Mutex::new(HashMap::new()),
        }
    }

    pub fn options(&self) -> SubscriberOptions {
        self.options
    }

    pub fn is_lossless(&self) -> bool {
        self.options.lossless
    }

    /// Create a queue registered under `subject` and return it for consumption
    pub fn subscribe(&self, subject: impl Into<String>) -> AsyncQueue<T> {
        let subject = subject.into();
        let queue = AsyncQueue::with_options(QueueOptions {
            capacity: self.options.capacity,
        });

        let mut subjects = lock_or_recover(&self.subjects, "subscriber map");
        let subscribers = subjects.entry(subject.clone()).or_default();
        subscribers.push(queue.clone());

        log::debug!(
            "Queue {} subscribed to '{}' ({} subscriber(s))",
            queue.id(),
            subject,
            subscribers.len()
        );
        queue
    }

    /// Stop and clear every queue, then forget all subjects
    ///
    /// Safe to call more than once.
    pub fn shutdown(&self) {
        let drained: Vec<(String, Vec<AsyncQueue<T>>)> =
            lock_or_recover(&self.subjects, "subscriber map")
                .drain()
                .collect();

        let mut stopped = 0;
        for (_, subscribers) in drained {
            for queue in subscribers {
                queue.stop();
                queue.clear();
                stopped += 1;
            }
        }

        log::debug!("Subscriber map shut down ({} queue(s) stopped)", stopped);
    }

    pub fn subject_count(&self) -> usize {
        lock_or_recover(&self.subjects, "subscriber map").len()
    }

    pub fn subscriber_count(&self, subject: &str) -> usize {
        lock_or_recover(&self.subjects, "subscriber map")
            .get(subject)
            .map_or(0, Vec::len)
    }

    /// Registered subjects in sorted order
    pub fn subjects(&self) -> Vec<String> {
        let mut subjects: Vec<String> = lock_or_recover(&self.subjects, "subscriber map")
            .keys()
            .cloned()
            .collect();
        subjects.sort();
        subjects
    }
}

impl<T: Clone> SubscriberMap<T> {
    /// Post `value` to every queue subscribed to `subject`
    ///
    /// Returns the number of queues that accepted it. Unknown subjects are a
    /// no-op.
    pub fn post(&self, subject: &str, value: T) -> usize {
        let subjects = lock_or_recover(&self.subjects, "subscriber map");
        let Some(subscribers) = subjects.get(subject) else {
            log::trace!("No subscribers for '{}'", subject);
            return 0;
        };

        let delivery = self.options.delivery();
        let accepted = subscribers
            .iter()
            .filter(|queue| queue.post(value.clone(), delivery).is_queued())
            .count();

        log::trace!(
            "Posted to '{}': {}/{} subscriber(s) accepted",
            subject,
            accepted,
            subscribers.len()
        );
        accepted
    }
}
