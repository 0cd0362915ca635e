//! Queue Consumer driving the pull-based consumption cycle
//!
//! A consumer takes everything buffered as one batch and hands the items out
//! one per [`next`](QueueConsumer::next) call. An item counts as delivered
//! when the consumer comes back for the following one, which keeps the
//! queue's reported length exact while a batch is being worked through.

use crate::core::timing::{self, TimeoutError};
use crate::queue::async_queue::Shared;
use crate::queue::error::QueueResult;
use crate::queue::internal::BatchEnd;
use futures::Stream;
use std::collections::VecDeque;
use std::mem;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// Park until there is something to take, then take a batch
    Waiting,
    /// Handing out the current batch
    Delivering,
    Finished,
}

/// The single attached consumer of an [`AsyncQueue`](super::AsyncQueue)
///
/// Created by [`AsyncQueue::consume`](super::AsyncQueue::consume). Dropping it
/// mid-cycle detaches it: undelivered batch items return to the front of the
/// buffer and another consumer may attach.
///
/// # Example
///
/// ```rust
/// # use asyncqueue::queue::{AsyncQueue, Delivery};
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let queue = AsyncQueue::new();
/// let mut consumer = queue.consume()?;
///
/// queue.post(1, Delivery::Always);
/// assert_eq!(consumer.next().await.transpose()?, Some(1));
///
/// queue.stop();
/// assert!(consumer.next().await.is_none());
/// # Ok(())
/// # }
/// ```
pub struct QueueConsumer<T> {
    shared: Arc<Shared<T>>,
    batch: VecDeque<T>,
    step: Step,
    /// An item was handed out and is counted in flight until the next pull
    owed: bool,
}

impl<T> QueueConsumer<T> {
    pub(crate) fn new(shared: Arc<Shared<T>>) -> Self {
        Self {
            shared,
            batch: VecDeque::new(),
            step: Step::Waiting,
            owed: false,
        }
    }

    /// True once the cycle has ended (gracefully or with an error)
    pub fn is_finished(&self) -> bool {
        self.step == Step::Finished
    }

    /// Pull the next item
    ///
    /// Returns `None` when the cycle ends after a graceful stop, and
    /// `Some(Err(_))` once if the queue was stopped with an error; both end
    /// the cycle. Suspends while nothing is buffered.
    ///
    /// Cancel-safe: dropping the future while it is suspended loses nothing,
    /// and the next call resumes the same cycle.
    pub async fn next(&mut self) -> Option<QueueResult<T>> {
        loop {
            match self.step {
                Step::Finished => return None,
                Step::Waiting => {
                    let signal = self.shared.lock().idle_signal();
                    if let Some(signal) = signal {
                        if let Err(error) = signal.wait().await {
                            self.shared.lock().abandon();
                            self.step = Step::Finished;
                            return Some(Err(error));
                        }
                    }

                    let batch = self.shared.lock().begin_batch();
                    match batch {
                        Ok(batch) => {
                            self.batch = batch;
                            self.step = Step::Delivering;
                        }
                        Err(error) => {
                            log::debug!(
                                "Queue {} cycle ended with error: {}",
                                self.shared.id(),
                                error
                            );
                            self.step = Step::Finished;
                            return Some(Err(error));
                        }
                    }
                }
                Step::Delivering => {
                    let mut state = self.shared.lock();
                    if mem::take(&mut self.owed) {
                        state.record_delivered();
                    }

                    if !state.is_truncating() {
                        if let Some(item) = self.batch.pop_front() {
                            state.record_handed_out();
                            self.owed = true;
                            return Some(Ok(item));
                        }
                    }

                    let remainder = mem::take(&mut self.batch);
                    match state.finish_batch(remainder) {
                        BatchEnd::Continue => self.step = Step::Waiting,
                        BatchEnd::Finished => {
                            log::debug!("Queue {} cycle ended (stopped)", self.shared.id());
                            self.step = Step::Finished;
                            return None;
                        }
                    }
                }
            }
        }
    }

    /// Pull the next item, giving up after `limit`
    ///
    /// Giving up leaves the consumer attached and the queue untouched.
    pub async fn next_within(
        &mut self,
        limit: Duration,
    ) -> Result<Option<QueueResult<T>>, TimeoutError> {
        timing::timeout(limit, "no queue item", self.next()).await
    }

    /// Adapt the consumer into a [`Stream`] of items
    pub fn into_stream(self) -> impl Stream<Item = QueueResult<T>> {
        futures::stream::unfold(self, |mut consumer| async move {
            let item = consumer.next().await?;
            Some((item, consumer))
        })
    }
}

impl<T> Drop for QueueConsumer<T> {
    fn drop(&mut self) {
        if self.step == Step::Finished {
            return;
        }
        let remainder = mem::take(&mut self.batch);
        self.shared.lock().detach(remainder);
        log::debug!("Queue {} consumer detached", self.shared.id());
    }
}
