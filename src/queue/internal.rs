//! Internal queue state machine
//!
//! All transitions happen on a `QueueState` borrowed from the queue's mutex,
//! so each one is atomic with respect to producers and the consumer. The
//! consumer's position is described by [`Phase`], the stop request by
//! [`Lifecycle`]; together they replace a set of independent flags.

use crate::queue::error::{QueueError, QueueResult};
use crate::queue::types::{Delivery, PostOutcome};
use crate::signal::Deferred;
use std::collections::VecDeque;
use std::mem;

/// Where the attached consumer (if any) is in its cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    /// No consumer attached
    Detached,
    /// Consumer attached, parked on the wake signal or about to take a batch
    Waiting,
    /// Consumer attached and handing out a batch
    Delivering(Truncation),
}

/// What happens to the undelivered rest of the current batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Truncation {
    Keep,
    /// `clear()` ran mid-batch: discard the rest and keep consuming
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Lifecycle {
    Open,
    /// Stop requested; posts are dropped until a consumer re-arms the queue
    Stopped,
}

/// How a delivery pass ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BatchEnd {
    /// Keep consuming; wait for or take the next batch
    Continue,
    /// Graceful stop; the cycle is over
    Finished,
}

#[derive(Debug)]
pub(crate) struct QueueState<T> {
    pending: VecDeque<T>,
    inflight: usize,
    processed: u64,
    capacity: usize,
    error: Option<QueueError>,
    signal: Deferred<(), QueueError>,
    phase: Phase,
    lifecycle: Lifecycle,
}

impl<T> QueueState<T> {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            pending: VecDeque::new(),
            inflight: 0,
            processed: 0,
            capacity,
            error: None,
            signal: Deferred::new(),
            phase: Phase::Detached,
            lifecycle: Lifecycle::Open,
        }
    }

    /// Items not yet fully delivered: buffered plus in flight
    pub(crate) fn len(&self) -> usize {
        self.pending.len() + self.inflight
    }

    pub(crate) fn processed(&self) -> u64 {
        self.processed
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn is_active(&self) -> bool {
        self.phase != Phase::Detached
    }

    pub(crate) fn is_stopped(&self) -> bool {
        self.lifecycle == Lifecycle::Stopped
    }

    pub(crate) fn pending(&self) -> &VecDeque<T> {
        &self.pending
    }

    pub(crate) fn post(&mut self, value: T, delivery: Delivery) -> PostOutcome {
        if self.lifecycle == Lifecycle::Stopped {
            return PostOutcome::DroppedStopped;
        }
        if delivery == Delivery::LiveOnly && self.phase == Phase::Detached {
            return PostOutcome::DroppedNoConsumer;
        }

        let mut evicted = 0;
        if self.capacity > 0 {
            while self.pending.len() >= self.capacity {
                self.pending.pop_front();
                evicted += 1;
            }
        }
        self.pending.push_back(value);
        self.signal.resolve(());

        PostOutcome::Queued { evicted }
    }

    pub(crate) fn stop(&mut self, error: Option<QueueError>) {
        if let Some(error) = error {
            self.error = Some(error);
        }
        self.lifecycle = Lifecycle::Stopped;
        if self.inflight == 0 {
            self.signal.resolve(());
        }
    }

    pub(crate) fn clear(&mut self) {
        self.pending.clear();
        if self.inflight > 0 {
            if let Phase::Delivering(truncation) = &mut self.phase {
                *truncation = Truncation::Reset;
            }
        }
    }

    /// Attach a consumer, re-arming the queue if it was stopped
    pub(crate) fn attach(&mut self) -> QueueResult<()> {
        if self.phase != Phase::Detached {
            return Err(QueueError::ConsumerActive);
        }
        if self.lifecycle == Lifecycle::Stopped {
            self.lifecycle = Lifecycle::Open;
            if self.pending.is_empty() {
                self.signal = Deferred::new();
            }
        }
        self.phase = Phase::Waiting;
        Ok(())
    }

    /// The signal to park on, or `None` if there is something to act on now
    pub(crate) fn idle_signal(&self) -> Option<Deferred<(), QueueError>> {
        if self.pending.is_empty() && self.error.is_none() {
            Some(self.signal.clone())
        } else {
            None
        }
    }

    /// Report the sticky error, or snapshot the buffer as the next batch
    pub(crate) fn begin_batch(&mut self) -> QueueResult<VecDeque<T>> {
        if let Some(error) = self.error.take() {
            self.phase = Phase::Detached;
            return Err(error);
        }
        let batch = mem::take(&mut self.pending);
        self.inflight = batch.len();
        self.phase = Phase::Delivering(Truncation::Keep);
        Ok(batch)
    }

    /// True when the rest of the current batch must not be handed out
    pub(crate) fn is_truncating(&self) -> bool {
        self.lifecycle == Lifecycle::Stopped
            || self.phase == Phase::Delivering(Truncation::Reset)
    }

    pub(crate) fn record_handed_out(&mut self) {
        self.processed += 1;
    }

    pub(crate) fn record_delivered(&mut self) {
        self.inflight = self.inflight.saturating_sub(1);
    }

    /// Close the current delivery pass
    ///
    /// `remainder` holds the batch items that were not handed out.
    pub(crate) fn finish_batch(&mut self, mut remainder: VecDeque<T>) -> BatchEnd {
        if self.phase == Phase::Delivering(Truncation::Reset) {
            remainder.clear();
        }
        self.inflight = 0;

        if self.lifecycle == Lifecycle::Stopped {
            self.restore(remainder);
            self.phase = Phase::Detached;
            return BatchEnd::Finished;
        }

        if self.pending.is_empty() {
            self.signal = Deferred::new();
        }
        self.phase = Phase::Waiting;
        BatchEnd::Continue
    }

    /// End a cycle that failed while parked
    pub(crate) fn abandon(&mut self) {
        self.inflight = 0;
        self.phase = Phase::Detached;
    }

    /// Consumer went away mid-cycle; put undelivered items back
    pub(crate) fn detach(&mut self, mut remainder: VecDeque<T>) {
        if self.phase == Phase::Delivering(Truncation::Reset) {
            remainder.clear();
        }
        self.inflight = 0;
        self.restore(remainder);
        self.phase = Phase::Detached;
    }

    /// Merge `front` ahead of the buffered items, then re-apply capacity
    fn restore(&mut self, mut front: VecDeque<T>) {
        if !front.is_empty() {
            front.append(&mut self.pending);
            self.pending = front;
        }
        if self.capacity > 0 {
            while self.pending.len() > self.capacity {
                self.pending.pop_front();
            }
        }
    }
}
