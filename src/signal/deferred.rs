//! Deferred signal implementation
//!
//! A `Deferred` starts unsettled and can be resolved or rejected exactly once.
//! Every clone shares the same slot, so one side can hand a clone to waiters
//! and keep another to settle it. Waiters that arrive after settlement get the
//! stored outcome immediately.

use crate::core::sync::lock_or_recover;
use crate::signal::SignalError;
use std::fmt;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

struct DeferredInner<T, E> {
    name: Option<String>,
    outcome: Mutex<Option<Result<T, E>>>,
    settled: Notify,
}

/// Single-shot resolve/reject signal with any number of waiters
///
/// # Example
///
/// ```rust
/// # use asyncqueue::signal::Deferred;
/// # async fn example() {
/// let ready: Deferred<u32> = Deferred::new();
/// let waiter = ready.clone();
///
/// let handle = tokio::spawn(async move { waiter.wait().await });
/// assert!(ready.resolve(7));
/// assert_eq!(handle.await.unwrap(), Ok(7));
/// # }
/// ```
pub struct Deferred<T = (), E = SignalError> {
    inner: Arc<DeferredInner<T, E>>,
}

impl<T, E> Clone for Deferred<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone, E: Clone> Default for Deferred<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> fmt::Debug for Deferred<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let settled = lock_or_recover(&self.inner.outcome, "deferred outcome").is_some();
        f.debug_struct("Deferred")
            .field("name", &self.inner.name)
            .field("settled", &settled)
            .finish()
    }
}

impl<T: Clone, E: Clone> Deferred<T, E> {
    /// Create an unsettled signal
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Create an unsettled signal carrying a name for diagnostics
    pub fn named(name: impl Into<String>) -> Self {
        Self::build(Some(name.into()))
    }

    fn build(name: Option<String>) -> Self {
        Self {
            inner: Arc::new(DeferredInner {
                name,
                outcome: Mutex::new(None),
                settled: Notify::new(),
            }),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.inner.name.as_deref()
    }

    /// Resolve with `value`; returns false if already settled
    pub fn resolve(&self, value: T) -> bool {
        self.settle(Ok(value))
    }

    /// Reject with `error`; returns false if already settled
    pub fn reject(&self, error: E) -> bool {
        self.settle(Err(error))
    }

    pub fn is_settled(&self) -> bool {
        lock_or_recover(&self.inner.outcome, "deferred outcome").is_some()
    }

    /// Wait until the signal settles and return its outcome
    ///
    /// Cancel-safe: dropping the returned future has no effect on the signal.
    pub async fn wait(&self) -> Result<T, E> {
        loop {
            // Register interest before checking so a settle in between is not missed
            let notified = self.inner.settled.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(outcome) = self.outcome() {
                return outcome;
            }

            notified.await;
        }
    }

    fn outcome(&self) -> Option<Result<T, E>> {
        lock_or_recover(&self.inner.outcome, "deferred outcome").clone()
    }

    fn settle(&self, outcome: Result<T, E>) -> bool {
        {
            let mut slot = lock_or_recover(&self.inner.outcome, "deferred outcome");
            if slot.is_some() {
                return false;
            }
            *slot = Some(outcome);
        }
        if let Some(name) = &self.inner.name {
            log::trace!("Deferred '{}' settled", name);
        }
        self.inner.settled.notify_waiters();
        true
    }
}
