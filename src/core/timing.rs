//! Delayed invocation, timeout and delay helpers
//!
//! [`DelayedCall`] runs a closure once after a delay unless cancelled first.
//! [`Timeout`] combines one with a [`Deferred`] that is rejected when the limit
//! passes, and [`timeout`] races an arbitrary future against it.

use crate::signal::Deferred;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Error produced when a [`Timeout`] fires
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason} after {limit:?}")]
pub struct TimeoutError {
    pub reason: String,
    pub limit: Duration,
}

/// A callback scheduled to run once after a delay
///
/// Must be created from within a tokio runtime.
#[derive(Debug)]
pub struct DelayedCall {
    handle: JoinHandle<()>,
}

impl DelayedCall {
    /// Schedule `callback` to run after `delay`
    pub fn schedule<F>(delay: Duration, callback: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            callback();
        });
        Self { handle }
    }

    /// Cancel the call if it has not fired yet
    pub fn cancel(&self) {
        self.handle.abort();
    }

    /// True once the callback has run or the call was cancelled
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Timer that rejects a shared signal once its limit passes
#[derive(Debug)]
pub struct Timeout {
    signal: Deferred<(), TimeoutError>,
    timer: DelayedCall,
}

impl Timeout {
    /// Arm a timeout that expires after `limit` with the given reason
    pub fn start(limit: Duration, reason: impl Into<String>) -> Self {
        let signal = Deferred::named("timeout");
        let expire = signal.clone();
        let error = TimeoutError {
            reason: reason.into(),
            limit,
        };
        let timer = DelayedCall::schedule(limit, move || {
            expire.reject(error);
        });
        Self { signal, timer }
    }

    /// Disarm the timeout; a waiter on [`expired`](Self::expired) then waits forever
    pub fn cancel(&self) {
        self.timer.cancel();
    }

    pub fn has_expired(&self) -> bool {
        self.signal.is_settled()
    }

    /// Wait for the timeout to fire and return its error
    pub async fn expired(&self) -> TimeoutError {
        loop {
            if let Err(error) = self.signal.wait().await {
                return error;
            }
        }
    }
}

impl Drop for Timeout {
    fn drop(&mut self) {
        self.timer.cancel();
    }
}

/// Run `future` to completion unless `limit` passes first
///
/// # Examples
/// ```rust
/// # use asyncqueue::core::timing::{delay, timeout};
/// # use std::time::Duration;
/// # async fn example() {
/// let quick = timeout(Duration::from_secs(1), "too slow", delay(Duration::ZERO, 3)).await;
/// assert_eq!(quick, Ok(3));
/// # }
/// ```
pub async fn timeout<F>(
    limit: Duration,
    reason: impl Into<String>,
    future: F,
) -> Result<F::Output, TimeoutError>
where
    F: Future,
{
    let timer = Timeout::start(limit, reason);
    tokio::select! {
        output = future => {
            timer.cancel();
            Ok(output)
        }
        error = timer.expired() => Err(error),
    }
}

/// Resolve to `value` after `duration`
pub async fn delay<T>(duration: Duration, value: T) -> T {
    tokio::time::sleep(duration).await;
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_delayed_call_fires() {
        let counter = Arc::new(AtomicUsize::new(0));
        let hits = Arc::clone(&counter);

        let call = DelayedCall::schedule(Duration::from_millis(10), move || {
            hits.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(call.is_finished());
    }

    #[tokio::test]
    async fn test_delayed_call_cancel() {
        let counter = Arc::new(AtomicUsize::new(0));
        let hits = Arc::clone(&counter);

        let call = DelayedCall::schedule(Duration::from_millis(50), move || {
            hits.fetch_add(1, Ordering::SeqCst);
        });
        call.cancel();

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_timeout_expires() {
        let timer = Timeout::start(Duration::from_millis(10), "waiting for items");
        let error = timer.expired().await;

        assert!(timer.has_expired());
        assert_eq!(error.reason, "waiting for items");
        assert_eq!(error.limit, Duration::from_millis(10));
        assert_eq!(error.to_string(), "waiting for items after 10ms");
    }

    #[tokio::test]
    async fn test_timeout_cancelled_never_expires() {
        let timer = Timeout::start(Duration::from_millis(10), "cancelled");
        timer.cancel();

        let waited = tokio::time::timeout(Duration::from_millis(80), timer.expired()).await;
        assert!(waited.is_err());
        assert!(!timer.has_expired());
    }

    #[tokio::test]
    async fn test_timeout_wrapper() {
        let ok = timeout(Duration::from_millis(200), "slow", async { 11 }).await;
        assert_eq!(ok, Ok(11));

        let late = timeout(
            Duration::from_millis(10),
            "slow",
            delay(Duration::from_millis(500), 11),
        )
        .await;
        assert_eq!(late.unwrap_err().reason, "slow");
    }

    #[tokio::test]
    async fn test_delay_returns_value() {
        let started = tokio::time::Instant::now();
        let value = delay(Duration::from_millis(20), "later").await;

        assert_eq!(value, "later");
        assert!(started.elapsed() >= Duration::from_millis(20));
    }
}
