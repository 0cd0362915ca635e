//! Synchronization utilities for robust mutex handling
//!
//! Queue and subscriber state transitions are short and always leave the
//! guarded data consistent, so a poisoned lock is recovered rather than
//! turned into an error. The recovery is logged so a panic while holding a
//! lock does not go unnoticed.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock a mutex, recovering the guard if a previous holder panicked
///
/// # Arguments
/// * `mutex` - The mutex to lock
/// * `context` - Short description of the guarded state, used in the log line
///
/// # Examples
/// ```
/// use std::sync::Mutex;
/// use asyncqueue::core::sync::lock_or_recover;
///
/// let mutex = Mutex::new(42);
/// let guard = lock_or_recover(&mutex, "answer");
/// assert_eq!(*guard, 42);
/// ```
pub fn lock_or_recover<'a, T>(mutex: &'a Mutex<T>, context: &str) -> MutexGuard<'a, T> {
    mutex.lock().unwrap_or_else(|poisoned: PoisonError<MutexGuard<'a, T>>| {
        log::warn!(
            "Recovered poisoned lock on {} (a panic occurred while it was held)",
            context
        );
        poisoned.into_inner()
    })
}
