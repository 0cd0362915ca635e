//! Single-shot wakeup primitives
//!
//! [`Deferred`] is a settle-once slot that any number of tasks can wait on.
//! The queue parks its consumer on one while there is nothing to deliver, and
//! the timing helpers build their timeout on top of it.

mod deferred;
mod error;

pub use deferred::Deferred;
pub use error::SignalError;
