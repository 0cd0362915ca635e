//! Public API for the queue system
//!
//! External modules should import from here rather than directly from internal modules.
//! See module documentation for usage examples and the consumption cycle.

// Core queue components
pub use crate::queue::async_queue::AsyncQueue;
pub use crate::queue::consumer::QueueConsumer;

// Posting policy and construction options
pub use crate::queue::types::{Delivery, PostOutcome, QueueOptions};

// Error handling
pub use crate::queue::error::{QueueError, QueueResult};
