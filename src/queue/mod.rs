//! Single-Consumer Item Queue
//!
//! A buffered queue that any number of producers post into at arbitrary
//! times, drained by one consumer through a restartable, pull-based cycle.
//!
//! # Overview
//!
//! - **Multiple Producers**: `AsyncQueue` handles are cloneable and `post` never blocks
//! - **Single Consumer**: one `QueueConsumer` at a time pulls items in FIFO order
//! - **Batching**: each wake-up takes the whole buffer as one batch
//! - **Bounded Buffering**: an optional capacity evicts the oldest items first
//! - **Graceful Stop**: `stop()` ends the cycle and keeps undelivered items for later
//! - **Reset**: `clear()` discards buffered items and the rest of the current batch
//!   without ending the cycle
//!
//! # Consumption Cycle
//!
//! ```text
//!            post / stop
//!                │ resolve signal
//!                ▼
//! ┌─────────┐  take batch  ┌────────────┐  batch done, buffer empty
//! │ Waiting │─────────────▶│ Delivering │──────────────────────────┐
//! └─────────┘              └─────┬──────┘                          │
//!      ▲                         │ stopped: merge leftovers         │
//!      │                         ▼                                  │
//!      │                   ┌──────────┐                             │
//!      │   consume()       │ Detached │                             │
//!      └───────────────────┴──────────┘◀────────────────────────────┘
//!                                   (back to Waiting unless stopped)
//! ```
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use asyncqueue::queue::{AsyncQueue, Delivery};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let queue = AsyncQueue::with_capacity(100);
//! let mut consumer = queue.consume()?;
//!
//! let producer = queue.clone();
//! tokio::spawn(async move {
//!     for i in 0..10 {
//!         producer.post(i, Delivery::Always);
//!     }
//!     producer.stop();
//! });
//!
//! while let Some(item) = consumer.next().await {
//!     println!("Received: {}", item?);
//! }
//! # Ok(())
//! # }
//! ```

mod async_queue;
mod consumer;
mod error;
mod internal;
mod types;

pub mod api;

pub use async_queue::AsyncQueue;
pub use consumer::QueueConsumer;
pub use error::{QueueError, QueueResult};
pub use types::{Delivery, PostOutcome, QueueOptions};

#[cfg(test)]
mod tests;
