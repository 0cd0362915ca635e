//! Pull-based async item queues and a subject-keyed subscriber map
//!
//! [`queue`] holds the single-consumer queue and its consumer, [`subscribers`]
//! fans values out to one queue per subscription, and [`signal`] provides the
//! one-shot settle-once signal both are built on.

pub mod app;
pub mod core;
pub mod queue;
pub mod signal;
pub mod subscribers;
