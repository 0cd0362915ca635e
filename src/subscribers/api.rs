//! Public API for the subscriber map
//!
//! Subject-keyed fan-out over [`AsyncQueue`](crate::queue::api::AsyncQueue)s.
//! External modules should import from here rather than directly from internal modules.

pub use crate::subscribers::manager::{SubscriberMap, SubscriberOptions};
