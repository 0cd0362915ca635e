//! Type definitions for the queue system

use serde::Deserialize;

/// Whether a post should be buffered when no consumer is attached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Delivery {
    /// Buffer the item even if nobody is consuming yet
    #[default]
    Always,
    /// Drop the item unless a consumer is currently attached
    LiveOnly,
}

impl Delivery {
    /// Map a "deliver only if a consumer is active" flag onto a policy
    pub fn live_only(flag: bool) -> Self {
        if flag {
            Delivery::LiveOnly
        } else {
            Delivery::Always
        }
    }
}

/// What happened to a posted item
///
/// Dropped posts are not errors; callers that need loss visibility can
/// inspect this instead of comparing counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostOutcome {
    /// Buffered; `evicted` older items were discarded to stay within capacity
    Queued { evicted: usize },
    /// The queue was stopped and has not been re-armed
    DroppedStopped,
    /// Live-only post with no consumer attached
    DroppedNoConsumer,
}

impl PostOutcome {
    pub fn is_queued(&self) -> bool {
        matches!(self, PostOutcome::Queued { .. })
    }
}

/// Construction options for an [`AsyncQueue`](super::AsyncQueue)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QueueOptions {
    /// Maximum number of buffered items, 0 for unbounded
    pub capacity: usize,
}
