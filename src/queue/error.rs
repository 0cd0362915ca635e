//! Queue Error Types

use std::sync::Arc;

#[derive(Debug, Clone, thiserror::Error)]
pub enum QueueError {
    #[error("Queue already has an active consumer")]
    ConsumerActive,

    #[error("Queue stopped: {reason}")]
    Stopped { reason: String },

    #[error("{0}")]
    Source(Arc<dyn std::error::Error + Send + Sync>),
}

impl QueueError {
    /// Stop reason carried as a plain message
    pub fn stopped(reason: impl Into<String>) -> Self {
        QueueError::Stopped {
            reason: reason.into(),
        }
    }

    /// Wrap an arbitrary error so it can be handed to a consumer
    pub fn from_source<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        QueueError::Source(Arc::new(error))
    }
}

/// Result type for queue operations
pub type QueueResult<T> = Result<T, QueueError>;
