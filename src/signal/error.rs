//! Signal Error Types

/// Default rejection reason carried by a [`Deferred`](super::Deferred)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignalError {
    #[error("Signal rejected: {reason}")]
    Rejected { reason: String },
}

impl SignalError {
    pub fn rejected(reason: impl Into<String>) -> Self {
        SignalError::Rejected {
            reason: reason.into(),
        }
    }
}
