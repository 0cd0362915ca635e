//! Errors surfaced by the relay binary

use crate::core::logging::LoggingError;
use crate::queue::api::QueueError;
use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("The specified configuration file does not exist: {}", .path.display())]
    ConfigMissing { path: PathBuf },

    #[error("Error reading configuration file {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Error parsing configuration file {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error(transparent)]
    Logging(#[from] LoggingError),

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Relay task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl AppError {
    /// True when the user can fix the problem by changing arguments or config
    pub fn is_user_actionable(&self) -> bool {
        matches!(
            self,
            AppError::ConfigMissing { .. }
                | AppError::ConfigParse { .. }
                | AppError::Invalid(_)
                | AppError::Logging(LoggingError::UnknownFormat(_))
        )
    }

    /// Process exit code: 2 for usage and configuration problems, 1 otherwise
    pub fn exit_code(&self) -> u8 {
        if self.is_user_actionable() {
            2
        } else {
            1
        }
    }
}
