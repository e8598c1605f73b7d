//! Error types for turnstile operations.

use thiserror::Error;

/// Result type alias for turnstile operations
pub type Result<T> = std::result::Result<T, TurnstileError>;

/// Error type for turnstile operations
#[derive(Error, Debug)]
pub enum TurnstileError {
    /// Invalid parameter value provided
    #[error("Invalid parameter '{parameter}': {reason}")]
    InvalidParameter {
        /// The parameter name
        parameter: String,
        /// Explanation of why it's invalid
        reason: String,
    },

    /// A stage's processing hook panicked while servicing an item
    #[error("Stage '{stage}' worker panicked while processing item #{item}: {message}")]
    WorkerPanicked {
        /// Name of the stage
        stage: String,
        /// Id of the item being processed
        item: usize,
        /// Panic payload rendered as text
        message: String,
    },

    /// A joined thread terminated by panicking
    #[error("Thread '{thread}' panicked: {message}")]
    ThreadPanicked {
        /// Name of the thread
        thread: String,
        /// Panic payload rendered as text
        message: String,
    },

    /// The operating system refused to start a thread
    #[error("Failed to spawn thread '{name}': {source}")]
    Spawn {
        /// Name of the thread
        name: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl TurnstileError {
    /// True for errors caused by invalid configuration rather than a failed run.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::InvalidParameter { .. })
    }
}

/// Render a panic payload as text.
#[must_use]
pub fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
