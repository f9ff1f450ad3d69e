use thiserror::Error;

/// Common error types used across the relay.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport error during {operation}: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("Unexpected status {status} during {operation}")]
    Protocol { operation: &'static str, status: u16 },

    #[error("Decode error during {operation}: {message}")]
    Decode {
        operation: &'static str,
        message: String,
    },

    #[error("Cancelled during {operation}")]
    Cancelled { operation: &'static str },
}

impl RelayError {
    /// Whether the failed operation may succeed if attempted again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RelayError::Transport { .. } | RelayError::Protocol { .. } | RelayError::Decode { .. }
        )
    }

    /// HTTP status carried by a protocol error.
    pub fn status(&self) -> Option<u16> {
        match self {
            RelayError::Protocol { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn transport(operation: &'static str, source: reqwest::Error) -> Self {
        RelayError::Transport { operation, source }
    }

    pub fn decode(operation: &'static str, message: impl Into<String>) -> Self {
        RelayError::Decode {
            operation,
            message: message.into(),
        }
    }
}
