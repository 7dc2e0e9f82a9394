//! Error types for connector configuration and message writing.

use std::fmt;
use thiserror::Error;

/// Comprehensive error type for all connector operations
#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Message write failed: {0}")]
    MessageWrite(#[from] MessageWriteError),

    #[error("Encoding failed: {0}")]
    Encoding(#[from] EncodingError),

    #[error("No destination configured for connector '{prefix}'")]
    NoDestination { prefix: String },

    #[error("Message '{message_id}' is closed and cannot be sent")]
    MessageClosed { message_id: String },
}

impl ConnectorError {
    /// Check if error is transient and the caller may retry with a fresh message
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Configuration(_) => false,
            Self::MessageWrite(_) => true,
            Self::Encoding(_) => false,
            Self::NoDestination { .. } => false,
            Self::MessageClosed { .. } => false,
        }
    }
}

/// Configuration errors
///
/// Raised while reading keys from a configuration source or when the
/// connection factory rejects a value at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("Invalid configuration for '{key}': {message}")]
    Invalid { key: String, message: String },

    #[error("Invalid value '{value}' for '{key}': expected {expected}")]
    InvalidValue {
        key: String,
        value: String,
        expected: String,
    },

    #[error("Missing required configuration: {key}")]
    Missing { key: String },
}

/// Identifies which write on the structured message failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WriteOperation {
    WriteInt,
    WriteByte,
    WriteBytes,
}

impl WriteOperation {
    /// Get the operation tag carried by write failures
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WriteInt => "writeInt",
            Self::WriteByte => "writeByte",
            Self::WriteBytes => "writeBytes",
        }
    }
}

impl fmt::Display for WriteOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A write on the underlying structured message failed
#[derive(Debug, Error)]
#[error("Error writing to stream message ({operation}): {source}")]
pub struct MessageWriteError {
    operation: WriteOperation,
    #[source]
    source: FieldWriteError,
}

impl MessageWriteError {
    pub fn new(operation: WriteOperation, source: FieldWriteError) -> Self {
        Self { operation, source }
    }

    /// Get the write operation that failed
    pub fn operation(&self) -> WriteOperation {
        self.operation
    }

    /// Get the failure reported by the message
    pub fn cause(&self) -> &FieldWriteError {
        &self.source
    }
}

/// Failure reported by a structured message when a field cannot be appended
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldWriteError {
    #[error("message is closed for writing")]
    MessageClosed,

    #[error("field rejected: {reason}")]
    Rejected { reason: String },
}

/// The payload could not be serialized to JSON
#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("Error writing object as JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error while writing JSON: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
