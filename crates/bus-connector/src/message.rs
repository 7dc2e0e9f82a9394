//! Structured message model.
//!
//! A structured message accumulates typed fields in write order, the way a
//! broker "stream message" does. [`StructuredMessage`] is the write-side
//! capability the [`MessageWriter`](crate::writer::MessageWriter) adapts;
//! [`StreamMessage`] is the in-memory implementation used by
//! [`InMemoryContext`](crate::memory::InMemoryContext).

use crate::error::FieldWriteError;
use bytes::{BufMut, Bytes, BytesMut};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;

// ============================================================================
// Core Identifiers
// ============================================================================

/// Unique identifier for messages created by a context
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(String);

impl MessageId {
    /// Generate new random message ID
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get message ID as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Timestamp wrapper for consistent time handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create timestamp for current time
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Get underlying DateTime
    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

// ============================================================================
// Write Capability
// ============================================================================

/// Sequential typed field writer
///
/// Each call appends one field at the message's current write position.
/// Implementations must keep fields in call order.
#[cfg_attr(test, mockall::automock)]
pub trait StructuredMessage {
    /// Append a 32-bit integer field
    fn write_int(&mut self, value: i32) -> Result<(), FieldWriteError>;

    /// Append a single byte field
    fn write_byte(&mut self, value: u8) -> Result<(), FieldWriteError>;

    /// Append a byte array field
    fn write_bytes(&mut self, value: &[u8]) -> Result<(), FieldWriteError>;
}

/// A single typed field of a structured message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageField {
    Int(i32),
    Byte(u8),
    Bytes(Bytes),
}

impl MessageField {
    /// Number of body bytes this field contributes when read back as bytes
    pub fn byte_len(&self) -> usize {
        match self {
            Self::Int(_) => 4,
            Self::Byte(_) => 1,
            Self::Bytes(bytes) => bytes.len(),
        }
    }
}

// ============================================================================
// In-Memory Stream Message
// ============================================================================

/// In-memory structured message
///
/// Fields are stored exactly as written. Once [`close`](Self::close) is
/// called the message is read-only and every write fails with
/// [`FieldWriteError::MessageClosed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamMessage {
    message_id: MessageId,
    created_at: Timestamp,
    fields: Vec<MessageField>,
    closed: bool,
}

impl StreamMessage {
    /// Create an empty, writable message
    pub fn new() -> Self {
        Self {
            message_id: MessageId::new(),
            created_at: Timestamp::now(),
            fields: Vec::new(),
            closed: false,
        }
    }

    pub fn message_id(&self) -> &MessageId {
        &self.message_id
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Fields in write order
    pub fn fields(&self) -> &[MessageField] {
        &self.fields
    }

    /// Mark message read-only
    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Read the message body back as bytes
    ///
    /// Concatenates all fields in write order; integer fields contribute
    /// their four big-endian bytes.
    pub fn read_bytes(&self) -> Bytes {
        let capacity = self.fields.iter().map(MessageField::byte_len).sum();
        let mut body = BytesMut::with_capacity(capacity);

        for field in &self.fields {
            match field {
                MessageField::Int(value) => body.put_i32(*value),
                MessageField::Byte(value) => body.put_u8(*value),
                MessageField::Bytes(bytes) => body.put_slice(bytes),
            }
        }

        body.freeze()
    }

    fn append(&mut self, field: MessageField) -> Result<(), FieldWriteError> {
        if self.closed {
            return Err(FieldWriteError::MessageClosed);
        }
        self.fields.push(field);
        Ok(())
    }
}

impl Default for StreamMessage {
    fn default() -> Self {
        Self::new()
    }
}

impl StructuredMessage for StreamMessage {
    fn write_int(&mut self, value: i32) -> Result<(), FieldWriteError> {
        self.append(MessageField::Int(value))
    }

    fn write_byte(&mut self, value: u8) -> Result<(), FieldWriteError> {
        self.append(MessageField::Byte(value))
    }

    fn write_bytes(&mut self, value: &[u8]) -> Result<(), FieldWriteError> {
        self.append(MessageField::Bytes(Bytes::copy_from_slice(value)))
    }
}
