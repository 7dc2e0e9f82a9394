//! JSON message encoding.
//!
//! [`JsonMessageEncoder`] creates a message through a [`MessageContext`],
//! wraps it in a [`MessageWriter`] and serializes the payload straight into
//! it. Empty values are left out of every JSON object.
//!
//! Failures keep their origin: a payload that cannot be represented as JSON
//! is an [`EncodingError`], a message that refuses bytes is a
//! [`MessageWriteError`](crate::error::MessageWriteError).

use crate::error::{ConnectorError, EncodingError};
use crate::message::StructuredMessage;
use crate::omit_empty::OmitEmpty;
use crate::writer::{take_write_error, MessageWriter};
use serde::Serialize;
use std::io;
use tracing::debug;

#[cfg(test)]
#[path = "encoder_tests.rs"]
mod tests;

/// Creates structured messages for a session
///
/// Implemented by the host's session handle. The returned message belongs to
/// the caller, who addresses and sends it.
pub trait MessageContext {
    type Message: StructuredMessage;

    /// Create a new, empty structured message
    fn create_stream_message(&self) -> Self::Message;
}

/// Serializes values as JSON into structured messages
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonMessageEncoder;

impl JsonMessageEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Encode `value` into a new message created by `context`
    ///
    /// # Errors
    /// - `ConnectorError::Encoding` - `value` cannot be serialized to JSON
    /// - `ConnectorError::MessageWrite` - the message rejected a write
    pub fn encode<C, T>(&self, context: &C, value: &T) -> Result<C::Message, ConnectorError>
    where
        C: MessageContext + ?Sized,
        T: Serialize + ?Sized,
    {
        let mut message = context.create_stream_message();
        self.encode_into(&mut message, value)?;
        Ok(message)
    }

    /// Encode `value` into an existing message
    ///
    /// Bytes reach the message as the serializer produces them. Object keys
    /// keep the order in which `value` serializes them.
    pub fn encode_into<M, T>(&self, message: &mut M, value: &T) -> Result<(), ConnectorError>
    where
        M: StructuredMessage + ?Sized,
        T: Serialize + ?Sized,
    {
        let mut writer = MessageWriter::new(message);
        serde_json::to_writer(&mut writer, &OmitEmpty(value)).map_err(classify_write_failure)?;
        writer.close();

        debug!("Encoded JSON payload into message");
        Ok(())
    }
}

fn classify_write_failure(error: serde_json::Error) -> ConnectorError {
    if !error.is_io() {
        return EncodingError::from(error).into();
    }

    match take_write_error(io::Error::from(error)) {
        Ok(write_error) => write_error.into(),
        Err(other) => EncodingError::from(other).into(),
    }
}
