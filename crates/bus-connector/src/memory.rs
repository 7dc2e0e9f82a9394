//! In-memory broker context for testing and development.
//!
//! [`InMemoryContext`] creates [`StreamMessage`]s and records every message
//! sent to a [`Destination`], in send order. It never talks to a broker.

use crate::connector::MessageProducer;
use crate::destination::Destination;
use crate::encoder::MessageContext;
use crate::error::ConnectorError;
use crate::message::{MessageId, StreamMessage};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;

/// Thread-safe in-memory session
///
/// Clones share the same sent-message storage.
#[derive(Debug, Clone, Default)]
pub struct InMemoryContext {
    sent: Arc<RwLock<HashMap<Destination, Vec<StreamMessage>>>>,
}

impl InMemoryContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Send a message to a destination
    ///
    /// The message is closed on send; later writes to a copy fail.
    ///
    /// # Errors
    /// - `ConnectorError::MessageClosed` - the message was already sent or closed
    pub fn send(
        &self,
        destination: &Destination,
        mut message: StreamMessage,
    ) -> Result<MessageId, ConnectorError> {
        if message.is_closed() {
            return Err(ConnectorError::MessageClosed {
                message_id: message.message_id().to_string(),
            });
        }

        message.close();
        let message_id = message.message_id().clone();

        let mut sent = self.sent.write().unwrap_or_else(PoisonError::into_inner);
        sent.entry(destination.clone()).or_default().push(message);

        debug!(
            destination = %destination,
            message_id = %message_id,
            "Message sent"
        );
        Ok(message_id)
    }

    /// Messages sent to `destination`, in send order
    pub fn sent(&self, destination: &Destination) -> Vec<StreamMessage> {
        let sent = self.sent.read().unwrap_or_else(PoisonError::into_inner);
        sent.get(destination).cloned().unwrap_or_default()
    }

    /// Total number of messages sent to all destinations
    pub fn sent_count(&self) -> usize {
        let sent = self.sent.read().unwrap_or_else(PoisonError::into_inner);
        sent.values().map(Vec::len).sum()
    }
}

impl MessageContext for InMemoryContext {
    type Message = StreamMessage;

    fn create_stream_message(&self) -> StreamMessage {
        StreamMessage::new()
    }
}

impl MessageProducer for InMemoryContext {
    fn send(
        &self,
        destination: &Destination,
        message: StreamMessage,
    ) -> Result<MessageId, ConnectorError> {
        InMemoryContext::send(self, destination, message)
    }
}
