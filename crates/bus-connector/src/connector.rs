//! A connector bundles everything configured under one prefix.

use crate::config::ConfigSource;
use crate::destination::{build_destination, Destination};
use crate::encoder::{JsonMessageEncoder, MessageContext};
use crate::error::ConnectorError;
use crate::factory::{build_connection_factory, has_server_url, ConnectionFactory};
use crate::message::MessageId;
use serde::Serialize;
use tracing::{info, warn};

#[cfg(test)]
#[path = "connector_tests.rs"]
mod tests;

/// Session that can send the messages it creates
pub trait MessageProducer: MessageContext {
    /// Send a message to a destination
    fn send(
        &self,
        destination: &Destination,
        message: Self::Message,
    ) -> Result<MessageId, ConnectorError>;
}

/// Connection factory and destination resolved from one prefix
#[derive(Debug, Clone)]
pub struct Connector {
    prefix: String,
    factory: ConnectionFactory,
    destination: Option<Destination>,
    encoder: JsonMessageEncoder,
}

impl Connector {
    /// Load the connector configured under `prefix`
    ///
    /// Returns `Ok(None)` when no `server-url` is configured for the prefix.
    ///
    /// # Errors
    /// - `ConnectorError::Configuration` - the factory configuration is invalid
    pub fn from_source<S: ConfigSource + ?Sized>(
        source: &S,
        prefix: &str,
    ) -> Result<Option<Self>, ConnectorError> {
        if !has_server_url(source, prefix) {
            warn!(prefix = %prefix, "Connector not configured: no server URL");
            return Ok(None);
        }

        let factory = build_connection_factory(source, prefix)?;
        let destination = build_destination(source, prefix);

        info!(
            prefix = %prefix,
            server_url = factory.server_url().unwrap_or_default(),
            destination = ?destination.as_ref().map(ToString::to_string),
            "Connector configured"
        );

        Ok(Some(Self {
            prefix: prefix.to_string(),
            factory,
            destination,
            encoder: JsonMessageEncoder::new(),
        }))
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn factory(&self) -> &ConnectionFactory {
        &self.factory
    }

    /// Configured destination; `None` disables publishing
    pub fn destination(&self) -> Option<&Destination> {
        self.destination.as_ref()
    }

    /// Encode `value` as JSON and send it to the configured destination
    ///
    /// # Errors
    /// - `ConnectorError::NoDestination` - no queue or topic is configured;
    ///   no message is created
    /// - `ConnectorError::Encoding` / `ConnectorError::MessageWrite` - see
    ///   [`JsonMessageEncoder::encode`]
    /// - any error returned by the producer's send
    pub fn publish<P, T>(&self, producer: &P, value: &T) -> Result<MessageId, ConnectorError>
    where
        P: MessageProducer + ?Sized,
        T: Serialize + ?Sized,
    {
        let destination = self
            .destination
            .as_ref()
            .ok_or_else(|| ConnectorError::NoDestination {
                prefix: self.prefix.clone(),
            })?;

        let message = self.encoder.encode(producer, value)?;
        producer.send(destination, message)
    }
}
