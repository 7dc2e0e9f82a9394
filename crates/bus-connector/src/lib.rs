//! # Bus Connector
//!
//! Configures a message bus client from key-value configuration and writes
//! JSON payloads into broker messages.
//!
//! This library provides:
//! - Connection factory parameters read from a prefixed key space
//! - Queue or topic destination resolution
//! - A `std::io::Write` adapter over structured (typed-field) messages
//! - JSON encoding that omits empty fields
//!
//! ## Module Organization
//!
//! - [`config`] - Configuration sources and the connector key space
//! - [`factory`] - Connection factory settings and construction
//! - [`destination`] - Queue/topic destination resolution
//! - [`message`] - Structured message capability and in-memory message
//! - [`writer`] - Byte-sink adapter over a structured message
//! - [`encoder`] - JSON message encoding
//! - [`omit_empty`] - Serialization that leaves empty object entries out
//! - [`connector`] - Factory and destination bundled per prefix
//! - [`memory`] - In-memory session for tests and tooling
//! - [`error`] - Error types for all connector operations
//!
//! ## Example
//!
//! ```
//! use bus_connector::{Connector, Destination, InMemoryContext, PropertyMap};
//!
//! let properties = PropertyMap::parse(
//!     "events.server-url=tcp://broker:7222\nevents.queue=orders\n",
//! );
//!
//! let connector = Connector::from_source(&properties, "events.")
//!     .unwrap()
//!     .expect("connector is configured");
//!
//! let context = InMemoryContext::new();
//! connector
//!     .publish(&context, &serde_json::json!({"type": "LOGIN"}))
//!     .unwrap();
//!
//! let sent = context.sent(&Destination::Queue("orders".to_string()));
//! assert_eq!(sent[0].read_bytes().as_ref(), br#"{"type":"LOGIN"}"#);
//! ```

// Module declarations
pub mod config;
pub mod connector;
pub mod destination;
pub mod encoder;
pub mod error;
pub mod factory;
pub mod memory;
pub mod message;
pub mod omit_empty;
pub mod writer;

// Re-export commonly used types at crate root for convenience
pub use crate::config::{ConfigKey, ConfigSource, PropertyMap};
pub use crate::connector::{Connector, MessageProducer};
pub use crate::destination::{build_destination, Destination};
pub use crate::encoder::{JsonMessageEncoder, MessageContext};
pub use crate::error::{
    ConfigurationError, ConnectorError, EncodingError, FieldWriteError, MessageWriteError,
    WriteOperation,
};
pub use crate::factory::{
    build_connection_factory, has_server_url, AttemptPolicy, ClientDefaults, ConnectionFactory,
    ConnectionSettings, UserPassword,
};
pub use crate::memory::InMemoryContext;
pub use crate::message::{MessageField, MessageId, StreamMessage, StructuredMessage, Timestamp};
pub use crate::omit_empty::OmitEmpty;
pub use crate::writer::MessageWriter;
