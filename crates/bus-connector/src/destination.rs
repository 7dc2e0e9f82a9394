//! Destination resolution.

use crate::config::{ConfigKey, ConfigSource};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

#[cfg(test)]
#[path = "destination_tests.rs"]
mod tests;

/// Named queue or topic a message is addressed to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "lowercase")]
pub enum Destination {
    /// Point-to-point queue
    Queue(String),
    /// Publish/subscribe topic
    Topic(String),
}

impl Destination {
    /// Get the destination address
    pub fn name(&self) -> &str {
        match self {
            Self::Queue(name) | Self::Topic(name) => name,
        }
    }

    pub fn is_queue(&self) -> bool {
        matches!(self, Self::Queue(_))
    }

    pub fn is_topic(&self) -> bool {
        matches!(self, Self::Topic(_))
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Queue(name) => write!(f, "queue://{}", name),
            Self::Topic(name) => write!(f, "topic://{}", name),
        }
    }
}

/// Resolve the destination configured under `prefix`
///
/// A non-empty `queue` address wins, whatever `topic` says. Otherwise a
/// non-empty `topic` address is used. `None` means publishing is disabled
/// for this connector.
pub fn build_destination<S: ConfigSource + ?Sized>(source: &S, prefix: &str) -> Option<Destination> {
    let destination = non_empty(source, &ConfigKey::Queue.with_prefix(prefix))
        .map(Destination::Queue)
        .or_else(|| non_empty(source, &ConfigKey::Topic.with_prefix(prefix)).map(Destination::Topic));

    match &destination {
        Some(destination) => debug!(prefix = %prefix, destination = %destination, "Resolved destination"),
        None => debug!(prefix = %prefix, "No destination configured"),
    }

    destination
}

fn non_empty<S: ConfigSource + ?Sized>(source: &S, key: &str) -> Option<String> {
    source.get_string(key).filter(|value| !value.is_empty())
}
