//! Connection factory configuration.
//!
//! Building a factory is a two step process:
//!
//! 1. [`ConnectionSettings::from_source`] reads every key under a prefix into
//!    an immutable record. Optional numeric and boolean values stay `None`
//!    when their key is absent.
//! 2. [`ConnectionFactory::new`] validates the record and applies each present
//!    value over [`ClientDefaults`]. Absent values never override a default.
//!
//! [`build_connection_factory`] does both in one call.

use crate::config::{ConfigKey, ConfigSource};
use crate::error::ConfigurationError;
use serde::{Serialize, Serializer};
use std::fmt;
use std::time::Duration;
use tracing::debug;
use url::Url;
use zeroize::Zeroizing;

#[cfg(test)]
#[path = "factory_tests.rs"]
mod tests;

/// URL schemes the broker client accepts
pub const SUPPORTED_SCHEMES: [&str; 3] = ["tcp", "ssl", "tls"];

/// Defaults used by the broker client when a parameter is not configured
pub struct ClientDefaults;

impl ClientDefaults {
    pub const CONNECTION_ATTEMPT_COUNT: u32 = 2;
    pub const CONNECTION_ATTEMPT_DELAY_MS: u32 = 500;
    pub const CONNECTION_ATTEMPT_TIMEOUT_MS: u32 = 0;
    pub const RECONNECTION_ATTEMPT_COUNT: u32 = 4;
    pub const RECONNECTION_ATTEMPT_DELAY_MS: u32 = 500;
    pub const RECONNECTION_ATTEMPT_TIMEOUT_MS: u32 = 0;
    pub const MULTICAST_ENABLED: bool = false;

    /// Default policy for the initial connection
    pub fn connection() -> AttemptPolicy {
        AttemptPolicy {
            count: Self::CONNECTION_ATTEMPT_COUNT,
            delay_ms: Self::CONNECTION_ATTEMPT_DELAY_MS,
            timeout_ms: Self::CONNECTION_ATTEMPT_TIMEOUT_MS,
        }
    }

    /// Default policy for reconnecting after a lost connection
    pub fn reconnection() -> AttemptPolicy {
        AttemptPolicy {
            count: Self::RECONNECTION_ATTEMPT_COUNT,
            delay_ms: Self::RECONNECTION_ATTEMPT_DELAY_MS,
            timeout_ms: Self::RECONNECTION_ATTEMPT_TIMEOUT_MS,
        }
    }
}

// ============================================================================
// Secrets
// ============================================================================

/// Broker user password
///
/// Zeroed on drop. Never included in Debug output, logs or serialized output.
#[derive(Clone, PartialEq, Eq)]
pub struct UserPassword(Zeroizing<String>);

impl UserPassword {
    pub fn new(value: impl Into<String>) -> Self {
        Self(Zeroizing::new(value.into()))
    }

    /// Get password as string (only for immediate use)
    pub fn expose_secret(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for UserPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UserPassword([REDACTED])")
    }
}

impl Serialize for UserPassword {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str("[REDACTED]")
    }
}

// ============================================================================
// Settings Record
// ============================================================================

/// Attempt parameters as read from configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttemptSettings {
    pub count: Option<i32>,
    pub delay_ms: Option<i32>,
    pub timeout_ms: Option<i32>,
}

/// Connection parameters as read from configuration
///
/// Strings are carried as-is: an absent key is `None`, an empty value is
/// `Some("")`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub server_url: Option<String>,
    pub client_id: Option<String>,
    pub user_name: Option<String>,
    pub user_password: Option<UserPassword>,
    pub multicast_daemon: Option<String>,
    pub multicast_enabled: Option<bool>,
    pub connection: AttemptSettings,
    pub reconnection: AttemptSettings,
}

impl ConnectionSettings {
    /// Read every connection key under `prefix`
    ///
    /// # Errors
    /// - `ConfigurationError::InvalidValue` - a present numeric or boolean value cannot be parsed
    pub fn from_source<S: ConfigSource + ?Sized>(
        source: &S,
        prefix: &str,
    ) -> Result<Self, ConfigurationError> {
        let string = |key: ConfigKey| source.get_string(&key.with_prefix(prefix));
        let int = |key: ConfigKey| source.get_int(&key.with_prefix(prefix));

        Ok(Self {
            server_url: string(ConfigKey::ServerUrl),
            client_id: string(ConfigKey::ClientId),
            user_name: string(ConfigKey::UserName),
            user_password: string(ConfigKey::UserPassword).map(UserPassword::new),
            multicast_daemon: string(ConfigKey::MulticastDaemon),
            multicast_enabled: source.get_bool(&ConfigKey::MulticastEnabled.with_prefix(prefix))?,
            connection: AttemptSettings {
                count: int(ConfigKey::ConnectionAttemptCount)?,
                delay_ms: int(ConfigKey::ConnectionAttemptDelay)?,
                timeout_ms: int(ConfigKey::ConnectionAttemptTimeout)?,
            },
            reconnection: AttemptSettings {
                count: int(ConfigKey::ReconnectionAttemptCount)?,
                delay_ms: int(ConfigKey::ReconnectionAttemptDelay)?,
                timeout_ms: int(ConfigKey::ReconnectionAttemptTimeout)?,
            },
        })
    }

    /// Set server URL
    pub fn with_server_url(mut self, server_url: impl Into<String>) -> Self {
        self.server_url = Some(server_url.into());
        self
    }

    /// Set client credentials
    pub fn with_credentials(
        mut self,
        user_name: impl Into<String>,
        user_password: impl Into<String>,
    ) -> Self {
        self.user_name = Some(user_name.into());
        self.user_password = Some(UserPassword::new(user_password));
        self
    }
}

// ============================================================================
// Connection Factory
// ============================================================================

/// Retry policy for connecting or reconnecting to the broker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AttemptPolicy {
    pub count: u32,
    pub delay_ms: u32,
    pub timeout_ms: u32,
}

impl AttemptPolicy {
    /// Delay between attempts
    pub fn delay(&self) -> Duration {
        Duration::from_millis(u64::from(self.delay_ms))
    }

    /// Timeout for a single attempt, `None` when unlimited
    pub fn timeout(&self) -> Option<Duration> {
        match self.timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(u64::from(ms))),
        }
    }

    fn apply(
        &mut self,
        settings: &AttemptSettings,
        keys: [ConfigKey; 3],
    ) -> Result<(), ConfigurationError> {
        let [count_key, delay_key, timeout_key] = keys;
        if let Some(count) = settings.count {
            self.count = non_negative(count_key, count)?;
            debug!(key = %count_key, value = count, "Applied connection parameter");
        }
        if let Some(delay) = settings.delay_ms {
            self.delay_ms = non_negative(delay_key, delay)?;
            debug!(key = %delay_key, value = delay, "Applied connection parameter");
        }
        if let Some(timeout) = settings.timeout_ms {
            self.timeout_ms = non_negative(timeout_key, timeout)?;
            debug!(key = %timeout_key, value = timeout, "Applied connection parameter");
        }
        Ok(())
    }
}

/// Reusable broker connection parameters
///
/// Immutable once constructed. Hosts use it to open connections and
/// sessions; opening them is outside this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionFactory {
    server_url: Option<String>,
    #[serde(skip)]
    server_urls: Vec<Url>,
    client_id: Option<String>,
    user_name: Option<String>,
    user_password: Option<UserPassword>,
    multicast_daemon: Option<String>,
    multicast_enabled: bool,
    connection: AttemptPolicy,
    reconnection: AttemptPolicy,
}

impl ConnectionFactory {
    /// Validate settings and apply them over the client defaults
    ///
    /// # Errors
    /// - `ConfigurationError::Invalid` - a server URL does not parse or uses an
    ///   unsupported scheme, or an attempt parameter is negative
    pub fn new(settings: ConnectionSettings) -> Result<Self, ConfigurationError> {
        let server_urls = match settings.server_url.as_deref() {
            Some(raw) => parse_server_urls(raw)?,
            None => Vec::new(),
        };

        let mut connection = ClientDefaults::connection();
        connection.apply(
            &settings.connection,
            [
                ConfigKey::ConnectionAttemptCount,
                ConfigKey::ConnectionAttemptDelay,
                ConfigKey::ConnectionAttemptTimeout,
            ],
        )?;

        let mut reconnection = ClientDefaults::reconnection();
        reconnection.apply(
            &settings.reconnection,
            [
                ConfigKey::ReconnectionAttemptCount,
                ConfigKey::ReconnectionAttemptDelay,
                ConfigKey::ReconnectionAttemptTimeout,
            ],
        )?;

        let multicast_enabled = match settings.multicast_enabled {
            Some(enabled) => {
                debug!(key = %ConfigKey::MulticastEnabled, value = enabled, "Applied connection parameter");
                enabled
            }
            None => ClientDefaults::MULTICAST_ENABLED,
        };

        Ok(Self {
            server_url: settings.server_url,
            server_urls,
            client_id: settings.client_id,
            user_name: settings.user_name,
            user_password: settings.user_password,
            multicast_daemon: settings.multicast_daemon,
            multicast_enabled,
            connection,
            reconnection,
        })
    }

    /// Server URL exactly as configured
    pub fn server_url(&self) -> Option<&str> {
        self.server_url.as_deref()
    }

    /// Parsed broker URLs, in fail-over order
    pub fn server_urls(&self) -> &[Url] {
        &self.server_urls
    }

    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    pub fn user_name(&self) -> Option<&str> {
        self.user_name.as_deref()
    }

    pub fn user_password(&self) -> Option<&UserPassword> {
        self.user_password.as_ref()
    }

    pub fn multicast_daemon(&self) -> Option<&str> {
        self.multicast_daemon.as_deref()
    }

    pub fn multicast_enabled(&self) -> bool {
        self.multicast_enabled
    }

    /// Initial connection policy
    pub fn connection(&self) -> &AttemptPolicy {
        &self.connection
    }

    /// Reconnection policy
    pub fn reconnection(&self) -> &AttemptPolicy {
        &self.reconnection
    }
}

/// Check whether a connector is configured under `prefix`
///
/// An absent, empty or whitespace-only `server-url` means "not configured",
/// not an error.
pub fn has_server_url<S: ConfigSource + ?Sized>(source: &S, prefix: &str) -> bool {
    source
        .get_string(&ConfigKey::ServerUrl.with_prefix(prefix))
        .is_some_and(|url| !url.trim().is_empty())
}

/// Build the connection factory configured under `prefix`
///
/// # Errors
/// - `ConfigurationError::InvalidValue` - a numeric or boolean value cannot be parsed
/// - `ConfigurationError::Invalid` - the factory rejects a value, see [`ConnectionFactory::new`]
pub fn build_connection_factory<S: ConfigSource + ?Sized>(
    source: &S,
    prefix: &str,
) -> Result<ConnectionFactory, ConfigurationError> {
    let settings = ConnectionSettings::from_source(source, prefix)?;
    ConnectionFactory::new(settings)
}

fn parse_server_urls(raw: &str) -> Result<Vec<Url>, ConfigurationError> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            let url = Url::parse(part).map_err(|e| ConfigurationError::Invalid {
                key: ConfigKey::ServerUrl.to_string(),
                message: format!("'{}' is not a valid URL: {}", part, e),
            })?;

            if !SUPPORTED_SCHEMES.contains(&url.scheme()) {
                return Err(ConfigurationError::Invalid {
                    key: ConfigKey::ServerUrl.to_string(),
                    message: format!(
                        "'{}' uses unsupported scheme '{}' (expected one of {})",
                        part,
                        url.scheme(),
                        SUPPORTED_SCHEMES.join(", ")
                    ),
                });
            }

            Ok(url)
        })
        .collect()
}

fn non_negative(key: ConfigKey, value: i32) -> Result<u32, ConfigurationError> {
    u32::try_from(value).map_err(|_| ConfigurationError::Invalid {
        key: key.to_string(),
        message: format!("must not be negative, got {}", value),
    })
}
