//! Configuration sources and the connector key space.
//!
//! Connector settings are read from a flat key space. Every key is the
//! concatenation of a caller-supplied prefix and one of the [`ConfigKey`]
//! suffixes, so several connectors can share one configuration namespace:
//!
//! ```text
//! audit.server-url = tcp://broker:7222
//! audit.queue      = audit-events
//! login.server-url = tcp://broker:7222
//! login.topic      = login-events
//! ```
//!
//! Two sources are supported and produce identical results for equivalent
//! inputs:
//! - [`PropertyMap`] - a flat string-to-string map, typically parsed from a
//!   properties file
//! - [`config::Config`] - a scoped accessor with native integer and boolean
//!   getters, as provided by a host application

use crate::error::ConfigurationError;
use std::collections::HashMap;
use std::fmt;

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

// ============================================================================
// Key Space
// ============================================================================

/// Key suffixes understood by the connector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    ServerUrl,
    ClientId,
    UserName,
    UserPassword,
    MulticastDaemon,
    MulticastEnabled,
    ConnectionAttemptCount,
    ConnectionAttemptDelay,
    ConnectionAttemptTimeout,
    ReconnectionAttemptCount,
    ReconnectionAttemptDelay,
    ReconnectionAttemptTimeout,
    Queue,
    Topic,
}

impl ConfigKey {
    /// Every key, in documentation order
    pub const ALL: [ConfigKey; 14] = [
        Self::ServerUrl,
        Self::ClientId,
        Self::UserName,
        Self::UserPassword,
        Self::MulticastDaemon,
        Self::MulticastEnabled,
        Self::ConnectionAttemptCount,
        Self::ConnectionAttemptDelay,
        Self::ConnectionAttemptTimeout,
        Self::ReconnectionAttemptCount,
        Self::ReconnectionAttemptDelay,
        Self::ReconnectionAttemptTimeout,
        Self::Queue,
        Self::Topic,
    ];

    /// Get the key suffix as written in configuration
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::ServerUrl => "server-url",
            Self::ClientId => "client-id",
            Self::UserName => "user-name",
            Self::UserPassword => "user-password",
            Self::MulticastDaemon => "multicast-daemon",
            Self::MulticastEnabled => "multicast-enabled",
            Self::ConnectionAttemptCount => "connection-attempt-count",
            Self::ConnectionAttemptDelay => "connection-attempt-delay",
            Self::ConnectionAttemptTimeout => "connection-attempt-timeout",
            Self::ReconnectionAttemptCount => "reconnection-attempt-count",
            Self::ReconnectionAttemptDelay => "reconnection-attempt-delay",
            Self::ReconnectionAttemptTimeout => "reconnection-attempt-timeout",
            Self::Queue => "queue",
            Self::Topic => "topic",
        }
    }

    /// Build the full key for a connector prefix
    pub fn with_prefix(&self, prefix: &str) -> String {
        format!("{}{}", prefix, self.suffix())
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

// ============================================================================
// Configuration Source
// ============================================================================

/// Read-only access to connector configuration values
///
/// Every getter distinguishes an absent key (`None`) from a present value.
/// Empty strings are returned as-is by [`get_string`](Self::get_string) but
/// count as absent for the typed getters.
pub trait ConfigSource {
    /// Get a string value
    fn get_string(&self, key: &str) -> Option<String>;

    /// Get an integer value
    ///
    /// # Errors
    /// - `ConfigurationError::InvalidValue` - value is present but not an integer
    fn get_int(&self, key: &str) -> Result<Option<i32>, ConfigurationError>;

    /// Get a boolean value
    ///
    /// # Errors
    /// - `ConfigurationError::InvalidValue` - value is present but not a boolean
    fn get_bool(&self, key: &str) -> Result<Option<bool>, ConfigurationError>;
}

impl<T: ConfigSource + ?Sized> ConfigSource for &T {
    fn get_string(&self, key: &str) -> Option<String> {
        (**self).get_string(key)
    }

    fn get_int(&self, key: &str) -> Result<Option<i32>, ConfigurationError> {
        (**self).get_int(key)
    }

    fn get_bool(&self, key: &str) -> Result<Option<bool>, ConfigurationError> {
        (**self).get_bool(key)
    }
}

// ============================================================================
// Flat Property Map
// ============================================================================

/// Flat string-keyed property map
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyMap {
    properties: HashMap<String, String>,
}

impl PropertyMap {
    /// Create an empty property map
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse Java properties text
    ///
    /// Follows the `java.util.Properties` line format:
    /// - blank lines and lines whose first non-blank character is `#` or `!`
    ///   are ignored
    /// - the key runs to the first unescaped `=`, `:` or whitespace; blanks
    ///   and at most one `=` or `:` after it are skipped, the rest is the value
    /// - a line ending in an odd number of backslashes continues on the next
    ///   line, whose leading whitespace is dropped
    /// - `\t`, `\n`, `\r`, `\f`, `\uXXXX` and `\<char>` escapes are decoded
    ///
    /// A line holding only a key defines it with an empty value. Later
    /// definitions win. A malformed `\u` escape is kept as written.
    pub fn parse(text: &str) -> Self {
        let mut properties = HashMap::new();
        let mut lines = text.lines();

        while let Some(line) = lines.next() {
            let line = line.trim_start_matches(PROPERTY_BLANKS);
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }

            let mut logical = line.to_string();
            while continues_on_next_line(&logical) {
                logical.pop();
                match lines.next() {
                    Some(next) => logical.push_str(next.trim_start_matches(PROPERTY_BLANKS)),
                    None => break,
                }
            }

            let (key, value) = split_property(&logical);
            properties.insert(unescape_property(key), unescape_property(value));
        }

        Self { properties }
    }

    /// Set a property, replacing any previous value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.properties.insert(key.into(), value.into())
    }

    /// Set a property (builder style)
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Get raw property value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Number of properties
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Check if map has no properties
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl From<HashMap<String, String>> for PropertyMap {
    fn from(properties: HashMap<String, String>) -> Self {
        Self { properties }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PropertyMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            properties: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl ConfigSource for PropertyMap {
    fn get_string(&self, key: &str) -> Option<String> {
        self.properties.get(key).cloned()
    }

    fn get_int(&self, key: &str) -> Result<Option<i32>, ConfigurationError> {
        match self.properties.get(key) {
            Some(raw) => parse_int(key, raw),
            None => Ok(None),
        }
    }

    fn get_bool(&self, key: &str) -> Result<Option<bool>, ConfigurationError> {
        match self.properties.get(key) {
            Some(raw) => parse_bool(key, raw),
            None => Ok(None),
        }
    }
}

const PROPERTY_BLANKS: [char; 3] = [' ', '\t', '\x0c'];

fn continues_on_next_line(line: &str) -> bool {
    line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

/// Split a logical properties line into raw (still escaped) key and value
fn split_property(line: &str) -> (&str, &str) {
    let mut key_end = line.len();
    let mut escaped = false;

    for (index, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' | ' ' | '\t' | '\x0c' => {
                key_end = index;
                break;
            }
            _ => {}
        }
    }

    let rest = line[key_end..].trim_start_matches(PROPERTY_BLANKS);
    let rest = rest.strip_prefix(['=', ':']).unwrap_or(rest);
    (&line[..key_end], rest.trim_start_matches(PROPERTY_BLANKS))
}

fn unescape_property(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\x0c'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let decoded = u32::from_str_radix(&hex, 16)
                    .ok()
                    .filter(|_| hex.len() == 4)
                    .and_then(char::from_u32);
                match decoded {
                    Some(ch) => out.push(ch),
                    None => {
                        out.push_str("\\u");
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }

    out
}

// ============================================================================
// Scoped Accessor (config crate)
// ============================================================================

// Environment variables cannot carry `-`, so `config::Environment` yields
// `server_url` where the key space says `server-url`. The kebab-case key is
// preferred; the snake_case spelling is the fallback.
impl ConfigSource for config::Config {
    fn get_string(&self, key: &str) -> Option<String> {
        let key = resolve_key(self, key);
        config::Config::get_string(self, &key).ok()
    }

    fn get_int(&self, key: &str) -> Result<Option<i32>, ConfigurationError> {
        let key = resolve_key(self, key);
        let key = key.as_str();
        if is_blank(self, key) {
            return Ok(None);
        }

        match config::Config::get_int(self, key) {
            Ok(value) => i32::try_from(value).map(Some).map_err(|_| {
                ConfigurationError::InvalidValue {
                    key: key.to_string(),
                    value: value.to_string(),
                    expected: "a 32-bit integer".to_string(),
                }
            }),
            Err(config::ConfigError::NotFound(_)) => Ok(None),
            Err(e) => Err(ConfigurationError::InvalidValue {
                key: key.to_string(),
                value: raw_value(self, key),
                expected: format!("an integer ({})", e),
            }),
        }
    }

    fn get_bool(&self, key: &str) -> Result<Option<bool>, ConfigurationError> {
        let key = resolve_key(self, key);
        let key = key.as_str();
        if is_blank(self, key) {
            return Ok(None);
        }

        match config::Config::get_bool(self, key) {
            Ok(value) => Ok(Some(value)),
            Err(config::ConfigError::NotFound(_)) => Ok(None),
            Err(e) => Err(ConfigurationError::InvalidValue {
                key: key.to_string(),
                value: raw_value(self, key),
                expected: format!("a boolean ({})", e),
            }),
        }
    }
}

fn resolve_key(config: &config::Config, key: &str) -> String {
    if key.contains('-') && is_missing(config, key) {
        let snake = key.replace('-', "_");
        if !is_missing(config, &snake) {
            return snake;
        }
    }
    key.to_string()
}

fn is_missing(config: &config::Config, key: &str) -> bool {
    matches!(
        config::Config::get_string(config, key),
        Err(config::ConfigError::NotFound(_))
    )
}

fn is_blank(config: &config::Config, key: &str) -> bool {
    matches!(config::Config::get_string(config, key), Ok(value) if value.trim().is_empty())
}

fn raw_value(config: &config::Config, key: &str) -> String {
    config::Config::get_string(config, key).unwrap_or_default()
}

// ============================================================================
// Value Parsing
// ============================================================================

fn parse_int(key: &str, raw: &str) -> Result<Option<i32>, ConfigurationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    trimmed
        .parse::<i32>()
        .map(Some)
        .map_err(|_| ConfigurationError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
            expected: "an integer".to_string(),
        })
}

fn parse_bool(key: &str, raw: &str) -> Result<Option<bool>, ConfigurationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    if trimmed.eq_ignore_ascii_case("true") {
        Ok(Some(true))
    } else if trimmed.eq_ignore_ascii_case("false") {
        Ok(Some(false))
    } else {
        Err(ConfigurationError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
            expected: "true or false".to_string(),
        })
    }
}
