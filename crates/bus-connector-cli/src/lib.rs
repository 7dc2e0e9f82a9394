//! # Bus Connector CLI
//!
//! Command-line interface for checking connector configuration and encoding
//! payloads the way a host publishes them.
//!
//! Commands:
//! - `check` - show whether a prefix is configured and what it resolves to
//! - `encode` - encode a JSON document into a message and print its body

use bus_connector::{
    ConfigSource, ConfigurationError, ConnectionFactory, Connector, ConnectorError, Destination,
    InMemoryContext, JsonMessageEncoder, PropertyMap,
};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

// ============================================================================
// CLI Structure
// ============================================================================

/// Bus connector CLI - message bus configuration and JSON encoding
#[derive(Parser)]
#[command(name = "bus-connector")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Check message bus connector configuration and encode JSON messages")]
pub struct Cli {
    /// Configuration file path (any format the config crate reads)
    #[arg(short, long, env = "BUS_CONNECTOR_CONFIG", conflicts_with = "properties")]
    pub config: Option<PathBuf>,

    /// Flat properties file (key=value lines)
    #[arg(short, long)]
    pub properties: Option<PathBuf>,

    /// Key prefix of the connector, e.g. "events."
    #[arg(long, default_value = "")]
    pub prefix: String,

    /// Logging level
    #[arg(short, long, default_value = "info")]
    pub log_level: String,

    /// Enable JSON logging
    #[arg(long)]
    pub json_logs: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Show the resolved connection factory and destination
    Check {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Encode a JSON document into a message and print the message body
    Encode {
        /// Input file, or "-" for standard input
        #[arg(short, long, default_value = "-")]
        input: String,
    },
}

/// Output formats for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Yaml,
}

// ============================================================================
// Error Types
// ============================================================================

/// CLI-specific errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error(transparent)]
    Connector(#[from] ConnectorError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid argument: {arg} - {message}")]
    InvalidArgument { arg: String, message: String },
}

impl CliError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Configuration { .. } => 1,
            Self::Connector(ConnectorError::Configuration(_)) => 1,
            Self::Connector(ConnectorError::NoDestination { .. }) => 1,
            Self::Connector(ConnectorError::Encoding(_)) => 2,
            Self::Connector(ConnectorError::MessageWrite(_)) => 3,
            Self::Connector(ConnectorError::MessageClosed { .. }) => 3,
            Self::Io(_) => 4,
            Self::InvalidArgument { .. } => 5,
        }
    }
}

impl From<config::ConfigError> for CliError {
    fn from(error: config::ConfigError) -> Self {
        Self::Configuration {
            message: error.to_string(),
        }
    }
}

// ============================================================================
// Configuration Loading
// ============================================================================

/// Configuration loaded for the CLI
pub enum LoadedSource {
    Properties(PropertyMap),
    Scoped(config::Config),
}

impl ConfigSource for LoadedSource {
    fn get_string(&self, key: &str) -> Option<String> {
        match self {
            Self::Properties(map) => map.get_string(key),
            Self::Scoped(config) => ConfigSource::get_string(config, key),
        }
    }

    fn get_int(&self, key: &str) -> Result<Option<i32>, ConfigurationError> {
        match self {
            Self::Properties(map) => map.get_int(key),
            Self::Scoped(config) => ConfigSource::get_int(config, key),
        }
    }

    fn get_bool(&self, key: &str) -> Result<Option<bool>, ConfigurationError> {
        match self {
            Self::Properties(map) => map.get_bool(key),
            Self::Scoped(config) => ConfigSource::get_bool(config, key),
        }
    }
}

/// Load configuration from the sources named on the command line
///
/// A properties file is used on its own. Otherwise the optional
/// configuration file is layered under environment variables prefixed
/// `BUS_CONNECTOR` (double-underscore separator), see [`environment`].
pub fn load_source(cli: &Cli) -> Result<LoadedSource, CliError> {
    if let Some(path) = &cli.properties {
        let text = std::fs::read_to_string(path)?;
        let properties = PropertyMap::parse(&text);
        info!(path = %path.display(), count = properties.len(), "Loaded properties file");
        return Ok(LoadedSource::Properties(properties));
    }

    let mut builder = config::Config::builder();
    if let Some(path) = &cli.config {
        builder = builder.add_source(config::File::from(path.as_path()).required(true));
        info!(path = %path.display(), "Loading configuration file");
    }

    let config = builder
        .add_source(environment())
        .build()?;

    Ok(LoadedSource::Scoped(config))
}

/// Environment variable layer
///
/// `BUS_CONNECTOR__EVENTS__SERVER_URL` becomes the key `events.server_url`,
/// which the scoped accessor resolves for `events.server-url`.
pub fn environment() -> config::Environment {
    config::Environment::with_prefix("BUS_CONNECTOR").separator("__")
}

// ============================================================================
// Reports
// ============================================================================

/// Result of the `check` command
#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub prefix: String,
    pub configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub factory: Option<ConnectionFactory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<Destination>,
}

impl CheckReport {
    /// Build the report for `prefix`
    pub fn from_source<S: ConfigSource + ?Sized>(
        source: &S,
        prefix: &str,
    ) -> Result<Self, CliError> {
        let connector = Connector::from_source(source, prefix)?;

        Ok(match connector {
            Some(connector) => Self {
                prefix: prefix.to_string(),
                configured: true,
                factory: Some(connector.factory().clone()),
                destination: connector.destination().cloned(),
            },
            None => Self {
                prefix: prefix.to_string(),
                configured: false,
                factory: None,
                destination: None,
            },
        })
    }

    /// Render the report
    pub fn render(&self, format: OutputFormat) -> Result<String, CliError> {
        match format {
            OutputFormat::Text => Ok(self.render_text()),
            OutputFormat::Json => {
                serde_json::to_string_pretty(self).map_err(|e| CliError::InvalidArgument {
                    arg: "format".to_string(),
                    message: e.to_string(),
                })
            }
            OutputFormat::Yaml => {
                serde_yaml::to_string(self).map_err(|e| CliError::InvalidArgument {
                    arg: "format".to_string(),
                    message: e.to_string(),
                })
            }
        }
    }

    fn render_text(&self) -> String {
        let label = if self.prefix.is_empty() {
            "(no prefix)"
        } else {
            self.prefix.as_str()
        };

        let factory = match &self.factory {
            Some(factory) => factory,
            None => return format!("Connector {}: not configured\n", label),
        };

        let mut out = format!("Connector {}: configured\n", label);
        out.push_str(&format!(
            "  server-url:         {}\n",
            factory.server_url().unwrap_or_default()
        ));
        if let Some(client_id) = factory.client_id() {
            out.push_str(&format!("  client-id:          {}\n", client_id));
        }
        if let Some(user_name) = factory.user_name() {
            out.push_str(&format!("  user-name:          {}\n", user_name));
        }
        if factory.user_password().is_some() {
            out.push_str("  user-password:      [REDACTED]\n");
        }
        if let Some(daemon) = factory.multicast_daemon() {
            out.push_str(&format!("  multicast-daemon:   {}\n", daemon));
        }
        out.push_str(&format!(
            "  multicast-enabled:  {}\n",
            factory.multicast_enabled()
        ));

        let connection = factory.connection();
        out.push_str(&format!(
            "  connection:         count={} delay={}ms timeout={}ms\n",
            connection.count, connection.delay_ms, connection.timeout_ms
        ));
        let reconnection = factory.reconnection();
        out.push_str(&format!(
            "  reconnection:       count={} delay={}ms timeout={}ms\n",
            reconnection.count, reconnection.delay_ms, reconnection.timeout_ms
        ));

        match &self.destination {
            Some(destination) => out.push_str(&format!("  destination:        {}\n", destination)),
            None => out.push_str("  destination:        none (publishing disabled)\n"),
        }

        out
    }
}

/// Encode a JSON document into a message body
pub fn encode_document(document: &str) -> Result<Vec<u8>, CliError> {
    let value: serde_json::Value =
        serde_json::from_str(document).map_err(|e| CliError::InvalidArgument {
            arg: "input".to_string(),
            message: format!("not a JSON document: {}", e),
        })?;

    let context = InMemoryContext::new();
    let message = JsonMessageEncoder::new().encode(&context, &value)?;
    debug!(message_id = %message.message_id(), fields = message.fields().len(), "Encoded message");

    Ok(message.read_bytes().to_vec())
}

// ============================================================================
// Command Execution
// ============================================================================

/// Main CLI entry point
pub fn run_cli() -> Result<(), CliError> {
    let cli = Cli::parse();
    initialize_logging(&cli);
    run(&cli)
}

/// Execute a parsed command line
pub fn run(cli: &Cli) -> Result<(), CliError> {
    match &cli.command {
        Commands::Check { format } => execute_check_command(cli, *format),
        Commands::Encode { input } => execute_encode_command(input),
    }
}

fn initialize_logging(cli: &Cli) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);

    // Logging stays on stderr so command output on stdout is not mixed with it
    let _ = if cli.json_logs {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

fn execute_check_command(cli: &Cli, format: OutputFormat) -> Result<(), CliError> {
    let source = load_source(cli)?;
    let report = CheckReport::from_source(&source, &cli.prefix)?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(report.render(format)?.as_bytes())?;
    if format != OutputFormat::Text {
        stdout.write_all(b"\n")?;
    }
    Ok(())
}

fn execute_encode_command(input: &str) -> Result<(), CliError> {
    let document = read_input(input)?;
    let body = encode_document(&document)?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(&body)?;
    stdout.write_all(b"\n")?;
    Ok(())
}

fn read_input(input: &str) -> Result<String, CliError> {
    if input == "-" {
        let mut document = String::new();
        io::stdin().read_to_string(&mut document)?;
        return Ok(document);
    }

    Ok(std::fs::read_to_string(Path::new(input))?)
}
