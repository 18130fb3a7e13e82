//! Configuration structures for the locker wall simulator
//!
//! This module contains the fleet configuration structure, its layered loading
//! (defaults, JSON file, command line, environment) and validation logic.

use super::Tenant;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Default MQTT broker port
pub const DEFAULT_MQTT_PORT: u16 = 1883;

/// Largest change threshold whose doubled upper bound still fits a `u32`
pub const MAX_CHANGE_AT: u32 = u32::MAX / 2;

/// Characters that are not allowed in a topic a client publishes to
const TOPIC_WILDCARDS: [char; 2] = ['+', '#'];

/// Characters that would split a device name across payload fields or lines
const NAME_SEPARATORS: [char; 3] = [',', '\r', '\n'];

/// Command line arguments structure
#[derive(Debug, Clone, Parser)]
#[command(
    name = "locker-wall-simulator",
    version,
    about = "Locker Wall Simulator - Publishes synthetic locker door telemetry over MQTT",
    long_about = "Simulates a fleet of locker walls. Every wall alternates between two door patterns and publishes one status message per tick to <tenant>/status.

EXAMPLES:
    # Run 1000 walls against the broker from the environment
    MQTT_URL=tcp://localhost:1883 locker-wall-simulator

    # Smaller fleet, faster ticks, printed instead of published
    locker-wall-simulator --device-count 10 --tick-interval-ms 200 --stdout

    # Use a configuration file
    locker-wall-simulator --config fleet.json

    # Generate configuration template
    locker-wall-simulator --print-config > fleet.json

    # Validate configuration without running
    locker-wall-simulator --config fleet.json --dry-run

CONFIGURATION:
    Configuration can be provided via:
    1. Command line arguments and MQTT_* environment variables (highest priority)
    2. Configuration file (--config flag)
    3. Default values (lowest priority)

    Supported configuration file formats: JSON (.json)"
)]
pub struct CliArgs {
    /// Configuration file path (JSON format)
    #[arg(
        short,
        long,
        help = "Configuration file path (JSON format)",
        long_help = "Path to a JSON configuration file. CLI arguments will override file settings."
    )]
    pub config: Option<String>,

    /// Number of locker walls to simulate
    #[arg(
        long,
        help = "Number of locker walls to simulate",
        long_help = "Number of locker walls in the fleet. Must be greater than 0. Default: 1000"
    )]
    pub device_count: Option<usize>,

    /// Cycle count at which a wall switches to the rising door pattern
    #[arg(
        long,
        help = "Cycle threshold for the door pattern change",
        long_help = "Walls report the rising pattern while their cycle is between this value and twice this value, the falling pattern otherwise. Must be greater than 0. Default: 15"
    )]
    pub change_at: Option<u32>,

    /// Interval between two status messages of one wall, in milliseconds
    #[arg(long, help = "Tick interval in milliseconds")]
    pub tick_interval_ms: Option<u64>,

    /// Tenant the fleet publishes under
    #[arg(long, help = "Tenant used to build the <tenant>/status topic")]
    pub tenant: Option<String>,

    /// Device name template
    #[arg(
        long,
        help = "Device name template",
        long_help = "Template for device names. `{n}` is replaced with the device index; without it the index is appended. Default: spurdo{n}"
    )]
    pub name_template: Option<String>,

    /// Stop the fleet after this many seconds
    #[arg(long, help = "Stop after the given number of seconds")]
    pub run_for_secs: Option<u64>,

    /// MQTT broker URL
    #[arg(long, env = "MQTT_URL", help = "MQTT broker URL (tcp://host:port)")]
    pub mqtt_url: Option<String>,

    /// MQTT client identifier
    #[arg(long, env = "MQTT_CLIENT_ID", help = "MQTT client identifier")]
    pub mqtt_client_id: Option<String>,

    /// MQTT user name
    #[arg(long, env = "MQTT_USER", help = "MQTT user name")]
    pub mqtt_user: Option<String>,

    /// MQTT password
    #[arg(long, env = "MQTT_PASS", hide_env_values = true, help = "MQTT password")]
    pub mqtt_pass: Option<String>,

    /// Print status messages instead of publishing them
    #[arg(long, help = "Print status messages to stdout instead of publishing to the broker")]
    pub stdout: bool,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable verbose logging")]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(short, long, help = "Enable debug logging")]
    pub debug: bool,

    /// Emit logs as JSON
    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    /// Directory for rolling log files
    #[arg(long, help = "Also write logs to daily rolling files in this directory")]
    pub log_dir: Option<String>,

    /// Dry run mode - validate configuration without starting the fleet
    #[arg(long, help = "Validate configuration without starting the fleet")]
    pub dry_run: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in JSON format and exit")]
    pub print_config: bool,
}

/// MQTT transport settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    /// Broker URL, `tcp://host:port` or `mqtt://host:port`
    pub url: String,

    /// Client identifier; a random one is generated when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    /// User name for broker authentication
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Password for broker authentication
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Keep alive interval in seconds
    pub keep_alive_secs: u64,

    /// How long to wait for the broker to accept the session at startup
    pub connect_timeout_secs: u64,

    /// Pause before reconnecting after the connection is lost
    pub reconnect_delay_ms: u64,

    /// Capacity of the outgoing request queue shared by all walls
    pub request_capacity: usize,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            url: format!("tcp://localhost:{}", DEFAULT_MQTT_PORT),
            client_id: None,
            username: None,
            password: None,
            keep_alive_secs: 30,
            connect_timeout_secs: 10,
            reconnect_delay_ms: 1000,
            request_capacity: 10_000,
        }
    }
}

impl MqttConfig {
    /// Split the broker URL into host and port
    pub fn broker_address(&self) -> Result<(String, u16), ConfigValidationError> {
        let invalid = |reason: &str| ConfigValidationError::InvalidBrokerUrl {
            url: self.url.clone(),
            reason: reason.to_string(),
        };

        let authority = match self.url.split_once("://") {
            Some(("tcp" | "mqtt", rest)) => rest,
            Some((scheme, _)) => {
                return Err(ConfigValidationError::UnsupportedBrokerScheme(scheme.to_string()))
            }
            None => self.url.as_str(),
        };
        let authority = authority.trim_end_matches('/');

        let (host, port) = match authority.rsplit_once(':') {
            Some((host, port)) if !host.ends_with(':') => {
                let port: u16 = port.parse().map_err(|_| invalid("invalid port"))?;
                (host, port)
            }
            _ => (authority, DEFAULT_MQTT_PORT),
        };
        let host = host.trim_start_matches('[').trim_end_matches(']');

        if host.is_empty() {
            return Err(invalid("missing host"));
        }
        if port == 0 {
            return Err(invalid("port must be greater than 0"));
        }

        Ok((host.to_string(), port))
    }

    /// Keep alive interval as a duration
    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs)
    }

    /// Connect timeout as a duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Reconnect delay as a duration
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }
}

/// Configuration file structure (allows partial configuration)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigFile {
    /// Number of locker walls to simulate
    pub device_count: Option<usize>,

    /// Cycle threshold for the door pattern change
    pub change_at: Option<u32>,

    /// Tick interval in milliseconds
    pub tick_interval_ms: Option<u64>,

    /// Tenant the fleet publishes under
    pub tenant: Option<String>,

    /// Device name template
    pub name_template: Option<String>,

    /// Stop the fleet after this many seconds
    pub run_for_secs: Option<u64>,

    /// MQTT transport settings; missing keys fall back to defaults
    pub mqtt: Option<MqttConfig>,
}

/// Configuration for a simulated locker wall fleet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetConfig {
    /// Number of locker walls to simulate
    pub device_count: usize,

    /// Cycle threshold for the door pattern change
    pub change_at: u32,

    /// Interval between two status messages of one wall, in milliseconds
    pub tick_interval_ms: u64,

    /// Tenant the fleet publishes under
    pub tenant: String,

    /// Device name template, `{n}` is replaced with the device index
    pub name_template: String,

    /// Stop the fleet after this many seconds; runs until a signal when absent
    pub run_for_secs: Option<u64>,

    /// MQTT transport settings
    pub mqtt: MqttConfig,
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Configuration file read error
    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    /// JSON parsing error
    #[error("Failed to parse JSON configuration: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Unsupported configuration file format
    #[error("Unsupported configuration file format: {0} (supported: .json)")]
    UnsupportedFormat(String),
}

/// Validation errors for fleet configuration
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigValidationError {
    /// Device count is invalid
    #[error("Device count must be greater than 0, got {0}")]
    InvalidDeviceCount(usize),

    /// Change threshold is invalid
    #[error("Change threshold must be between 1 and {max}, got {0}", max = MAX_CHANGE_AT)]
    InvalidChangeAt(u32),

    /// Tick interval is invalid
    #[error("Tick interval must be greater than 0 ms, got {0}")]
    InvalidTickInterval(u64),

    /// Run duration is invalid
    #[error("Run duration must be greater than 0 s, got {0}")]
    InvalidRunDuration(u64),

    /// Tenant is empty
    #[error("Tenant must not be empty")]
    EmptyTenant,

    /// Tenant contains topic wildcards
    #[error("Tenant must not contain MQTT wildcards ('+', '#'), got {0:?}")]
    InvalidTenant(String),

    /// Name template is empty
    #[error("Device name template must not be empty")]
    EmptyNameTemplate,

    /// Name template contains a payload separator
    #[error("Device name template must not contain ',' or line breaks, got {0:?}")]
    InvalidNameTemplate(String),

    /// Broker URL scheme is not supported
    #[error("Unsupported broker scheme {0:?} (supported: tcp, mqtt)")]
    UnsupportedBrokerScheme(String),

    /// Broker URL is malformed
    #[error("Invalid broker URL {url:?}: {reason}")]
    InvalidBrokerUrl {
        /// The offending URL
        url: String,
        /// Why it was rejected
        reason: String,
    },
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            device_count: 1000,
            change_at: 15,
            tick_interval_ms: 1000,
            tenant: "tester".to_string(),
            name_template: "spurdo{n}".to_string(),
            run_for_secs: None,
            mqtt: MqttConfig::default(),
        }
    }
}

impl FleetConfig {
    /// Create configuration from parsed CLI arguments
    pub fn from_cli_args(args: CliArgs) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(config_path) = &args.config {
            config = Self::from_file(config_path)?;
        }

        // CLI and environment take precedence over the file
        Self::apply_cli_overrides(&mut config, args);

        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let content = fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => {
                let config_file: ConfigFile = serde_json::from_str(&content)?;
                Ok(Self::from_config_file(config_file))
            }
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => Err(ConfigError::UnsupportedFormat("no extension".to_string())),
        }
    }

    /// Create configuration from a config file, merging with defaults
    fn from_config_file(config_file: ConfigFile) -> Self {
        let defaults = Self::default();

        Self {
            device_count: config_file.device_count.unwrap_or(defaults.device_count),
            change_at: config_file.change_at.unwrap_or(defaults.change_at),
            tick_interval_ms: config_file.tick_interval_ms.unwrap_or(defaults.tick_interval_ms),
            tenant: config_file.tenant.unwrap_or(defaults.tenant),
            name_template: config_file.name_template.unwrap_or(defaults.name_template),
            run_for_secs: config_file.run_for_secs.or(defaults.run_for_secs),
            mqtt: config_file.mqtt.unwrap_or(defaults.mqtt),
        }
    }

    /// Apply CLI argument overrides to configuration
    fn apply_cli_overrides(config: &mut Self, args: CliArgs) {
        if let Some(value) = args.device_count {
            config.device_count = value;
        }
        if let Some(value) = args.change_at {
            config.change_at = value;
        }
        if let Some(value) = args.tick_interval_ms {
            config.tick_interval_ms = value;
        }
        if let Some(value) = args.tenant {
            config.tenant = value;
        }
        if let Some(value) = args.name_template {
            config.name_template = value;
        }
        if let Some(value) = args.run_for_secs {
            config.run_for_secs = Some(value);
        }

        if let Some(value) = args.mqtt_url {
            config.mqtt.url = value;
        }
        if let Some(value) = args.mqtt_client_id {
            config.mqtt.client_id = Some(value);
        }
        if let Some(value) = args.mqtt_user {
            config.mqtt.username = Some(value);
        }
        if let Some(value) = args.mqtt_pass {
            config.mqtt.password = Some(value);
        }
    }

    /// Print configuration as JSON
    pub fn print_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate the configuration parameters
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.device_count == 0 {
            return Err(ConfigValidationError::InvalidDeviceCount(self.device_count));
        }

        if self.change_at == 0 || self.change_at > MAX_CHANGE_AT {
            return Err(ConfigValidationError::InvalidChangeAt(self.change_at));
        }

        if self.tick_interval_ms == 0 {
            return Err(ConfigValidationError::InvalidTickInterval(self.tick_interval_ms));
        }

        if let Some(0) = self.run_for_secs {
            return Err(ConfigValidationError::InvalidRunDuration(0));
        }

        if self.tenant.is_empty() {
            return Err(ConfigValidationError::EmptyTenant);
        }
        if self.tenant.contains(TOPIC_WILDCARDS) {
            return Err(ConfigValidationError::InvalidTenant(self.tenant.clone()));
        }

        if self.name_template.is_empty() {
            return Err(ConfigValidationError::EmptyNameTemplate);
        }
        if self.name_template.contains(NAME_SEPARATORS) {
            return Err(ConfigValidationError::InvalidNameTemplate(self.name_template.clone()));
        }

        self.mqtt.broker_address()?;

        Ok(())
    }

    /// Tick interval as a duration
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Optional run duration
    pub fn run_for(&self) -> Option<Duration> {
        self.run_for_secs.map(Duration::from_secs)
    }

    /// Tenant identifier
    pub fn tenant(&self) -> Tenant {
        Tenant::new(self.tenant.clone())
    }

    /// Status messages the fleet publishes per second
    pub fn messages_per_second(&self) -> f64 {
        if self.tick_interval_ms == 0 {
            return 0.0;
        }
        self.device_count as f64 * 1000.0 / self.tick_interval_ms as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn empty_args() -> CliArgs {
        CliArgs {
            config: None,
            device_count: None,
            change_at: None,
            tick_interval_ms: None,
            tenant: None,
            name_template: None,
            run_for_secs: None,
            mqtt_url: None,
            mqtt_client_id: None,
            mqtt_user: None,
            mqtt_pass: None,
            stdout: false,
            verbose: false,
            debug: false,
            json_logs: false,
            log_dir: None,
            dry_run: false,
            print_config: false,
        }
    }

    #[test]
    fn test_fleet_config_default() {
        let config = FleetConfig::default();

        assert_eq!(config.device_count, 1000);
        assert_eq!(config.change_at, 15);
        assert_eq!(config.tick_interval_ms, 1000);
        assert_eq!(config.tenant, "tester");
        assert_eq!(config.name_template, "spurdo{n}");
        assert!(config.run_for_secs.is_none());
        assert!(config.validate().is_ok());
        assert_eq!(config.tick_interval(), Duration::from_secs(1));
        assert_eq!(config.tenant().status_topic(), "tester/status");
    }

    #[test]
    fn test_config_file_loading() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{ "device_count": 25, "tenant": "acme", "mqtt": {{ "url": "tcp://broker:1884" }} }}"#
        )
        .unwrap();

        let config = FleetConfig::from_file(file.path()).unwrap();
        assert_eq!(config.device_count, 25);
        assert_eq!(config.tenant, "acme");
        assert_eq!(config.change_at, 15);
        assert_eq!(config.mqtt.url, "tcp://broker:1884");
        assert_eq!(config.mqtt.keep_alive_secs, 30);
    }

    #[test]
    fn test_config_file_errors() {
        match FleetConfig::from_file("/definitely/not/here.json") {
            Err(ConfigError::FileNotFound(_)) => {}
            other => panic!("Expected FileNotFound, got {:?}", other),
        }

        let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        match FleetConfig::from_file(file.path()) {
            Err(ConfigError::UnsupportedFormat(ext)) => assert_eq!(ext, "yaml"),
            other => panic!("Expected UnsupportedFormat, got {:?}", other),
        }
    }

    #[test]
    fn test_cli_overrides() {
        let mut args = empty_args();
        args.device_count = Some(3);
        args.change_at = Some(4);
        args.tenant = Some("lab".to_string());
        args.mqtt_url = Some("mqtt://10.0.0.5:1999".to_string());
        args.mqtt_user = Some("sim".to_string());

        let config = FleetConfig::from_cli_args(args).unwrap();
        assert_eq!(config.device_count, 3);
        assert_eq!(config.change_at, 4);
        assert_eq!(config.tenant, "lab");
        assert_eq!(config.mqtt.username.as_deref(), Some("sim"));
        assert_eq!(
            config.mqtt.broker_address().unwrap(),
            ("10.0.0.5".to_string(), 1999)
        );
    }

    #[test]
    fn test_validation_rejects_non_positive_values() {
        let mut config = FleetConfig::default();
        config.device_count = 0;
        assert_eq!(config.validate(), Err(ConfigValidationError::InvalidDeviceCount(0)));

        let mut config = FleetConfig::default();
        config.change_at = 0;
        assert_eq!(config.validate(), Err(ConfigValidationError::InvalidChangeAt(0)));

        let mut config = FleetConfig::default();
        config.tick_interval_ms = 0;
        assert_eq!(config.validate(), Err(ConfigValidationError::InvalidTickInterval(0)));

        let mut config = FleetConfig::default();
        config.run_for_secs = Some(0);
        assert_eq!(config.validate(), Err(ConfigValidationError::InvalidRunDuration(0)));
    }

    #[test]
    fn test_validation_rejects_bad_names() {
        let mut config = FleetConfig::default();
        config.tenant = String::new();
        assert_eq!(config.validate(), Err(ConfigValidationError::EmptyTenant));

        config.tenant = "acme/#".to_string();
        assert!(matches!(config.validate(), Err(ConfigValidationError::InvalidTenant(_))));

        let mut config = FleetConfig::default();
        config.name_template = String::new();
        assert_eq!(config.validate(), Err(ConfigValidationError::EmptyNameTemplate));

        for template in ["wall,{n}", "wall{n}\n", "wall\r{n}"] {
            config.name_template = template.to_string();
            assert_eq!(
                config.validate(),
                Err(ConfigValidationError::InvalidNameTemplate(template.to_string()))
            );
        }
    }

    #[test]
    fn test_validation_bounds_change_at() {
        let mut config = FleetConfig::default();
        config.change_at = MAX_CHANGE_AT;
        assert!(config.validate().is_ok());

        config.change_at = MAX_CHANGE_AT + 1;
        assert_eq!(config.validate(), Err(ConfigValidationError::InvalidChangeAt(MAX_CHANGE_AT + 1)));
    }

    #[test]
    fn test_broker_address_parsing() {
        let mut mqtt = MqttConfig::default();
        assert_eq!(mqtt.broker_address().unwrap(), ("localhost".to_string(), 1883));

        mqtt.url = "broker.local".to_string();
        assert_eq!(mqtt.broker_address().unwrap(), ("broker.local".to_string(), 1883));

        mqtt.url = "tcp://[::1]:1885/".to_string();
        assert_eq!(mqtt.broker_address().unwrap(), ("::1".to_string(), 1885));

        mqtt.url = "ssl://broker:8883".to_string();
        assert_eq!(
            mqtt.broker_address(),
            Err(ConfigValidationError::UnsupportedBrokerScheme("ssl".to_string()))
        );

        mqtt.url = "tcp://broker:notaport".to_string();
        assert!(matches!(
            mqtt.broker_address(),
            Err(ConfigValidationError::InvalidBrokerUrl { .. })
        ));

        mqtt.url = "tcp://".to_string();
        assert!(matches!(
            mqtt.broker_address(),
            Err(ConfigValidationError::InvalidBrokerUrl { .. })
        ));
    }

    #[test]
    fn test_messages_per_second() {
        let mut config = FleetConfig::default();
        assert_eq!(config.messages_per_second(), 1000.0);

        config.device_count = 10;
        config.tick_interval_ms = 500;
        assert_eq!(config.messages_per_second(), 20.0);
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = FleetConfig::default();
        let json = config.print_json().unwrap();
        assert!(json.contains("\"change_at\": 15"));
        assert!(!json.contains("password"));

        let parsed: FleetConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
