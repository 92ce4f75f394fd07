//! [`Config`] – typed view over the persisted `config.json`.
//!
//! The document has three sections (`serial`, `system`, `logging`).  Every
//! field is optional: absent fields silently take their default, while a
//! present-but-malformed field fails the load with [`ConfigError`].  The
//! config is immutable after load.

use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

/// A config document that could not be loaded or does not validate.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(&'static str),
}

/// Serial device settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SerialConfig {
    /// Device path opened by the link.
    #[serde(default = "default_port")]
    pub port: String,
    /// Line rate in baud.
    #[serde(default = "default_baudrate")]
    pub baudrate: u32,
    /// Per-read blocking budget in seconds.
    #[serde(default = "default_io_timeout")]
    pub timeout: f64,
    /// Per-write blocking budget in seconds.
    #[serde(default = "default_io_timeout")]
    pub write_timeout: f64,
}

/// Loop cadence and framing bounds.
#[derive(Debug, Clone, Deserialize)]
pub struct SystemConfig {
    /// Idle sleep between poll attempts, in seconds.
    #[serde(default = "default_loop_interval")]
    pub loop_interval: f64,
    /// Hard upper bound on bytes buffered per command.
    #[serde(default = "default_max_command_length")]
    pub max_command_length: usize,
    /// Maximum time granted to the drain-and-close phase, in seconds.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout: f64,
}

/// Log-sink settings.  Opaque to the core; consumed once at startup by
/// [`telemetry::init_logging`][crate::telemetry::init_logging].
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub level: LogLevel,
    /// Log file path.  `None` logs to the console only.
    #[serde(default = "default_log_file")]
    pub file: Option<String>,
    /// Accepted for config-file compatibility; the file sink rotates daily
    /// rather than by size.
    #[serde(default = "default_log_max_bytes")]
    pub max_bytes: u64,
    /// Number of rotated files kept on disk.
    #[serde(default = "default_log_backup_count")]
    pub backup_count: usize,
}

/// Log verbosity threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
}

impl LogLevel {
    /// The `tracing` filter directive for this level.
    pub fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// The whole persisted configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub serial: SerialConfig,
    #[serde(default)]
    pub system: SystemConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_port() -> String {
    "/dev/ttyUSB0".to_string()
}
fn default_baudrate() -> u32 {
    9600
}
fn default_io_timeout() -> f64 {
    1.0
}
fn default_loop_interval() -> f64 {
    0.1
}
fn default_max_command_length() -> usize {
    256
}
fn default_shutdown_timeout() -> f64 {
    5.0
}
fn default_log_file() -> Option<String> {
    Some("sensorlink.log".to_string())
}
fn default_log_max_bytes() -> u64 {
    1_048_576
}
fn default_log_backup_count() -> usize {
    3
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            baudrate: default_baudrate(),
            timeout: default_io_timeout(),
            write_timeout: default_io_timeout(),
        }
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            loop_interval: default_loop_interval(),
            max_command_length: default_max_command_length(),
            shutdown_timeout: default_shutdown_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            file: default_log_file(),
            max_bytes: default_log_max_bytes(),
            backup_count: default_log_backup_count(),
        }
    }
}

impl SerialConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.write_timeout)
    }
}

impl SystemConfig {
    pub fn idle_sleep(&self) -> Duration {
        Duration::from_secs_f64(self.loop_interval)
    }

    pub fn drain_budget(&self) -> Duration {
        Duration::from_secs_f64(self.shutdown_timeout)
    }
}

impl Config {
    /// Load and validate the config at `path`.
    ///
    /// A missing file is not an error: the defaults are used and a warning
    /// is logged, so a freshly provisioned board comes up without any
    /// on-disk configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file exists but cannot be read,
    /// parsed, or validated.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            warn!(path = %path.display(), "config file not found; using defaults");
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: Config = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Range checks beyond what the type system enforces.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.serial.port.is_empty() {
            return Err(ConfigError::Invalid("serial.port must not be empty"));
        }
        if self.serial.baudrate == 0 {
            return Err(ConfigError::Invalid("serial.baudrate must be positive"));
        }
        if !(self.serial.timeout >= 0.0) {
            return Err(ConfigError::Invalid("serial.timeout must not be negative"));
        }
        if !(self.serial.write_timeout >= 0.0) {
            return Err(ConfigError::Invalid(
                "serial.write_timeout must not be negative",
            ));
        }
        if !(self.system.loop_interval > 0.0) {
            return Err(ConfigError::Invalid("system.loop_interval must be positive"));
        }
        if self.system.max_command_length == 0 {
            return Err(ConfigError::Invalid(
                "system.max_command_length must be positive",
            ));
        }
        if !(self.system.shutdown_timeout >= 0.0) {
            return Err(ConfigError::Invalid(
                "system.shutdown_timeout must not be negative",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn write_config(dir: &tempfile::TempDir, body: &str) -> std::path::PathBuf {
        let path = dir.path().join("config.json");
        let mut f = fs::File::create(&path).expect("create config");
        f.write_all(body.as_bytes()).expect("write config");
        path
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let config = Config::load(&dir.path().join("absent.json")).expect("load ok");
        assert_eq!(config.serial.port, "/dev/ttyUSB0");
        assert_eq!(config.serial.baudrate, 9600);
        assert_eq!(config.system.max_command_length, 256);
        assert_eq!(config.logging.level, LogLevel::Info);
    }

    #[test]
    fn absent_fields_take_defaults() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = write_config(&dir, r#"{"serial": {"port": "/dev/ttyAMA0"}}"#);
        let config = Config::load(&path).expect("load ok");
        assert_eq!(config.serial.port, "/dev/ttyAMA0");
        assert_eq!(config.serial.baudrate, 9600);
        assert_eq!(config.system.loop_interval, 0.1);
    }

    #[test]
    fn full_document_overlays_every_section() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = write_config(
            &dir,
            r#"{
                "serial": {"port": "/dev/ttyS1", "baudrate": 115200, "timeout": 0.5, "write_timeout": 0.25},
                "system": {"loop_interval": 0.05, "max_command_length": 128, "shutdown_timeout": 2.0},
                "logging": {"level": "WARNING", "file": "srv.log", "max_bytes": 4096, "backup_count": 1}
            }"#,
        );
        let config = Config::load(&path).expect("load ok");
        assert_eq!(config.serial.baudrate, 115200);
        assert_eq!(config.serial.write_timeout(), Duration::from_millis(250));
        assert_eq!(config.system.max_command_length, 128);
        assert_eq!(config.logging.level, LogLevel::Warning);
        assert_eq!(config.logging.backup_count, 1);
    }

    #[test]
    fn malformed_field_is_a_parse_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = write_config(&dir, r#"{"serial": {"baudrate": "fast"}}"#);
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn unknown_log_level_is_a_parse_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = write_config(&dir, r#"{"logging": {"level": "LOUD"}}"#);
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn zero_baudrate_fails_validation() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = write_config(&dir, r#"{"serial": {"baudrate": 0}}"#);
        assert!(matches!(Config::load(&path), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn negative_timeout_fails_validation() {
        let mut config = Config::default();
        config.serial.timeout = -1.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn zero_loop_interval_fails_validation() {
        let mut config = Config::default();
        config.system.loop_interval = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn zero_max_command_length_fails_validation() {
        let mut config = Config::default();
        config.system.max_command_length = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn log_level_maps_to_tracing_filters() {
        assert_eq!(LogLevel::Debug.as_filter(), "debug");
        assert_eq!(LogLevel::Warning.as_filter(), "warn");
        assert_eq!(LogLevel::Error.as_filter(), "error");
    }

    #[test]
    fn defaults_validate() {
        Config::default().validate().expect("defaults must validate");
    }
}
