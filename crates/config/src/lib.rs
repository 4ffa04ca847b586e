use core::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use slalink_core_types::Wei;

mod utils;
pub use utils::wei_from_anything;

/// Configuration of a protocol participant
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// A custom human-readable name for this party
    pub moniker: String,

    /// Log configuration options
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Event polling options
    #[serde(default)]
    pub ledger: LedgerConfig,

    /// Handshake options
    #[serde(default)]
    pub handshake: HandshakeConfig,

    /// Provider options
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Checkpoint report options
    #[serde(default)]
    pub checkpoint: CheckpointConfig,
}

/// load_config parses the environment variables and loads the provided config file path
/// to create a Config struct.
pub fn load_config(path: impl AsRef<Path>, prefix: Option<&str>) -> eyre::Result<Config> {
    ::config::Config::builder()
        .add_source(::config::File::from(path.as_ref()))
        .add_source(::config::Environment::with_prefix(prefix.unwrap_or("SLALINK")).separator("__"))
        .build()?
        .try_deserialize()
        .map_err(Into::into)
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub log_level: LogLevel,
    pub log_format: LogFormat,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            e => Err(format!("Invalid log level: {e}")),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Plaintext,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plaintext" => Ok(LogFormat::Plaintext),
            "json" => Ok(LogFormat::Json),
            e => Err(format!("Invalid log format: {e}")),
        }
    }
}

/// How often the event log is polled while waiting for a confirmation.
///
/// The delay starts at `poll_interval` and is multiplied by `backoff_factor`
/// after every poll that found nothing, up to `max_poll_interval`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LedgerConfig {
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,

    #[serde(with = "humantime_serde")]
    pub max_poll_interval: Duration,

    pub backoff_factor: f64,
}

impl LedgerConfig {
    /// Delay to apply after `delay` when the next poll comes up empty too.
    pub fn next_delay(&self, delay: Duration) -> Duration {
        let factor = self.backoff_factor.max(1.0);

        Duration::try_from_secs_f64(delay.as_secs_f64() * factor)
            .unwrap_or(self.max_poll_interval)
            .min(self.max_poll_interval)
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(50),
            max_poll_interval: Duration::from_secs(1),
            backoff_factor: 2.0,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HandshakeConfig {
    /// Stake attached to a proposal or an acceptance
    #[serde(deserialize_with = "wei_from_anything")]
    pub stake: Wei,

    /// Deadline imposed on a whole handshake by its runner
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for HandshakeConfig {
    fn default() -> Self {
        Self {
            stake: Wei::from_ether(100),
            timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Price of one unit of work
    #[serde(deserialize_with = "wei_from_anything")]
    pub rate: Wei,

    pub host_address: String,
    pub host_port: u16,

    /// DER-encoded server attestation certificate
    #[serde(default)]
    pub server_cert_path: Option<PathBuf>,

    /// DER-encoded application certificate, from which the ledger derives
    /// the provider's hardware id
    #[serde(default)]
    pub app_cert_path: Option<PathBuf>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            rate: Wei::new(1),
            host_address: "127.0.0.1".to_string(),
            host_port: 65432,
            server_cert_path: None,
            app_cert_path: None,
        }
    }
}

/// Parameters of the sampled usage source.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CheckpointConfig {
    pub batch_size: usize,
    pub accept_rate: f64,
    pub min_units_used: u64,
    pub max_units_used: u64,
    pub min_micros_per_unit: f64,
    pub max_micros_per_unit: f64,
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            accept_rate: 0.95,
            min_units_used: 1,
            max_units_used: u32::MAX as u64,
            min_micros_per_unit: 0.05,
            max_micros_per_unit: 0.1,
        }
    }
}
