// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! YAML configuration parser with strict schema validation.
//!
//! Every field has a default, so an empty file (or no file) is a valid
//! configuration. Any invalid field results in a HardValidationError that
//! prevents the benchmark from starting.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{BenchError, BenchResult, HardValidationError};
use crate::framing::Framing;
use crate::transport::RetryPolicy;
use crate::types::{MessageSize, Port};

/// Upper bound on ping-pong rounds per session.
const MAX_ROUNDS: u64 = 100_000_000;
/// Upper bound on a single retry pause.
const MAX_BACKOFF_US: u64 = 1_000_000;

/// Raw connection settings as parsed from YAML (before validation).
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConnectionConfig {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default)]
    port: u16,
    #[serde(default = "default_true")]
    nodelay: bool,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for RawConnectionConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: 0,
            nodelay: true,
        }
    }
}

/// Raw session settings.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSessionConfig {
    #[serde(default)]
    framing: Framing,
    #[serde(default = "default_amount")]
    amount: u64,
    #[serde(default = "default_message_size")]
    message_size: u64,
    #[serde(default = "default_rounds")]
    rounds: u64,
}

fn default_amount() -> u64 {
    1024
}

fn default_message_size() -> u64 {
    1024
}

fn default_rounds() -> u64 {
    10_000
}

impl Default for RawSessionConfig {
    fn default() -> Self {
        Self {
            framing: Framing::default(),
            amount: default_amount(),
            message_size: default_message_size(),
            rounds: default_rounds(),
        }
    }
}

#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
enum RawRetryStrategy {
    #[default]
    BusyPoll,
    ExponentialBackoff,
}

/// Raw retry settings.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRetryConfig {
    #[serde(default)]
    strategy: RawRetryStrategy,
    #[serde(default = "default_initial_backoff_us")]
    initial_backoff_us: u64,
    #[serde(default = "default_max_backoff_us")]
    max_backoff_us: u64,
}

fn default_initial_backoff_us() -> u64 {
    10
}

fn default_max_backoff_us() -> u64 {
    1000
}

impl Default for RawRetryConfig {
    fn default() -> Self {
        Self {
            strategy: RawRetryStrategy::default(),
            initial_backoff_us: default_initial_backoff_us(),
            max_backoff_us: default_max_backoff_us(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawAffinityConfig {
    #[serde(default)]
    pin_threads: bool,
}

/// Raw root configuration file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    connection: RawConnectionConfig,
    #[serde(default)]
    session: RawSessionConfig,
    #[serde(default)]
    retry: RawRetryConfig,
    #[serde(default)]
    affinity: RawAffinityConfig,
}

/// Validated connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub host: String,
    /// 0 lets a server pick an ephemeral port; clients need an explicit one.
    pub port: u16,
    pub nodelay: bool,
}

impl ConnectionConfig {
    /// Port to connect to. Fails if none was configured.
    pub fn remote_port(&self) -> Result<Port, HardValidationError> {
        Port::new(self.port)
    }
}

/// Validated session settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub framing: Framing,
    /// Throughput mode: payload bytes to transfer.
    pub amount: u64,
    pub message_size: MessageSize,
    /// Latency mode: number of ping-pong rounds.
    pub rounds: u64,
}

/// Complete validated configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub connection: ConnectionConfig,
    pub session: SessionConfig,
    pub retry: RetryPolicy,
    pub pin_threads: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            connection: ConnectionConfig {
                host: default_host(),
                port: 0,
                nodelay: true,
            },
            session: SessionConfig {
                framing: Framing::default(),
                amount: default_amount(),
                message_size: MessageSize::default(),
                rounds: default_rounds(),
            },
            retry: RetryPolicy::default(),
            pin_threads: false,
        }
    }
}

/// Configuration loader with strict validation.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate configuration from a YAML file.
    pub fn load_file(path: impl AsRef<Path>) -> BenchResult<Config> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(BenchError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| BenchError::Io {
            context: "reading config file",
            source: e,
        })?;

        Self::load_string(&content)
    }

    /// Load and validate configuration from a YAML string.
    pub fn load_string(content: &str) -> BenchResult<Config> {
        // serde_yaml reads an empty document as null, not as an empty map.
        if content.trim().is_empty() {
            return Self::validate(RawConfig::default());
        }

        let raw: RawConfig =
            serde_yaml::from_str(content).map_err(|e| BenchError::ConfigParse {
                message: format!("YAML parse error: {}", e),
            })?;

        Self::validate(raw)
    }

    fn validate(raw: RawConfig) -> BenchResult<Config> {
        Ok(Config {
            connection: Self::validate_connection(raw.connection)?,
            session: Self::validate_session(raw.session)?,
            retry: Self::validate_retry(raw.retry)?,
            pin_threads: raw.affinity.pin_threads,
        })
    }

    fn validate_connection(raw: RawConnectionConfig) -> Result<ConnectionConfig, HardValidationError> {
        if raw.host.trim().is_empty() {
            return Err(HardValidationError::InvalidFieldValue {
                field: "host",
                value: raw.host,
                reason: "Host cannot be empty".to_string(),
            });
        }

        Ok(ConnectionConfig {
            host: raw.host,
            port: raw.port,
            nodelay: raw.nodelay,
        })
    }

    fn validate_session(raw: RawSessionConfig) -> Result<SessionConfig, HardValidationError> {
        let message_size = MessageSize::new(raw.message_size)?;
        let rounds = Self::validate_rounds(raw.rounds)?;

        Ok(SessionConfig {
            framing: raw.framing,
            amount: raw.amount,
            message_size,
            rounds,
        })
    }

    /// Validate a ping-pong round count.
    pub fn validate_rounds(rounds: u64) -> Result<u64, HardValidationError> {
        if rounds == 0 || rounds > MAX_ROUNDS {
            return Err(HardValidationError::InvalidFieldValue {
                field: "rounds",
                value: rounds.to_string(),
                reason: format!("Must be between 1 and {}", MAX_ROUNDS),
            });
        }
        Ok(rounds)
    }

    fn validate_retry(raw: RawRetryConfig) -> Result<RetryPolicy, HardValidationError> {
        if raw.strategy == RawRetryStrategy::BusyPoll {
            return Ok(RetryPolicy::BusyPoll);
        }

        if raw.initial_backoff_us == 0 {
            return Err(HardValidationError::InvalidFieldValue {
                field: "initial_backoff_us",
                value: "0".to_string(),
                reason: "Backoff must be greater than 0, use busy_poll instead".to_string(),
            });
        }

        if raw.max_backoff_us < raw.initial_backoff_us || raw.max_backoff_us > MAX_BACKOFF_US {
            return Err(HardValidationError::InvalidFieldValue {
                field: "max_backoff_us",
                value: raw.max_backoff_us.to_string(),
                reason: format!(
                    "Must be between initial_backoff_us ({}) and {}",
                    raw.initial_backoff_us, MAX_BACKOFF_US
                ),
            });
        }

        Ok(RetryPolicy::ExponentialBackoff {
            initial: Duration::from_micros(raw.initial_backoff_us),
            max: Duration::from_micros(raw.max_backoff_us),
        })
    }
}
