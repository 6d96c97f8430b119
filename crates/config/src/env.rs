//! Environment variable parsing and env-to-config merging.
//!
//! Env parsing is strict: a variable that is present must parse, otherwise
//! loading fails before any request is made.

use crate::schema::{ClientConfig, ValidatedClientConfig};
use milvus_client_domain::ConsistencyLevel;
use milvus_client_shared::{ErrorCode, ErrorEnvelope};
use std::collections::BTreeMap;
use std::fmt;

/// Env var: default database name.
pub const ENV_DATABASE: &str = "MILVUS_DATABASE";
/// Env var: request timeout in milliseconds.
pub const ENV_REQUEST_TIMEOUT_MS: &str = "MILVUS_REQUEST_TIMEOUT_MS";
/// Env var: index build poll interval in milliseconds.
pub const ENV_INDEX_POLL_INTERVAL_MS: &str = "MILVUS_INDEX_POLL_INTERVAL_MS";
/// Env var: index build wait deadline in milliseconds.
pub const ENV_INDEX_BUILD_TIMEOUT_MS: &str = "MILVUS_INDEX_BUILD_TIMEOUT_MS";
/// Env var: default consistency level.
pub const ENV_CONSISTENCY_LEVEL: &str = "MILVUS_CONSISTENCY_LEVEL";
/// Env var: bounded consistency graceful time in milliseconds.
pub const ENV_GRACEFUL_TIME_MS: &str = "MILVUS_GRACEFUL_TIME_MS";

const ENV_VARS: [&str; 6] = [
    ENV_DATABASE,
    ENV_REQUEST_TIMEOUT_MS,
    ENV_INDEX_POLL_INTERVAL_MS,
    ENV_INDEX_BUILD_TIMEOUT_MS,
    ENV_CONSISTENCY_LEVEL,
    ENV_GRACEFUL_TIME_MS,
];

/// Parsed env overrides; `None` leaves the config value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientEnv {
    /// Override for `database`.
    pub database: Option<Box<str>>,
    /// Override for `requestTimeoutMs`.
    pub request_timeout_ms: Option<u64>,
    /// Override for `indexPollIntervalMs`.
    pub index_poll_interval_ms: Option<u64>,
    /// Override for `indexBuildTimeoutMs`.
    pub index_build_timeout_ms: Option<u64>,
    /// Override for `consistencyLevel`.
    pub consistency_level: Option<ConsistencyLevel>,
    /// Override for `gracefulTimeMs`.
    pub graceful_time_ms: Option<u64>,
}

impl ClientEnv {
    /// Parse env overrides from a key/value map (useful for tests and fixtures).
    pub fn from_map(map: &BTreeMap<String, String>) -> Result<Self, EnvParseError> {
        Ok(Self {
            database: read_trimmed(map, ENV_DATABASE)?.map(Into::into),
            request_timeout_ms: parse_u64(map, ENV_REQUEST_TIMEOUT_MS)?,
            index_poll_interval_ms: parse_u64(map, ENV_INDEX_POLL_INTERVAL_MS)?,
            index_build_timeout_ms: parse_u64(map, ENV_INDEX_BUILD_TIMEOUT_MS)?,
            consistency_level: parse_consistency_level(map, ENV_CONSISTENCY_LEVEL)?,
            graceful_time_ms: parse_u64(map, ENV_GRACEFUL_TIME_MS)?,
        })
    }

    /// Parse env overrides from the process environment.
    pub fn from_std_env() -> Result<Self, EnvParseError> {
        let map: BTreeMap<String, String> = ENV_VARS
            .into_iter()
            .filter_map(|name| std::env::var(name).ok().map(|value| (name.to_owned(), value)))
            .collect();
        Self::from_map(&map)
    }

    /// Returns true when no override is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.database.is_none()
            && self.request_timeout_ms.is_none()
            && self.index_poll_interval_ms.is_none()
            && self.index_build_timeout_ms.is_none()
            && self.consistency_level.is_none()
            && self.graceful_time_ms.is_none()
    }
}

/// Apply env overrides on top of `base`, then validate the result.
pub fn apply_env_overrides(
    base: ClientConfig,
    env: &ClientEnv,
) -> Result<ValidatedClientConfig, ErrorEnvelope> {
    let mut config = base;
    if let Some(database) = env.database.as_deref() {
        database.clone_into(&mut config.database);
    }
    if let Some(value) = env.request_timeout_ms {
        config.request_timeout_ms = value;
    }
    if let Some(value) = env.index_poll_interval_ms {
        config.index_poll_interval_ms = value;
    }
    if env.index_build_timeout_ms.is_some() {
        config.index_build_timeout_ms = env.index_build_timeout_ms;
    }
    if let Some(level) = env.consistency_level {
        level.as_str().clone_into(&mut config.consistency_level);
    }
    if let Some(value) = env.graceful_time_ms {
        config.graceful_time_ms = value;
    }

    config.validate().map_err(Into::into)
}

fn read_trimmed<'a>(
    map: &'a BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<&'a str>, EnvParseError> {
    match map.get(var).map(|value| value.trim()) {
        None => Ok(None),
        Some("") => Err(EnvParseError::EmptyValue { var }),
        Some(value) => Ok(Some(value)),
    }
}

fn parse_u64(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<u64>, EnvParseError> {
    read_trimmed(map, var)?
        .map(|value| {
            value.parse::<u64>().map_err(|_| EnvParseError::InvalidInt {
                var,
                value: value.to_owned(),
            })
        })
        .transpose()
}

fn parse_consistency_level(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<ConsistencyLevel>, EnvParseError> {
    read_trimmed(map, var)?
        .map(|value| {
            ConsistencyLevel::parse(value).ok_or_else(|| EnvParseError::InvalidEnum {
                var,
                value: value.to_owned(),
            })
        })
        .transpose()
}

/// Env parsing failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvParseError {
    /// An env var was present but empty after trimming.
    EmptyValue {
        /// Env var name.
        var: &'static str,
    },
    /// Integer env var had an invalid value.
    InvalidInt {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
    /// Enum env var had an unsupported value.
    InvalidEnum {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
}

impl EnvParseError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::EmptyValue { .. } => ErrorCode::new("config", "empty_env_var"),
            Self::InvalidInt { .. } => ErrorCode::new("config", "invalid_env_int"),
            Self::InvalidEnum { .. } => ErrorCode::new("config", "invalid_env_enum"),
        }
    }
}

impl fmt::Display for EnvParseError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyValue { var } => write!(formatter, "{var} must be non-empty"),
            Self::InvalidInt { var, .. } => {
                write!(formatter, "{var} must be a non-negative integer")
            },
            Self::InvalidEnum { var, .. } => write!(formatter, "{var} has an unsupported value"),
        }
    }
}

impl std::error::Error for EnvParseError {}

impl From<EnvParseError> for ErrorEnvelope {
    fn from(error: EnvParseError) -> Self {
        let code = error.error_code();
        let message = error.to_string();
        let mut envelope = Self::expected(code, message);

        match error {
            EnvParseError::EmptyValue { var } => {
                envelope = envelope.with_metadata("env_var", var);
            },
            EnvParseError::InvalidInt { var, value } | EnvParseError::InvalidEnum { var, value } => {
                envelope = envelope
                    .with_metadata("env_var", var)
                    .with_metadata("value", value);
            },
        }

        envelope
    }
}
