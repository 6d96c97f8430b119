//! Client configuration schema and validation.

use milvus_client_domain::{ConsistencyLevel, DEFAULT_DATABASE_NAME};
use milvus_client_shared::{ErrorCode, ErrorEnvelope, PollOptions};
use schemars::{JsonSchema, Schema, schema_for};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;
use std::time::Duration;

/// Default deadline for a single request, in milliseconds.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 60_000;
/// Default delay between index build progress probes, in milliseconds.
pub const DEFAULT_INDEX_POLL_INTERVAL_MS: u64 = 500;
/// Default staleness window for bounded consistency, in milliseconds.
pub const DEFAULT_GRACEFUL_TIME_MS: u64 = 5_000;

const MIN_REQUEST_TIMEOUT_MS: u64 = 1;
const MAX_REQUEST_TIMEOUT_MS: u64 = 600_000;
const MIN_INDEX_POLL_INTERVAL_MS: u64 = 1;
const MAX_INDEX_POLL_INTERVAL_MS: u64 = 60_000;
const MIN_INDEX_BUILD_TIMEOUT_MS: u64 = 1;
const MAX_INDEX_BUILD_TIMEOUT_MS: u64 = 86_400_000;
const MIN_GRACEFUL_TIME_MS: u64 = 0;
const MAX_GRACEFUL_TIME_MS: u64 = 3_600_000;

/// Client configuration as read from a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct ClientConfig {
    /// Database addressed when a request does not name one.
    pub database: String,
    /// Deadline for one-shot calls (ms).
    pub request_timeout_ms: u64,
    /// Delay between index build progress probes (ms).
    pub index_poll_interval_ms: u64,
    /// Cumulative deadline when waiting for an index build (ms); unset waits
    /// until the build finishes or the request is cancelled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_build_timeout_ms: Option<u64>,
    /// Default consistency level for searches (`Strong`, `Session`,
    /// `Bounded`, `Eventually`, `Customized`).
    pub consistency_level: String,
    /// Staleness window used by bounded consistency (ms).
    pub graceful_time_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            database: DEFAULT_DATABASE_NAME.to_owned(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            index_poll_interval_ms: DEFAULT_INDEX_POLL_INTERVAL_MS,
            index_build_timeout_ms: None,
            consistency_level: ConsistencyLevel::default().as_str().to_owned(),
            graceful_time_ms: DEFAULT_GRACEFUL_TIME_MS,
        }
    }
}

impl ClientConfig {
    /// Validate bounds and normalize string fields.
    pub fn validate(mut self) -> Result<ValidatedClientConfig, ConfigSchemaError> {
        self.database = self.database.trim().to_owned();
        if self.database.is_empty() {
            return Err(ConfigSchemaError::BlankDatabase);
        }

        check_range(
            "requestTimeoutMs",
            self.request_timeout_ms,
            MIN_REQUEST_TIMEOUT_MS,
            MAX_REQUEST_TIMEOUT_MS,
        )?;
        check_range(
            "indexPollIntervalMs",
            self.index_poll_interval_ms,
            MIN_INDEX_POLL_INTERVAL_MS,
            MAX_INDEX_POLL_INTERVAL_MS,
        )?;
        if let Some(timeout_ms) = self.index_build_timeout_ms {
            check_range(
                "indexBuildTimeoutMs",
                timeout_ms,
                MIN_INDEX_BUILD_TIMEOUT_MS,
                MAX_INDEX_BUILD_TIMEOUT_MS,
            )?;
        }
        check_range(
            "gracefulTimeMs",
            self.graceful_time_ms,
            MIN_GRACEFUL_TIME_MS,
            MAX_GRACEFUL_TIME_MS,
        )?;

        let consistency_level = ConsistencyLevel::parse(&self.consistency_level).ok_or_else(|| {
            ConfigSchemaError::InvalidConsistencyLevel {
                value: self.consistency_level.clone(),
            }
        })?;
        self.consistency_level = consistency_level.as_str().to_owned();

        Ok(ValidatedClientConfig {
            raw: self,
            consistency_level,
        })
    }
}

const fn check_range(
    field: &'static str,
    value: u64,
    min: u64,
    max: u64,
) -> Result<(), ConfigSchemaError> {
    if value < min || value > max {
        return Err(ConfigSchemaError::ValueOutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

/// Validated config wrapper with typed accessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedClientConfig {
    raw: ClientConfig,
    consistency_level: ConsistencyLevel,
}

impl ValidatedClientConfig {
    /// Borrow the raw config.
    #[must_use]
    pub const fn as_ref(&self) -> &ClientConfig {
        &self.raw
    }

    /// Consume the wrapper and return the raw config.
    #[must_use]
    pub fn into_inner(self) -> ClientConfig {
        self.raw
    }

    /// Default database name.
    #[must_use]
    pub fn database(&self) -> &str {
        &self.raw.database
    }

    /// Deadline for one-shot calls.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.raw.request_timeout_ms)
    }

    /// Default consistency level for searches.
    #[must_use]
    pub const fn consistency_level(&self) -> ConsistencyLevel {
        self.consistency_level
    }

    /// Staleness window for bounded consistency.
    #[must_use]
    pub const fn graceful_time(&self) -> Duration {
        Duration::from_millis(self.raw.graceful_time_ms)
    }

    /// Polling schedule for index build waits.
    #[must_use]
    pub fn index_poll_options(&self) -> PollOptions {
        PollOptions::new(
            Duration::from_millis(self.raw.index_poll_interval_ms),
            self.raw.index_build_timeout_ms.map(Duration::from_millis),
        )
    }
}

impl Default for ValidatedClientConfig {
    fn default() -> Self {
        Self {
            raw: ClientConfig::default(),
            consistency_level: ConsistencyLevel::default(),
        }
    }
}

impl AsRef<ClientConfig> for ValidatedClientConfig {
    fn as_ref(&self) -> &ClientConfig {
        &self.raw
    }
}

impl Deref for ValidatedClientConfig {
    type Target = ClientConfig;

    fn deref(&self) -> &Self::Target {
        &self.raw
    }
}

/// Validation failures for [`ClientConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSchemaError {
    /// The database name is blank.
    BlankDatabase,
    /// A numeric value is out of bounds.
    ValueOutOfRange {
        /// Field name in the config file (e.g. `requestTimeoutMs`).
        field: &'static str,
        /// Value provided.
        value: u64,
        /// Minimum allowed value.
        min: u64,
        /// Maximum allowed value.
        max: u64,
    },
    /// The consistency level name is not recognized.
    InvalidConsistencyLevel {
        /// Raw input value.
        value: String,
    },
}

impl ConfigSchemaError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::BlankDatabase => ErrorCode::new("config", "invalid_database"),
            Self::ValueOutOfRange { .. } => ErrorCode::new("config", "value_out_of_range"),
            Self::InvalidConsistencyLevel { .. } => {
                ErrorCode::new("config", "invalid_consistency_level")
            },
        }
    }
}

impl fmt::Display for ConfigSchemaError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BlankDatabase => formatter.write_str("database must be non-empty"),
            Self::ValueOutOfRange {
                field,
                value,
                min,
                max,
            } => write!(
                formatter,
                "{field} must be between {min} and {max} (got {value})"
            ),
            Self::InvalidConsistencyLevel { value } => {
                write!(formatter, "unsupported consistency level: {value}")
            },
        }
    }
}

impl std::error::Error for ConfigSchemaError {}

impl From<ConfigSchemaError> for ErrorEnvelope {
    fn from(error: ConfigSchemaError) -> Self {
        let code = error.error_code();
        let message = error.to_string();
        let mut envelope = Self::expected(code, message);

        match error {
            ConfigSchemaError::BlankDatabase => {
                envelope = envelope.with_metadata("field", "database");
            },
            ConfigSchemaError::ValueOutOfRange {
                field,
                value,
                min,
                max,
            } => {
                envelope = envelope
                    .with_metadata("field", field)
                    .with_metadata("value", value.to_string())
                    .with_metadata("min", min.to_string())
                    .with_metadata("max", max.to_string());
            },
            ConfigSchemaError::InvalidConsistencyLevel { value } => {
                envelope = envelope
                    .with_metadata("field", "consistencyLevel")
                    .with_metadata("value", value);
            },
        }

        envelope
    }
}

/// Parse a client config from a JSON string and validate it.
pub fn parse_client_config_json(input: &str) -> Result<ValidatedClientConfig, ErrorEnvelope> {
    let config: ClientConfig = serde_json::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_json"),
            format!("invalid config JSON: {error}"),
        )
    })?;

    config.validate().map_err(Into::into)
}

/// Parse a client config from a TOML string and validate it.
pub fn parse_client_config_toml(input: &str) -> Result<ValidatedClientConfig, ErrorEnvelope> {
    let config: ClientConfig = toml::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_toml"),
            format!("invalid config TOML: {error}"),
        )
    })?;

    config.validate().map_err(Into::into)
}

/// JSON Schema for [`ClientConfig`].
#[must_use]
pub fn client_config_schema() -> Schema {
    schema_for!(ClientConfig)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() -> Result<(), ConfigSchemaError> {
        let config = ClientConfig::default().validate()?;
        assert_eq!(config.database(), "default");
        assert_eq!(config.request_timeout(), Duration::from_secs(60));
        assert_eq!(config.graceful_time(), Duration::from_secs(5));
        assert_eq!(config.consistency_level(), ConsistencyLevel::Bounded);

        let poll = config.index_poll_options();
        assert_eq!(poll.interval, Duration::from_millis(500));
        assert_eq!(poll.timeout, None);
        assert_eq!(config, ValidatedClientConfig::default());
        Ok(())
    }

    #[test]
    fn rejects_out_of_range_values() {
        let config = ClientConfig {
            request_timeout_ms: 0,
            ..ClientConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigSchemaError::ValueOutOfRange {
                field: "requestTimeoutMs",
                value: 0,
                min: 1,
                max: 600_000,
            })
        );

        let config = ClientConfig {
            index_build_timeout_ms: Some(86_400_001),
            ..ClientConfig::default()
        };
        let error = ErrorEnvelope::from(config.validate().expect_err("too long"));
        assert_eq!(error.code, ErrorCode::new("config", "value_out_of_range"));
        assert_eq!(error.metadata_value("field"), Some("indexBuildTimeoutMs"));
    }

    #[test]
    fn zero_graceful_time_is_allowed() -> Result<(), ConfigSchemaError> {
        let config = ClientConfig {
            graceful_time_ms: 0,
            ..ClientConfig::default()
        }
        .validate()?;
        assert_eq!(config.graceful_time(), Duration::ZERO);
        Ok(())
    }

    #[test]
    fn normalizes_consistency_level_and_database() -> Result<(), ConfigSchemaError> {
        let config = ClientConfig {
            database: "  analytics ".to_owned(),
            consistency_level: "strong".to_owned(),
            ..ClientConfig::default()
        }
        .validate()?;
        assert_eq!(config.database(), "analytics");
        assert_eq!(config.consistency_level, "Strong");
        assert_eq!(config.consistency_level(), ConsistencyLevel::Strong);
        Ok(())
    }

    #[test]
    fn rejects_unknown_consistency_level() {
        let config = ClientConfig {
            consistency_level: "sometimes".to_owned(),
            ..ClientConfig::default()
        };
        let error = ErrorEnvelope::from(config.validate().expect_err("unknown level"));
        assert_eq!(
            error.code,
            ErrorCode::new("config", "invalid_consistency_level")
        );
        assert_eq!(error.metadata_value("value"), Some("sometimes"));
    }

    #[test]
    fn rejects_blank_database() {
        let config = ClientConfig {
            database: "   ".to_owned(),
            ..ClientConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigSchemaError::BlankDatabase));
    }

    #[test]
    fn json_rejects_unknown_fields() {
        let error = parse_client_config_json(r#"{"database":"x","retries":3}"#)
            .expect_err("unknown field");
        assert_eq!(error.code, ErrorCode::new("config", "invalid_json"));
    }

    #[test]
    fn schema_lists_camel_case_properties() {
        let schema = client_config_schema();
        let properties = schema
            .as_value()
            .get("properties")
            .and_then(serde_json::Value::as_object)
            .expect("properties");
        for key in [
            "database",
            "requestTimeoutMs",
            "indexPollIntervalMs",
            "indexBuildTimeoutMs",
            "consistencyLevel",
            "gracefulTimeMs",
        ] {
            assert!(properties.contains_key(key), "missing {key}");
        }
    }
}
