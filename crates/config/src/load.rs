//! Config loading helpers (file + env).
//!
//! Precedence (highest wins): env overrides, config file, defaults. Every
//! failure surfaces as a typed `ErrorEnvelope` with a `config:*` code.

use crate::{ClientConfig, ClientEnv, ValidatedClientConfig, apply_env_overrides};
use milvus_client_shared::{ErrorClass, ErrorCode, ErrorEnvelope};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Toml => "toml",
        }
    }
}

/// Load the client config from an optional file path, then apply `env`.
pub fn load_client_config_from_path(
    config_path: Option<&Path>,
    env: &ClientEnv,
) -> Result<ValidatedClientConfig, ErrorEnvelope> {
    let config = match config_path {
        None => ClientConfig::default(),
        Some(path) => {
            let format = detect_config_format(path)?;
            let config_text = read_config_file(path)?;
            tracing::debug!(
                path = %path.display(),
                format = format.as_str(),
                "loading client config"
            );
            parse_config_unvalidated(&config_text, format)?
        },
    };

    // env is applied last and also validates the resulting config.
    apply_env_overrides(config, env)
}

/// Load the client config from the process env and an optional file path.
pub fn load_client_config_std_env(
    config_path: Option<&Path>,
) -> Result<ValidatedClientConfig, ErrorEnvelope> {
    let env = ClientEnv::from_std_env().map_err(ErrorEnvelope::from)?;
    load_client_config_from_path(config_path, &env)
}

/// Serialize the config as deterministic pretty JSON (with trailing newline).
pub fn to_pretty_json(config: &ClientConfig) -> Result<String, ErrorEnvelope> {
    let mut output = serde_json::to_string_pretty(config).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::internal(),
            format!("failed to serialize config: {error}"),
            ErrorClass::NonRetriable,
        )
    })?;
    output.push('\n');
    Ok(output)
}

/// Serialize the config as deterministic pretty TOML (with trailing newline).
pub fn to_pretty_toml(config: &ClientConfig) -> Result<String, ErrorEnvelope> {
    let mut output = toml::to_string_pretty(config).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::new("config", "serialize_toml"),
            format!("failed to serialize config TOML: {error}"),
            ErrorClass::NonRetriable,
        )
    })?;
    if !output.ends_with('\n') {
        output.push('\n');
    }
    Ok(output)
}

fn parse_config_unvalidated(
    input: &str,
    format: ConfigFormat,
) -> Result<ClientConfig, ErrorEnvelope> {
    match format {
        ConfigFormat::Json => serde_json::from_str(input).map_err(|error| {
            ErrorEnvelope::expected(
                ErrorCode::new("config", "invalid_json"),
                format!("invalid config JSON: {error}"),
            )
            .with_metadata("source", "config")
        }),
        ConfigFormat::Toml => toml::from_str(input).map_err(|error| {
            ErrorEnvelope::expected(
                ErrorCode::new("config", "invalid_toml"),
                format!("invalid config TOML: {error}"),
            )
            .with_metadata("source", "config")
        }),
    }
}

fn read_config_file(path: &Path) -> Result<String, ErrorEnvelope> {
    std::fs::read_to_string(path).map_err(|error| {
        let code = match error.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::new("config", "config_file_not_found"),
            std::io::ErrorKind::PermissionDenied => {
                ErrorCode::new("config", "config_file_permission_denied")
            },
            _ => ErrorCode::new("config", "config_file_io"),
        };

        ErrorEnvelope::expected(code, format!("failed to read config file: {error}"))
            .with_metadata("path", path.to_string_lossy().to_string())
    })
}

fn detect_config_format(path: &Path) -> Result<ConfigFormat, ErrorEnvelope> {
    let ext = path
        .extension()
        .and_then(|value| value.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        None | Some("json") => Ok(ConfigFormat::Json),
        Some("toml") => Ok(ConfigFormat::Toml),
        Some(other) => Err(ErrorEnvelope::expected(
            ErrorCode::new("config", "unsupported_format"),
            "unsupported config format; use .json or .toml",
        )
        .with_metadata("extension", other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_format_by_extension() -> Result<(), ErrorEnvelope> {
        assert_eq!(
            detect_config_format(Path::new("client.json"))?,
            ConfigFormat::Json
        );
        assert_eq!(
            detect_config_format(Path::new("client.TOML"))?,
            ConfigFormat::Toml
        );
        assert_eq!(detect_config_format(Path::new("client"))?, ConfigFormat::Json);

        let error = detect_config_format(Path::new("client.yaml")).expect_err("yaml");
        assert_eq!(error.code, ErrorCode::new("config", "unsupported_format"));
        assert_eq!(error.metadata_value("extension"), Some("yaml"));
        Ok(())
    }

    #[test]
    fn missing_path_uses_defaults() -> Result<(), ErrorEnvelope> {
        let config = load_client_config_from_path(None, &ClientEnv::default())?;
        assert_eq!(config.as_ref(), &ClientConfig::default());
        Ok(())
    }

    #[test]
    fn missing_file_reports_not_found() {
        let error = load_client_config_from_path(
            Some(Path::new("/definitely/not/here/client.json")),
            &ClientEnv::default(),
        )
        .expect_err("missing file");
        assert_eq!(error.code, ErrorCode::new("config", "config_file_not_found"));
        assert!(error.metadata_value("path").is_some());
    }

    #[test]
    fn pretty_output_round_trips() -> Result<(), ErrorEnvelope> {
        let config = ClientConfig {
            index_build_timeout_ms: Some(30_000),
            ..ClientConfig::default()
        };

        let json = to_pretty_json(&config)?;
        assert!(json.ends_with('\n'));
        assert!(json.contains("\"indexBuildTimeoutMs\": 30000"));
        assert_eq!(
            parse_config_unvalidated(&json, ConfigFormat::Json)?,
            config
        );

        let toml = to_pretty_toml(&config)?;
        assert_eq!(
            parse_config_unvalidated(&toml, ConfigFormat::Toml)?,
            config
        );
        Ok(())
    }
}
