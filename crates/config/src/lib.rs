//! # milvus-client-config
//!
//! Client configuration schema, loading, env overrides and validation.
//! This crate depends on `domain` and `shared` only.

/// Environment variable parsing and merging.
pub mod env;
/// Config loading helpers (file + env).
pub mod load;
/// Configuration schema types and helpers.
pub mod schema;

pub use env::{ClientEnv, EnvParseError, apply_env_overrides};
pub use load::{
    load_client_config_from_path, load_client_config_std_env, to_pretty_json, to_pretty_toml,
};
pub use schema::{
    ClientConfig, ConfigSchemaError, DEFAULT_GRACEFUL_TIME_MS, DEFAULT_INDEX_POLL_INTERVAL_MS,
    DEFAULT_REQUEST_TIMEOUT_MS, ValidatedClientConfig, client_config_schema,
    parse_client_config_json, parse_client_config_toml,
};

/// Returns the config crate version.
#[must_use]
pub const fn config_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use milvus_client_domain::domain_crate_version;
    use milvus_client_shared::shared_crate_version;

    #[test]
    fn config_crate_compiles() {
        let version = config_crate_version();
        assert!(!version.is_empty());
    }

    #[test]
    fn config_can_use_domain_and_shared() {
        let domain_version = domain_crate_version();
        let shared_version = shared_crate_version();

        assert!(!domain_version.is_empty());
        assert!(!shared_version.is_empty());
    }
}
