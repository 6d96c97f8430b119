//! # milvus-client-adapters
//!
//! Wire codecs between domain values and the Milvus protobuf contract:
//! query vector encoding, identifier unions, search and index request
//! assembly, and reply decoding with status mapping.
//! This crate depends on `domain`, `proto`, and `shared`.

pub mod milvus;

pub use milvus::{
    DecodeError, MilvusErrorContext, build_search_request, create_index_request,
    decode_describe_index, decode_ids, decode_index_build_progress, decode_index_state,
    decode_index_state_response, decode_mutation_result, decode_search_results, decode_status,
    describe_index_request, drop_index_request, encode_ids, encode_placeholder_group,
    encode_vectors, get_index_build_progress_request, get_index_state_request,
};

/// Returns the adapters crate version.
#[must_use]
pub const fn adapters_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use milvus_client_domain::domain_crate_version;
    use milvus_client_shared::shared_crate_version;

    fn workspace_deps() -> Vec<String> {
        let cargo_toml = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.toml"));
        let mut deps = Vec::new();
        let mut in_deps = false;
        let mut in_dev_deps = false;

        for raw_line in cargo_toml.lines() {
            let line = raw_line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            if line.starts_with('[') {
                in_deps = line == "[dependencies]";
                in_dev_deps = line == "[dev-dependencies]";
                continue;
            }
            if !(in_deps || in_dev_deps) {
                continue;
            }
            if line.starts_with("milvus-client-") {
                let key = line.split('=').next().unwrap_or("").trim();
                let name = key.split('.').next().unwrap_or("").trim();
                deps.push(name.to_string());
            }
        }

        deps
    }

    #[test]
    fn adapters_do_not_depend_on_app_or_testkit() {
        let deps = workspace_deps();
        let forbidden = ["milvus-client-app", "milvus-client-testkit"];

        for dep in &deps {
            assert!(
                !forbidden.contains(&dep.as_str()),
                "forbidden dependency found: {dep}"
            );
        }
        assert!(deps.iter().any(|dep| dep == "milvus-client-proto"));
    }

    #[test]
    fn adapters_link_domain_and_shared() {
        assert!(!adapters_crate_version().is_empty());
        assert!(!domain_crate_version().is_empty());
        assert!(!shared_crate_version().is_empty());
    }
}
