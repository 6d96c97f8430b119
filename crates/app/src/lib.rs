//! # milvus-client-app
//!
//! Client use cases over a pluggable transport: search, index creation,
//! description and removal, index state and build progress, and waiting for
//! an index build to finish.
//! This crate depends on `adapters`, `config`, `ports`, `domain`, and `shared`.

mod client;
pub mod index;
pub mod search;
pub mod wait_for_index;

pub use client::MilvusClient;

/// Returns the app crate version.
#[must_use]
pub const fn app_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use milvus_client_adapters::adapters_crate_version;
    use milvus_client_domain::domain_crate_version;
    use milvus_client_ports::ports_crate_version;
    use milvus_client_shared::shared_crate_version;

    #[test]
    fn app_crate_compiles() {
        let version = app_crate_version();
        assert!(!version.is_empty());
    }

    #[test]
    fn app_can_use_adapters_ports_domain_shared() {
        assert!(!adapters_crate_version().is_empty());
        assert!(!ports_crate_version().is_empty());
        assert!(!domain_crate_version().is_empty());
        assert!(!shared_crate_version().is_empty());
    }
}
