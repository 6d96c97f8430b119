//! # milvus-client-domain
//!
//! Value types describing what the client sends and receives, independent of
//! the wire encoding:
//!
//! - **Search** - `SearchParameters` (+ builder), `SearchVectors`, `MetricType`
//! - **Consistency** - `ConsistencyLevel`, guarantee-timestamp derivation
//! - **Identifiers** - `IdentifierUnion`, `Id`
//! - **Mutations** - `MutationOutcome`
//! - **Index lifecycle** - `IndexTarget`, `CreateIndexParams`, `IndexState`,
//!   `IndexBuildProgress`, `IndexInfo`
//! - **Results** - `SearchResults`, `SearchHit`, `FieldColumn`
//!
//! ## Dependency Rules
//!
//! - Depends only on the `shared` crate
//! - No wire or transport types
//! - Pure logic with no I/O; time is always passed in

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub use milvus_client_shared::shared_crate_version;

// =============================================================================
// DOMAIN MODULES
// =============================================================================

pub mod consistency;
pub mod hybrid_time;
pub mod ids;
pub mod index;
pub mod mutation;
pub mod results;
pub mod search;

pub use consistency::{
    ConsistencyLevel, GUARANTEE_EVENTUALLY_TS, GUARANTEE_STRONG_TS, guarantee_timestamp,
};
pub use hybrid_time::{HybridTimestamp, LOGICAL_BITS};
pub use ids::{Id, IdentifierUnion};
pub use index::{
    CreateIndexParams, CreateIndexParamsBuilder, IndexBuildProgress, IndexInfo, IndexParamError,
    IndexState, IndexStateReport, IndexTarget, IndexType,
};
pub use mutation::{MutationOutcome, MutationOutcomeBuilder};
pub use results::{FieldColumn, SearchHit, SearchResults};
pub use search::{
    DEFAULT_DATABASE_NAME, DEFAULT_ROUND_DECIMAL, MAX_TOP_K, MIN_TOP_K, MetricType,
    SearchParamError, SearchParameters, SearchParametersBuilder, SearchVectors,
};

/// Returns the domain crate version.
#[must_use]
pub const fn domain_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_crate_compiles() {
        let version = domain_crate_version();
        assert!(!version.is_empty());
    }

    #[test]
    fn domain_depends_on_shared() {
        let shared_version = shared_crate_version();
        assert!(!shared_version.is_empty());
    }
}
