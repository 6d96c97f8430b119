//! # milvus-client-testkit
//!
//! Test doubles and fixtures: a scripted transport, deterministic clocks,
//! status fixtures and test log output.
//! This crate depends on `ports`, `proto`, and `shared`.

pub mod clock;
pub mod errors;
pub mod logging;
pub mod transport;

pub use clock::{FixedClock, SteppingClock};
pub use logging::init_test_tracing;
pub use transport::{RecordedRequest, ScriptedTransport};

/// Returns the testkit crate version.
#[must_use]
pub const fn testkit_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use milvus_client_ports::ports_crate_version;
    use milvus_client_shared::shared_crate_version;

    #[test]
    fn testkit_crate_compiles() {
        let version = testkit_crate_version();
        assert!(!version.is_empty());
    }

    #[test]
    fn testkit_can_use_ports_and_shared() {
        let ports_version = ports_crate_version();
        let shared_version = shared_crate_version();

        assert!(!ports_version.is_empty());
        assert!(!shared_version.is_empty());
    }

    #[test]
    fn error_fixtures_are_available() {
        let codes = errors::common_error_codes();
        assert!(!codes.is_empty());
        assert!(errors::connection_error().class.is_retriable());
    }

    #[test]
    fn tracing_init_is_idempotent() {
        init_test_tracing();
        init_test_tracing();
    }
}
