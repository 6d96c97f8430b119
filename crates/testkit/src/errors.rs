//! Error and status fixtures.

use milvus_client_proto::common::{ErrorCode as StatusCode, Status};
use milvus_client_shared::{ErrorClass, ErrorCode, ErrorEnvelope};

/// Return a list of common error codes used in tests.
pub fn common_error_codes() -> Vec<ErrorCode> {
    vec![
        ErrorCode::cancelled(),
        ErrorCode::invalid_input(),
        ErrorCode::not_found(),
        ErrorCode::timeout(),
        ErrorCode::io(),
        ErrorCode::internal(),
    ]
}

/// A transport-level connection failure, as a transport would report it.
pub fn connection_error() -> ErrorEnvelope {
    ErrorEnvelope::unexpected(
        ErrorCode::new("vector", "vdb_connection"),
        "connection refused",
        ErrorClass::Retriable,
    )
}

/// A successful reply status.
pub fn ok_status() -> Status {
    Status::default()
}

/// A failed reply status with a legacy error code and reason.
pub fn failed_status(code: StatusCode, reason: &str) -> Status {
    Status {
        error_code: code as i32,
        reason: reason.to_owned(),
        ..Status::default()
    }
}
