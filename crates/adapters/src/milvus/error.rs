//! Milvus status mapping helpers.

use milvus_client_proto::common::{ErrorCode as ProtoErrorCode, Status};
use milvus_client_shared::{ErrorClass, ErrorCode, ErrorEnvelope, Result};

/// Context attached to error envelopes produced from service replies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MilvusErrorContext {
    /// Operation label (e.g. `search`, `describe_index`).
    pub operation: &'static str,
    /// Collection name, when the request is collection-scoped.
    pub collection_name: Option<String>,
}

impl MilvusErrorContext {
    /// Context for a collection-scoped operation.
    pub fn new(operation: &'static str, collection: impl Into<String>) -> Self {
        Self {
            operation,
            collection_name: Some(collection.into()),
        }
    }

    pub(crate) fn annotate(&self, envelope: ErrorEnvelope) -> ErrorEnvelope {
        let envelope = envelope.with_metadata("operation", self.operation);
        match self.collection_name.as_ref() {
            Some(collection) => envelope.with_metadata("collection", collection.to_owned()),
            None => envelope,
        }
    }
}

/// Fail when a reply status reports anything but success.
///
/// An absent status is treated as success.
pub fn ensure_status_ok(status: Option<&Status>, ctx: &MilvusErrorContext) -> Result<()> {
    match status {
        Some(status) if !is_success(status) => Err(map_status_error(status, ctx)),
        _ => Ok(()),
    }
}

/// Maps a non-success reply status into the shared error envelope format.
pub fn map_status_error(status: &Status, ctx: &MilvusErrorContext) -> ErrorEnvelope {
    let known = ProtoErrorCode::try_from(status.error_code).ok();
    let error_code = known.map_or_else(vdb_unknown_code, code_for);

    let class = if status.retriable
        || matches!(error_code.code(), "vdb_connection" | "vdb_rate_limited")
    {
        ErrorClass::Retriable
    } else {
        ErrorClass::NonRetriable
    };

    let status_code = known.map_or_else(
        || status.error_code.to_string(),
        |code| format!("{code:?}"),
    );
    let message = if status.reason.trim().is_empty() {
        format!("Milvus returned status {status_code}")
    } else {
        status.reason.clone()
    };

    let mut envelope = ctx
        .annotate(ErrorEnvelope::unexpected(error_code, message, class))
        .with_metadata("status_code", status_code);
    if status.code != 0 {
        envelope = envelope.with_metadata("service_code", status.code.to_string());
    }
    envelope
}

fn is_success(status: &Status) -> bool {
    status.error_code == ProtoErrorCode::Success as i32 && status.code == 0
}

fn code_for(code: ProtoErrorCode) -> ErrorCode {
    match code {
        ProtoErrorCode::PermissionDenied => vdb_auth_code(),
        ProtoErrorCode::ConnectFailed | ProtoErrorCode::NotReadyServe => vdb_connection_code(),
        ProtoErrorCode::IllegalArgument
        | ProtoErrorCode::IllegalTopk
        | ProtoErrorCode::IllegalCollectionName
        | ProtoErrorCode::IllegalRowRecord
        | ProtoErrorCode::IllegalVectorId
        | ProtoErrorCode::IllegalNlist => vdb_query_invalid_code(),
        ProtoErrorCode::IllegalDimension
        | ProtoErrorCode::IllegalIndexType
        | ProtoErrorCode::IllegalMetricType => vdb_schema_mismatch_code(),
        ProtoErrorCode::IndexNotExist => ErrorCode::new("vector", "vdb_index_not_found"),
        ProtoErrorCode::CollectionNotExists | ProtoErrorCode::CollectionNameNotFound => {
            ErrorCode::new("vector", "vdb_collection_not_found")
        },
        ProtoErrorCode::RateLimit => ErrorCode::new("vector", "vdb_rate_limited"),
        _ => vdb_unknown_code(),
    }
}

fn vdb_auth_code() -> ErrorCode {
    ErrorCode::new("vector", "vdb_auth")
}

fn vdb_connection_code() -> ErrorCode {
    ErrorCode::new("vector", "vdb_connection")
}

fn vdb_schema_mismatch_code() -> ErrorCode {
    ErrorCode::new("vector", "vdb_schema_mismatch")
}

fn vdb_query_invalid_code() -> ErrorCode {
    ErrorCode::new("vector", "vdb_query_invalid")
}

fn vdb_unknown_code() -> ErrorCode {
    ErrorCode::new("vector", "vdb_unknown")
}
