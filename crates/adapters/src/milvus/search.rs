//! Search request assembly.

use crate::milvus::shared::msg_base;
use crate::milvus::vectors::encode_placeholder_group;
use milvus_client_domain::{ConsistencyLevel, SearchParameters, guarantee_timestamp};
use milvus_client_proto::common::{
    ConsistencyLevel as WireConsistencyLevel, DslType, KeyValuePair, MsgType,
};
use milvus_client_proto::milvus::SearchRequest;
use milvus_client_shared::{ErrorClass, ErrorCode, ErrorEnvelope, Result};
use std::collections::BTreeMap;
use std::time::{Duration, SystemTime};

/// Search param key: vector field searched.
pub const PARAM_ANNS_FIELD: &str = "anns_field";
/// Search param key: hits per query.
pub const PARAM_TOP_K: &str = "topk";
/// Search param key: distance metric.
pub const PARAM_METRIC_TYPE: &str = "metric_type";
/// Search param key: skip growing segments.
pub const PARAM_IGNORE_GROWING: &str = "ignore_growing";
/// Search param key: score rounding.
pub const PARAM_ROUND_DECIMAL: &str = "round_decimal";
/// Search param key: JSON object of index-specific parameters.
pub const PARAM_PARAMS: &str = "params";

/// Build the wire search request for validated parameters.
///
/// `graceful_time` and `now` feed the guarantee timestamp of bounded reads;
/// both are inputs so the result is deterministic.
pub fn build_search_request(
    params: &SearchParameters,
    graceful_time: Duration,
    now: SystemTime,
) -> Result<SearchRequest> {
    let placeholder_group = encode_placeholder_group(params.vectors())?;
    let search_params = search_params(params)?;
    let level = params.consistency_level();
    let guarantee_timestamp =
        guarantee_timestamp(level, params.guarantee_timestamp(), graceful_time, now);
    let nq = i64::try_from(params.nq()).map_err(|_| {
        ErrorEnvelope::invariant(ErrorCode::internal(), "query count exceeds i64::MAX")
    })?;

    tracing::trace!(
        collection = params.collection(),
        nq,
        guarantee_timestamp,
        "built search request"
    );

    Ok(SearchRequest {
        base: Some(msg_base(MsgType::Search)),
        db_name: params.database().to_owned(),
        collection_name: params.collection().to_owned(),
        partition_names: params.partition_names().to_vec(),
        dsl: params.filter_expr().unwrap_or_default().to_owned(),
        placeholder_group,
        dsl_type: DslType::BoolExprV1 as i32,
        output_fields: params.output_fields().to_vec(),
        search_params,
        travel_timestamp: params.travel_timestamp(),
        guarantee_timestamp,
        nq,
        not_return_all_meta: false,
        consistency_level: level.map_or(WireConsistencyLevel::Bounded, wire_consistency_level)
            as i32,
        use_default_consistency: level.is_none(),
        search_by_primary_keys: false,
    })
}

/// Auxiliary key/value parameters, in wire order.
pub fn search_params(params: &SearchParameters) -> Result<Vec<KeyValuePair>> {
    Ok(vec![
        key_value(PARAM_ANNS_FIELD, params.vector_field()),
        key_value(PARAM_TOP_K, params.top_k().to_string()),
        key_value(PARAM_METRIC_TYPE, params.metric_type().as_wire_str()),
        key_value(PARAM_IGNORE_GROWING, params.ignore_growing().to_string()),
        key_value(PARAM_ROUND_DECIMAL, params.round_decimal().to_string()),
        key_value(PARAM_PARAMS, extra_params_json(params.extra_params())?),
    ])
}

/// Combine extra parameters into one JSON object string.
///
/// Values that parse as JSON are embedded as-is, anything else becomes a JSON
/// string. Keys are emitted in sorted order; no parameters yield `{}`.
pub fn extra_params_json(params: &BTreeMap<String, String>) -> Result<String> {
    let map: serde_json::Map<String, serde_json::Value> = params
        .iter()
        .map(|(key, value)| {
            let value = serde_json::from_str::<serde_json::Value>(value)
                .unwrap_or_else(|_| serde_json::Value::String(value.clone()));
            (key.clone(), value)
        })
        .collect();
    serde_json::to_string(&map).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::new("vector", "vdb_invalid_request"),
            format!("failed to serialize search params: {error}"),
            ErrorClass::NonRetriable,
        )
    })
}

pub(crate) fn key_value(key: &str, value: impl Into<String>) -> KeyValuePair {
    KeyValuePair {
        key: key.to_owned(),
        value: value.into(),
    }
}

const fn wire_consistency_level(level: ConsistencyLevel) -> WireConsistencyLevel {
    match level {
        ConsistencyLevel::Strong => WireConsistencyLevel::Strong,
        ConsistencyLevel::Session => WireConsistencyLevel::Session,
        ConsistencyLevel::Bounded => WireConsistencyLevel::Bounded,
        ConsistencyLevel::Eventually => WireConsistencyLevel::Eventually,
        ConsistencyLevel::Customized => WireConsistencyLevel::Customized,
    }
}
