//! Index lifecycle request builders.

use crate::milvus::search::{PARAM_METRIC_TYPE, PARAM_PARAMS, extra_params_json, key_value};
use crate::milvus::shared::msg_base;
use milvus_client_domain::{CreateIndexParams, IndexTarget};
use milvus_client_proto::common::{KeyValuePair, MsgType};
use milvus_client_proto::milvus::{
    CreateIndexRequest, DescribeIndexRequest, DropIndexRequest, GetIndexBuildProgressRequest,
    GetIndexStateRequest,
};
use milvus_client_shared::Result;

/// Create-index param key: index algorithm.
pub const PARAM_INDEX_TYPE: &str = "index_type";

/// Build a create-index request.
///
/// `extra_params` holds `metric_type`, `index_type` and `params` in that
/// order, each only when supplied.
pub fn create_index_request(
    database: &str,
    params: &CreateIndexParams,
) -> Result<CreateIndexRequest> {
    let target = params.target();
    let mut extra_params: Vec<KeyValuePair> = Vec::with_capacity(3);
    if let Some(metric_type) = params.metric_type() {
        extra_params.push(key_value(PARAM_METRIC_TYPE, metric_type.as_wire_str()));
    }
    if let Some(index_type) = params.index_type() {
        extra_params.push(key_value(PARAM_INDEX_TYPE, index_type.as_wire_str()));
    }
    if !params.params().is_empty() {
        extra_params.push(key_value(PARAM_PARAMS, extra_params_json(params.params())?));
    }

    Ok(CreateIndexRequest {
        base: Some(msg_base(MsgType::CreateIndex)),
        db_name: database.to_owned(),
        collection_name: target.collection().to_owned(),
        field_name: target.field().to_owned(),
        extra_params,
        index_name: target.wire_index_name().to_owned(),
    })
}

/// Build a describe-index request.
#[must_use]
pub fn describe_index_request(database: &str, target: &IndexTarget) -> DescribeIndexRequest {
    DescribeIndexRequest {
        base: Some(msg_base(MsgType::DescribeIndex)),
        db_name: database.to_owned(),
        collection_name: target.collection().to_owned(),
        field_name: target.field().to_owned(),
        index_name: target.wire_index_name().to_owned(),
        timestamp: 0,
    }
}

/// Build a drop-index request.
#[must_use]
pub fn drop_index_request(database: &str, target: &IndexTarget) -> DropIndexRequest {
    DropIndexRequest {
        base: Some(msg_base(MsgType::DropIndex)),
        db_name: database.to_owned(),
        collection_name: target.collection().to_owned(),
        field_name: target.field().to_owned(),
        index_name: target.wire_index_name().to_owned(),
    }
}

/// Build an index-state request.
#[must_use]
pub fn get_index_state_request(database: &str, target: &IndexTarget) -> GetIndexStateRequest {
    GetIndexStateRequest {
        base: Some(msg_base(MsgType::GetIndexState)),
        db_name: database.to_owned(),
        collection_name: target.collection().to_owned(),
        field_name: target.field().to_owned(),
        index_name: target.wire_index_name().to_owned(),
    }
}

/// Build an index-build-progress request.
#[must_use]
pub fn get_index_build_progress_request(
    database: &str,
    target: &IndexTarget,
) -> GetIndexBuildProgressRequest {
    GetIndexBuildProgressRequest {
        base: Some(msg_base(MsgType::GetIndexBuildProgress)),
        db_name: database.to_owned(),
        collection_name: target.collection().to_owned(),
        field_name: target.field().to_owned(),
        index_name: target.wire_index_name().to_owned(),
    }
}
