//! Milvus wire marshalling: request builders and reply decoders.

mod decode;
mod error;
mod ids;
mod index;
mod search;
mod shared;
mod vectors;

pub use decode::{
    DecodeError, decode_describe_index, decode_field_column, decode_index_build_progress,
    decode_index_state, decode_index_state_response, decode_mutation_result,
    decode_search_results, decode_status,
};
pub use error::{MilvusErrorContext, ensure_status_ok, map_status_error};
pub use ids::{decode_ids, encode_ids};
pub use index::{
    PARAM_INDEX_TYPE, create_index_request, describe_index_request, drop_index_request,
    get_index_build_progress_request, get_index_state_request,
};
pub use search::{
    PARAM_ANNS_FIELD, PARAM_IGNORE_GROWING, PARAM_METRIC_TYPE, PARAM_PARAMS, PARAM_ROUND_DECIMAL,
    PARAM_TOP_K, build_search_request, extra_params_json, search_params,
};
pub use vectors::{
    EncodedVectors, PLACEHOLDER_TAG, encode_placeholder_group, encode_vectors,
    float_vector_to_bytes, float_vectors_from_bytes,
};
