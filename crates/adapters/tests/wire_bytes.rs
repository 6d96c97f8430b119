//! Requests and replies pushed through protobuf bytes, the way a transport
//! carries them.

use milvus_client_adapters::{
    MilvusErrorContext, build_search_request, decode_mutation_result, encode_ids,
};
use milvus_client_domain::{IdentifierUnion, MetricType, SearchParameters};
use milvus_client_proto::common::{KeyValuePair, PlaceholderGroup};
use milvus_client_proto::milvus::{MutationResult, SearchRequest};
use milvus_client_shared::Result;
use prost::Message;
use std::time::{Duration, UNIX_EPOCH};

#[test]
fn search_request_survives_the_wire() -> Result<()> {
    let params = SearchParameters::builder("docs", "embedding", ["id", "title"])
        .top_k(5)
        .metric_type(MetricType::Ip)
        .float_vectors(vec![vec![0.25, -0.5, 1.0]])
        .filter_expr("year > 2020")
        .parameter("ef", "64")
        .build()?;
    let request = build_search_request(
        &params,
        Duration::from_secs(5),
        UNIX_EPOCH + Duration::from_secs(1_700_000_000),
    )?;

    let decoded = SearchRequest::decode(request.encode_to_vec().as_slice()).expect("decode");
    assert_eq!(decoded, request);

    let group =
        PlaceholderGroup::decode(decoded.placeholder_group.as_slice()).expect("placeholder");
    let value = group.placeholders.first().expect("placeholder value");
    assert_eq!(
        value.values,
        vec![vec![0, 0, 0x80, 0x3e, 0, 0, 0, 0xbf, 0, 0, 0x80, 0x3f]]
    );
    assert!(decoded.search_params.contains(&KeyValuePair {
        key: "params".to_owned(),
        value: r#"{"ef":64}"#.to_owned(),
    }));
    Ok(())
}

#[test]
fn mutation_reply_decodes_from_bytes() -> Result<()> {
    let reply = MutationResult {
        ids: Some(encode_ids(&IdentifierUnion::StringIds(vec![
            "a".to_owned(),
            "b".to_owned(),
        ]))),
        succ_index: vec![0, 1],
        acknowledged: true,
        upsert_cnt: 2,
        timestamp: 1_700_000_000_000 << 18,
        ..MutationResult::default()
    };
    let bytes = reply.encode_to_vec();

    let outcome = decode_mutation_result(
        MutationResult::decode(bytes.as_slice()).expect("decode"),
        &MilvusErrorContext::new("upsert", "docs"),
    )?;
    assert_eq!(
        outcome.ids().as_string_ids(),
        Some(&["a".to_owned(), "b".to_owned()][..])
    );
    assert_eq!(outcome.upsert_count(), 2);
    assert!(!outcome.has_row_errors());
    assert_eq!(
        outcome.timestamp(),
        UNIX_EPOCH + Duration::from_millis(1_700_000_000_000)
    );
    Ok(())
}
