//! Contract-style tests for the scripted transport behind the port trait.

use milvus_client_ports::MilvusTransport;
use milvus_client_proto::milvus::{
    CreateIndexRequest, DescribeIndexResponse, GetIndexStateRequest, GetIndexStateResponse,
    SearchRequest, SearchResults,
};
use milvus_client_shared::{RequestContext, Result};
use milvus_client_testkit::errors::ok_status;
use milvus_client_testkit::{RecordedRequest, ScriptedTransport};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn transport_port_replays_in_order() -> Result<()> {
    let scripted = Arc::new(
        ScriptedTransport::new()
            .with_search(Ok(SearchResults {
                collection_name: "first".to_owned(),
                ..SearchResults::default()
            }))
            .with_search(Ok(SearchResults {
                collection_name: "second".to_owned(),
                ..SearchResults::default()
            }))
            .with_create_index(Ok(ok_status()))
            .with_describe_index(Ok(DescribeIndexResponse::default())),
    );
    let port: Arc<dyn MilvusTransport> = scripted.clone();
    let ctx = RequestContext::new_request();

    let first = port.search(&ctx, SearchRequest::default()).await?;
    let second = port.search(&ctx, SearchRequest::default()).await?;
    let third = port.search(&ctx, SearchRequest::default()).await?;
    assert_eq!(first.collection_name, "first");
    assert_eq!(second.collection_name, "second");
    assert_eq!(third.collection_name, "second");

    let request = CreateIndexRequest {
        collection_name: "docs".to_owned(),
        ..CreateIndexRequest::default()
    };
    port.create_index(&ctx, request.clone()).await?;

    let recorded = scripted.requests().await;
    assert_eq!(recorded.len(), 4);
    assert_eq!(recorded.last(), Some(&RecordedRequest::CreateIndex(request)));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn latency_delays_replies() -> Result<()> {
    let port = ScriptedTransport::new()
        .with_latency(Duration::from_secs(3))
        .with_index_state(Ok(GetIndexStateResponse::default()));
    let ctx = RequestContext::new_request();

    let started = tokio::time::Instant::now();
    port.get_index_state(&ctx, GetIndexStateRequest::default())
        .await?;
    assert!(started.elapsed() >= Duration::from_secs(3));
    Ok(())
}
