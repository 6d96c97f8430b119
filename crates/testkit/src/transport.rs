//! Scripted in-memory transport.
//!
//! Responses are queued per RPC and handed out in order. The last queued
//! response of an RPC sticks: once the queue holds a single entry, every
//! further call returns a copy of it. An RPC with nothing queued fails with a
//! `core:not_found` error. Every request is recorded in arrival order.

use milvus_client_ports::{BoxFuture, MilvusTransport};
use milvus_client_proto::common::Status;
use milvus_client_proto::milvus::{
    CreateIndexRequest, DescribeIndexRequest, DescribeIndexResponse, DropIndexRequest,
    GetIndexBuildProgressRequest, GetIndexBuildProgressResponse, GetIndexStateRequest,
    GetIndexStateResponse, SearchRequest, SearchResults,
};
use milvus_client_shared::{ErrorCode, ErrorEnvelope, RequestContext, Result};
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Mutex;

/// A request received by [`ScriptedTransport`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedRequest {
    /// `Search` call.
    Search(SearchRequest),
    /// `CreateIndex` call.
    CreateIndex(CreateIndexRequest),
    /// `DescribeIndex` call.
    DescribeIndex(DescribeIndexRequest),
    /// `DropIndex` call.
    DropIndex(DropIndexRequest),
    /// `GetIndexState` call.
    GetIndexState(GetIndexStateRequest),
    /// `GetIndexBuildProgress` call.
    GetIndexBuildProgress(GetIndexBuildProgressRequest),
}

#[derive(Debug, Default)]
struct Script {
    search: VecDeque<Result<SearchResults>>,
    create_index: VecDeque<Result<Status>>,
    describe_index: VecDeque<Result<DescribeIndexResponse>>,
    drop_index: VecDeque<Result<Status>>,
    get_index_state: VecDeque<Result<GetIndexStateResponse>>,
    get_index_build_progress: VecDeque<Result<GetIndexBuildProgressResponse>>,
}

/// Transport double replaying queued responses.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    script: Mutex<Script>,
    requests: Mutex<Vec<RecordedRequest>>,
    latency: Option<Duration>,
}

impl ScriptedTransport {
    /// Empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every reply by `latency` (use with paused tokio time).
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Queue a search reply.
    pub fn with_search(mut self, response: Result<SearchResults>) -> Self {
        self.script.get_mut().search.push_back(response);
        self
    }

    /// Queue a create-index reply.
    pub fn with_create_index(mut self, response: Result<Status>) -> Self {
        self.script.get_mut().create_index.push_back(response);
        self
    }

    /// Queue a describe-index reply.
    pub fn with_describe_index(mut self, response: Result<DescribeIndexResponse>) -> Self {
        self.script.get_mut().describe_index.push_back(response);
        self
    }

    /// Queue a drop-index reply.
    pub fn with_drop_index(mut self, response: Result<Status>) -> Self {
        self.script.get_mut().drop_index.push_back(response);
        self
    }

    /// Queue an index-state reply.
    pub fn with_index_state(mut self, response: Result<GetIndexStateResponse>) -> Self {
        self.script.get_mut().get_index_state.push_back(response);
        self
    }

    /// Queue an index-build-progress reply.
    pub fn with_build_progress(mut self, response: Result<GetIndexBuildProgressResponse>) -> Self {
        self.script
            .get_mut()
            .get_index_build_progress
            .push_back(response);
        self
    }

    /// Queue one progress reply per `(indexed, total)` pair.
    pub fn with_build_progress_steps(self, steps: &[(i64, i64)]) -> Self {
        steps.iter().fold(self, |transport, (indexed, total)| {
            transport.with_build_progress(Ok(GetIndexBuildProgressResponse {
                status: None,
                indexed_rows: *indexed,
                total_rows: *total,
            }))
        })
    }

    /// Requests received so far, in arrival order.
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().await.clone()
    }

    /// Number of requests received so far.
    pub async fn request_count(&self) -> usize {
        self.requests.lock().await.len()
    }

    async fn record(&self, request: RecordedRequest) {
        self.requests.lock().await.push(request);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

fn next<T: Clone>(queue: &mut VecDeque<Result<T>>, rpc: &'static str) -> Result<T> {
    if queue.len() > 1 {
        return queue.pop_front().unwrap_or_else(|| Err(unscripted(rpc)));
    }
    queue.front().cloned().unwrap_or_else(|| Err(unscripted(rpc)))
}

fn unscripted(rpc: &'static str) -> ErrorEnvelope {
    ErrorEnvelope::expected(
        ErrorCode::not_found(),
        format!("no scripted response for {rpc}"),
    )
    .with_metadata("rpc", rpc)
}

impl MilvusTransport for ScriptedTransport {
    fn search(
        &self,
        _ctx: &RequestContext,
        request: SearchRequest,
    ) -> BoxFuture<'_, Result<SearchResults>> {
        Box::pin(async move {
            self.record(RecordedRequest::Search(request)).await;
            next(&mut self.script.lock().await.search, "search")
        })
    }

    fn create_index(
        &self,
        _ctx: &RequestContext,
        request: CreateIndexRequest,
    ) -> BoxFuture<'_, Result<Status>> {
        Box::pin(async move {
            self.record(RecordedRequest::CreateIndex(request)).await;
            next(&mut self.script.lock().await.create_index, "create_index")
        })
    }

    fn describe_index(
        &self,
        _ctx: &RequestContext,
        request: DescribeIndexRequest,
    ) -> BoxFuture<'_, Result<DescribeIndexResponse>> {
        Box::pin(async move {
            self.record(RecordedRequest::DescribeIndex(request)).await;
            next(&mut self.script.lock().await.describe_index, "describe_index")
        })
    }

    fn drop_index(
        &self,
        _ctx: &RequestContext,
        request: DropIndexRequest,
    ) -> BoxFuture<'_, Result<Status>> {
        Box::pin(async move {
            self.record(RecordedRequest::DropIndex(request)).await;
            next(&mut self.script.lock().await.drop_index, "drop_index")
        })
    }

    fn get_index_state(
        &self,
        _ctx: &RequestContext,
        request: GetIndexStateRequest,
    ) -> BoxFuture<'_, Result<GetIndexStateResponse>> {
        Box::pin(async move {
            self.record(RecordedRequest::GetIndexState(request)).await;
            next(&mut self.script.lock().await.get_index_state, "get_index_state")
        })
    }

    fn get_index_build_progress(
        &self,
        _ctx: &RequestContext,
        request: GetIndexBuildProgressRequest,
    ) -> BoxFuture<'_, Result<GetIndexBuildProgressResponse>> {
        Box::pin(async move {
            self.record(RecordedRequest::GetIndexBuildProgress(request))
                .await;
            next(
                &mut self.script.lock().await.get_index_build_progress,
                "get_index_build_progress",
            )
        })
    }
}
