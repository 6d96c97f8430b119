//! Transport boundary contract: one round trip per service RPC.

use crate::BoxFuture;
use milvus_client_proto::common::Status;
use milvus_client_proto::milvus::{
    CreateIndexRequest, DescribeIndexRequest, DescribeIndexResponse, DropIndexRequest,
    GetIndexBuildProgressRequest, GetIndexBuildProgressResponse, GetIndexStateRequest,
    GetIndexStateResponse, SearchRequest, SearchResults,
};
use milvus_client_shared::{RequestContext, Result};

/// Boundary contract for the network round trip.
///
/// Implementations own connections, authentication and any retry policy.
/// They return the decoded response body as-is, including non-success
/// statuses; a transport-level failure (connect, protocol, deadline) is an
/// `Err` and is propagated unchanged by the client.
pub trait MilvusTransport: Send + Sync {
    /// `Search` RPC.
    fn search(
        &self,
        ctx: &RequestContext,
        request: SearchRequest,
    ) -> BoxFuture<'_, Result<SearchResults>>;

    /// `CreateIndex` RPC.
    fn create_index(
        &self,
        ctx: &RequestContext,
        request: CreateIndexRequest,
    ) -> BoxFuture<'_, Result<Status>>;

    /// `DescribeIndex` RPC.
    fn describe_index(
        &self,
        ctx: &RequestContext,
        request: DescribeIndexRequest,
    ) -> BoxFuture<'_, Result<DescribeIndexResponse>>;

    /// `DropIndex` RPC.
    fn drop_index(
        &self,
        ctx: &RequestContext,
        request: DropIndexRequest,
    ) -> BoxFuture<'_, Result<Status>>;

    /// `GetIndexState` RPC.
    fn get_index_state(
        &self,
        ctx: &RequestContext,
        request: GetIndexStateRequest,
    ) -> BoxFuture<'_, Result<GetIndexStateResponse>>;

    /// `GetIndexBuildProgress` RPC.
    fn get_index_build_progress(
        &self,
        ctx: &RequestContext,
        request: GetIndexBuildProgressRequest,
    ) -> BoxFuture<'_, Result<GetIndexBuildProgressResponse>>;
}
