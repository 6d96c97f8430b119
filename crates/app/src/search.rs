//! Vector similarity search.

use crate::client::{MilvusClient, log_outcome};
use milvus_client_adapters::{MilvusErrorContext, build_search_request, decode_search_results};
use milvus_client_domain::{SearchParameters, SearchResults};
use milvus_client_shared::{RequestContext, Result};
use std::time::Instant;

const OPERATION: &str = "search";

impl MilvusClient {
    /// Run a search and decode its hits.
    ///
    /// The guarantee timestamp is derived from the client clock at call time,
    /// using the configured graceful time for bounded reads.
    pub async fn search(
        &self,
        ctx: &RequestContext,
        params: &SearchParameters,
    ) -> Result<SearchResults> {
        let started_at = Instant::now();
        tracing::debug!(
            operation = OPERATION,
            collection = params.collection(),
            nq = params.nq(),
            top_k = params.top_k(),
            correlation_id = ctx.correlation_id().as_str(),
            "milvus search started"
        );

        let result = async {
            ctx.ensure_not_cancelled(OPERATION)?;
            let request =
                build_search_request(params, self.config().graceful_time(), self.clock().now())?;
            let response = self
                .invoke(ctx, OPERATION, self.transport().search(ctx, request))
                .await?;
            decode_search_results(
                response,
                &MilvusErrorContext::new(OPERATION, params.collection()),
            )
        }
        .await;

        log_outcome(ctx, OPERATION, params.collection(), started_at, result)
    }
}
