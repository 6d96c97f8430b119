//! Index lifecycle calls.

use crate::client::{MilvusClient, log_outcome};
use milvus_client_adapters::{
    MilvusErrorContext, create_index_request, decode_describe_index, decode_index_build_progress,
    decode_index_state_response, decode_status, describe_index_request, drop_index_request,
    get_index_build_progress_request, get_index_state_request,
};
use milvus_client_domain::{
    CreateIndexParams, IndexBuildProgress, IndexInfo, IndexStateReport, IndexTarget,
};
use milvus_client_shared::{RequestContext, Result};
use std::time::Instant;

impl MilvusClient {
    /// Create an index on a field.
    pub async fn create_index(
        &self,
        ctx: &RequestContext,
        params: &CreateIndexParams,
    ) -> Result<()> {
        const OPERATION: &str = "create_index";
        let target = params.target();
        let started_at = Instant::now();
        log_start(ctx, OPERATION, target);

        let result = async {
            ctx.ensure_not_cancelled(OPERATION)?;
            let request = create_index_request(self.config().database(), params)?;
            let status = self
                .invoke(ctx, OPERATION, self.transport().create_index(ctx, request))
                .await?;
            decode_status(&status, &error_context(OPERATION, target))
        }
        .await;

        log_outcome(ctx, OPERATION, target.collection(), started_at, result)
    }

    /// Describe the indexes matching `target`.
    pub async fn describe_index(
        &self,
        ctx: &RequestContext,
        target: &IndexTarget,
    ) -> Result<Vec<IndexInfo>> {
        const OPERATION: &str = "describe_index";
        let started_at = Instant::now();
        log_start(ctx, OPERATION, target);

        let result = async {
            ctx.ensure_not_cancelled(OPERATION)?;
            let request = describe_index_request(self.config().database(), target);
            let response = self
                .invoke(ctx, OPERATION, self.transport().describe_index(ctx, request))
                .await?;
            decode_describe_index(response, &error_context(OPERATION, target))
        }
        .await;

        log_outcome(ctx, OPERATION, target.collection(), started_at, result)
    }

    /// Drop the index addressed by `target`.
    pub async fn drop_index(&self, ctx: &RequestContext, target: &IndexTarget) -> Result<()> {
        const OPERATION: &str = "drop_index";
        let started_at = Instant::now();
        log_start(ctx, OPERATION, target);

        let result = async {
            ctx.ensure_not_cancelled(OPERATION)?;
            let request = drop_index_request(self.config().database(), target);
            let status = self
                .invoke(ctx, OPERATION, self.transport().drop_index(ctx, request))
                .await?;
            decode_status(&status, &error_context(OPERATION, target))
        }
        .await;

        log_outcome(ctx, OPERATION, target.collection(), started_at, result)
    }

    /// Current build state of an index.
    pub async fn get_index_state(
        &self,
        ctx: &RequestContext,
        target: &IndexTarget,
    ) -> Result<IndexStateReport> {
        const OPERATION: &str = "get_index_state";
        let started_at = Instant::now();
        log_start(ctx, OPERATION, target);

        let result = async {
            ctx.ensure_not_cancelled(OPERATION)?;
            let request = get_index_state_request(self.config().database(), target);
            let response = self
                .invoke(ctx, OPERATION, self.transport().get_index_state(ctx, request))
                .await?;
            decode_index_state_response(response, &error_context(OPERATION, target))
        }
        .await;

        log_outcome(ctx, OPERATION, target.collection(), started_at, result)
    }

    /// Rows indexed so far for an index.
    pub async fn get_index_build_progress(
        &self,
        ctx: &RequestContext,
        target: &IndexTarget,
    ) -> Result<IndexBuildProgress> {
        const OPERATION: &str = "get_index_build_progress";
        let started_at = Instant::now();
        log_start(ctx, OPERATION, target);

        let result = async {
            ctx.ensure_not_cancelled(OPERATION)?;
            let request = get_index_build_progress_request(self.config().database(), target);
            let response = self
                .invoke(
                    ctx,
                    OPERATION,
                    self.transport().get_index_build_progress(ctx, request),
                )
                .await?;
            decode_index_build_progress(&response, &error_context(OPERATION, target))
        }
        .await;

        log_outcome(ctx, OPERATION, target.collection(), started_at, result)
    }
}

fn error_context(operation: &'static str, target: &IndexTarget) -> MilvusErrorContext {
    MilvusErrorContext::new(operation, target.collection())
}

fn log_start(ctx: &RequestContext, operation: &'static str, target: &IndexTarget) {
    tracing::debug!(
        operation,
        collection = target.collection(),
        field = target.field(),
        index_name = target.wire_index_name(),
        correlation_id = ctx.correlation_id().as_str(),
        "milvus index call started"
    );
}
