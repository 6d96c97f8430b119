//! Wait until an index build finishes.

use crate::client::{MilvusClient, duration_ms};
use milvus_client_domain::{IndexBuildProgress, IndexTarget};
use milvus_client_shared::{
    CorrelationId, PollOptions, PollStep, RequestContext, Result, poll_until_with_progress,
};
use std::time::Instant;

const OPERATION: &str = "wait_for_index_build";

impl MilvusClient {
    /// Poll build progress until every row is indexed.
    ///
    /// Each incomplete progress reading is handed to `on_progress` in order.
    /// Probe failures end the wait with that error; the deadline in `options`
    /// ends it with a `core:timeout` error naming the index and collection.
    ///
    /// The wait runs under its own `wait_*` correlation id and shares the
    /// caller's cancellation.
    pub async fn wait_for_index_build<S>(
        &self,
        ctx: &RequestContext,
        target: &IndexTarget,
        options: PollOptions,
        mut on_progress: S,
    ) -> Result<IndexBuildProgress>
    where
        S: FnMut(IndexBuildProgress),
    {
        let started_at = Instant::now();
        let failure_message = timeout_message(target);
        let wait_ctx = ctx.child(CorrelationId::new_wait_id());
        let wait_ctx = &wait_ctx;
        let mut attempt: u64 = 0;

        tracing::debug!(
            operation = OPERATION,
            collection = target.collection(),
            correlation_id = ctx.correlation_id().as_str(),
            wait_id = wait_ctx.correlation_id().as_str(),
            "waiting for index build"
        );

        let result = poll_until_with_progress(
            wait_ctx,
            OPERATION,
            &failure_message,
            options,
            move || async move {
                self.get_index_build_progress(wait_ctx, target)
                    .await
                    .map(|progress| PollStep::from_probe(progress.is_complete(), progress))
            },
            |progress| {
                attempt += 1;
                tracing::debug!(
                    operation = OPERATION,
                    collection = target.collection(),
                    wait_id = wait_ctx.correlation_id().as_str(),
                    attempt,
                    indexed_rows = progress.indexed_rows(),
                    total_rows = progress.total_rows(),
                    "index build in progress"
                );
                on_progress(progress);
            },
        )
        .await;

        let duration_ms = duration_ms(started_at);
        match &result {
            Ok(progress) => tracing::info!(
                operation = OPERATION,
                collection = target.collection(),
                index_name = target.wire_index_name(),
                total_rows = progress.total_rows(),
                duration_ms,
                "index build complete"
            ),
            Err(error) if error.is_timeout() || error.is_cancelled() => tracing::warn!(
                operation = OPERATION,
                collection = target.collection(),
                index_name = target.wire_index_name(),
                duration_ms,
                code = %error.code,
                "index build wait ended early"
            ),
            Err(_) => {},
        }
        result
    }
}

fn timeout_message(target: &IndexTarget) -> String {
    target.index_name().map_or_else(
        || {
            format!(
                "Timeout when waiting for index on collection '{}' to build",
                target.collection()
            )
        },
        |index_name| {
            format!(
                "Timeout when waiting for index '{index_name}' on collection '{}' to build",
                target.collection()
            )
        },
    )
}
