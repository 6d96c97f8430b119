//! Client handle shared by every use case.

use milvus_client_config::ValidatedClientConfig;
use milvus_client_domain::{MetricType, SearchParameters, SearchParametersBuilder};
use milvus_client_ports::{Clock, MilvusTransport, SystemClock};
use milvus_client_shared::{PollOptions, RequestContext, Result, timeout_with_context};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

/// Entry point for search and index lifecycle calls.
///
/// The client owns no connection. Every call builds a wire request, hands it
/// to the transport, and decodes the reply. One-shot calls are bounded by the
/// configured request timeout and are never retried.
#[derive(Clone)]
pub struct MilvusClient {
    transport: Arc<dyn MilvusTransport>,
    clock: Arc<dyn Clock>,
    config: ValidatedClientConfig,
}

impl MilvusClient {
    /// Client over `transport` using the system clock.
    pub fn new(transport: Arc<dyn MilvusTransport>, config: ValidatedClientConfig) -> Self {
        Self {
            transport,
            clock: Arc::new(SystemClock),
            config,
        }
    }

    /// Replace the clock used for guarantee timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Effective configuration.
    #[must_use]
    pub const fn config(&self) -> &ValidatedClientConfig {
        &self.config
    }

    /// Polling schedule from configuration.
    #[must_use]
    pub fn index_poll_options(&self) -> PollOptions {
        self.config.index_poll_options()
    }

    /// Search builder preset with the configured database and consistency level.
    pub fn search_parameters<I, S>(
        &self,
        collection: impl Into<String>,
        vector_field: impl Into<String>,
        output_fields: I,
        metric_type: MetricType,
    ) -> SearchParametersBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SearchParameters::builder(collection, vector_field, output_fields)
            .database(self.config.database())
            .consistency_level(self.config.consistency_level())
            .metric_type(metric_type)
    }

    pub(crate) fn transport(&self) -> &dyn MilvusTransport {
        self.transport.as_ref()
    }

    pub(crate) fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Run one transport round trip under the request deadline.
    pub(crate) async fn invoke<T, F>(
        &self,
        ctx: &RequestContext,
        operation: &'static str,
        fut: F,
    ) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        timeout_with_context(ctx, self.config.request_timeout(), operation, fut).await
    }
}

impl std::fmt::Debug for MilvusClient {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("MilvusClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

pub(crate) fn duration_ms(started_at: Instant) -> u64 {
    u64::try_from(started_at.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Log the outcome of a one-shot call and hand the result back.
pub(crate) fn log_outcome<T>(
    ctx: &RequestContext,
    operation: &'static str,
    collection: &str,
    started_at: Instant,
    result: Result<T>,
) -> Result<T> {
    let duration_ms = duration_ms(started_at);
    match &result {
        Ok(_) => tracing::debug!(
            operation,
            collection,
            correlation_id = ctx.correlation_id().as_str(),
            duration_ms,
            "milvus call completed"
        ),
        Err(error) if error.is_cancelled() => tracing::debug!(
            operation,
            collection,
            correlation_id = ctx.correlation_id().as_str(),
            duration_ms,
            "milvus call aborted"
        ),
        Err(error) => tracing::debug!(
            operation,
            collection,
            correlation_id = ctx.correlation_id().as_str(),
            duration_ms,
            code = %error.code,
            "milvus call failed"
        ),
    }
    result
}
