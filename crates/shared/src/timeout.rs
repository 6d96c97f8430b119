//! Deadline helpers with cancellation awareness.

use crate::concurrency::cancelled_error;
use crate::{ErrorClass, ErrorCode, ErrorEnvelope, RequestContext, Result};
use std::future::Future;
use std::time::Duration;

/// Apply a deadline to a single call, honoring request cancellation.
///
/// A call that outlives `timeout` reports a retriable `core:timeout` error; a
/// cancelled context wins over both the call and the deadline.
pub async fn timeout_with_context<T, F>(
    ctx: &RequestContext,
    timeout: Duration,
    operation: &'static str,
    fut: F,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    ctx.ensure_not_cancelled(operation)?;

    tokio::select! {
        biased;
        () = ctx.cancelled() => Err(cancelled_error(operation, ctx.correlation_id())),
        res = tokio::time::timeout(timeout, fut) => {
            res.unwrap_or_else(|_| Err(timeout_error(operation, timeout)))
        }
    }
}

fn timeout_error(operation: &'static str, timeout: Duration) -> ErrorEnvelope {
    ErrorEnvelope::unexpected(
        ErrorCode::timeout(),
        format!("operation timed out: {operation}"),
        ErrorClass::Retriable,
    )
    .with_metadata("operation", operation)
    .with_metadata("timeout_ms", timeout.as_millis().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn timeout_triggers() {
        let ctx = RequestContext::new_request();
        let fut = async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            Ok::<_, ErrorEnvelope>(())
        };

        let error = timeout_with_context(&ctx, Duration::from_millis(10), "describe_index", fut)
            .await
            .expect_err("deadline exceeded");
        assert!(error.is_timeout());
        assert!(error.class.is_retriable());
        assert_eq!(error.metadata_value("timeout_ms"), Some("10"));
    }

    #[tokio::test(start_paused = true)]
    async fn fast_calls_pass_through() -> Result<()> {
        let ctx = RequestContext::new_request();
        let value =
            timeout_with_context(&ctx, Duration::from_secs(1), "search", async { Ok(7_u32) })
                .await?;
        assert_eq!(value, 7);
        Ok(())
    }

    #[tokio::test]
    async fn cancellation_triggers() {
        let ctx = RequestContext::new_request();
        let token = ctx.cancellation_token();
        let fut = async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            Ok::<_, ErrorEnvelope>(())
        };

        let task = tokio::spawn(async move {
            timeout_with_context(&ctx, Duration::from_millis(200), "test_cancel", fut).await
        });

        tokio::task::yield_now().await;
        token.cancel();
        let result = task.await.expect("join");
        assert!(result.is_err_and(|error| error.is_cancelled()));
    }

    #[tokio::test]
    async fn already_cancelled_context_short_circuits() {
        let ctx = RequestContext::new_request();
        ctx.cancel();
        let result = timeout_with_context(&ctx, Duration::from_secs(1), "search", async {
            Ok::<_, ErrorEnvelope>(())
        })
        .await;
        assert!(result.is_err_and(|error| error.is_cancelled()));
    }
}
