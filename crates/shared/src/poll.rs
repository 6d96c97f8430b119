//! Poll-until-done driver for long-running server-side operations.
//!
//! A single sequential loop per call: probe, return when the probe reports
//! completion, otherwise report progress and sleep. The sleep races the
//! request's cancellation token; the cumulative deadline is checked between
//! probes, never inside one.

use crate::concurrency::cancelled_error;
use crate::{ErrorClass, ErrorCode, ErrorEnvelope, RequestContext, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Delay between probes when none is configured.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Scheduling options for a polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    /// Delay between two probes. A zero interval falls back to the default.
    pub interval: Duration,
    /// Cumulative deadline measured from the first probe; `None` polls until
    /// done or cancelled.
    pub timeout: Option<Duration>,
}

impl PollOptions {
    /// Options with an explicit interval and optional deadline.
    #[must_use]
    pub const fn new(interval: Duration, timeout: Option<Duration>) -> Self {
        Self { interval, timeout }
    }

    /// Replace the interval.
    #[must_use]
    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set a cumulative deadline.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Interval actually slept between probes.
    #[must_use]
    pub fn effective_interval(&self) -> Duration {
        if self.interval.is_zero() {
            DEFAULT_POLL_INTERVAL
        } else {
            self.interval
        }
    }
}

impl Default for PollOptions {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL, None)
    }
}

/// Outcome of a single probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStep<T> {
    /// The operation finished; the value is returned to the caller.
    Ready(T),
    /// Still running; the value is reported as progress.
    Pending(T),
}

impl<T> PollStep<T> {
    /// Build a step from a `(done, value)` pair.
    pub fn from_probe(done: bool, value: T) -> Self {
        if done {
            Self::Ready(value)
        } else {
            Self::Pending(value)
        }
    }
}

/// Poll `probe` until it reports [`PollStep::Ready`], discarding progress.
pub async fn poll_until<T, P, Fut>(
    ctx: &RequestContext,
    operation: &'static str,
    failure_message: &str,
    options: PollOptions,
    probe: P,
) -> Result<T>
where
    P: FnMut() -> Fut,
    Fut: Future<Output = Result<PollStep<T>>>,
{
    poll_until_with_progress(ctx, operation, failure_message, options, probe, |_| {}).await
}

/// Poll `probe` until it reports [`PollStep::Ready`].
///
/// Every pending value is handed to `on_progress` once, in probe order; the
/// ready value is only returned. Probe errors propagate unchanged. When the
/// deadline passes the error is `core:timeout` with `failure_message` as its
/// message, and a fired cancellation token yields `core:cancelled` instead.
pub async fn poll_until_with_progress<T, P, Fut, S>(
    ctx: &RequestContext,
    operation: &'static str,
    failure_message: &str,
    options: PollOptions,
    mut probe: P,
    mut on_progress: S,
) -> Result<T>
where
    P: FnMut() -> Fut,
    Fut: Future<Output = Result<PollStep<T>>>,
    S: FnMut(T),
{
    let interval = options.effective_interval();
    let started = Instant::now();
    let mut attempts: u64 = 0;

    loop {
        ctx.ensure_not_cancelled(operation)?;
        attempts += 1;
        match probe().await? {
            PollStep::Ready(value) => return Ok(value),
            PollStep::Pending(value) => on_progress(value),
        }

        ctx.ensure_not_cancelled(operation)?;
        let elapsed = started.elapsed();
        let wait = match options.timeout {
            Some(timeout) if elapsed >= timeout => {
                return Err(poll_timeout_error(
                    operation,
                    failure_message,
                    elapsed,
                    timeout,
                    attempts,
                ));
            },
            Some(timeout) => interval.min(timeout.saturating_sub(elapsed)),
            None => interval,
        };

        tokio::select! {
            biased;
            () = ctx.cancelled() => return Err(cancelled_error(operation, ctx.correlation_id())),
            () = tokio::time::sleep(wait) => {}
        }
    }
}

fn poll_timeout_error(
    operation: &'static str,
    failure_message: &str,
    elapsed: Duration,
    timeout: Duration,
    attempts: u64,
) -> ErrorEnvelope {
    ErrorEnvelope::unexpected(ErrorCode::timeout(), failure_message, ErrorClass::Retriable)
        .with_metadata("operation", operation)
        .with_metadata("elapsed_ms", elapsed.as_millis().to_string())
        .with_metadata("timeout_ms", timeout.as_millis().to_string())
        .with_metadata("attempts", attempts.to_string())
}
