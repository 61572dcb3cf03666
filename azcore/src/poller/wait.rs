//! Caller-side polling loop

use serde::de::DeserializeOwned;
use std::time::Duration;

use super::AsyncOperation;
use crate::context::{Context, Interrupted};
use crate::error::OperationError;
use crate::http::Sender;

/// Cadence used by [`wait_for_completion`]
#[derive(Debug, Clone)]
pub struct PollingPolicy {
    /// Delay between polls when the service sends no `Retry-After`
    pub interval: Duration,
    /// Upper bound for any single delay
    pub max_delay: Duration,
    /// Give up with `Incomplete` after this many polls
    pub max_attempts: Option<u32>,
    /// Consecutive transient poll failures tolerated before giving up
    pub max_transient_errors: u32,
    /// First backoff after a transient failure; doubles on each repeat
    pub initial_backoff: Duration,
}

impl Default for PollingPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            max_delay: Duration::from_secs(60),
            max_attempts: None,
            max_transient_errors: 3,
            initial_backoff: Duration::from_secs(1),
        }
    }
}

impl PollingPolicy {
    /// Delay before the next poll, honouring `Retry-After` up to `max_delay`
    pub fn delay_for(&self, retry_after: Option<Duration>) -> Duration {
        retry_after
            .map_or(self.interval, |requested| requested.max(self.interval))
            .min(self.max_delay)
    }

    /// Exponential backoff for the `failures`-th consecutive transient error
    pub fn backoff_for(&self, failures: u32) -> Duration {
        let factor = 1u32 << failures.saturating_sub(1).min(16);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_delay)
    }
}

/// Drives `operation` to a terminal state and returns its result.
///
/// The context is checked before every poll and raced against every sleep.
pub async fn wait_for_completion<T, S>(
    operation: &mut AsyncOperation<T>,
    ctx: &Context,
    sender: &S,
    policy: &PollingPolicy,
) -> Result<T, OperationError>
where
    T: DeserializeOwned,
    S: Sender + ?Sized,
{
    let mut attempts = 0u32;
    let mut transient_failures = 0u32;

    loop {
        match operation.done(ctx, sender).await {
            Ok(true) => return operation.result(ctx, sender).await,
            Ok(false) => transient_failures = 0,
            Err(err) if err.is_retryable() && transient_failures < policy.max_transient_errors => {
                transient_failures += 1;
                let backoff = policy.backoff_for(transient_failures);
                tracing::warn!(
                    "Retrying poll of {} after {:?} (failure {}): {}",
                    operation.polling_url(),
                    backoff,
                    transient_failures,
                    err
                );
                pause(ctx, backoff).await?;
                continue;
            }
            Err(err) => return Err(err),
        }

        attempts += 1;
        if let Some(max_attempts) = policy.max_attempts {
            if attempts >= max_attempts {
                return Err(OperationError::Incomplete {
                    operation: operation.describe(),
                });
            }
        }

        pause(ctx, policy.delay_for(operation.polling_delay())).await?;
    }
}

async fn pause(ctx: &Context, delay: Duration) -> Result<(), OperationError> {
    tokio::select! {
        _ = ctx.done() => Err(ctx.interrupted().unwrap_or(Interrupted::Canceled).into()),
        _ = tokio::time::sleep(delay) => Ok(()),
    }
}
