//! Exponential backoff retry policy for transient provider failures.

use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use http::Extensions;
use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next};
use reqwest_retry::{RetryDecision, RetryPolicy, RetryTransientMiddleware};

/// Exponential backoff retry policy.
///
/// Retries failed requests with exponentially increasing delays, capped at a maximum.
pub struct BackoffPolicy {
    max_retries: u32,
    base_delay: Duration,
    max_delay: Duration,
}

impl BackoffPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
        }
    }

    fn exponential_delay(&self, n_attempts: u32) -> Duration {
        self.base_delay
            .saturating_mul(2_u32.saturating_pow(n_attempts))
            .min(self.max_delay)
    }
}

impl RetryPolicy for BackoffPolicy {
    fn should_retry(&self, _request_start_time: SystemTime, n_past_retries: u32) -> RetryDecision {
        if n_past_retries >= self.max_retries {
            RetryDecision::DoNotRetry
        } else {
            RetryDecision::Retry {
                execute_after: SystemTime::now() + self.exponential_delay(n_past_retries),
            }
        }
    }
}

/// Retries transient failures of idempotent requests only.
///
/// POSTs (message sends, single-use code exchanges) are sent exactly once.
pub struct IdempotentRetry {
    inner: RetryTransientMiddleware<BackoffPolicy>,
}

impl IdempotentRetry {
    pub fn new(policy: BackoffPolicy) -> Self {
        Self {
            inner: RetryTransientMiddleware::new_with_policy(policy),
        }
    }
}

#[async_trait]
impl Middleware for IdempotentRetry {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        if req.method().is_idempotent() {
            self.inner.handle(req, extensions, next).await
        } else {
            next.run(req, extensions).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_doubles_per_attempt() {
        let policy = BackoffPolicy::new(3);

        assert_eq!(policy.exponential_delay(0), Duration::from_millis(200));
        assert_eq!(policy.exponential_delay(1), Duration::from_millis(400));
        assert_eq!(policy.exponential_delay(2), Duration::from_millis(800));
    }

    #[test]
    fn delay_is_capped() {
        let policy = BackoffPolicy::new(10);
        assert_eq!(policy.exponential_delay(10), policy.max_delay);
    }

    #[test]
    fn zero_retries_never_retries() {
        let policy = BackoffPolicy::new(0);
        assert!(matches!(
            policy.should_retry(SystemTime::now(), 0),
            RetryDecision::DoNotRetry
        ));
    }
}
