//! Retry with exponential backoff for transient store failures
//!
//! Only errors the store reports as retryable are retried; logic and
//! validation errors surface immediately.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

use crate::error::StoreError;

/// Configuration for retry behavior
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts (not including the initial attempt)
    pub max_retries: u32,
    /// Initial backoff duration before first retry
    pub initial_backoff: Duration,
    /// Maximum backoff duration
    pub max_backoff: Duration,
    /// Backoff multiplier for exponential backoff
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(10),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Calculate backoff duration for a given attempt
    fn backoff_duration(&self, attempt: u32) -> Duration {
        let backoff = self.initial_backoff.as_millis() as f64
            * self.backoff_multiplier.powi(attempt as i32);
        Duration::from_millis(backoff as u64).min(self.max_backoff)
    }
}

/// Run a store operation, retrying transient failures per the policy
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    operation: &str,
    mut f: F,
) -> Result<T, StoreError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, StoreError>>,
{
    let mut attempt = 0;
    loop {
        match f().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt < policy.max_retries => {
                let backoff = policy.backoff_duration(attempt);
                log::warn!(
                    target: "ledgerweb::store",
                    "{} failed (attempt {}/{}), retrying in {:?}: {}",
                    operation,
                    attempt + 1,
                    policy.max_retries,
                    backoff,
                    err
                );
                sleep(backoff).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn quick_policy() -> RetryPolicy {
        RetryPolicy {
            max_retries: 3,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(5),
            backoff_multiplier: 2.0,
        }
    }

    #[tokio::test]
    async fn test_transient_error_is_retried_until_success() {
        let calls = AtomicU32::new(0);
        let result = with_retry(&quick_policy(), "insert", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(StoreError::Transient { message: "connection reset".into() })
                } else {
                    Ok(42u32)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_retryable_error_fails_immediately() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, _> = with_retry(&quick_policy(), "update", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(StoreError::NotFound { id: "ent-9:missing".into() }) }
        })
        .await;

        assert!(matches!(result, Err(StoreError::NotFound { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retries_are_bounded() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, _> = with_retry(&quick_policy(), "insert", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(StoreError::Transient { message: "still down".into() }) }
        })
        .await;

        assert!(matches!(result, Err(StoreError::Transient { .. })));
        // Initial attempt plus max_retries
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_backoff_is_capped() {
        let policy = RetryPolicy {
            max_retries: 10,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_millis(400),
            backoff_multiplier: 2.0,
        };
        assert_eq!(policy.backoff_duration(0), Duration::from_millis(100));
        assert_eq!(policy.backoff_duration(1), Duration::from_millis(200));
        assert_eq!(policy.backoff_duration(5), Duration::from_millis(400));
    }
}
