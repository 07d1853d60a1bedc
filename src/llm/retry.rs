//! Bounded retry with exponential backoff for remote model calls.

use std::future::Future;
use std::time::Duration;

use crate::error::{GraphRagError, Result};

pub const DEFAULT_MAX_ATTEMPTS: usize = 3;
pub const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: usize,
    /// Delay before the second attempt; doubled after every retry.
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_backoff: DEFAULT_INITIAL_BACKOFF,
        }
    }
}

/// Run `op` until it succeeds, fails non-transiently, or attempts run out.
///
/// `op` receives the 1-based attempt number. Transient failures
/// (`GraphRagError::is_transient`) are retried after a sleep; anything else is
/// returned immediately. Running out of attempts yields `GraphRagError::Llm`
/// carrying the last failure.
pub async fn with_backoff<T, F, Fut>(policy: RetryPolicy, mut op: F) -> Result<T>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut delay = policy.initial_backoff;
    let mut attempt = 0;

    loop {
        attempt += 1;
        match op(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    log::debug!("Model call succeeded on attempt {}", attempt);
                }
                return Ok(value);
            }
            Err(e) if e.is_transient() && attempt < max_attempts => {
                log::warn!(
                    "Retry {}/{} in {:?} after error: {}",
                    attempt,
                    max_attempts - 1,
                    delay,
                    e
                );
                tokio::time::sleep(delay).await;
                delay *= 2; // Exponential backoff
            }
            Err(e) if e.is_transient() => {
                return Err(GraphRagError::Llm(format!(
                    "Failed to get response after {} attempts: {}",
                    max_attempts, e
                )));
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    fn fast(max_attempts: usize) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            initial_backoff: Duration::from_millis(5),
        }
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.initial_backoff, Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_succeeds_after_busy_responses() {
        let start = Instant::now();
        let result = with_backoff(fast(3), |attempt| async move {
            if attempt < 3 {
                Err(GraphRagError::ModelBusy("503 Service Unavailable".into()))
            } else {
                Ok(attempt)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 3);
        // 5ms then 10ms of backoff
        assert!(start.elapsed() >= Duration::from_millis(15));
    }

    #[tokio::test]
    async fn test_non_transient_error_is_not_retried() {
        let calls = AtomicUsize::new(0);
        let result: Result<()> = with_backoff(fast(3), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(GraphRagError::Llm("API request failed with status code 401".into())) }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(result.unwrap_err().to_string().contains("401"));
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let calls = AtomicUsize::new(0);
        let result: Result<()> = with_backoff(fast(3), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(GraphRagError::Transport("connection reset".into())) }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        let err = result.unwrap_err();
        assert!(matches!(err, GraphRagError::Llm(_)));
        assert!(err.to_string().contains("after 3 attempts"));
        assert!(err.to_string().contains("connection reset"));
    }

    #[tokio::test]
    async fn test_zero_attempts_still_tries_once() {
        let calls = AtomicUsize::new(0);
        let result = with_backoff(fast(0), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, GraphRagError>("ok") }
        })
        .await;
        assert_eq!(result.unwrap(), "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
