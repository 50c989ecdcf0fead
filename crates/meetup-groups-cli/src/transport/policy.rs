//! Fixed-delay reconnect policy.

use crate::transport::TransportError;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Default pause between connection attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(3);

/// Retry with a fixed delay, optionally capped at `max_attempts`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub delay: Duration,
    /// `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::unbounded(DEFAULT_RETRY_DELAY)
    }
}

impl ReconnectPolicy {
    pub fn unbounded(delay: Duration) -> Self {
        Self {
            delay,
            max_attempts: None,
        }
    }

    pub fn bounded(delay: Duration, max_attempts: u32) -> Self {
        Self {
            delay,
            max_attempts: Some(max_attempts.max(1)),
        }
    }

    /// Whether attempt number `attempt` (1-based) may run.
    pub fn allows(&self, attempt: u32) -> bool {
        self.max_attempts.map_or(true, |max| attempt <= max)
    }

    /// Run `op` until it succeeds or the policy gives up.
    pub async fn retry<T, F, Fut>(&self, what: &str, mut op: F) -> Result<T, TransportError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        let mut attempt = 1;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    if !self.allows(attempt + 1) {
                        return Err(TransportError::AttemptsExhausted {
                            what: what.to_string(),
                            attempts: attempt,
                            last_error: format!("{e:#}"),
                        });
                    }
                    warn!(attempt, delay_ms = self.delay.as_millis() as u64, "{what} failed: {e:#}, retrying");
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_allows() {
        let policy = ReconnectPolicy::bounded(Duration::ZERO, 3);
        assert!(policy.allows(1));
        assert!(policy.allows(3));
        assert!(!policy.allows(4));
        assert!(ReconnectPolicy::default().allows(u32::MAX));
        assert_eq!(ReconnectPolicy::bounded(Duration::ZERO, 0).max_attempts, Some(1));
    }

    #[tokio::test]
    async fn test_retry_until_success() {
        let calls = AtomicU32::new(0);
        let policy = ReconnectPolicy::unbounded(Duration::ZERO);
        let value = policy
            .retry("connect", |attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt < 3 {
                        anyhow::bail!("refused");
                    }
                    Ok(attempt)
                }
            })
            .await
            .unwrap();
        assert_eq!(value, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up() {
        let policy = ReconnectPolicy::bounded(Duration::ZERO, 2);
        let err = policy
            .retry("connect", |_| async { Err::<(), _>(anyhow::anyhow!("refused")) })
            .await
            .unwrap_err();
        match err {
            TransportError::AttemptsExhausted {
                attempts,
                last_error,
                ..
            } => {
                assert_eq!(attempts, 2);
                assert!(last_error.contains("refused"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
