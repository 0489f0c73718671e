//! Resilient text-generation wrapper with exponential backoff retry.
//!
//! Wraps any TextGenPort implementation with retry logic to handle transient
//! collaborator failures.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use crate::infrastructure::ports::{LlmError, TextGenPort, TextGenRequest, TextGenResponse};

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (0 = no retries, just the initial attempt)
    pub max_retries: u32,
    /// Base delay in milliseconds before first retry
    pub base_delay_ms: u64,
    /// Maximum delay in milliseconds (caps exponential growth)
    pub max_delay_ms: u64,
    /// Jitter factor (0.0-1.0) for randomizing delays to prevent thundering herd
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay_ms: 500,
            max_delay_ms: 5000,
            jitter_factor: 0.2,
        }
    }
}

/// Wrapper that adds retry logic to any text generation collaborator
pub struct ResilientTextGen {
    inner: Arc<dyn TextGenPort>,
    config: RetryConfig,
}

impl ResilientTextGen {
    /// Create a new resilient wrapper around an existing collaborator
    pub fn new(inner: Arc<dyn TextGenPort>, config: RetryConfig) -> Self {
        Self { inner, config }
    }

    /// Calculate delay for a given attempt number using exponential backoff with jitter
    fn calculate_delay(&self, attempt: u32) -> u64 {
        let base = self.config.base_delay_ms;
        // Exponential: base * 2^(attempt-1)
        let exponential = base.saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)));
        let capped = exponential.min(self.config.max_delay_ms);

        let jitter_range = (capped as f64 * self.config.jitter_factor) as i64;
        if jitter_range > 0 {
            let jitter = rand::thread_rng().gen_range(-jitter_range..=jitter_range);
            (capped as i64 + jitter).max(0) as u64
        } else {
            capped
        }
    }

    /// Determine if an error is retryable
    fn is_retryable(error: &LlmError) -> bool {
        match error {
            // Network/request failures are typically transient
            LlmError::RequestFailed(msg) => {
                // Don't retry on auth errors or bad requests
                !msg.contains("401")
                    && !msg.contains("403")
                    && !msg.contains("400")
                    && !msg.contains("Invalid")
            }
            // A malformed response may be a truncated network read
            LlmError::InvalidResponse(_) => true,
            // Nothing to retry against
            LlmError::Unavailable => false,
        }
    }
}

#[async_trait]
impl TextGenPort for ResilientTextGen {
    async fn generate(&self, request: TextGenRequest) -> Result<TextGenResponse, LlmError> {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            match self.inner.generate(request.clone()).await {
                Ok(response) => {
                    if attempt > 0 {
                        tracing::info!(attempt = attempt + 1, "text generation succeeded after retry");
                    }
                    return Ok(response);
                }
                Err(err) => {
                    if !Self::is_retryable(&err) || attempt == self.config.max_retries {
                        return Err(err);
                    }
                    let delay = self.calculate_delay(attempt + 1);
                    tracing::warn!(
                        attempt = attempt + 1,
                        delay_ms = delay,
                        error = %err,
                        "text generation failed, retrying"
                    );
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                    last_error = Some(err);
                }
            }
        }

        Err(last_error.unwrap_or(LlmError::Unavailable))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    struct FlakyTextGen {
        failures_before_success: u32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl TextGenPort for FlakyTextGen {
        async fn generate(&self, _request: TextGenRequest) -> Result<TextGenResponse, LlmError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures_before_success {
                Err(LlmError::RequestFailed("connection reset".to_string()))
            } else {
                Ok(TextGenResponse {
                    content: "ok".to_string(),
                })
            }
        }
    }

    fn no_delay_config(max_retries: u32) -> RetryConfig {
        RetryConfig {
            max_retries,
            base_delay_ms: 0,
            max_delay_ms: 0,
            jitter_factor: 0.0,
        }
    }

    #[tokio::test]
    async fn test_retries_transient_failures() {
        let inner = Arc::new(FlakyTextGen {
            failures_before_success: 2,
            calls: AtomicU32::new(0),
        });
        let resilient = ResilientTextGen::new(inner.clone(), no_delay_config(3));

        let response = resilient
            .generate(TextGenRequest::new(vec![]))
            .await
            .expect("succeeds within the retry budget");
        assert_eq!(response.content, "ok");
        assert_eq!(inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let inner = Arc::new(FlakyTextGen {
            failures_before_success: 10,
            calls: AtomicU32::new(0),
        });
        let resilient = ResilientTextGen::new(inner.clone(), no_delay_config(1));

        let result = resilient.generate(TextGenRequest::new(vec![])).await;
        assert!(result.is_err());
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_auth_failures_are_not_retried() {
        let auth_err = LlmError::RequestFailed("401 unauthorized".to_string());
        assert!(!ResilientTextGen::is_retryable(&auth_err));

        struct AuthFailGen;
        #[async_trait]
        impl TextGenPort for AuthFailGen {
            async fn generate(
                &self,
                _request: TextGenRequest,
            ) -> Result<TextGenResponse, LlmError> {
                Err(LlmError::RequestFailed("401 unauthorized".to_string()))
            }
        }

        let resilient = ResilientTextGen::new(Arc::new(AuthFailGen), no_delay_config(5));
        let result = resilient.generate(TextGenRequest::new(vec![])).await;
        assert!(matches!(result, Err(LlmError::RequestFailed(_))));
    }

    #[tokio::test]
    async fn test_unavailable_is_not_retried() {
        assert!(!ResilientTextGen::is_retryable(&LlmError::Unavailable));
    }
}
