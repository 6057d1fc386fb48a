use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use mapkit_core::HttpResponse;

use crate::executor::http::{HttpClient, HttpError, HttpRequestParts};
use crate::retry::config::RetryConfig;
use crate::retry::decision::{decide_retry, AttemptOutcome, RetryDecision};

/// Transport decorator that repeats a request on retryable statuses and transient
/// network errors. Maps never see the intermediate attempts.
pub struct RetryingHttpClient<C> {
    inner: C,
    config: RetryConfig,
}

impl<C: HttpClient> RetryingHttpClient<C> {
    pub fn new(inner: C, config: RetryConfig) -> Self {
        Self { inner, config }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for RetryingHttpClient<C> {
    async fn send(
        &self,
        req: HttpRequestParts,
        timeout: Duration,
        max_response_bytes: usize,
    ) -> Result<HttpResponse, HttpError> {
        let mut attempt_no = 1;
        loop {
            let result = self
                .inner
                .send(req.clone(), timeout, max_response_bytes)
                .await;
            let outcome = match &result {
                Ok(resp) => AttemptOutcome::Status {
                    status: resp.status,
                    headers: &resp.headers,
                },
                Err(e) if e.is_transient() => AttemptOutcome::TransientError,
                Err(_) => AttemptOutcome::Error,
            };
            let decision = decide_retry(
                &self.config,
                attempt_no,
                outcome,
                SystemTime::now(),
                || fastrand::u64(..),
            );
            match decision {
                RetryDecision::Stop { .. } => return result,
                RetryDecision::RetryAfter { delay, reason } => {
                    tracing::debug!(
                        url = %req.url,
                        attempt = attempt_no,
                        delay_ms = delay.as_millis() as u64,
                        ?reason,
                        "retrying request"
                    );
                    tokio::time::sleep(delay).await;
                    attempt_no += 1;
                }
            }
        }
    }
}
