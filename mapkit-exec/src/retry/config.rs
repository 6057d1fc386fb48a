use std::collections::BTreeSet;
use std::time::Duration;

/// How [`RetryingHttpClient`](super::RetryingHttpClient) repeats a request.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub retry_statuses: BTreeSet<u16>,
    /// Total attempts including the first one.
    pub max_attempts: usize,
    pub base_delay: Duration,
    pub factor: f64,
    pub max_delay: Duration,
    /// Server hints consulted in order before falling back to backoff.
    pub wait_hints: Vec<WaitHint>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            retry_statuses: [408u16, 429, 502, 503, 504].into_iter().collect(),
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            factor: 2.0,
            max_delay: Duration::from_secs(30),
            wait_hints: vec![WaitHint::RetryAfter],
        }
    }
}

impl RetryConfig {
    /// Also honor a rate-limit reset header carrying unix epoch seconds.
    pub fn with_reset_header(mut self, name: impl Into<String>) -> Self {
        self.wait_hints.push(WaitHint::ResetAt(name.into()));
        self
    }
}

/// A response header that tells the client how long to back off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitHint {
    /// `Retry-After`: delta seconds or an HTTP-date.
    RetryAfter,
    /// Named header holding delta seconds.
    DelaySeconds(String),
    /// Named header holding the unix time at which the limit resets.
    ResetAt(String),
}
