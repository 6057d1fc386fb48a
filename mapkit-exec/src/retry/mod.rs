mod client;
mod config;
mod decision;
mod wait;

pub use client::RetryingHttpClient;
pub use config::{RetryConfig, WaitHint};
pub use decision::{decide_retry, AttemptOutcome, RetryDecision, RetryReason};
pub use wait::server_wait;
