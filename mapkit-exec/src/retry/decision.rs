use std::time::{Duration, SystemTime};

use mapkit_core::request::Headers;

use crate::retry::config::RetryConfig;
use crate::retry::wait::server_wait;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    RetryAfter { delay: Duration, reason: RetryReason },
    Stop { reason: RetryReason },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryReason {
    NotRetryable,
    AttemptsExhausted,
    NetworkFailure,
    HttpStatus(u16),
    ServerWait,
}

/// What the transport saw on one attempt.
#[derive(Debug, Clone, Copy)]
pub enum AttemptOutcome<'a> {
    Status { status: u16, headers: &'a Headers },
    TransientError,
    Error,
}

/// Decide if we should retry and how long to wait.
///
/// - `attempt_no`: 1-based number of the attempt that just finished.
/// - `now`: time source for date-valued wait hints.
/// - `rand_u64`: RNG for full jitter.
pub fn decide_retry(
    cfg: &RetryConfig,
    attempt_no: usize,
    outcome: AttemptOutcome<'_>,
    now: SystemTime,
    rand_u64: impl Fn() -> u64,
) -> RetryDecision {
    let reason = match outcome {
        AttemptOutcome::Status { status, .. } if cfg.retry_statuses.contains(&status) => {
            RetryReason::HttpStatus(status)
        }
        AttemptOutcome::Status { status, .. } => {
            return RetryDecision::Stop {
                reason: RetryReason::HttpStatus(status),
            }
        }
        AttemptOutcome::TransientError => RetryReason::NetworkFailure,
        AttemptOutcome::Error => {
            return RetryDecision::Stop {
                reason: RetryReason::NotRetryable,
            }
        }
    };

    if attempt_no >= cfg.max_attempts.max(1) {
        return RetryDecision::Stop {
            reason: RetryReason::AttemptsExhausted,
        };
    }

    if let AttemptOutcome::Status { headers, .. } = outcome {
        if let Some(delay) = server_wait(headers, &cfg.wait_hints, now) {
            return RetryDecision::RetryAfter {
                delay: delay.min(cfg.max_delay),
                reason: RetryReason::ServerWait,
            };
        }
    }

    // Exponential backoff: base * factor^(attempt_no-1), with full jitter.
    let exp = (attempt_no.saturating_sub(1)) as i32;
    let raw = (cfg.base_delay.as_millis() as f64) * cfg.factor.powi(exp);
    let raw_ms = raw.min(cfg.max_delay.as_millis() as f64).max(0.0) as u64;

    let jitter_ms = if raw_ms == 0 { 0 } else { rand_u64() % (raw_ms + 1) };
    RetryDecision::RetryAfter {
        delay: Duration::from_millis(jitter_ms),
        reason,
    }
}
