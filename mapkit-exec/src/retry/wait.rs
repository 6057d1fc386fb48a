use std::time::{Duration, SystemTime};

use mapkit_core::request::Headers;

use crate::retry::config::WaitHint;

/// The first wait a response asks for, going through `hints` in order.
///
/// Points in time already past count as no wait at all.
pub fn server_wait(headers: &Headers, hints: &[WaitHint], now: SystemTime) -> Option<Duration> {
    hints.iter().find_map(|hint| hint_wait(headers, hint, now))
}

fn hint_wait(headers: &Headers, hint: &WaitHint, now: SystemTime) -> Option<Duration> {
    match hint {
        WaitHint::RetryAfter => {
            let v = header(headers, "retry-after")?;
            match v.parse::<u64>() {
                Ok(secs) => Some(Duration::from_secs(secs)),
                Err(_) => httpdate::parse_http_date(v).ok().map(|at| until(at, now)),
            }
        }
        WaitHint::DelaySeconds(name) => header(headers, name)?.parse().ok().map(Duration::from_secs),
        WaitHint::ResetAt(name) => {
            let secs: u64 = header(headers, name)?.parse().ok()?;
            Some(until(SystemTime::UNIX_EPOCH + Duration::from_secs(secs), now))
        }
    }
}

fn until(at: SystemTime, now: SystemTime) -> Duration {
    at.duration_since(now).unwrap_or(Duration::ZERO)
}

fn header<'a>(headers: &'a Headers, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .and_then(|(_, v)| v.first())
        .map(|v| v.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(name: &str, value: &str) -> Headers {
        let mut h = Headers::new();
        h.insert(name.to_string(), vec![value.to_string()]);
        h
    }

    const RETRY_AFTER: &[WaitHint] = &[WaitHint::RetryAfter];

    #[test]
    fn retry_after_seconds_and_date() {
        let now = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        assert_eq!(
            server_wait(&headers("Retry-After", " 7 "), RETRY_AFTER, now),
            Some(Duration::from_secs(7))
        );
        let at = httpdate::fmt_http_date(now + Duration::from_secs(30));
        assert_eq!(
            server_wait(&headers("retry-after", &at), RETRY_AFTER, now),
            Some(Duration::from_secs(30))
        );
        let past = httpdate::fmt_http_date(now - Duration::from_secs(30));
        assert_eq!(
            server_wait(&headers("retry-after", &past), RETRY_AFTER, now),
            Some(Duration::ZERO)
        );
    }

    #[test]
    fn reset_header_is_relative_to_now() {
        let hints = vec![
            WaitHint::RetryAfter,
            WaitHint::ResetAt("x-ratelimit-reset".to_string()),
        ];
        let now = SystemTime::UNIX_EPOCH + Duration::from_secs(1000);
        assert_eq!(
            server_wait(&headers("X-RateLimit-Reset", "1012"), &hints, now),
            Some(Duration::from_secs(12))
        );
        assert_eq!(server_wait(&Headers::new(), &hints, now), None);
    }

    #[test]
    fn earlier_hint_wins() {
        let mut h = headers("Retry-After", "3");
        h.insert("x-wait".to_string(), vec!["9".to_string()]);
        let hints = vec![WaitHint::DelaySeconds("x-wait".to_string()), WaitHint::RetryAfter];
        assert_eq!(
            server_wait(&h, &hints, SystemTime::now()),
            Some(Duration::from_secs(9))
        );
    }
}
