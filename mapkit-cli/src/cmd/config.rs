use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use mapkit_core::PaginationConfig;
use mapkit_exec::executor::{
    EventSink, HttpConfig, NoOpEventSink, SensitiveHeadersConfig, ServiceUrlResolver,
    StdoutEventSink, TracingEventSink,
};
use mapkit_exec::{RetryConfig, RuntimeConfig};

use crate::{RetryArgs, RuntimeArgs};

/// Read a JSON or YAML document. `Ok(None)` when no path was given.
pub fn load_document(
    path: Option<&Path>,
    what: &str,
) -> Result<Option<serde_json::Value>, String> {
    let Some(path) = path else {
        return Ok(None);
    };
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {what} from {}: {e}", path.display()))?;
    if let Ok(v) = serde_json::from_str(&content) {
        return Ok(Some(v));
    }
    serde_yaml::from_str(&content)
        .map(Some)
        .map_err(|_| format!("{what} file is neither valid JSON nor YAML"))
}

pub fn merge_set_inputs(inputs: &mut Option<serde_json::Value>, set_inputs: &[String]) {
    if set_inputs.is_empty() {
        return;
    }
    let obj = inputs.get_or_insert(serde_json::json!({}));
    if let Some(map) = obj.as_object_mut() {
        for s in set_inputs {
            if let Some((k, v)) = s.split_once('=') {
                map.insert(k.to_string(), serde_json::Value::String(v.to_string()));
            }
        }
    }
}

pub fn build_runtime_config(
    runtime: &RuntimeArgs,
    secret_query_params: &[&str],
) -> RuntimeConfig {
    let sensitive_headers = secret_query_params
        .iter()
        .fold(SensitiveHeadersConfig::default(), |cfg, name| {
            cfg.redact_query_param(name)
        });
    RuntimeConfig {
        http: HttpConfig {
            timeout: Duration::from_millis(runtime.timeout),
            max_response_bytes: runtime.max_response_bytes,
        },
        pagination: PaginationConfig {
            max_pages: runtime.max_pages,
        },
        sensitive_headers,
    }
}

/// `None` when retries are off.
pub fn build_retry_config(retry: &RetryArgs) -> Option<RetryConfig> {
    let defaults = RetryConfig::default();
    let max_attempts = retry.retry_max_attempts.unwrap_or(defaults.max_attempts);
    if max_attempts <= 1 {
        return None;
    }
    let config = RetryConfig {
        max_attempts,
        max_delay: retry
            .retry_max_delay
            .map(Duration::from_millis)
            .unwrap_or(defaults.max_delay),
        ..defaults
    };
    Some(match &retry.retry_reset_header {
        Some(name) => config.with_reset_header(name.as_str()),
        None => config,
    })
}

/// Provider defaults first, then `NAME=URL` overrides in order.
pub fn build_url_resolver(
    defaults: &[(&str, &str)],
    overrides: &[String],
) -> Result<ServiceUrlResolver, String> {
    let mut resolver = ServiceUrlResolver::new();
    for (name, url) in defaults {
        resolver = resolver
            .with_service(name, url)
            .map_err(|e| e.to_string())?;
    }
    for s in overrides {
        let (name, url) = s
            .split_once('=')
            .ok_or_else(|| format!("invalid --service `{s}`, expected NAME=URL"))?;
        resolver = resolver
            .with_service(name.trim(), url.trim())
            .map_err(|e| e.to_string())?;
    }
    Ok(resolver)
}

pub fn build_event_sink(kind: &str) -> Result<Arc<dyn EventSink>, String> {
    match kind {
        "none" => Ok(Arc::new(NoOpEventSink)),
        "stdout" => Ok(Arc::new(StdoutEventSink)),
        "log" => Ok(Arc::new(TracingEventSink)),
        other => Err(format!(
            "unknown events sink `{other}`, expected none, stdout or log"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapkit_exec::executor::{UrlContext, UrlResolver};
    use mapkit_exec::retry::WaitHint;
    use serde_json::json;

    #[test]
    fn documents_load_from_json_or_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = dir.path().join("input.yaml");
        std::fs::write(&yaml, "city: Prague\nunits: metric\n").unwrap();
        assert_eq!(
            load_document(Some(yaml.as_path()), "input").unwrap(),
            Some(json!({"city": "Prague", "units": "metric"}))
        );
        assert_eq!(load_document(None, "input").unwrap(), None);

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{ not: [valid").unwrap();
        let err = load_document(Some(bad.as_path()), "security").unwrap_err();
        assert_eq!(err, "security file is neither valid JSON nor YAML");
        let missing = dir.path().join("missing.json");
        let err = load_document(Some(missing.as_path()), "input").unwrap_err();
        assert!(err.starts_with("failed to read input from"));
    }

    #[test]
    fn set_inputs_override_file_values() {
        let mut inputs = Some(json!({"city": "Prague", "units": "metric"}));
        merge_set_inputs(&mut inputs, &["city=Oslo".to_string(), "bad".to_string()]);
        assert_eq!(inputs, Some(json!({"city": "Oslo", "units": "metric"})));

        let mut none = None;
        merge_set_inputs(&mut none, &["a=1".to_string()]);
        assert_eq!(none, Some(json!({"a": "1"})));
    }

    #[test]
    fn service_override_replaces_default() {
        let r = build_url_resolver(
            &[("default", "https://api.example.com")],
            &["default=http://localhost:8080".to_string()],
        )
        .unwrap();
        let url = r
            .resolve(
                "/x",
                &UrlContext {
                    parameters: &serde_json::Value::Null,
                    security: &serde_json::Value::Null,
                    service: None,
                },
            )
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/x");
        assert!(build_url_resolver(&[], &["nope".to_string()]).is_err());
    }

    #[test]
    fn provider_secret_params_join_default_redaction() {
        let args = RuntimeArgs {
            services: vec![],
            timeout: 1500,
            max_response_bytes: 1024,
            max_pages: 10,
            events: "none".to_string(),
        };
        let cfg = build_runtime_config(&args, &["appid"]);
        assert_eq!(cfg.http.timeout, Duration::from_millis(1500));
        assert_eq!(cfg.pagination.max_pages, 10);
        assert!(cfg.sensitive_headers.query_params.contains(&"appid".to_string()));
        assert!(cfg.sensitive_headers.query_params.contains(&"api_key".to_string()));
        assert!(!build_runtime_config(&args, &[])
            .sensitive_headers
            .query_params
            .contains(&"appid".to_string()));
    }

    #[test]
    fn single_attempt_disables_retry() {
        let off = RetryArgs {
            retry_max_attempts: Some(1),
            retry_max_delay: None,
            retry_reset_header: None,
        };
        assert!(build_retry_config(&off).is_none());
        let on = RetryArgs {
            retry_max_attempts: Some(4),
            retry_max_delay: Some(250),
            retry_reset_header: Some("x-ratelimit-reset".to_string()),
        };
        let cfg = build_retry_config(&on).unwrap();
        assert_eq!(cfg.max_attempts, 4);
        assert_eq!(cfg.max_delay, Duration::from_millis(250));
        assert_eq!(
            cfg.wait_hints,
            vec![
                WaitHint::RetryAfter,
                WaitHint::ResetAt("x-ratelimit-reset".to_string())
            ]
        );
    }
}
