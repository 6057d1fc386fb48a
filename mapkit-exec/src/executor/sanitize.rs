use mapkit_core::request::Headers;

const REDACTED: &str = "<redacted>";

/// Names whose values never leave the runtime through events or logs.
#[derive(Debug, Clone)]
pub struct SensitiveHeadersConfig {
    /// Lowercased header names that must always be redacted.
    pub always_redact: Vec<String>,
    /// Lowercased query parameter names that must always be redacted.
    pub query_params: Vec<String>,
}

impl Default for SensitiveHeadersConfig {
    fn default() -> Self {
        Self {
            always_redact: vec![
                "authorization".to_string(),
                "proxy-authorization".to_string(),
                "cookie".to_string(),
                "set-cookie".to_string(),
                "x-api-key".to_string(),
            ],
            query_params: vec![
                "api_key".to_string(),
                "apikey".to_string(),
                "access_token".to_string(),
                "key".to_string(),
            ],
        }
    }
}

impl SensitiveHeadersConfig {
    /// Add a query parameter that carries a credential for one particular API.
    pub fn redact_query_param(mut self, name: &str) -> Self {
        let name = name.to_ascii_lowercase();
        if !self.query_params.contains(&name) {
            self.query_params.push(name);
        }
        self
    }
}

pub fn sanitize_headers(headers: &Headers, sensitive: &SensitiveHeadersConfig) -> Headers {
    let mut out = headers.clone();
    for (name, values) in out.iter_mut() {
        if sensitive
            .always_redact
            .iter()
            .any(|s| s.eq_ignore_ascii_case(name))
        {
            for v in values.iter_mut() {
                *v = REDACTED.to_string();
            }
        }
    }
    out
}

pub fn sanitize_url(url: &url::Url, sensitive: &SensitiveHeadersConfig) -> String {
    if url.query().is_none() {
        return url.to_string();
    }
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let redact = sensitive
                .query_params
                .iter()
                .any(|s| s.eq_ignore_ascii_case(&k));
            let v = if redact { REDACTED.to_string() } else { v.into_owned() };
            (k.into_owned(), v)
        })
        .collect();
    let mut out = url.clone();
    out.query_pairs_mut().clear().extend_pairs(pairs);
    out.to_string()
}
