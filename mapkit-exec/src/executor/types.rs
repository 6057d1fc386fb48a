use std::time::Duration;

use mapkit_core::PaginationConfig;

use crate::executor::sanitize::SensitiveHeadersConfig;

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub timeout: Duration,
    pub max_response_bytes: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_response_bytes: 4 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    pub http: HttpConfig,
    pub pagination: PaginationConfig,
    pub sensitive_headers: SensitiveHeadersConfig,
}
