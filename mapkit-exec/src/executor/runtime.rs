use std::sync::Arc;

use crate::executor::endpoint::UrlResolver;
use crate::executor::events::{Event, EventSink, NoOpEventSink};
use crate::executor::http::HttpClient;
use crate::executor::types::RuntimeConfig;

/// Services shared by every invocation. Cloning is cheap.
#[derive(Clone)]
pub struct Runtime {
    http: Arc<dyn HttpClient>,
    urls: Arc<dyn UrlResolver>,
    events: Arc<dyn EventSink>,
    config: RuntimeConfig,
}

impl Runtime {
    pub fn new(http: Arc<dyn HttpClient>, urls: Arc<dyn UrlResolver>) -> Self {
        Self {
            http,
            urls,
            events: Arc::new(NoOpEventSink),
            config: RuntimeConfig::default(),
        }
    }

    pub fn with_config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn http(&self) -> &dyn HttpClient {
        self.http.as_ref()
    }

    pub fn urls(&self) -> &dyn UrlResolver {
        self.urls.as_ref()
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub(crate) async fn emit(&self, event: Event) {
        self.events.emit(event).await;
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
