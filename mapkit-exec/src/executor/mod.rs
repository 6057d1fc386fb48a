mod compose;
mod context;
pub mod endpoint;
pub mod events;
pub mod http;
mod provider;
mod request;
mod runtime;
pub mod sanitize;
mod types;

pub use compose::paginate_with;
pub use context::MapContext;
pub use endpoint::{ServiceUrlResolver, UrlContext, UrlResolver};
pub use events::{
    CompositeEventSink, Event, EventSink, InvocationResult, NoOpEventSink, StdoutEventSink,
    TracingEventSink,
};
pub use http::{HttpClient, HttpError, HttpRequestParts, ReqwestHttpClient};
pub use provider::{Map, Provider, ProviderBuilder, Report};
pub use request::to_parts;
pub use runtime::Runtime;
pub use sanitize::SensitiveHeadersConfig;
pub use types::{HttpConfig, RuntimeConfig};
