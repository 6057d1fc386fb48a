#![forbid(unsafe_code)]

//! Runtime for executing use-case integration maps.
//!
//! The execution contract itself (merging, scope, outcome, dispatch) lives in
//! `mapkit-core`; this crate adds the transport, URL resolution, events, helper
//! composition, pagination and the per-provider entry dispatcher.

pub mod executor;
pub mod retry;

pub use crate::executor::{
    paginate_with, HttpClient, HttpConfig, Map, MapContext, Provider, Report, Runtime,
    RuntimeConfig, ServiceUrlResolver,
};
pub use crate::retry::{RetryConfig, RetryingHttpClient};
pub use mapkit_core::{Fault, Invocation, MapFailure};
