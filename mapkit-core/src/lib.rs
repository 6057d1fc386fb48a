#![forbid(unsafe_code)]

//! Execution contract shared by every use-case integration map.
//!
//! This crate is pure and synchronous: merging partial values, the per-invocation
//! scope and outcome, request descriptors, response dispatch and the pagination page
//! model. Transport and orchestration live in `mapkit-exec`.

pub mod dispatch;
pub mod error;
pub mod frame;
pub mod helper;
pub mod merge;
pub mod outcome;
pub mod pagination;
pub mod request;
pub mod response;
pub mod scope;

pub use crate::dispatch::{dispatch, Branches, ContentTypeMatch, Dispatched, Flow, StatusMatch};
pub use crate::error::{Fault, MapFailure};
pub use crate::frame::{Frame, Invocation};
pub use crate::helper::HelperResult;
pub use crate::merge::{merge, merge_into, merge_reporting, Replacement};
pub use crate::outcome::Outcome;
pub use crate::pagination::{Page, PageRequest, Paginated, PaginationConfig, Pager};
pub use crate::request::{encode_body, BodyEncoding, HttpRequest, QueryValue, RequestBuilder};
pub use crate::response::{decode_body, Body, BodyKind, HttpResponse, ResponseView};
pub use crate::scope::Scope;
