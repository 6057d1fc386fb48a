//! Ordered guard cascade that routes a response to its handling branch.
//!
//! Branches are tried strictly in declaration order and the first whose status and
//! content-type guards both hold runs. A catch-all registered with
//! [`Branches::otherwise`] is always tried last.

use std::fmt;

use crate::error::Fault;
use crate::frame::Frame;
use crate::response::{decode_body, BodyKind, HttpResponse, ResponseView};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusMatch {
    Exact(u16),
    Any,
}

impl StatusMatch {
    pub fn matches(self, status: u16) -> bool {
        match self {
            StatusMatch::Exact(s) => s == status,
            StatusMatch::Any => true,
        }
    }
}

impl From<u16> for StatusMatch {
    fn from(s: u16) -> Self {
        StatusMatch::Exact(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentTypeMatch {
    Any,
    /// Case-insensitive substring of any `Content-Type` value.
    Media(String),
}

impl ContentTypeMatch {
    pub fn matches(&self, resp: &HttpResponse) -> bool {
        match self {
            ContentTypeMatch::Any => true,
            ContentTypeMatch::Media(m) => {
                let needle = m.to_ascii_lowercase();
                resp.header_values("content-type")
                    .iter()
                    .any(|v| v.to_ascii_lowercase().contains(&needle))
            }
        }
    }

    fn body_kind(&self) -> BodyKind {
        match self {
            ContentTypeMatch::Any => BodyKind::Sniff,
            ContentTypeMatch::Media(m) => BodyKind::for_media_type(m),
        }
    }
}

impl From<&str> for ContentTypeMatch {
    fn from(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() || s == "*" {
            ContentTypeMatch::Any
        } else {
            ContentTypeMatch::Media(s.to_string())
        }
    }
}

/// Whether the map body should keep going after a handler ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Return,
}

impl Flow {
    pub fn is_return(self) -> bool {
        self == Flow::Return
    }
}

pub type Handler<'h> =
    Box<dyn FnMut(&ResponseView<'_>, &mut Frame) -> Result<Flow, Fault> + Send + 'h>;

struct Branch<'h> {
    status: StatusMatch,
    content_type: ContentTypeMatch,
    handler: Handler<'h>,
}

impl fmt::Debug for Branch<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Branch")
            .field("status", &self.status)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
pub struct Branches<'h> {
    branches: Vec<Branch<'h>>,
    fallback: Option<Branch<'h>>,
}

impl<'h> Branches<'h> {
    pub fn new() -> Self {
        Self {
            branches: Vec::new(),
            fallback: None,
        }
    }

    pub fn on<F>(
        mut self,
        status: impl Into<StatusMatch>,
        content_type: impl Into<ContentTypeMatch>,
        handler: F,
    ) -> Self
    where
        F: FnMut(&ResponseView<'_>, &mut Frame) -> Result<Flow, Fault> + Send + 'h,
    {
        self.branches.push(Branch {
            status: status.into(),
            content_type: content_type.into(),
            handler: Box::new(handler),
        });
        self
    }

    /// Catch-all for any status and content type. Replaces a previous catch-all.
    pub fn otherwise<F>(mut self, handler: F) -> Self
    where
        F: FnMut(&ResponseView<'_>, &mut Frame) -> Result<Flow, Fault> + Send + 'h,
    {
        self.fallback = Some(Branch {
            status: StatusMatch::Any,
            content_type: ContentTypeMatch::Any,
            handler: Box::new(handler),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.branches.len() + usize::from(self.fallback.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Which branch ran and what it asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatched {
    /// Position in evaluation order; the catch-all comes after every `on` branch.
    pub branch: usize,
    pub flow: Flow,
}

pub fn dispatch(
    resp: &HttpResponse,
    branches: Branches<'_>,
    frame: &mut Frame,
) -> Result<Dispatched, Fault> {
    let Branches {
        branches,
        fallback,
    } = branches;

    for (index, mut b) in branches.into_iter().chain(fallback).enumerate() {
        if !b.status.matches(resp.status) || !b.content_type.matches(resp) {
            continue;
        }
        let view = ResponseView {
            status: resp.status,
            headers: &resp.headers,
            body: decode_body(resp, b.content_type.body_kind())?,
        };
        let flow = (b.handler)(&view, frame)?;
        if flow.is_return() {
            frame.terminate();
        }
        return Ok(Dispatched {
            branch: index,
            flow,
        });
    }

    Err(Fault::UnexpectedResponse {
        status: resp.status,
        content_type: resp.content_type(),
    })
}
