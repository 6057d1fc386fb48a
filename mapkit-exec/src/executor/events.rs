use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};
use uuid::Uuid;

use mapkit_core::request::Headers;

#[derive(Debug, Clone)]
pub enum Event {
    InvocationStarted {
        invocation_id: Uuid,
        map: String,
        helper: bool,
    },
    InvocationFinished {
        invocation_id: Uuid,
        map: String,
        result: InvocationResult,
    },
    RequestSent {
        invocation_id: Uuid,
        method: String,
        url: String,
        headers: Headers,
    },
    ResponseReceived {
        invocation_id: Uuid,
        status: u16,
        duration_ms: u64,
    },
    BranchMatched {
        invocation_id: Uuid,
        status: u16,
        branch: usize,
    },
    ValueReplaced {
        invocation_id: Uuid,
        variable: String,
        pointer: String,
    },
    PageFetched {
        invocation_id: Uuid,
        page: usize,
        items: usize,
    },
    PaginationCapped {
        invocation_id: Uuid,
        pages: usize,
    },
    Debug {
        invocation_id: Uuid,
        message: String,
        payload: JsonValue,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationResult {
    Success,
    Failure,
    Fault,
}

impl InvocationResult {
    pub fn as_str(self) -> &'static str {
        match self {
            InvocationResult::Success => "success",
            InvocationResult::Failure => "failure",
            InvocationResult::Fault => "fault",
        }
    }
}

impl Event {
    pub fn invocation_id(&self) -> Uuid {
        match self {
            Event::InvocationStarted { invocation_id, .. }
            | Event::InvocationFinished { invocation_id, .. }
            | Event::RequestSent { invocation_id, .. }
            | Event::ResponseReceived { invocation_id, .. }
            | Event::BranchMatched { invocation_id, .. }
            | Event::ValueReplaced { invocation_id, .. }
            | Event::PageFetched { invocation_id, .. }
            | Event::PaginationCapped { invocation_id, .. }
            | Event::Debug { invocation_id, .. } => *invocation_id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Event::InvocationStarted { .. } => "invocation.started",
            Event::InvocationFinished { .. } => "invocation.finished",
            Event::RequestSent { .. } => "request.sent",
            Event::ResponseReceived { .. } => "response.received",
            Event::BranchMatched { .. } => "branch.matched",
            Event::ValueReplaced { .. } => "value.replaced",
            Event::PageFetched { .. } => "page.fetched",
            Event::PaginationCapped { .. } => "pagination.capped",
            Event::Debug { .. } => "debug",
        }
    }

    pub fn to_json(&self) -> JsonValue {
        let payload = match self {
            Event::InvocationStarted { map, helper, .. } => {
                json!({ "map": map, "helper": helper })
            }
            Event::InvocationFinished { map, result, .. } => {
                json!({ "map": map, "result": result.as_str() })
            }
            Event::RequestSent {
                method,
                url,
                headers,
                ..
            } => json!({ "method": method, "url": url, "headers": headers }),
            Event::ResponseReceived {
                status,
                duration_ms,
                ..
            } => json!({ "status": status, "duration_ms": duration_ms }),
            Event::BranchMatched { status, branch, .. } => {
                json!({ "status": status, "branch": branch })
            }
            Event::ValueReplaced {
                variable, pointer, ..
            } => json!({ "variable": variable, "pointer": pointer }),
            Event::PageFetched { page, items, .. } => json!({ "page": page, "items": items }),
            Event::PaginationCapped { pages, .. } => json!({ "pages": pages }),
            Event::Debug {
                message, payload, ..
            } => json!({ "message": message, "payload": payload }),
        };
        json!({
            "type": self.kind(),
            "invocation_id": self.invocation_id().to_string(),
            "payload": payload,
        })
    }
}

/// Best-effort diagnostic sink. Emitting never fails the invocation.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn emit(&self, event: Event);
}

pub struct CompositeEventSink {
    sinks: Vec<Box<dyn EventSink>>,
}

impl Default for CompositeEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl CompositeEventSink {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn add(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }
}

#[async_trait]
impl EventSink for CompositeEventSink {
    async fn emit(&self, event: Event) {
        for sink in &self.sinks {
            sink.emit(event.clone()).await;
        }
    }
}

/// Writes one JSON object per line to stdout.
pub struct StdoutEventSink;

#[async_trait]
impl EventSink for StdoutEventSink {
    async fn emit(&self, event: Event) {
        println!("{}", serde_json::to_string(&event.to_json()).unwrap_or_default());
    }
}

/// Forwards events to `tracing` at debug level.
pub struct TracingEventSink;

#[async_trait]
impl EventSink for TracingEventSink {
    async fn emit(&self, event: Event) {
        let json = event.to_json();
        tracing::debug!(
            target: "mapkit::events",
            kind = event.kind(),
            invocation_id = %event.invocation_id(),
            payload = %json["payload"],
            "event"
        );
    }
}

pub struct NoOpEventSink;

#[async_trait]
impl EventSink for NoOpEventSink {
    async fn emit(&self, _event: Event) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_shape_carries_kind_and_id() {
        let id = Uuid::new_v4();
        let v = Event::PageFetched {
            invocation_id: id,
            page: 2,
            items: 10,
        }
        .to_json();
        assert_eq!(v["type"], "page.fetched");
        assert_eq!(v["invocation_id"], id.to_string());
        assert_eq!(v["payload"]["items"], 10);
    }
}
