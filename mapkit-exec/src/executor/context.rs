use std::time::Instant;

use mapkit_core::{
    dispatch, Branches, Fault, Flow, Frame, HttpResponse, Invocation, RequestBuilder,
};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::executor::endpoint::UrlContext;
use crate::executor::events::Event;
use crate::executor::request::to_parts;
use crate::executor::runtime::Runtime;
use crate::executor::sanitize::{sanitize_headers, sanitize_url};

/// Everything one running map sees: the shared runtime and its own [`Frame`].
#[derive(Debug)]
pub struct MapContext {
    runtime: Runtime,
    invocation_id: Uuid,
    frame: Frame,
}

impl MapContext {
    pub fn new(runtime: Runtime, map: &str, invocation: Invocation) -> Self {
        Self {
            runtime,
            invocation_id: Uuid::new_v4(),
            frame: Frame::new(map, invocation),
        }
    }

    pub fn invocation_id(&self) -> Uuid {
        self.invocation_id
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn frame_mut(&mut self) -> &mut Frame {
        &mut self.frame
    }

    pub(crate) fn into_frame(self) -> Frame {
        self.frame
    }

    pub fn input(&self) -> &JsonValue {
        self.frame.input()
    }

    pub fn input_field(&self, name: &str) -> &JsonValue {
        self.frame.input_field(name)
    }

    pub fn parameters(&self) -> &JsonValue {
        self.frame.parameters()
    }

    pub fn security(&self) -> &JsonValue {
        self.frame.security()
    }

    pub fn assign(&mut self, name: &str, partial: JsonValue) {
        self.frame.assign(name, partial);
    }

    pub fn var(&self, name: &str) -> Option<&JsonValue> {
        self.frame.var(name)
    }

    pub fn lookup(&self, path: &str) -> Option<&JsonValue> {
        self.frame.lookup(path)
    }

    pub fn set_data(&mut self, partial: JsonValue) {
        self.frame.set_data(partial);
    }

    pub fn set_error(&mut self, partial: JsonValue) {
        self.frame.set_error(partial);
    }

    /// Diagnostic output. Never affects the outcome.
    pub async fn debug(&self, message: &str, payload: JsonValue) {
        tracing::debug!(map = self.frame.map(), %payload, "{message}");
        self.runtime
            .emit(Event::Debug {
                invocation_id: self.invocation_id,
                message: message.to_string(),
                payload,
            })
            .await;
    }

    pub fn request(&self, method: &str, path: &str) -> RequestBuilder {
        RequestBuilder::new(method, path)
    }

    /// Resolve, encode and send a request, returning the raw response.
    pub async fn send(&self, builder: RequestBuilder) -> Result<HttpResponse, Fault> {
        let req = builder.build()?;
        let url = self.runtime.urls().resolve(
            &req.path,
            &UrlContext {
                parameters: self.frame.parameters(),
                security: self.frame.security(),
                service: req.service.as_deref(),
            },
        )?;
        let parts = to_parts(&req, url)?;

        let sensitive = &self.runtime.config().sensitive_headers;
        let shown_url = sanitize_url(&parts.url, sensitive);
        tracing::debug!(
            map = self.frame.map(),
            method = %parts.method,
            url = %shown_url,
            "sending request"
        );
        self.runtime
            .emit(Event::RequestSent {
                invocation_id: self.invocation_id,
                method: parts.method.clone(),
                url: shown_url,
                headers: sanitize_headers(&parts.headers, sensitive),
            })
            .await;

        let http = &self.runtime.config().http;
        let started = Instant::now();
        let resp = self
            .runtime
            .http()
            .send(parts, http.timeout, http.max_response_bytes)
            .await?;
        let duration_ms = started.elapsed().as_millis() as u64;

        tracing::debug!(
            map = self.frame.map(),
            status = resp.status,
            duration_ms,
            "response received"
        );
        self.runtime
            .emit(Event::ResponseReceived {
                invocation_id: self.invocation_id,
                status: resp.status,
                duration_ms,
            })
            .await;
        Ok(resp)
    }

    /// Run the first matching branch against this invocation's frame.
    pub async fn dispatch(
        &mut self,
        resp: &HttpResponse,
        branches: Branches<'_>,
    ) -> Result<Flow, Fault> {
        let dispatched = dispatch(resp, branches, &mut self.frame);
        self.report_replacements().await;
        let dispatched = dispatched?;

        self.runtime
            .emit(Event::BranchMatched {
                invocation_id: self.invocation_id,
                status: resp.status,
                branch: dispatched.branch,
            })
            .await;
        Ok(dispatched.flow)
    }

    /// [`send`](Self::send) followed by [`dispatch`](Self::dispatch).
    pub async fn fetch(
        &mut self,
        builder: RequestBuilder,
        branches: Branches<'_>,
    ) -> Result<Flow, Fault> {
        let resp = self.send(builder).await?;
        self.dispatch(&resp, branches).await
    }

    pub(crate) async fn report_replacements(&mut self) {
        for (variable, r) in self.frame.take_replacements() {
            tracing::debug!(
                map = self.frame.map(),
                variable = %variable,
                pointer = %r.pointer,
                "structured value replaced by a list or scalar"
            );
            self.runtime
                .emit(Event::ValueReplaced {
                    invocation_id: self.invocation_id,
                    variable,
                    pointer: r.pointer,
                })
                .await;
        }
    }
}
