use serde_json::Value as JsonValue;

use crate::error::Fault;
use crate::request::Headers;

/// Response as received from the transport. Read-only to the runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Headers,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers
            .entry(name.to_string())
            .or_default()
            .push(value.to_string());
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_json(self, body: &JsonValue) -> Self {
        self.with_header("Content-Type", "application/json")
            .with_body(body.to_string())
    }

    pub fn header_values(&self, name: &str) -> Vec<&str> {
        header_values(&self.headers, name)
    }

    /// All `Content-Type` values joined with `, `, if any.
    pub fn content_type(&self) -> Option<String> {
        let values = self.header_values("content-type");
        if values.is_empty() {
            None
        } else {
            Some(values.join(", "))
        }
    }
}

pub(crate) fn header_values<'a>(headers: &'a Headers, name: &str) -> Vec<&'a str> {
    headers
        .iter()
        .filter(|(k, _)| k.eq_ignore_ascii_case(name))
        .flat_map(|(_, v)| v.iter().map(String::as_str))
        .collect()
}

/// How a branch expects the body to be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Json,
    Text,
    Bytes,
    /// Pick from the response's own content type, never failing.
    Sniff,
}

impl BodyKind {
    pub fn for_media_type(media: &str) -> Self {
        let m = media.to_ascii_lowercase();
        if m.contains("json") {
            BodyKind::Json
        } else if m.starts_with("text/") || m.contains("xml") || m.contains("urlencoded") {
            BodyKind::Text
        } else {
            BodyKind::Bytes
        }
    }

    fn name(self) -> &'static str {
        match self {
            BodyKind::Json => "json",
            BodyKind::Text => "text",
            BodyKind::Bytes => "bytes",
            BodyKind::Sniff => "any",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Empty,
    Json(JsonValue),
    Text(String),
    Bytes(Vec<u8>),
}

impl Body {
    /// The body as a value. Bytes become a list of numbers.
    pub fn to_value(&self) -> JsonValue {
        match self {
            Body::Empty => JsonValue::Null,
            Body::Json(v) => v.clone(),
            Body::Text(s) => JsonValue::String(s.clone()),
            Body::Bytes(b) => JsonValue::Array(b.iter().map(|x| JsonValue::from(*x)).collect()),
        }
    }

    pub fn as_json(&self) -> Option<&JsonValue> {
        match self {
            Body::Json(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Body::Text(s) => Some(s),
            _ => None,
        }
    }
}

pub fn decode_body(resp: &HttpResponse, kind: BodyKind) -> Result<Body, Fault> {
    if resp.body.is_empty() {
        return Ok(Body::Empty);
    }
    match kind {
        BodyKind::Json => serde_json::from_slice(&resp.body)
            .map(Body::Json)
            .map_err(|e| Fault::Decode {
                expected: kind.name().to_string(),
                message: e.to_string(),
            }),
        BodyKind::Text => String::from_utf8(resp.body.clone())
            .map(Body::Text)
            .map_err(|e| Fault::Decode {
                expected: kind.name().to_string(),
                message: e.to_string(),
            }),
        BodyKind::Bytes => Ok(Body::Bytes(resp.body.clone())),
        BodyKind::Sniff => Ok(sniff(resp)),
    }
}

fn sniff(resp: &HttpResponse) -> Body {
    let declared = resp
        .content_type()
        .map(|ct| BodyKind::for_media_type(&ct))
        .unwrap_or(BodyKind::Text);
    if declared == BodyKind::Json {
        if let Ok(v) = serde_json::from_slice(&resp.body) {
            return Body::Json(v);
        }
    }
    match std::str::from_utf8(&resp.body) {
        Ok(s) if declared != BodyKind::Bytes => Body::Text(s.to_string()),
        _ => Body::Bytes(resp.body.clone()),
    }
}

static NULL: JsonValue = JsonValue::Null;

/// What a dispatch handler sees: status, headers and the decoded body.
#[derive(Debug, Clone)]
pub struct ResponseView<'a> {
    pub status: u16,
    pub headers: &'a Headers,
    pub body: Body,
}

impl<'a> ResponseView<'a> {
    pub fn header(&self, name: &str) -> Option<&'a str> {
        header_values(self.headers, name).into_iter().next()
    }

    /// JSON body, or `Null` when the body is not JSON.
    pub fn json(&self) -> &JsonValue {
        self.body.as_json().unwrap_or(&NULL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_decode_failure_is_a_fault() {
        let resp = HttpResponse::new(200)
            .with_header("Content-Type", "application/json")
            .with_body("{not json");
        assert!(matches!(
            decode_body(&resp, BodyKind::Json),
            Err(Fault::Decode { .. })
        ));
    }

    #[test]
    fn sniff_prefers_declared_json() {
        let resp = HttpResponse::new(200).with_json(&json!({"ok": true}));
        assert_eq!(
            decode_body(&resp, BodyKind::Sniff).unwrap(),
            Body::Json(json!({"ok": true}))
        );
    }

    #[test]
    fn sniff_falls_back_to_text() {
        let resp = HttpResponse::new(500)
            .with_header("Content-Type", "application/json")
            .with_body("Internal Server Error");
        assert_eq!(
            decode_body(&resp, BodyKind::Sniff).unwrap(),
            Body::Text("Internal Server Error".to_string())
        );
    }

    #[test]
    fn sniff_keeps_binary_as_bytes() {
        let resp = HttpResponse::new(200)
            .with_header("Content-Type", "image/png")
            .with_body(vec![0x89, 0x50]);
        assert_eq!(
            decode_body(&resp, BodyKind::Sniff).unwrap(),
            Body::Bytes(vec![0x89, 0x50])
        );
    }

    #[test]
    fn empty_body_decodes_to_empty() {
        let resp = HttpResponse::new(204).with_header("Content-Type", "application/json");
        assert_eq!(decode_body(&resp, BodyKind::Json).unwrap(), Body::Empty);
        assert_eq!(Body::Empty.to_value(), JsonValue::Null);
    }

    #[test]
    fn repeated_content_type_values_are_joined() {
        let resp = HttpResponse::new(200)
            .with_header("content-type", "text/plain")
            .with_header("Content-Type", "charset=utf-8");
        assert_eq!(
            resp.content_type().as_deref(),
            Some("charset=utf-8, text/plain")
        );
    }
}
