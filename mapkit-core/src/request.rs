use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::error::Fault;
use crate::merge::merge_into;

/// Header name to its values, in order. Repeated headers keep every value.
pub type Headers = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyEncoding {
    #[default]
    Json,
    Form,
    Raw,
}

impl BodyEncoding {
    pub fn content_type(self) -> Option<&'static str> {
        match self {
            BodyEncoding::Json => Some("application/json"),
            BodyEncoding::Form => Some("application/x-www-form-urlencoded"),
            BodyEncoding::Raw => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Single(String),
    Multi(Vec<String>),
}

impl QueryValue {
    pub fn values(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            QueryValue::Single(s) => std::slice::from_ref(s),
            QueryValue::Multi(v) => v,
        };
        slice.iter().map(String::as_str)
    }
}

/// Transport-agnostic request descriptor. The URL is still a path template; resolving
/// it against a service belongs to the runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: String,
    pub path: String,
    pub service: Option<String>,
    pub headers: Headers,
    pub query: BTreeMap<String, QueryValue>,
    pub body: Option<JsonValue>,
    pub encoding: BodyEncoding,
}

impl HttpRequest {
    pub fn builder(method: impl Into<String>, path: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(method, path)
    }

    pub fn header(&self, name: &str) -> Option<&[String]> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_slice())
    }
}

/// Accumulates a request descriptor from partial values.
///
/// `headers`, `query` and `body` are merged with the same engine as variables, so a
/// later partial only overrides the keys it names.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    method: String,
    path: String,
    service: Option<String>,
    headers: JsonValue,
    query: JsonValue,
    body: Option<JsonValue>,
    encoding: BodyEncoding,
}

impl RequestBuilder {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            service: None,
            headers: JsonValue::Object(Map::new()),
            query: JsonValue::Object(Map::new()),
            body: None,
            encoding: BodyEncoding::default(),
        }
    }

    pub fn service(mut self, selector: impl Into<String>) -> Self {
        self.service = Some(selector.into());
        self
    }

    pub fn headers(mut self, partial: JsonValue) -> Self {
        merge_into(&mut self.headers, partial);
        self
    }

    pub fn header(self, name: &str, value: impl Into<JsonValue>) -> Self {
        let mut m = Map::new();
        m.insert(name.to_string(), value.into());
        self.headers(JsonValue::Object(m))
    }

    pub fn query(mut self, partial: JsonValue) -> Self {
        merge_into(&mut self.query, partial);
        self
    }

    pub fn body(mut self, partial: JsonValue) -> Self {
        match self.body.as_mut() {
            Some(existing) => merge_into(existing, partial),
            None => self.body = Some(partial),
        }
        self
    }

    pub fn encoding(mut self, encoding: BodyEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn build(self) -> Result<HttpRequest, Fault> {
        let method = self.method.trim().to_ascii_uppercase();
        if method.is_empty() {
            return Err(Fault::InvalidRequest("empty HTTP method".to_string()));
        }

        let mut headers = Headers::new();
        for (name, value) in object_entries(self.headers, "headers")? {
            if value.is_null() {
                continue;
            }
            headers.insert(name.clone(), string_list(&value, "header", &name)?);
        }

        let mut query = BTreeMap::new();
        for (name, value) in object_entries(self.query, "query")? {
            let q = match &value {
                JsonValue::Null => continue,
                JsonValue::Array(_) => QueryValue::Multi(string_list(&value, "query", &name)?),
                other => QueryValue::Single(scalar_string(other).ok_or_else(|| {
                    Fault::InvalidRequest(format!("query parameter `{name}` is not a scalar"))
                })?),
            };
            query.insert(name, q);
        }

        Ok(HttpRequest {
            method,
            path: self.path,
            service: self.service,
            headers,
            query,
            body: self.body,
            encoding: self.encoding,
        })
    }
}

fn object_entries(v: JsonValue, what: &str) -> Result<Map<String, JsonValue>, Fault> {
    match v {
        JsonValue::Object(m) => Ok(m),
        JsonValue::Null => Ok(Map::new()),
        _ => Err(Fault::InvalidRequest(format!("{what} must be a keyed structure"))),
    }
}

fn string_list(v: &JsonValue, what: &str, name: &str) -> Result<Vec<String>, Fault> {
    let not_scalar = || Fault::InvalidRequest(format!("{what} `{name}` has a non-scalar value"));
    match v {
        JsonValue::Array(items) => items
            .iter()
            .map(|i| scalar_string(i).ok_or_else(not_scalar))
            .collect(),
        other => Ok(vec![scalar_string(other).ok_or_else(not_scalar)?]),
    }
}

/// String form of a scalar. `Null` becomes the empty string.
pub fn scalar_string(v: &JsonValue) -> Option<String> {
    match v {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        JsonValue::Null => Some(String::new()),
        JsonValue::Array(_) | JsonValue::Object(_) => None,
    }
}

/// Serialized request body and the content type implied by its encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBody {
    pub bytes: Vec<u8>,
    pub content_type: Option<&'static str>,
}

pub fn encode_body(req: &HttpRequest) -> Result<EncodedBody, Fault> {
    let Some(body) = &req.body else {
        return Ok(EncodedBody {
            bytes: Vec::new(),
            content_type: None,
        });
    };
    let bytes = match req.encoding {
        BodyEncoding::Json => serde_json::to_vec(body)
            .map_err(|e| Fault::InvalidRequest(format!("failed to serialize body: {e}")))?,
        BodyEncoding::Form => encode_form(body)?.into_bytes(),
        BodyEncoding::Raw => encode_raw(body)?,
    };
    Ok(EncodedBody {
        bytes,
        content_type: req.encoding.content_type(),
    })
}

fn encode_form(body: &JsonValue) -> Result<String, Fault> {
    let JsonValue::Object(fields) = body else {
        return Err(Fault::InvalidRequest(
            "form body must be a keyed structure".to_string(),
        ));
    };
    let mut pairs = Vec::new();
    for (k, v) in fields {
        let values = match v {
            JsonValue::Array(items) => items.iter().map(form_value).collect(),
            other => vec![form_value(other)],
        };
        for value in values {
            pairs.push(format!(
                "{}={}",
                urlencoding::encode(k),
                urlencoding::encode(&value)
            ));
        }
    }
    Ok(pairs.join("&"))
}

fn form_value(v: &JsonValue) -> String {
    scalar_string(v).unwrap_or_else(|| v.to_string())
}

fn encode_raw(body: &JsonValue) -> Result<Vec<u8>, Fault> {
    match body {
        JsonValue::String(s) => Ok(s.as_bytes().to_vec()),
        JsonValue::Array(items) => items
            .iter()
            .map(|i| {
                i.as_u64()
                    .and_then(|n| u8::try_from(n).ok())
                    .ok_or_else(|| Fault::InvalidRequest("raw body list must hold bytes".to_string()))
            })
            .collect(),
        _ => Err(Fault::InvalidRequest(
            "raw body must be a string or a list of bytes".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn partials_merge_into_body() {
        let req = HttpRequest::builder("post", "/mail/send")
            .body(json!({"personalizations": {"to": "a@example.com"}}))
            .body(json!({"personalizations": {"subject": "hi"}}))
            .body(json!({"from": "b@example.com"}))
            .build()
            .unwrap();
        assert_eq!(req.method, "POST");
        assert_eq!(
            req.body,
            Some(json!({
                "personalizations": {"to": "a@example.com", "subject": "hi"},
                "from": "b@example.com"
            }))
        );
    }

    #[test]
    fn headers_become_string_lists() {
        let req = HttpRequest::builder("GET", "/")
            .header("Accept", "application/json")
            .headers(json!({"X-Tag": ["a", "b"], "X-Count": 3}))
            .build()
            .unwrap();
        assert_eq!(req.header("accept"), Some(&["application/json".to_string()][..]));
        assert_eq!(req.headers["X-Tag"], vec!["a", "b"]);
        assert_eq!(req.headers["X-Count"], vec!["3"]);
    }

    #[test]
    fn null_header_clears_an_earlier_value() {
        let req = HttpRequest::builder("GET", "/x")
            .header("X-Trace", "t1")
            .header("Accept", "application/json")
            .headers(json!({"X-Trace": null}))
            .build()
            .unwrap();
        assert_eq!(req.header("x-trace"), None);
        assert_eq!(req.headers.len(), 1);
    }

    #[test]
    fn nested_header_value_is_rejected() {
        let err = HttpRequest::builder("GET", "/")
            .headers(json!({"X-Bad": {"a": 1}}))
            .build()
            .unwrap_err();
        assert!(matches!(err, Fault::InvalidRequest(_)));
    }

    #[test]
    fn query_keeps_lists_and_drops_nulls() {
        let req = HttpRequest::builder("GET", "/")
            .query(json!({"q": "Prague", "units": null, "id": [1, 2]}))
            .build()
            .unwrap();
        assert_eq!(req.query.get("q"), Some(&QueryValue::Single("Prague".to_string())));
        assert!(!req.query.contains_key("units"));
        assert_eq!(
            req.query["id"].values().collect::<Vec<_>>(),
            vec!["1", "2"]
        );
    }

    #[test]
    fn form_encoding_escapes_values() {
        let req = HttpRequest::builder("POST", "/")
            .encoding(BodyEncoding::Form)
            .body(json!({"To": "+420 123", "Tag": ["a", "b"]}))
            .build()
            .unwrap();
        let enc = encode_body(&req).unwrap();
        assert_eq!(String::from_utf8(enc.bytes).unwrap(), "To=%2B420%20123&Tag=a&Tag=b");
        assert_eq!(enc.content_type, Some("application/x-www-form-urlencoded"));
    }

    #[test]
    fn raw_body_accepts_text_and_bytes_only() {
        let text = HttpRequest::builder("PUT", "/")
            .encoding(BodyEncoding::Raw)
            .body(json!("hello"))
            .build()
            .unwrap();
        assert_eq!(encode_body(&text).unwrap().bytes, b"hello".to_vec());

        let bytes = HttpRequest::builder("PUT", "/")
            .encoding(BodyEncoding::Raw)
            .body(json!([104, 105]))
            .build()
            .unwrap();
        assert_eq!(encode_body(&bytes).unwrap().bytes, b"hi".to_vec());

        let bad = HttpRequest::builder("PUT", "/")
            .encoding(BodyEncoding::Raw)
            .body(json!({"a": 1}))
            .build()
            .unwrap();
        assert!(encode_body(&bad).is_err());
    }

    #[test]
    fn missing_body_encodes_empty() {
        let req = HttpRequest::builder("GET", "/").build().unwrap();
        let enc = encode_body(&req).unwrap();
        assert!(enc.bytes.is_empty());
        assert_eq!(enc.content_type, None);
    }
}
