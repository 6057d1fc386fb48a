use mapkit_core::{encode_body, Fault, HttpRequest};

use crate::executor::http::HttpRequestParts;

/// Wire form of a built request against an already resolved endpoint.
///
/// Query values are appended after whatever query the endpoint carries. The body's
/// content type is only set when the map did not set one itself.
pub fn to_parts(req: &HttpRequest, mut url: url::Url) -> Result<HttpRequestParts, Fault> {
    if !req.query.is_empty() {
        let mut qp = url.query_pairs_mut();
        for (k, v) in &req.query {
            for value in v.values() {
                qp.append_pair(k, value);
            }
        }
    }

    let encoded = encode_body(req)?;
    let mut headers = req.headers.clone();
    if let Some(ct) = encoded.content_type {
        if req.header("content-type").is_none() {
            headers.insert("Content-Type".to_string(), vec![ct.to_string()]);
        }
    }

    Ok(HttpRequestParts {
        method: req.method.clone(),
        url,
        headers,
        body: encoded.bytes,
    })
}
