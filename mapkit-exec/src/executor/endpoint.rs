use std::collections::BTreeMap;

use mapkit_core::request::scalar_string;
use mapkit_core::Fault;
use serde_json::Value as JsonValue;

/// What URL resolution may look at besides the path template.
#[derive(Debug, Clone, Copy)]
pub struct UrlContext<'a> {
    pub parameters: &'a JsonValue,
    pub security: &'a JsonValue,
    pub service: Option<&'a str>,
}

/// Turns a path template into an absolute endpoint.
pub trait UrlResolver: Send + Sync {
    fn resolve(&self, path_template: &str, ctx: &UrlContext<'_>) -> Result<url::Url, Fault>;
}

/// Resolves against named service base URLs.
///
/// `{name}` placeholders in the path are filled from the invocation parameters,
/// percent-encoded. A `?query` or `#fragment` suffix of the template is kept as the
/// URL's query or fragment. A template that is already absolute is used as is.
#[derive(Debug, Clone, Default)]
pub struct ServiceUrlResolver {
    services: BTreeMap<String, url::Url>,
    default_service: Option<String>,
}

impl ServiceUrlResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_service(mut self, name: &str, base_url: &str) -> Result<Self, Fault> {
        let url = url::Url::parse(base_url)
            .map_err(|e| Fault::UrlResolution(format!("invalid base url for `{name}`: {e}")))?;
        if self.default_service.is_none() {
            self.default_service = Some(name.to_string());
        }
        self.services.insert(name.to_string(), url);
        Ok(self)
    }

    pub fn with_default(mut self, name: &str) -> Self {
        self.default_service = Some(name.to_string());
        self
    }

    pub fn services(&self) -> impl Iterator<Item = (&str, &url::Url)> {
        self.services.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl UrlResolver for ServiceUrlResolver {
    fn resolve(&self, path_template: &str, ctx: &UrlContext<'_>) -> Result<url::Url, Fault> {
        let path = fill_template(path_template, ctx.parameters)?;
        if path.starts_with("http://") || path.starts_with("https://") {
            return url::Url::parse(&path).map_err(|e| Fault::UrlResolution(e.to_string()));
        }

        let service = ctx
            .service
            .or(self.default_service.as_deref())
            .ok_or_else(|| Fault::UrlResolution("no service selected".to_string()))?;
        let base = self
            .services
            .get(service)
            .ok_or_else(|| Fault::UrlResolution(format!("unknown service `{service}`")))?;

        let (rest, fragment) = match path.split_once('#') {
            Some((rest, fragment)) => (rest, Some(fragment)),
            None => (path.as_str(), None),
        };
        let (path, query) = match rest.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (rest, None),
        };

        let mut url = base.clone();
        let joined = format!(
            "{}/{}",
            base.path().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        url.set_path(&joined);
        if query.is_some() {
            url.set_query(query);
        }
        url.set_fragment(fragment);
        Ok(url)
    }
}

fn fill_template(template: &str, parameters: &JsonValue) -> Result<String, Fault> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let end = after
            .find('}')
            .ok_or_else(|| Fault::UrlResolution(format!("unclosed placeholder in `{template}`")))?;
        let name = after[..end].trim();
        let value = parameters
            .get(name)
            .and_then(scalar_string)
            .ok_or_else(|| Fault::UrlResolution(format!("missing path parameter `{name}`")))?;
        out.push_str(&urlencoding::encode(&value));
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}
