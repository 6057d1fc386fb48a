//! Page model and loop state for bounded pagination.
//!
//! The loop itself is async and lives in the runtime; this module decides what to ask
//! for next and when to stop.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

use crate::error::Fault;

pub const DEFAULT_MAX_PAGES: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Hard cap on page fetches, reached only when upstream never signals the end.
    pub max_pages: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

/// One page as reported by a page-fetch helper.
///
/// A bare list is read as a page of items. A keyed structure may carry `items`, a
/// `cursor` (or `next`) for the following request, a `last` marker and a `total` count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub items: Vec<JsonValue>,
    pub cursor: Option<JsonValue>,
    pub last: bool,
    pub total: Option<usize>,
}

impl Page {
    pub fn from_value(v: JsonValue) -> Result<Self, Fault> {
        match v {
            JsonValue::Array(items) => Ok(Page {
                items,
                ..Page::default()
            }),
            JsonValue::Null => Ok(Page::default()),
            JsonValue::Object(mut m) => {
                let items = match m.remove("items") {
                    Some(JsonValue::Array(items)) => items,
                    Some(JsonValue::Null) | None => Vec::new(),
                    Some(_) => return Err(Fault::map("page `items` must be a list")),
                };
                let cursor = m
                    .remove("cursor")
                    .or_else(|| m.remove("next"))
                    .filter(|c| !c.is_null());
                let last = m.get("last").and_then(JsonValue::as_bool).unwrap_or(false);
                let total = m
                    .get("total")
                    .and_then(JsonValue::as_u64)
                    .and_then(|t| usize::try_from(t).ok());
                Ok(Page {
                    items,
                    cursor,
                    last,
                    total,
                })
            }
            _ => Err(Fault::map("page must be a list or a keyed structure")),
        }
    }
}

/// What the next page-fetch call receives.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: usize,
    pub cursor: Option<JsonValue>,
}

impl PageRequest {
    pub fn to_value(&self) -> JsonValue {
        json!({
            "page": self.page,
            "cursor": self.cursor.clone().unwrap_or(JsonValue::Null),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Paginated {
    pub items: Vec<JsonValue>,
    pub pages: usize,
    /// The cap was reached before any termination signal; `items` may be incomplete.
    pub capped: bool,
}

#[derive(Debug, Clone)]
pub struct Pager {
    max_pages: usize,
    pages: usize,
    items: Vec<JsonValue>,
    cursor: Option<JsonValue>,
    done: bool,
}

impl Pager {
    pub fn new(config: &PaginationConfig) -> Self {
        Self {
            max_pages: config.max_pages,
            pages: 0,
            items: Vec::new(),
            cursor: None,
            done: false,
        }
    }

    /// The next request, or `None` once finished or capped.
    pub fn next_request(&self) -> Option<PageRequest> {
        if self.done || self.pages >= self.max_pages {
            return None;
        }
        Some(PageRequest {
            page: self.pages + 1,
            cursor: self.cursor.clone(),
        })
    }

    /// Record a fetched page. Returns `true` when the loop should stop.
    pub fn accept(&mut self, page: Page) -> bool {
        self.pages += 1;
        let empty = page.items.is_empty();
        self.items.extend(page.items);
        self.cursor = page.cursor;
        let total_reached = page.total.is_some_and(|t| self.items.len() >= t);
        self.done = empty || page.last || total_reached;
        self.done
    }

    pub fn items(&self) -> &[JsonValue] {
        &self.items
    }

    pub fn pages(&self) -> usize {
        self.pages
    }

    pub fn finish(self) -> Paginated {
        Paginated {
            capped: !self.done,
            items: self.items,
            pages: self.pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drive(pages: Vec<JsonValue>, max_pages: usize) -> (Paginated, Vec<PageRequest>) {
        let mut pager = Pager::new(&PaginationConfig { max_pages });
        let mut source = pages.into_iter().cycle();
        let mut requests = Vec::new();
        while let Some(req) = pager.next_request() {
            requests.push(req);
            let page = Page::from_value(source.next().unwrap()).unwrap();
            if pager.accept(page) {
                break;
            }
        }
        (pager.finish(), requests)
    }

    #[test]
    fn stops_on_empty_page() {
        let (out, reqs) = drive(vec![json!(["a", "b"]), json!(["c"]), json!([])], 10);
        assert_eq!(out.items, vec![json!("a"), json!("b"), json!("c")]);
        assert_eq!(out.pages, 3);
        assert!(!out.capped);
        assert_eq!(reqs.iter().map(|r| r.page).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn stops_on_last_marker() {
        let (out, _) = drive(
            vec![json!({"items": [1], "cursor": "x"}), json!({"items": [2], "last": true})],
            10,
        );
        assert_eq!(out.items, vec![json!(1), json!(2)]);
        assert_eq!(out.pages, 2);
    }

    #[test]
    fn stops_when_total_reached() {
        let (out, _) = drive(vec![json!({"items": [1, 2], "total": 4})], 10);
        assert_eq!(out.items.len(), 4);
        assert_eq!(out.pages, 2);
        assert!(!out.capped);
    }

    #[test]
    fn cursor_is_forwarded() {
        let (_, reqs) = drive(
            vec![json!({"items": [1], "next": "abc"}), json!({"items": []})],
            10,
        );
        assert_eq!(reqs[0].cursor, None);
        assert_eq!(reqs[1].cursor, Some(json!("abc")));
        assert_eq!(reqs[1].to_value(), json!({"page": 2, "cursor": "abc"}));
    }

    #[test]
    fn cap_returns_partial_items() {
        let (out, reqs) = drive(vec![json!([1])], 5);
        assert_eq!(reqs.len(), 5);
        assert_eq!(out.items.len(), 5);
        assert!(out.capped);
    }

    #[test]
    fn malformed_page_is_rejected() {
        assert!(Page::from_value(json!("nope")).is_err());
        assert!(Page::from_value(json!({"items": 3})).is_err());
        assert_eq!(Page::from_value(JsonValue::Null).unwrap(), Page::default());
    }
}
