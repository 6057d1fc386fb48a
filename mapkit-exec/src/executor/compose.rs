//! Helper calls and bounded pagination on top of [`MapContext`].

use std::future::Future;

use mapkit_core::{
    merge, Fault, HelperResult, Invocation, MapFailure, Page, PageRequest, Paginated,
    PaginationConfig, Pager,
};
use serde_json::Value as JsonValue;

use crate::executor::context::MapContext;
use crate::executor::events::{Event, InvocationResult};
use crate::executor::provider::Map;

impl MapContext {
    /// Invoke another map as a helper with a fresh frame.
    ///
    /// Parameters and security are inherited; `input` replaces the input. Errors of the
    /// helper come back inside the [`HelperResult`], faults are returned as `Err`.
    pub async fn call_helper(
        &self,
        helper: &dyn Map,
        input: JsonValue,
    ) -> Result<HelperResult, Fault> {
        let invocation = Invocation::new(input)
            .with_parameters(self.parameters().clone())
            .with_security(self.security().clone());
        let mut child = MapContext::new(self.runtime().clone(), helper.name(), invocation);
        let child_id = child.invocation_id();
        tracing::debug!(
            parent = %self.invocation_id(),
            helper = helper.name(),
            invocation_id = %child_id,
            "calling helper"
        );
        self.runtime()
            .emit(Event::InvocationStarted {
                invocation_id: child_id,
                map: helper.name().to_string(),
                helper: true,
            })
            .await;

        let ran = helper.run(&mut child).await;
        child.report_replacements().await;
        let (result, kind) = match ran {
            Ok(()) => {
                let frame = child.into_frame();
                let kind = if frame.outcome().error().is_some() {
                    InvocationResult::Failure
                } else {
                    InvocationResult::Success
                };
                (frame.into_helper_result(), kind)
            }
            Err(MapFailure::Error(error)) => (
                Ok(HelperResult::new(helper.name(), None, Some(error))),
                InvocationResult::Failure,
            ),
            Err(MapFailure::Fault(fault)) => (Err(fault), InvocationResult::Fault),
        };
        let kind = if result.is_err() {
            InvocationResult::Fault
        } else {
            kind
        };
        self.runtime()
            .emit(Event::InvocationFinished {
                invocation_id: child_id,
                map: helper.name().to_string(),
                result: kind,
            })
            .await;
        result
    }

    /// Drain a page-fetch helper into the scope variable `into`.
    ///
    /// Each call gets `{page, cursor}` merged into `input`. The accumulated list is
    /// written to `into` once the loop ends. A helper error is propagated at once,
    /// `into` is left untouched and whatever was collected is dropped.
    pub async fn paginate(
        &mut self,
        helper: &dyn Map,
        input: JsonValue,
        into: &str,
    ) -> Result<Paginated, MapFailure> {
        let mut pager = Pager::new(&self.runtime().config().pagination);
        while let Some(req) = pager.next_request() {
            let page_no = req.page;
            let result = self
                .call_helper(helper, merge(input.clone(), req.to_value()))
                .await?;
            let page = Page::from_value(result.propagate()?.unwrap_or(JsonValue::Null))?;
            let count = page.items.len();
            let stop = pager.accept(page);

            self.runtime()
                .emit(Event::PageFetched {
                    invocation_id: self.invocation_id(),
                    page: page_no,
                    items: count,
                })
                .await;
            if stop {
                break;
            }
        }

        let paginated = pager.finish();
        self.assign(into, JsonValue::Array(paginated.items.clone()));
        self.report_replacements().await;
        if paginated.capped {
            tracing::warn!(
                map = self.frame().map(),
                pages = paginated.pages,
                items = paginated.items.len(),
                "pagination stopped at the page cap"
            );
            self.runtime()
                .emit(Event::PaginationCapped {
                    invocation_id: self.invocation_id(),
                    pages: paginated.pages,
                })
                .await;
        }
        Ok(paginated)
    }
}

/// The pagination loop without a context, over any async page source.
pub async fn paginate_with<F, Fut>(
    config: &PaginationConfig,
    mut fetch: F,
) -> Result<Paginated, MapFailure>
where
    F: FnMut(PageRequest) -> Fut,
    Fut: Future<Output = Result<HelperResult, Fault>>,
{
    let mut pager = Pager::new(config);
    while let Some(req) = pager.next_request() {
        let result = fetch(req).await?;
        let page = Page::from_value(result.propagate()?.unwrap_or(JsonValue::Null))?;
        if pager.accept(page) {
            break;
        }
    }
    let paginated = pager.finish();
    if paginated.capped {
        tracing::warn!(pages = paginated.pages, "pagination stopped at the page cap");
    }
    Ok(paginated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page(helper: &str, data: JsonValue) -> Result<HelperResult, Fault> {
        Ok(HelperResult::new(helper, Some(data), None))
    }

    #[tokio::test]
    async fn collects_until_empty_page() {
        let mut pages = vec![json!(["a", "b"]), json!(["c"]), json!([])].into_iter();
        let mut seen = Vec::new();
        let out = paginate_with(&PaginationConfig::default(), |req| {
            seen.push(req.page);
            let data = pages.next().unwrap_or(json!([]));
            async move { page("list", data) }
        })
        .await
        .unwrap();
        assert_eq!(out.items, vec![json!("a"), json!("b"), json!("c")]);
        assert_eq!(out.pages, 3);
        assert!(!out.capped);
        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn cap_returns_accumulated_items() {
        let out = paginate_with(&PaginationConfig { max_pages: 4 }, |_| async {
            page("list", json!({"items": [1], "cursor": "again"}))
        })
        .await
        .unwrap();
        assert!(out.capped);
        assert_eq!(out.pages, 4);
        assert_eq!(out.items.len(), 4);
    }

    #[tokio::test]
    async fn helper_error_discards_collected_items() {
        let mut n = 0;
        let err = paginate_with(&PaginationConfig::default(), |_| {
            n += 1;
            let result = if n == 1 {
                page("list", json!([1, 2]))
            } else {
                Ok(HelperResult::new("list", None, Some(json!({"title": "boom"}))))
            };
            async move { result }
        })
        .await
        .unwrap_err();
        assert_eq!(err, MapFailure::Error(json!({"title": "boom"})));
    }
}
