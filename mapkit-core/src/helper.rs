use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::Value as JsonValue;

use crate::error::{Fault, MapFailure};

/// Plain `{data, error}` record returned by a helper (sub-map) invocation.
///
/// The caller has to look at the error before using the data. Reading the data of a
/// failed helper whose error nobody inspected is a [`Fault::UncheckedHelperError`].
#[derive(Debug)]
#[must_use = "helper errors must be checked"]
pub struct HelperResult {
    helper: String,
    data: Option<JsonValue>,
    error: Option<JsonValue>,
    checked: AtomicBool,
}

impl HelperResult {
    pub fn new(helper: &str, data: Option<JsonValue>, error: Option<JsonValue>) -> Self {
        Self {
            helper: helper.to_string(),
            data,
            error,
            checked: AtomicBool::new(false),
        }
    }

    pub fn helper(&self) -> &str {
        &self.helper
    }

    /// Inspect the error. Counts as handling it.
    pub fn error(&self) -> Option<&JsonValue> {
        self.checked.store(true, Ordering::Relaxed);
        self.error.as_ref()
    }

    pub fn is_error(&self) -> bool {
        self.error().is_some()
    }

    pub fn data(&self) -> Result<Option<&JsonValue>, Fault> {
        self.ensure_checked()?;
        Ok(self.data.as_ref())
    }

    pub fn into_data(self) -> Result<Option<JsonValue>, Fault> {
        self.ensure_checked()?;
        Ok(self.data)
    }

    /// Re-raise the helper's error as the caller's own structured error.
    pub fn propagate(self) -> Result<Option<JsonValue>, MapFailure> {
        match self.error {
            Some(error) => Err(MapFailure::Error(error)),
            None => Ok(self.data),
        }
    }

    /// Treat a helper error as fatal.
    pub fn require(self) -> Result<Option<JsonValue>, Fault> {
        match self.error {
            Some(error) => Err(Fault::HelperFailed {
                helper: self.helper,
                error,
            }),
            None => Ok(self.data),
        }
    }

    /// Take both halves; the caller handles the error explicitly.
    pub fn into_parts(self) -> (Option<JsonValue>, Option<JsonValue>) {
        (self.data, self.error)
    }

    fn ensure_checked(&self) -> Result<(), Fault> {
        match &self.error {
            Some(error) if !self.checked.load(Ordering::Relaxed) => {
                Err(Fault::UncheckedHelperError {
                    helper: self.helper.clone(),
                    error: error.clone(),
                })
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn successful_helper_data_is_usable_directly() {
        let r = HelperResult::new("page", Some(json!({"items": []})), None);
        assert_eq!(r.data().unwrap(), Some(&json!({"items": []})));
    }

    #[test]
    fn unchecked_error_faults_on_use() {
        let r = HelperResult::new("page", None, Some(json!({"title": "nope"})));
        let fault = r.data().unwrap_err();
        assert!(matches!(fault, Fault::UncheckedHelperError { ref helper, .. } if helper == "page"));
    }

    #[test]
    fn checked_error_allows_data_access() {
        let r = HelperResult::new("page", None, Some(json!({"title": "nope"})));
        assert!(r.is_error());
        assert_eq!(r.data().unwrap(), None);
    }

    #[test]
    fn propagate_turns_error_into_failure() {
        let r = HelperResult::new("page", None, Some(json!({"title": "nope"})));
        assert_eq!(
            r.propagate(),
            Err(MapFailure::Error(json!({"title": "nope"})))
        );
    }

    #[test]
    fn require_turns_error_into_fault() {
        let r = HelperResult::new("page", None, Some(json!("x")));
        assert!(matches!(r.require(), Err(Fault::HelperFailed { .. })));
    }
}
