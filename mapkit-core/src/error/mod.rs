use serde_json::Value as JsonValue;
use thiserror::Error;

/// A contract violation or unhandled case.
///
/// Faults abort the whole invocation chain. They are never reported to the use-case
/// caller as a failure; the host sees them as the `Err` side of `run`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Fault {
    #[error("unknown use case: {use_case}")]
    UnknownUseCase { use_case: String },
    #[error("unexpected response (status {status}, content-type {content_type:?})")]
    UnexpectedResponse {
        status: u16,
        content_type: Option<String>,
    },
    #[error("error returned by helper `{helper}` was used without being checked: {error}")]
    UncheckedHelperError { helper: String, error: JsonValue },
    #[error("helper `{helper}` failed: {error}")]
    HelperFailed { helper: String, error: JsonValue },
    #[error("map `{map}` finished without setting a result or an error")]
    OutcomeUnset { map: String },
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("failed to decode response body as {expected}: {message}")]
    Decode { expected: String, message: String },
    #[error("url resolution failed: {0}")]
    UrlResolution(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("{0}")]
    Map(String),
}

impl Fault {
    /// Fault raised by map logic that hit a case it cannot express as a business error.
    pub fn map(message: impl Into<String>) -> Self {
        Self::Map(message.into())
    }
}

/// How a top-level map invocation can fail.
///
/// `Error` is the structured, business-level failure constructed by the map itself.
/// `Fault` is everything else and must keep propagating.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MapFailure {
    #[error("use case failed: {0}")]
    Error(JsonValue),
    #[error(transparent)]
    Fault(#[from] Fault),
}

impl MapFailure {
    pub fn is_fault(&self) -> bool {
        matches!(self, MapFailure::Fault(_))
    }

    /// Split into the structured error, or re-raise the fault.
    pub fn into_error(self) -> Result<JsonValue, Fault> {
        match self {
            MapFailure::Error(e) => Ok(e),
            MapFailure::Fault(f) => Err(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fault_converts_into_map_failure() {
        fn raise() -> Result<(), MapFailure> {
            Err(Fault::map("boom"))?;
            Ok(())
        }
        let err = raise().unwrap_err();
        assert!(err.is_fault());
        assert_eq!(err.into_error(), Err(Fault::Map("boom".to_string())));
    }

    #[test]
    fn structured_error_is_not_a_fault() {
        let err = MapFailure::Error(json!({"title": "Bad request"}));
        assert!(!err.is_fault());
        assert_eq!(err.into_error(), Ok(json!({"title": "Bad request"})));
    }
}
