use serde_json::Value as JsonValue;

use crate::error::{Fault, MapFailure};
use crate::helper::HelperResult;
use crate::merge::merge_into;

/// The single result of one map invocation.
///
/// Setting data or an error never stops the map body by itself; early return is the
/// separate [`Outcome::terminate`] action.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outcome {
    data: Option<JsonValue>,
    error: Option<JsonValue>,
    terminated: bool,
}

impl Outcome {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a partial success value into `data`.
    pub fn set_data(&mut self, partial: JsonValue) {
        accumulate(&mut self.data, partial);
    }

    /// Merge a partial structured error into `error`.
    pub fn set_error(&mut self, partial: JsonValue) {
        accumulate(&mut self.error, partial);
    }

    pub fn data(&self) -> Option<&JsonValue> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&JsonValue> {
        self.error.as_ref()
    }

    pub fn terminate(&mut self) {
        self.terminated = true;
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    pub fn is_set(&self) -> bool {
        self.data.is_some() || self.error.is_some()
    }

    /// Close a top-level invocation. An error, if set, wins over data.
    pub fn finish(self, map: &str) -> Result<JsonValue, MapFailure> {
        match (self.data, self.error) {
            (_, Some(error)) => Err(MapFailure::Error(error)),
            (Some(data), None) => Ok(data),
            (None, None) => Err(MapFailure::Fault(Fault::OutcomeUnset {
                map: map.to_string(),
            })),
        }
    }

    /// Close a helper invocation into the plain `{data, error}` record.
    pub fn into_helper_result(self, map: &str) -> Result<HelperResult, Fault> {
        if !self.is_set() {
            return Err(Fault::OutcomeUnset {
                map: map.to_string(),
            });
        }
        Ok(HelperResult::new(map, self.data, self.error))
    }
}

fn accumulate(slot: &mut Option<JsonValue>, partial: JsonValue) {
    match slot {
        Some(existing) => merge_into(existing, partial),
        None => *slot = Some(partial),
    }
}
