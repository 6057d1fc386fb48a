use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{Fault, MapFailure};
use crate::helper::HelperResult;
use crate::merge::Replacement;
use crate::outcome::Outcome;
use crate::scope::Scope;

static NULL: JsonValue = JsonValue::Null;

/// The `{input, parameters, security}` triple an invocation is started with.
///
/// `parameters` and `security` are provider-scoped configuration resolved by the host;
/// the runtime only forwards them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Invocation {
    #[serde(default)]
    pub input: JsonValue,
    #[serde(default)]
    pub parameters: JsonValue,
    #[serde(default)]
    pub security: JsonValue,
}

impl Invocation {
    pub fn new(input: JsonValue) -> Self {
        Self {
            input,
            ..Self::default()
        }
    }

    pub fn with_parameters(mut self, parameters: JsonValue) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_security(mut self, security: JsonValue) -> Self {
        self.security = security;
        self
    }
}

/// Environment of one invocation: the read-only triple plus its own scope and outcome.
///
/// Every nested helper call gets a fresh frame.
#[derive(Debug, Clone)]
pub struct Frame {
    map: String,
    invocation: Invocation,
    scope: Scope,
    outcome: Outcome,
    replacements: Vec<(String, Replacement)>,
}

impl Frame {
    pub fn new(map: impl Into<String>, invocation: Invocation) -> Self {
        Self {
            map: map.into(),
            invocation,
            scope: Scope::new(),
            outcome: Outcome::new(),
            replacements: Vec::new(),
        }
    }

    pub fn map(&self) -> &str {
        &self.map
    }

    pub fn input(&self) -> &JsonValue {
        &self.invocation.input
    }

    /// Field of the input object, `Null` when absent.
    pub fn input_field(&self, name: &str) -> &JsonValue {
        self.invocation.input.get(name).unwrap_or(&NULL)
    }

    pub fn parameters(&self) -> &JsonValue {
        &self.invocation.parameters
    }

    pub fn security(&self) -> &JsonValue {
        &self.invocation.security
    }

    pub fn invocation(&self) -> &Invocation {
        &self.invocation
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    pub fn outcome_mut(&mut self) -> &mut Outcome {
        &mut self.outcome
    }

    /// Merge `partial` into the variable `name`.
    pub fn assign(&mut self, name: &str, partial: JsonValue) {
        for r in self.scope.assign(name, partial) {
            self.replacements.push((name.to_string(), r));
        }
    }

    pub fn var(&self, name: &str) -> Option<&JsonValue> {
        self.scope.get(name)
    }

    /// Dotted-path read through the scope, see [`Scope::lookup`].
    pub fn lookup(&self, path: &str) -> Option<&JsonValue> {
        self.scope.lookup(path)
    }

    pub fn set_data(&mut self, partial: JsonValue) {
        self.outcome.set_data(partial);
    }

    pub fn set_error(&mut self, partial: JsonValue) {
        self.outcome.set_error(partial);
    }

    pub fn terminate(&mut self) {
        self.outcome.terminate();
    }

    /// Structure-by-list/scalar replacements seen since the last call.
    pub fn take_replacements(&mut self) -> Vec<(String, Replacement)> {
        std::mem::take(&mut self.replacements)
    }

    pub fn finish(self) -> Result<JsonValue, MapFailure> {
        self.outcome.finish(&self.map)
    }

    pub fn into_helper_result(self) -> Result<HelperResult, Fault> {
        self.outcome.into_helper_result(&self.map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn invocation_deserializes_with_missing_parts() {
        let inv: Invocation = serde_json::from_value(json!({"input": {"a": 1}})).unwrap();
        assert_eq!(inv.input, json!({"a": 1}));
        assert_eq!(inv.parameters, JsonValue::Null);
    }

    #[test]
    fn frame_records_replacements_per_variable() {
        let mut f = Frame::new("m", Invocation::default());
        f.assign("body", json!({"items": {"a": 1}}));
        f.assign("body", json!({"items": [1, 2]}));
        let r = f.take_replacements();
        assert_eq!(r.len(), 1);
        assert_eq!(r[0].0, "body");
        assert_eq!(r[0].1.pointer, "/items");
        assert!(f.take_replacements().is_empty());
    }

    #[test]
    fn input_field_defaults_to_null() {
        let f = Frame::new("m", Invocation::new(json!({"city": "Prague"})));
        assert_eq!(f.input_field("city"), &json!("Prague"));
        assert_eq!(f.input_field("zip"), &JsonValue::Null);
    }
}
