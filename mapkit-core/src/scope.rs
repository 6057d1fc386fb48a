use serde_json::{Map, Value as JsonValue};

use crate::merge::{merge_reporting, Replacement};

/// Per-invocation variable environment.
///
/// Entries are kept in assignment order and only ever written through the merge
/// engine, so successive partial assignments to one name accumulate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scope {
    vars: Map<String, JsonValue>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `partial` into the entry `name`, creating it if absent.
    pub fn assign(&mut self, name: &str, partial: JsonValue) -> Vec<Replacement> {
        match self.vars.get_mut(name) {
            Some(existing) => merge_reporting(existing, partial),
            None => {
                self.vars.insert(name.to_string(), partial);
                Vec::new()
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&JsonValue> {
        self.vars.get(name)
    }

    /// Read a dotted path such as `page.items.0.id`. Numeric segments index lists.
    pub fn lookup(&self, path: &str) -> Option<&JsonValue> {
        let mut segments = path.split('.');
        let mut cur = self.vars.get(segments.next()?)?;
        for seg in segments {
            cur = match cur {
                JsonValue::Object(m) => m.get(seg)?,
                JsonValue::Array(a) => a.get(seg.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(cur)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.vars.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Snapshot of the whole scope as a keyed structure.
    pub fn to_value(&self) -> JsonValue {
        JsonValue::Object(self.vars.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn successive_partials_accumulate() {
        let mut scope = Scope::new();
        scope.assign("payload", json!({"to": "a@example.com"}));
        scope.assign("payload", json!({"subject": "hello"}));
        scope.assign("payload", json!({"content": {"text": "x"}}));
        assert_eq!(
            scope.get("payload"),
            Some(&json!({"to": "a@example.com", "subject": "hello", "content": {"text": "x"}}))
        );
    }

    #[test]
    fn lookup_follows_objects_and_lists() {
        let mut scope = Scope::new();
        scope.assign("page", json!({"items": [{"id": 7}], "cursor": null}));
        assert_eq!(scope.lookup("page.items.0.id"), Some(&json!(7)));
        assert_eq!(scope.lookup("page.items.1.id"), None);
        assert_eq!(scope.lookup("missing"), None);
    }

    #[test]
    fn reads_see_latest_state() {
        let mut scope = Scope::new();
        scope.assign("n", json!(1));
        assert_eq!(scope.get("n"), Some(&json!(1)));
        scope.assign("n", json!(2));
        assert_eq!(scope.get("n"), Some(&json!(2)));
    }

    #[test]
    fn names_keep_assignment_order() {
        let mut scope = Scope::new();
        scope.assign("zeta", json!(1));
        scope.assign("alpha", json!(2));
        assert_eq!(scope.names().collect::<Vec<_>>(), vec!["zeta", "alpha"]);
    }
}
