//! Deep merge of partial values.
//!
//! Every accumulating value in an invocation (scope entries, the outcome, request
//! headers/query/body) grows through [`merge_into`]. Keyed structures merge key by key,
//! recursively; lists and scalars always replace.

use serde_json::Value as JsonValue;

/// Merge `patch` onto `base` and return the result.
pub fn merge(mut base: JsonValue, patch: JsonValue) -> JsonValue {
    merge_into(&mut base, patch);
    base
}

/// In-place form of [`merge`].
pub fn merge_into(base: &mut JsonValue, patch: JsonValue) {
    let mut sink = None;
    merge_at(base, patch, &mut String::new(), &mut sink);
}

/// A place where a list or scalar replaced a keyed structure that was already there.
///
/// The merge itself cannot tell whether the author meant to drop the earlier fields,
/// so these are surfaced for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    /// JSON pointer of the replaced location, `""` for the root.
    pub pointer: String,
}

/// Like [`merge_into`], also reporting every [`Replacement`].
pub fn merge_reporting(base: &mut JsonValue, patch: JsonValue) -> Vec<Replacement> {
    let mut sink = Some(Vec::new());
    merge_at(base, patch, &mut String::new(), &mut sink);
    sink.unwrap_or_default()
}

fn merge_at(
    base: &mut JsonValue,
    patch: JsonValue,
    pointer: &mut String,
    replaced: &mut Option<Vec<Replacement>>,
) {
    match (base, patch) {
        (JsonValue::Object(base_map), JsonValue::Object(patch_map)) => {
            for (key, value) in patch_map {
                match base_map.get_mut(&key) {
                    Some(existing) => {
                        let len = pointer.len();
                        pointer.push('/');
                        pointer.push_str(&escape_token(&key));
                        merge_at(existing, value, pointer, replaced);
                        pointer.truncate(len);
                    }
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, patch) => {
            if let Some(out) = replaced.as_mut() {
                if is_rich(base) && !patch.is_object() {
                    out.push(Replacement {
                        pointer: pointer.clone(),
                    });
                }
            }
            *base = patch;
        }
    }
}

fn is_rich(v: &JsonValue) -> bool {
    matches!(v, JsonValue::Object(m) if !m.is_empty())
}

fn escape_token(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_objects_merge_recursively() {
        let base = json!({"payload": {"to": "a@example.com"}});
        let out = merge(base, json!({"payload": {"subject": "hi"}}));
        assert_eq!(out, json!({"payload": {"to": "a@example.com", "subject": "hi"}}));
    }

    #[test]
    fn lists_replace_instead_of_concatenating() {
        let out = merge(json!({"tags": [1, 2]}), json!({"tags": [3]}));
        assert_eq!(out, json!({"tags": [3]}));
    }

    #[test]
    fn scalar_patch_replaces_whole_value() {
        assert_eq!(merge(json!({"a": 1}), json!(5)), json!(5));
        assert_eq!(merge(json!(null), json!({"a": 1})), json!({"a": 1}));
        assert_eq!(merge(json!([1]), json!({"a": 1})), json!({"a": 1}));
    }

    #[test]
    fn empty_patch_is_identity() {
        let a = json!({"a": {"b": [1, 2]}, "c": "x"});
        assert_eq!(merge(a.clone(), json!({})), a);
    }

    #[test]
    fn disjoint_patches_commute() {
        let a = json!({"x": {"k": 1}});
        let b = json!({"x": {"l": 2}, "y": true});
        let c = json!({"z": [1]});
        let left = merge(merge(a.clone(), b.clone()), c.clone());
        let right = merge(merge(a, c), b);
        assert_eq!(left, right);
    }

    #[test]
    fn later_patch_wins_at_leaf() {
        let out = merge(merge(json!({}), json!({"a": 1})), json!({"a": 2}));
        assert_eq!(out, json!({"a": 2}));
    }

    #[test]
    fn reports_structure_replaced_by_list() {
        let mut base = json!({"body": {"items": {"id": 1}}, "n": 1});
        let replaced = merge_reporting(&mut base, json!({"body": {"items": [1]}, "n": 2}));
        assert_eq!(
            replaced,
            vec![Replacement {
                pointer: "/body/items".to_string()
            }]
        );
        assert_eq!(base, json!({"body": {"items": [1]}, "n": 2}));
    }

    #[test]
    fn pointer_tokens_are_escaped() {
        let mut base = json!({"a/b": {"c": 1}});
        let replaced = merge_reporting(&mut base, json!({"a/b": "flat"}));
        assert_eq!(replaced[0].pointer, "/a~1b");
    }
}
