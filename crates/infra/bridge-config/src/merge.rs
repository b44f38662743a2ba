//! RFC 7396 JSON merge patch.

use serde_json::Value;

/// Apply `patch` to `target` with RFC 7396 semantics.
///
/// Objects merge key by key, `null` in the patch removes the key, and any
/// other patch value (arrays and scalars included) replaces the target.
///
/// ```
/// use serde_json::json;
/// use bridge_config::merge::merge_patch;
///
/// let global = json!({"session": {"timeout_secs": 10, "headers": {"A": "1"}}});
/// let local = json!({"session": {"headers": {"B": "2"}}});
/// assert_eq!(
///     merge_patch(global, local),
///     json!({"session": {"timeout_secs": 10, "headers": {"A": "1", "B": "2"}}})
/// );
/// ```
pub fn merge_patch(target: Value, patch: Value) -> Value {
    match (target, patch) {
        (Value::Object(mut target_map), Value::Object(patch_map)) => {
            for (key, patch_value) in patch_map {
                if patch_value.is_null() {
                    target_map.remove(&key);
                    continue;
                }
                let existing = target_map.remove(&key).unwrap_or(Value::Null);
                target_map.insert(key, merge_patch(existing, patch_value));
            }
            Value::Object(target_map)
        }
        (_, patch) => patch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_nested_sections_merge() {
        let target = json!({"session": {"timeout_secs": 10}, "logging": {"level": "info"}});
        let patch = json!({"session": {"call_timeout_secs": 3}});
        assert_eq!(
            merge_patch(target, patch),
            json!({
                "session": {"timeout_secs": 10, "call_timeout_secs": 3},
                "logging": {"level": "info"}
            })
        );
    }

    #[test]
    fn test_null_deletes_nested_key() {
        let target = json!({"session": {"timeout_secs": 10, "call_timeout_secs": 3}});
        let patch = json!({"session": {"call_timeout_secs": null}});
        assert_eq!(merge_patch(target, patch), json!({"session": {"timeout_secs": 10}}));
    }

    #[test]
    fn test_scalars_and_arrays_replace() {
        assert_eq!(merge_patch(json!({"a": [1, 2]}), json!({"a": [3]})), json!({"a": [3]}));
        assert_eq!(merge_patch(json!({"a": {"b": 1}}), json!({"a": 7})), json!({"a": 7}));
        assert_eq!(merge_patch(json!({"a": 7}), json!({"a": {"b": 1}})), json!({"a": {"b": 1}}));
    }

    proptest! {
        #[test]
        fn prop_empty_patch_is_identity(target in arb_object(true)) {
            prop_assert_eq!(merge_patch(target.clone(), json!({})), target);
        }

        #[test]
        fn prop_null_free_patch_is_idempotent(target in arb_object(true), patch in arb_object(false)) {
            let once = merge_patch(target, patch.clone());
            let twice = merge_patch(once.clone(), patch);
            prop_assert_eq!(once, twice);
        }
    }

    fn arb_object(with_nulls: bool) -> impl Strategy<Value = Value> {
        prop::collection::hash_map("[a-z]{1,3}", arb_value(with_nulls), 0..5)
            .prop_map(|m| Value::Object(m.into_iter().collect()))
    }

    fn arb_value(with_nulls: bool) -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| Value::Number(n.into())),
            "[a-z]{0,8}".prop_map(Value::String),
        ];
        let leaf = if with_nulls {
            prop_oneof![Just(Value::Null), leaf].boxed()
        } else {
            leaf.boxed()
        };
        leaf.prop_recursive(2, 8, 3, |inner| {
            prop::collection::hash_map("[a-z]{1,2}", inner, 0..3)
                .prop_map(|m| Value::Object(m.into_iter().collect()))
        })
    }
}
