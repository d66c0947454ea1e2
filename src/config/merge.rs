//! Merge functionality for variable sources.
//!
//! Sources are combined left to right, later sources winning per key.
//! Arrays are replaced entirely, never concatenated or merged element-wise.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// How the sources of one namespace are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    /// Nested objects are merged key-by-key, recursively.
    #[default]
    Deep,
    /// Top-level keys are replaced wholesale.
    Shallow,
}

impl std::fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MergeStrategy::Deep => write!(f, "deep"),
            MergeStrategy::Shallow => write!(f, "shallow"),
        }
    }
}

/// Deep merge two JSON values, with `overlay` taking precedence over `base`.
///
/// - Objects are merged recursively: keys in overlay override keys in base
/// - Arrays, strings, numbers, booleans and nulls are replaced entirely
///
/// # Example
/// ```
/// use serde_json::json;
/// use composed_vars::config::deep_merge;
///
/// let base = json!({
///     "server": { "port": 8080, "host": "localhost" },
///     "features": ["a", "b"]
/// });
/// let overlay = json!({
///     "server": { "port": 9000 },
///     "features": ["c"]
/// });
/// let result = deep_merge(base, overlay);
/// assert_eq!(
///     result,
///     json!({ "server": { "port": 9000, "host": "localhost" }, "features": ["c"] })
/// );
/// ```
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            deep_merge_into(&mut base_map, overlay_map);
            Value::Object(base_map)
        }
        (_, overlay) => overlay,
    }
}

/// Merge `source` into `target` in place, descending into objects present on both sides.
///
/// Existing keys keep their position; new keys are appended.
fn deep_merge_into(target: &mut Map<String, Value>, source: Map<String, Value>) {
    for (key, value) in source {
        match value {
            Value::Object(incoming) => match target.get_mut(&key) {
                Some(Value::Object(existing)) => deep_merge_into(existing, incoming),
                _ => {
                    target.insert(key, Value::Object(incoming));
                }
            },
            value => {
                target.insert(key, value);
            }
        }
    }
}

/// Replace top-level keys of `target` with those of `source`.
pub fn shallow_merge(target: &mut Map<String, Value>, source: Map<String, Value>) {
    target.extend(source);
}

/// Merge an ordered list of sources into a fresh object.
///
/// Missing sources contribute nothing, and neither do scalars. A shallow
/// merge spreads an array source as `"0"`, `"1"`, ... keys; a deep merge
/// skips it. With no contributing sources the result is `{}`.
pub fn merge<I>(strategy: MergeStrategy, sources: I) -> Value
where
    I: IntoIterator<Item = Option<Value>>,
{
    let mut merged = Map::new();
    for source in sources.into_iter().flatten() {
        match (strategy, source) {
            (MergeStrategy::Deep, Value::Object(map)) => deep_merge_into(&mut merged, map),
            (MergeStrategy::Shallow, Value::Object(map)) => shallow_merge(&mut merged, map),
            (MergeStrategy::Shallow, Value::Array(items)) => {
                shallow_merge(&mut merged, indexed(items))
            }
            _ => {}
        }
    }
    Value::Object(merged)
}

/// Array elements keyed by their index.
fn indexed(items: Vec<Value>) -> Map<String, Value> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| (index.to_string(), item))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn both(a: Value, b: Value) -> (Value, Value) {
        (
            merge(MergeStrategy::Deep, [Some(a.clone()), Some(b.clone())]),
            merge(MergeStrategy::Shallow, [Some(a), Some(b)]),
        )
    }

    #[test]
    fn test_merge_simple_objects() {
        let base = json!({"a": 1, "b": 2});
        let overlay = json!({"b": 3, "c": 4});
        let result = deep_merge(base, overlay);
        assert_eq!(result, json!({"a": 1, "b": 3, "c": 4}));
    }

    #[test]
    fn test_disjoint_keys_agree_across_strategies() {
        let (deep, shallow) =
            both(json!({"a": 1, "n": {"x": 1}}), json!({"b": [2], "m": {"y": 2}}));
        let expected = json!({"a": 1, "n": {"x": 1}, "b": [2], "m": {"y": 2}});
        assert_eq!(deep, expected);
        assert_eq!(shallow, expected);
    }

    #[test]
    fn test_scalar_values_last_writer_wins() {
        let (deep, shallow) = both(
            json!({
                "val1": "val1",
                "str": "a",
                "bool": false,
                "number": 1234,
                "nullVal": "not-null"
            }),
            json!({"val2": "val2", "str": "b", "bool": true, "number": 5678, "nullVal": null}),
        );
        let expected = json!({
            "val1": "val1",
            "val2": "val2",
            "str": "b",
            "bool": true,
            "number": 5678,
            "nullVal": null
        });
        assert_eq!(deep, expected);
        assert_eq!(shallow, expected);
    }

    #[test]
    fn test_nested_objects_deep_vs_shallow() {
        let (deep, shallow) = both(json!({"n": {"x": 1}}), json!({"n": {"y": 2}}));
        assert_eq!(deep, json!({"n": {"x": 1, "y": 2}}));
        assert_eq!(shallow, json!({"n": {"y": 2}}));
    }

    #[test]
    fn test_arrays_replaced_not_merged() {
        let (deep, shallow) = both(json!({"a": [1, 2]}), json!({"a": [3]}));
        assert_eq!(deep, json!({"a": [3]}));
        assert_eq!(shallow, json!({"a": [3]}));
    }

    #[test]
    fn test_complex_values() {
        let first = json!({
            "deepObj": {"a": false, "b": "a", "c": {"deeper": true}},
            "numArray": [1, 2, 3, 4],
            "array": [{"obj1": false}, {"obj2": false}]
        });
        let second = json!({
            "deepObj": {"a": true, "b": "b", "d": {"deeper": true}},
            "array": [{"obj3": true}, {"obj4": true}],
            "numArray": [5, 6, 7, 8]
        });
        let (deep, shallow) = both(first, second);
        assert_eq!(
            deep,
            json!({
                "deepObj": {"a": true, "b": "b", "c": {"deeper": true}, "d": {"deeper": true}},
                "numArray": [5, 6, 7, 8],
                "array": [{"obj3": true}, {"obj4": true}]
            })
        );
        assert_eq!(
            shallow,
            json!({
                "deepObj": {"a": true, "b": "b", "d": {"deeper": true}},
                "numArray": [5, 6, 7, 8],
                "array": [{"obj3": true}, {"obj4": true}]
            })
        );
    }

    #[test]
    fn test_missing_sources_skipped() {
        for strategy in [MergeStrategy::Deep, MergeStrategy::Shallow] {
            let result = merge(strategy, [None, Some(json!({"x": 1})), Some(Value::Null), None]);
            assert_eq!(result, json!({"x": 1}));
        }
    }

    #[test]
    fn test_no_sources_yields_empty_object() {
        assert_eq!(merge(MergeStrategy::Deep, Vec::<Option<Value>>::new()), json!({}));
        assert_eq!(merge(MergeStrategy::Shallow, [None::<Value>, None]), json!({}));
    }

    #[test]
    fn test_non_object_sources_skipped() {
        let result = merge(
            MergeStrategy::Deep,
            [Some(json!([1, 2])), Some(json!("text")), Some(json!({"k": true}))],
        );
        assert_eq!(result, json!({"k": true}));
    }

    #[test]
    fn test_three_way_right_bias() {
        let result = merge(
            MergeStrategy::Deep,
            [
                Some(json!({"a": 1})),
                Some(json!({"b": 2})),
                Some(json!({"a": 99, "c": 3})),
            ],
        );
        assert_eq!(result, json!({"a": 99, "b": 2, "c": 3}));
    }

    #[test]
    fn test_overlay_replaces_primitive_with_object() {
        let result = deep_merge(json!({"value": 42}), json!({"value": {"nested": true}}));
        assert_eq!(result, json!({"value": {"nested": true}}));
    }

    #[test]
    fn test_overlay_replaces_object_with_primitive() {
        let result = deep_merge(json!({"value": {"nested": true}}), json!({"value": 42}));
        assert_eq!(result, json!({"value": 42}));
    }

    #[test]
    fn test_null_overrides_nested_object() {
        let result = deep_merge(json!({"a": {"b": 1}}), json!({"a": null}));
        assert_eq!(result, json!({"a": null}));
    }

    #[test]
    fn test_existing_key_order_preserved() {
        let result = merge(
            MergeStrategy::Shallow,
            [Some(json!({"first": 1, "second": 2})), Some(json!({"third": 3, "first": 0}))],
        );
        let keys: Vec<&String> = result.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["first", "second", "third"]);
    }

    #[test]
    fn test_array_source_spread_only_when_shallow() {
        let sources = || [Some(json!(["x", "y"])), Some(json!({"1": "z", "b": 2}))];
        assert_eq!(merge(MergeStrategy::Deep, sources()), json!({"1": "z", "b": 2}));
        assert_eq!(
            merge(MergeStrategy::Shallow, sources()),
            json!({"0": "x", "1": "z", "b": 2})
        );
    }
}
