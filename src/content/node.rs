//! Generic traversal over content document trees.
//!
//! Every YAML and JSON content document is lowered to a [`serde_json::Value`]
//! (`Mapping | Seq | Scalar`). The extractors never reach into documents with
//! ad-hoc nested loops; they use the visitors below with a key predicate.

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::marketplace::Marketplace;

/// Suffix of keys that override their base key for the alternative marketplace.
pub const ALTERNATIVE_SUFFIX: &str = "_x2";

/// Converts a parsed YAML document into the common tree.
pub fn yaml_to_node(value: &serde_yaml::Value) -> Result<Value> {
    serde_json::to_value(value).context("YAML document cannot be represented as a JSON tree")
}

/// Converts a tree back into a YAML value, keeping key order.
pub fn node_to_yaml(value: &Value) -> Result<serde_yaml::Value> {
    serde_yaml::to_value(value).context("Failed to convert document to YAML")
}

/// Calls `visit` for every `(key, value)` pair at any depth, parents before children.
pub fn visit_entries<'a, F>(node: &'a Value, visit: &mut F)
where
    F: FnMut(&'a str, &'a Value),
{
    match node {
        Value::Object(map) => {
            for (key, value) in map {
                visit(key, value);
                visit_entries(value, visit);
            }
        }
        Value::Array(items) => {
            for item in items {
                visit_entries(item, visit);
            }
        }
        _ => {}
    }
}

/// Collects every value stored under any of `keys`, at any depth.
///
/// Every requested key is present in the result, possibly with an empty list.
/// Values found along different paths are all kept, duplicates included.
#[must_use]
pub fn get_values_for_keys_recursively(node: &Value, keys: &[&str]) -> BTreeMap<String, Vec<Value>> {
    let mut found: BTreeMap<String, Vec<Value>> =
        keys.iter().map(|k| ((*k).to_string(), Vec::new())).collect();
    visit_entries(node, &mut |key, value| {
        if let Some(bucket) = found.get_mut(key) {
            bucket.push(value.clone());
        }
    });
    found
}

/// True iff any key at any depth ends in `_x2`.
#[must_use]
pub fn has_alternative_key(node: &Value) -> bool {
    let mut hit = false;
    visit_entries(node, &mut |key, _| {
        if key.ends_with(ALTERNATIVE_SUFFIX) {
            hit = true;
        }
    });
    hit
}

/// Looks up `key`, preferring `key_x2` when `marketplace` asks for alternative keys.
#[must_use]
pub fn get_for_marketplace<'a>(
    map: &'a Map<String, Value>,
    key: &str,
    marketplace: Option<Marketplace>,
) -> Option<&'a Value> {
    if let Some(mp) = marketplace
        && mp.uses_alternative_keys()
        && let Some(value) = map.get(&format!("{key}{ALTERNATIVE_SUFFIX}"))
    {
        return Some(value);
    }
    map.get(key)
}

/// Follows `path` through nested mappings.
#[must_use]
pub fn get_path<'a>(node: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(node, |current, key| current.get(*key))
}

/// String at `path`, if present and a string.
#[must_use]
pub fn str_at<'a>(node: &'a Value, path: &[&str]) -> Option<&'a str> {
    get_path(node, path).and_then(Value::as_str)
}

/// Renders a scalar as a string: strings as-is, numbers and booleans via `to_string`.
#[must_use]
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// String items of a sequence; a lone string counts as a one-item sequence.
#[must_use]
pub fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(scalar_to_string).collect(),
        Some(Value::String(s)) if !s.is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_values_for_keys_recursively() {
        let doc = json!({
            "a": {"filters": [1], "inner": [{"filters": [2]}, {"transformers": "t"}]},
            "filters": [3]
        });
        let found = get_values_for_keys_recursively(&doc, &["filters", "transformers", "missing"]);
        assert_eq!(found["filters"], vec![json!([1]), json!([2]), json!([3])]);
        assert_eq!(found["transformers"], vec![json!("t")]);
        assert!(found["missing"].is_empty());
    }

    #[test]
    fn test_duplicates_across_paths_are_kept() {
        let doc = json!([{"id": "x"}, {"id": "x"}]);
        let found = get_values_for_keys_recursively(&doc, &["id"]);
        assert_eq!(found["id"].len(), 2);
    }

    #[test]
    fn test_has_alternative_key() {
        assert!(has_alternative_key(&json!({"a": [{"b": {"name_x2": 1}}]})));
        assert!(!has_alternative_key(&json!({"a": [{"b": {"x2": 1}}]})));
        assert!(!has_alternative_key(&json!("name_x2")));
    }

    #[test]
    fn test_get_for_marketplace_prefers_alternative() {
        let doc = json!({"name": "base", "name_x2": "alt"});
        let map = doc.as_object().unwrap();
        assert_eq!(get_for_marketplace(map, "name", None), Some(&json!("base")));
        assert_eq!(get_for_marketplace(map, "name", Some(Marketplace::Xsoar)), Some(&json!("base")));
        assert_eq!(
            get_for_marketplace(map, "name", Some(Marketplace::MarketplaceV2)),
            Some(&json!("alt"))
        );
    }

    #[test]
    fn test_yaml_to_node_keeps_order() {
        let yaml: serde_yaml::Value = serde_yaml::from_str("zeta: 1\nalpha: [a, b]\n").unwrap();
        let node = yaml_to_node(&yaml).unwrap();
        let keys: Vec<_> = node.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_path_helpers() {
        let doc = json!({"script": {"type": "python", "commands": [{"name": "a"}]}});
        assert_eq!(str_at(&doc, &["script", "type"]), Some("python"));
        assert_eq!(str_at(&doc, &["script", "missing"]), None);
        assert_eq!(string_list(Some(&json!(["a", 1, null]))), vec!["a", "1"]);
        assert_eq!(string_list(Some(&json!("solo"))), vec!["solo"]);
    }
}
