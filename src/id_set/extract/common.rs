//! Record fields shared by every kind.

use regex::Regex;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::sync::LazyLock;

use super::ExtractContext;
use crate::constants::{DEFAULT_FROM_VERSION, is_built_in_field};
use crate::content::node::{get_for_marketplace, has_alternative_key, scalar_to_string, visit_entries};
use crate::id_set::Record;
use crate::id_set::marketplace::item_marketplaces;

/// A non-empty string stored at `key`.
pub fn text<'a>(doc: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    doc.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Like [`text`], preferring the `_x2` variant for alternative-key marketplaces.
pub fn text_for<'a>(ctx: &ExtractContext<'_>, doc: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    get_for_marketplace(doc, key, ctx.marketplace).and_then(Value::as_str).filter(|s| !s.is_empty())
}

pub fn flag(doc: &Map<String, Value>, key: &str) -> bool {
    doc.get(key).and_then(Value::as_bool).unwrap_or(false)
}

/// The id stored at `key`, or `-` when missing.
pub fn id_or_dash(doc: &Map<String, Value>, key: &str) -> String {
    text(doc, key).unwrap_or("-").to_string()
}

/// Inserts a sorted, de-duplicated id list when it is not empty.
pub fn insert_ids(record: &mut Record, key: &str, ids: BTreeSet<String>) {
    if !ids.is_empty() {
        record.insert(key.to_string(), Value::Array(ids.into_iter().map(Value::String).collect()));
    }
}

/// Inserts a string when it is present.
pub fn insert_text(record: &mut Record, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        record.insert(key.to_string(), Value::String(value.to_string()));
    }
}

static INCIDENT_SUBSTITUTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{incident\.([^.}\s]+)").expect("valid pattern"));

static INCIDENT_PATH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^incident\.([^.]+)").expect("valid pattern"));

/// Incident fields referenced anywhere under `node`, built-in fields excluded.
///
/// Recognises `${incident.<field>}` substitutions in strings and `complex`
/// values whose `root.accessor` path starts with `incident.`.
pub fn incident_field_refs(node: &Value) -> BTreeSet<String> {
    let mut fields = BTreeSet::new();
    let mut add = |field: &str| {
        if !is_built_in_field(field) {
            fields.insert(field.to_string());
        }
    };
    let scan_string = |s: &str, add: &mut dyn FnMut(&str)| {
        for caps in INCIDENT_SUBSTITUTION.captures_iter(s) {
            add(&caps[1]);
        }
    };

    if let Value::String(s) = node {
        scan_string(s, &mut add);
    }
    visit_entries(node, &mut |key, value| match value {
        Value::String(s) => scan_string(s, &mut add),
        Value::Array(items) => {
            for s in items.iter().filter_map(Value::as_str) {
                scan_string(s, &mut add);
            }
        }
        Value::Object(complex) if key == "complex" => {
            let root = complex.get("root").and_then(Value::as_str).unwrap_or_default();
            let path = match complex.get("accessor").and_then(Value::as_str).filter(|a| !a.is_empty()) {
                Some(accessor) => format!("{root}.{accessor}"),
                None => root.to_string(),
            };
            if let Some(caps) = INCIDENT_PATH.captures(&path) {
                add(&caps[1]);
            }
        }
        _ => {}
    });
    fields
}

/// Filter and transformer operators used by `complex` values under `node`.
///
/// Returns `(filters, transformers)`.
pub fn complex_operators(node: &Value) -> (BTreeSet<String>, BTreeSet<String>) {
    let mut filters = BTreeSet::new();
    let mut transformers = BTreeSet::new();
    visit_entries(node, &mut |key, value| {
        if key != "complex" {
            return;
        }
        if let Some(Value::Array(groups)) = value.get("filters") {
            for item in groups {
                match item {
                    Value::Array(conditions) => filters.extend(conditions.iter().filter_map(operator)),
                    other => filters.extend(operator(other)),
                }
            }
        }
        if let Some(Value::Array(items)) = value.get("transformers") {
            transformers.extend(items.iter().filter_map(operator));
        }
    });
    (filters, transformers)
}

fn operator(item: &Value) -> Option<String> {
    item.get("operator").and_then(Value::as_str).filter(|op| !op.is_empty()).map(str::to_string)
}

/// A version bound; unquoted yml numbers such as `6.0` arrive as floats.
fn version(doc: &Map<String, Value>, yml_key: &str, json_key: &str) -> Option<String> {
    let read = |key: &str| doc.get(key).and_then(scalar_to_string).filter(|v| !v.is_empty());
    read(yml_key).or_else(|| read(json_key))
}

/// Builds the attributes every record carries.
///
/// `fromversion` defaults to `0.0.0`; `toversion` is only present when declared.
pub fn common_record(
    ctx: &ExtractContext<'_>,
    doc: &Map<String, Value>,
    name: Option<&str>,
    display_name: Option<&str>,
) -> Record {
    let mut record = Record::new();
    if let Some(name) = name.filter(|n| !n.is_empty()) {
        record.insert("name".to_string(), Value::String(name.to_string()));
    }
    if let Some(display) = display_name.or(name).filter(|d| !d.is_empty()) {
        record.insert("display_name".to_string(), Value::String(display.to_string()));
    }
    record.insert("file_path".to_string(), Value::String(ctx.file_path.clone()));
    record.insert(
        "fromversion".to_string(),
        Value::String(version(doc, "fromversion", "fromVersion").unwrap_or_else(|| DEFAULT_FROM_VERSION.to_string())),
    );
    insert_text(&mut record, "toversion", version(doc, "toversion", "toVersion").as_deref());
    insert_text(&mut record, "pack", ctx.pack);

    let doc_value = Value::Object(doc.clone());
    record.insert(
        "marketplaces".to_string(),
        item_marketplaces(&doc_value, ctx.pack_marketplaces).to_value(),
    );
    record.insert("source".to_string(), ctx.source.to_value());
    if flag(doc, "deprecated") {
        record.insert("deprecated".to_string(), Value::Bool(true));
    }
    if has_alternative_key(&doc_value) {
        record.insert("has_alternative_meta".to_string(), Value::Bool(true));
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{Marketplace, MarketplaceSet};
    use crate::id_set::RepoSource;
    use serde_json::json;
    use std::path::Path;

    #[test]
    fn test_common_record_defaults() {
        let source = RepoSource::new("github.com", "demisto", "content");
        let pack_mps: MarketplaceSet = [Marketplace::Xsoar].into_iter().collect();
        let ctx = ExtractContext::new(Path::new("Packs/Demo/Scripts/S/S.yml"), "Packs/Demo/Scripts/S/S.yml")
            .pack(Some("Demo"))
            .pack_marketplaces(&pack_mps)
            .source(&source);
        let doc = json!({"name": "S", "nested": {"comment_x2": "alt"}});
        let record = common_record(&ctx, doc.as_object().unwrap(), Some("S"), None);

        assert_eq!(
            Value::Object(record),
            json!({
                "name": "S",
                "display_name": "S",
                "file_path": "Packs/Demo/Scripts/S/S.yml",
                "fromversion": "0.0.0",
                "pack": "Demo",
                "marketplaces": ["xsoar"],
                "source": ["github.com", "demisto", "content"],
                "has_alternative_meta": true
            })
        );
    }

    #[test]
    fn test_incident_field_refs() {
        let node = json!({
            "a": {"simple": "${incident.customer_id} and ${incident.severity}"},
            "b": {"complex": {"root": "incident", "accessor": "dest_ip"}},
            "c": {"complex": {"root": "incident.src_host"}},
            "d": {"complex": {"root": "Account", "accessor": "Username"}},
            "e": ["${incident.from_list}"]
        });
        let fields: Vec<String> = incident_field_refs(&node).into_iter().collect();
        assert_eq!(fields, vec!["customer_id", "dest_ip", "from_list", "src_host"]);
        assert!(incident_field_refs(&json!("${incident.owner}")).is_empty());
    }

    #[test]
    fn test_complex_operators() {
        let node = json!({
            "value": {"complex": {
                "root": "Ticket",
                "filters": [[{"operator": "isEqualString"}], [{"operator": "containsGeneral"}]],
                "transformers": [{"operator": "toLowerCase"}, {"operator": "uniq"}, {"operator": "uniq"}]
            }}
        });
        let (filters, transformers) = complex_operators(&node);
        assert_eq!(filters.into_iter().collect::<Vec<_>>(), vec!["containsGeneral", "isEqualString"]);
        assert_eq!(transformers.into_iter().collect::<Vec<_>>(), vec!["toLowerCase", "uniq"]);
    }

    #[test]
    fn test_json_version_keys() {
        let ctx = ExtractContext::new(Path::new("a.json"), "a.json");
        let doc = json!({"fromVersion": "6.0.0", "toVersion": "6.5.0", "deprecated": true, "marketplaces": ["xpanse"]});
        let record = common_record(&ctx, doc.as_object().unwrap(), None, None);
        assert_eq!(record["fromversion"], "6.0.0");
        assert_eq!(record["toversion"], "6.5.0");
        assert_eq!(record["deprecated"], true);
        assert_eq!(record["marketplaces"], json!(["xpanse"]));
        assert!(record.get("name").is_none());
    }

    #[test]
    fn test_unquoted_yml_versions() {
        use crate::content::IdSetKey;
        use crate::id_set::duplicates::has_duplicate;

        let ctx = ExtractContext::new(Path::new("a.yml"), "a.yml").pack(Some("P"));
        let old: Value = serde_yaml::from_str("name: A\ntoversion: 5.9\n").unwrap();
        let new: Value = serde_yaml::from_str("name: A\nfromversion: 6.0\n").unwrap();
        let old = common_record(&ctx, old.as_object().unwrap(), Some("A"), None);
        let new = common_record(&ctx, new.as_object().unwrap(), Some("A"), None);

        assert_eq!(old["fromversion"], "0.0.0");
        assert_eq!(old["toversion"], "5.9");
        assert_eq!(new["fromversion"], "6.0");
        assert!(new.get("toversion").is_none());

        let entries = vec![("A".to_string(), old), ("A".to_string(), new)];
        assert!(!has_duplicate(&entries, "A", IdSetKey::Scripts, false));
    }
}
