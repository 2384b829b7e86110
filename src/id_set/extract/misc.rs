//! Jobs, wizards and the rule-like kinds that only need a minimal record.

use anyhow::Result;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

use super::ExtractContext;
use super::common::{common_record, flag, id_or_dash, insert_ids, insert_text, text, text_for};
use crate::content::ContentKind;
use crate::content::node::{get_path, scalar_to_string, string_list};
use crate::id_set::Entry;

pub fn extract_job(ctx: &ExtractContext<'_>, doc: &Map<String, Value>) -> Entry {
    let id = id_or_dash(doc, "id");
    let mut record = common_record(ctx, doc, text_for(ctx, doc, "name"), None);
    insert_text(&mut record, "details", text(doc, "details"));
    if flag(doc, "isFeed") {
        record.insert("is_feed".to_string(), Value::Bool(true));
    }
    insert_ids(&mut record, "selectedFeeds", string_list(doc.get("selectedFeeds")).into_iter().collect());
    insert_text(&mut record, "playbookId", text(doc, "playbookId"));
    (id, record)
}

fn names_in(node: Option<&Value>, key: &str) -> BTreeSet<String> {
    match node {
        Some(Value::Array(items)) => items.iter().filter_map(|item| item.get(key)?.as_str()).map(str::to_string).collect(),
        _ => BTreeSet::new(),
    }
}

/// Wizards reference the packs they install and the integrations and playbooks they configure.
pub fn extract_wizard(ctx: &ExtractContext<'_>, doc: &Map<String, Value>) -> Entry {
    let id = id_or_dash(doc, "id");
    let mut record = common_record(ctx, doc, text_for(ctx, doc, "name"), None);

    let mut packs = BTreeSet::new();
    if let Some(Value::Array(groups)) = doc.get("dependency_packs") {
        for group in groups {
            packs.extend(names_in(group.get("packs"), "name"));
        }
    }
    insert_ids(&mut record, "dependency_packs", packs);

    let wizard = doc.get("wizard");
    let mut integrations = names_in(wizard.and_then(|w| w.get("fetching_integrations")), "name");
    integrations.extend(names_in(wizard.and_then(|w| w.get("supporting_integrations")), "name"));
    insert_ids(&mut record, "integrations", integrations);
    insert_ids(&mut record, "playbooks", names_in(wizard.and_then(|w| w.get("set_playbook")), "name"));
    (id, record)
}

/// Where each rule-like kind keeps its id and name.
fn identity_keys(kind: ContentKind) -> (&'static [&'static str], &'static [&'static str]) {
    match kind {
        ContentKind::CorrelationRule => (&["global_rule_id"], &["name"]),
        ContentKind::XsiamDashboard => (&["dashboards_data", "0", "global_id"], &["dashboards_data", "0", "name"]),
        ContentKind::XsiamReport => (&["templates_data", "0", "global_id"], &["templates_data", "0", "report_name"]),
        ContentKind::Trigger => (&["trigger_id"], &["trigger_name"]),
        ContentKind::XdrcTemplate => (&["content_global_id"], &["name"]),
        ContentKind::LayoutRule => (&["rule_id"], &["rule_name"]),
        _ => (&["id"], &["name"]),
    }
}

/// Follows `path`, treating numeric segments as sequence indexes.
fn lookup<'a>(doc: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(doc, |node, segment| match (node, segment.parse::<usize>()) {
        (Value::Array(items), Ok(index)) => items.get(index),
        _ => get_path(node, &[*segment]),
    })
}

/// Minimal record of a rule-like kind.
///
/// A present id of the wrong shape is malformed; a missing one is recorded as `-`.
pub fn extract_minimal(kind: ContentKind, ctx: &ExtractContext<'_>, doc: &Map<String, Value>) -> Result<Entry> {
    let (id_path, name_path) = identity_keys(kind);
    let value = Value::Object(doc.clone());
    let id = match lookup(&value, id_path) {
        None | Some(Value::Null) => "-".to_string(),
        Some(v) => scalar_to_string(v)
            .ok_or_else(|| ctx.malformed(format!("'{}' must be a scalar", id_path.join("."))))?,
    };
    let name = lookup(&value, name_path).and_then(Value::as_str);
    Ok((id, common_record(ctx, doc, name, None)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::Path;

    fn ctx() -> ExtractContext<'static> {
        ExtractContext::new(Path::new("x.json"), "x.json")
    }

    #[test]
    fn test_job_record() {
        let doc = json!({
            "id": "job1",
            "name": "Nightly",
            "details": "runs nightly",
            "isFeed": true,
            "selectedFeeds": ["Feed B", "Feed A"],
            "playbookId": "Sync"
        });
        let (_, record) = extract_job(&ctx(), doc.as_object().unwrap());
        assert_eq!(record["details"], "runs nightly");
        assert_eq!(record["is_feed"], true);
        assert_eq!(record["selectedFeeds"], json!(["Feed A", "Feed B"]));
        assert_eq!(record["playbookId"], "Sync");
    }

    #[test]
    fn test_wizard_record() {
        let doc = json!({
            "id": "wiz",
            "name": "Wizard",
            "dependency_packs": [
                {"name": "Mail", "packs": [{"name": "EWS"}, {"name": "Gmail"}]},
                {"name": "Enrich", "packs": [{"name": "VirusTotal"}, {"name": "EWS"}]}
            ],
            "wizard": {
                "fetching_integrations": [{"name": "EWS v2"}],
                "supporting_integrations": [{"name": "VirusTotal (API v3)"}],
                "set_playbook": [{"name": "Phishing - Generic v3"}]
            }
        });
        let (_, record) = extract_wizard(&ctx(), doc.as_object().unwrap());
        assert_eq!(record["dependency_packs"], json!(["EWS", "Gmail", "VirusTotal"]));
        assert_eq!(record["integrations"], json!(["EWS v2", "VirusTotal (API v3)"]));
        assert_eq!(record["playbooks"], json!(["Phishing - Generic v3"]));
    }

    #[test]
    fn test_minimal_identity_keys() {
        let cases = [
            (ContentKind::ParsingRule, json!({"id": "pr", "name": "PR"}), "pr", "PR"),
            (ContentKind::CorrelationRule, json!({"global_rule_id": "cr", "name": "CR"}), "cr", "CR"),
            (
                ContentKind::XsiamDashboard,
                json!({"dashboards_data": [{"global_id": "xd", "name": "XD"}]}),
                "xd",
                "XD",
            ),
            (
                ContentKind::XsiamReport,
                json!({"templates_data": [{"global_id": "xr", "report_name": "XR"}]}),
                "xr",
                "XR",
            ),
            (ContentKind::Trigger, json!({"trigger_id": 42, "trigger_name": "T"}), "42", "T"),
            (ContentKind::XdrcTemplate, json!({"content_global_id": "xt", "name": "XT"}), "xt", "XT"),
            (ContentKind::LayoutRule, json!({"rule_id": "lr", "rule_name": "LR"}), "lr", "LR"),
        ];
        for (kind, doc, id, name) in cases {
            let (got, record) = extract_minimal(kind, &ctx(), doc.as_object().unwrap()).unwrap();
            assert_eq!(got, id, "{kind}");
            assert_eq!(record["name"], name, "{kind}");
        }
    }

    #[test]
    fn test_minimal_bad_id() {
        let doc = json!({"rule_id": {"nested": true}});
        assert!(extract_minimal(ContentKind::LayoutRule, &ctx(), doc.as_object().unwrap()).is_err());
        let doc = json!({"rule_name": "x"});
        let (id, _) = extract_minimal(ContentKind::LayoutRule, &ctx(), doc.as_object().unwrap()).unwrap();
        assert_eq!(id, "-");
    }
}
