//! Script records, API modules included.

use anyhow::Result;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use super::ExtractContext;
use super::common::{common_record, id_or_dash, insert_ids, insert_text, text, text_for};
use crate::content::node::string_list;
use crate::id_set::Entry;
use crate::unify::code::is_inlined_code;

static EXECUTE_COMMAND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)execute_?command\(['"](\w+)['"]"#).expect("valid pattern"));

/// `dependson.must` entries: the command names, and `command → brand` for `brand|…|command`.
pub fn depends_on(must: &[String]) -> (BTreeSet<String>, BTreeMap<String, String>) {
    let mut commands = BTreeSet::new();
    let mut command_to_integration = BTreeMap::new();
    for entry in must {
        let parts: Vec<&str> = entry.split('|').collect();
        let command = parts.last().copied().unwrap_or_default();
        commands.insert(command.to_string());
        if parts.len() > 1 && !parts[0].is_empty() {
            command_to_integration.insert(command.to_string(), parts[0].to_string());
        }
    }
    (commands, command_to_integration)
}

/// Commands a script runs through `executeCommand`, sorted and de-duplicated.
#[must_use]
pub fn script_executions(code: &str) -> BTreeSet<String> {
    EXECUTE_COMMAND.captures_iter(code).map(|caps| caps[1].to_string()).collect()
}

pub fn extract(ctx: &ExtractContext<'_>, doc: &Map<String, Value>) -> Result<Entry> {
    let id = ctx.mapping_at(doc, "commonfields")?.map_or_else(|| "-".to_string(), |cf| id_or_dash(cf, "id"));
    let name = text_for(ctx, doc, "name").unwrap_or("-");
    let mut record = common_record(ctx, doc, Some(name), None);

    let must = ctx.mapping_at(doc, "dependson")?.map(|d| string_list(d.get("must"))).unwrap_or_default();
    let (commands, command_to_integration) = depends_on(&must);
    insert_ids(&mut record, "depends_on", commands);
    if !command_to_integration.is_empty() {
        let map: Map<String, Value> =
            command_to_integration.into_iter().map(|(cmd, brand)| (cmd, Value::String(brand))).collect();
        record.insert("command_to_integration".to_string(), Value::Object(map));
    }

    let inline = doc.get("script").and_then(Value::as_str).filter(|code| is_inlined_code(code));
    if let Some(code) = inline.or(ctx.code) {
        insert_ids(&mut record, "script_executions", script_executions(code));
    }

    insert_text(&mut record, "docker_image", text(doc, "dockerimage"));
    insert_text(&mut record, "type", text(doc, "type"));
    insert_ids(&mut record, "tests", string_list(doc.get("tests")).into_iter().collect());
    Ok((id, record))
}
