//! Integration records.

use anyhow::Result;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

use super::ExtractContext;
use super::common::{common_record, flag, id_or_dash, insert_ids, insert_text, text, text_for};
use crate::content::node::string_list;
use crate::id_set::Entry;
use crate::unify::api_module::find_api_module_imports;
use crate::unify::code::is_inlined_code;

/// Value recorded for the indicator fields and types every feed depends on.
const FEED_COMMON_TYPES: &str = "CommonTypes";

pub fn extract(ctx: &ExtractContext<'_>, doc: &Map<String, Value>) -> Result<Entry> {
    let commonfields = ctx.mapping_at(doc, "commonfields")?;
    let id = commonfields.map_or_else(|| "-".to_string(), |cf| id_or_dash(cf, "id"));
    let script = ctx.mapping_at(doc, "script")?;
    let empty = Map::new();
    let script = script.unwrap_or(&empty);

    let name = text_for(ctx, doc, "name").unwrap_or("-");
    let mut record = common_record(ctx, doc, Some(name), text_for(ctx, doc, "display"));

    let commands = match script.get("commands") {
        None | Some(Value::Null) => &[][..],
        Some(Value::Array(items)) => items.as_slice(),
        Some(_) => return Err(ctx.malformed("'script.commands' must be a list")),
    };
    let command_names: Vec<Value> =
        commands.iter().filter_map(|c| text(c.as_object()?, "name")).map(|n| Value::String(n.to_string())).collect();
    if !command_names.is_empty() {
        record.insert("commands".to_string(), Value::Array(command_names));
    }
    let deprecated_commands: BTreeSet<String> = commands
        .iter()
        .filter_map(Value::as_object)
        .filter(|c| flag(c, "deprecated"))
        .filter_map(|c| text(c, "name").map(str::to_string))
        .collect();
    insert_ids(&mut record, "deprecated_commands", deprecated_commands);

    insert_ids(&mut record, "tests", string_list(doc.get("tests")).into_iter().collect());

    let inline = text(script, "script").filter(|code| is_inlined_code(code));
    if let Some(code) = inline.or(ctx.code) {
        insert_ids(&mut record, "api_modules", find_api_module_imports(code).into_iter().collect());
    }

    record.insert("is_fetch".to_string(), Value::Bool(flag(script, "isfetch")));
    let is_feed = flag(script, "feed") || flag(doc, "feed");
    record.insert("is_feed".to_string(), Value::Bool(is_feed));

    insert_ids(&mut record, "classifiers", string_list(doc.get("defaultclassifier")).into_iter().collect());
    let mappers: BTreeSet<String> =
        ["defaultmapperin", "defaultmapperout"].iter().filter_map(|key| text(doc, key)).map(str::to_string).collect();
    insert_ids(&mut record, "mappers", mappers);
    insert_ids(&mut record, "incident_types", string_list(doc.get("defaultIncidentType")).into_iter().collect());
    if is_feed {
        let common = BTreeSet::from([FEED_COMMON_TYPES.to_string()]);
        insert_ids(&mut record, "indicator_fields", common.clone());
        insert_ids(&mut record, "indicator_types", common);
    }

    insert_text(&mut record, "docker_image", text(script, "dockerimage"));
    insert_text(&mut record, "type", text(script, "type"));
    Ok((id, record))
}
