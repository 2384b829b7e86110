//! Widgets, dashboards and reports.
//!
//! A widget whose `dataType` is `scripts` runs the script named by its `query`.

use anyhow::Result;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

use super::ExtractContext;
use super::common::{common_record, id_or_dash, insert_ids, text, text_for};
use crate::id_set::Entry;

fn widget_script(widget: &Map<String, Value>) -> Option<String> {
    (text(widget, "dataType") == Some("scripts")).then(|| text(widget, "query")).flatten().map(str::to_string)
}

pub fn extract_widget(ctx: &ExtractContext<'_>, doc: &Map<String, Value>) -> Entry {
    let id = id_or_dash(doc, "id");
    let mut record = common_record(ctx, doc, text_for(ctx, doc, "name"), None);
    insert_ids(&mut record, "scripts", widget_script(doc).into_iter().collect());
    (id, record)
}

fn scripts_of_layouts(ctx: &ExtractContext<'_>, layouts: Option<&Value>) -> Result<BTreeSet<String>> {
    let layouts = match layouts {
        None | Some(Value::Null) => return Ok(BTreeSet::new()),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(ctx.malformed("'layout' must be a list")),
    };
    Ok(layouts
        .iter()
        .filter_map(|layout| layout.get("widget")?.as_object())
        .filter_map(widget_script)
        .collect())
}

fn extract_with_layouts(ctx: &ExtractContext<'_>, doc: &Map<String, Value>, layouts: Option<&Value>) -> Result<Entry> {
    let id = id_or_dash(doc, "id");
    let mut record = common_record(ctx, doc, text_for(ctx, doc, "name"), None);
    insert_ids(&mut record, "scripts", scripts_of_layouts(ctx, layouts)?);
    Ok((id, record))
}

pub fn extract_dashboard(ctx: &ExtractContext<'_>, doc: &Map<String, Value>) -> Result<Entry> {
    extract_with_layouts(ctx, doc, doc.get("layout"))
}

/// Reports embed a dashboard; its layouts hold the widgets.
pub fn extract_report(ctx: &ExtractContext<'_>, doc: &Map<String, Value>) -> Result<Entry> {
    let layouts = ctx.mapping_at(doc, "dashboard")?.and_then(|d| d.get("layout"));
    extract_with_layouts(ctx, doc, layouts)
}
