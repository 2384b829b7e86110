//! Layouts and layouts containers.
//!
//! Both share the `Layouts` bucket; `kind` tells presentation variants apart.

use serde_json::{Map, Value};
use std::collections::BTreeSet;

use super::ExtractContext;
use super::common::{common_record, insert_ids, insert_text, text, text_for};
use crate::content::node::get_values_for_keys_recursively;
use crate::id_set::Entry;

/// Every `fieldId` value found at any depth.
fn field_ids(doc: &Map<String, Value>) -> BTreeSet<String> {
    let doc = Value::Object(doc.clone());
    get_values_for_keys_recursively(&doc, &["fieldId"])
        .remove("fieldId")
        .unwrap_or_default()
        .iter()
        .filter_map(Value::as_str)
        .filter(|field| !field.is_empty())
        .map(str::to_string)
        .collect()
}

fn type_ids<'a>(ids: impl IntoIterator<Item = Option<&'a str>>) -> BTreeSet<String> {
    ids.into_iter().flatten().map(str::to_string).collect()
}

/// A layout's id is its own `id`, else `layout.id`; its name is `layout.name`.
pub fn extract_layout(ctx: &ExtractContext<'_>, doc: &Map<String, Value>) -> Entry {
    let layout = doc.get("layout").and_then(Value::as_object);
    let id = text(doc, "id").or_else(|| layout.and_then(|l| text(l, "id"))).unwrap_or("-");
    let name = layout.and_then(|l| text(l, "name")).unwrap_or("-");
    let mut record = common_record(ctx, doc, Some(name), None);

    let type_name = text(doc, "TypeName");
    insert_text(&mut record, "typeID", text(doc, "typeId"));
    insert_text(&mut record, "typename", type_name);
    insert_text(&mut record, "kind", text(doc, "kind"));
    insert_ids(&mut record, "incident_and_indicator_types", type_ids([Some(id), type_name]));
    insert_ids(&mut record, "incident_and_indicator_fields", field_ids(doc));
    (id.to_string(), record)
}

pub fn extract_container(ctx: &ExtractContext<'_>, doc: &Map<String, Value>) -> Entry {
    let id = text(doc, "id").unwrap_or("-");
    let name = text_for(ctx, doc, "name");
    let mut record = common_record(ctx, doc, name, None);

    insert_text(&mut record, "group", text(doc, "group"));
    insert_ids(&mut record, "incident_and_indicator_types", type_ids([Some(id), name]));
    insert_ids(&mut record, "incident_and_indicator_fields", field_ids(doc));
    (id.to_string(), record)
}
