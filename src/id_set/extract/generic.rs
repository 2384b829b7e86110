//! Generic fields, types, modules and definitions.

use serde_json::{Map, Value};
use std::collections::BTreeSet;

use super::ExtractContext;
use super::common::{common_record, id_or_dash, insert_ids, insert_text, text, text_for};
use crate::content::node::string_list;
use crate::id_set::{Entry, Record};

fn base(ctx: &ExtractContext<'_>, doc: &Map<String, Value>) -> (String, Record) {
    let id = id_or_dash(doc, "id");
    let mut record = common_record(ctx, doc, text_for(ctx, doc, "name"), None);
    insert_text(&mut record, "definitionId", text(doc, "definitionId"));
    (id, record)
}

/// `generic_types` holds the declared associations; it is narrowed to the
/// generic types sharing the field's `definitionId` once the walk is done.
pub fn extract_field(ctx: &ExtractContext<'_>, doc: &Map<String, Value>) -> Entry {
    let (id, mut record) = base(ctx, doc);
    let types: BTreeSet<String> = string_list(doc.get("associatedTypes"))
        .into_iter()
        .chain(string_list(doc.get("systemAssociatedTypes")))
        .collect();
    insert_ids(&mut record, "generic_types", types);
    (id, record)
}

pub fn extract_type(ctx: &ExtractContext<'_>, doc: &Map<String, Value>) -> Entry {
    let (id, mut record) = base(ctx, doc);
    insert_text(&mut record, "layout", text(doc, "layout"));
    (id, record)
}

pub fn extract_module(ctx: &ExtractContext<'_>, doc: &Map<String, Value>) -> Entry {
    let id = id_or_dash(doc, "id");
    let mut record = common_record(ctx, doc, text_for(ctx, doc, "name"), None);
    insert_ids(&mut record, "definitionIds", string_list(doc.get("definitionIds")).into_iter().collect());
    let views: BTreeSet<String> = match doc.get("views") {
        Some(Value::Array(views)) => {
            views.iter().filter_map(|view| view.get("name")?.as_str()).map(str::to_string).collect()
        }
        _ => BTreeSet::new(),
    };
    insert_ids(&mut record, "views", views);
    (id, record)
}

pub fn extract_definition(ctx: &ExtractContext<'_>, doc: &Map<String, Value>) -> Entry {
    let id = id_or_dash(doc, "id");
    (id, common_record(ctx, doc, text_for(ctx, doc, "name"), None))
}
