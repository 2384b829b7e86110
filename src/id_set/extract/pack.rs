//! `pack_metadata.json` records, stored under `Packs` keyed by pack directory name.

use serde_json::{Map, Value};

use super::ExtractContext;
use super::common::{insert_text, text};
use crate::content::node::string_list;
use crate::id_set::Entry;
use crate::id_set::Record;

/// Support levels whose packs are certified.
const CERTIFIED_SUPPORT: &[&str] = &["xsoar", "partner"];

fn insert_list(record: &mut Record, key: &str, values: Vec<String>) {
    record.insert(key.to_string(), Value::Array(values.into_iter().map(Value::String).collect()));
}

pub fn extract(ctx: &ExtractContext<'_>, doc: &Map<String, Value>) -> Entry {
    let name = text(doc, "name");
    let id = ctx.pack.or(name).unwrap_or("-").to_string();

    let mut record = Record::new();
    insert_text(&mut record, "name", name);
    insert_text(&mut record, "current_version", text(doc, "currentVersion"));
    insert_text(&mut record, "author", text(doc, "author"));
    let certified = text(doc, "support").is_some_and(|support| CERTIFIED_SUPPORT.contains(&support));
    record.insert(
        "certification".to_string(),
        Value::String(if certified { "certified" } else { "" }.to_string()),
    );
    insert_list(&mut record, "tags", string_list(doc.get("tags")));
    insert_list(&mut record, "use_cases", string_list(doc.get("useCases")));
    insert_list(&mut record, "categories", string_list(doc.get("categories")));
    record.insert("marketplaces".to_string(), ctx.pack_marketplaces.to_value());
    record.insert("file_path".to_string(), Value::String(ctx.file_path.clone()));
    record.insert("source".to_string(), ctx.source.to_value());
    (id, record)
}
