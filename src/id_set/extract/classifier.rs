//! Classifiers and mappers.

use anyhow::Result;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

use super::ExtractContext;
use super::common::{common_record, complex_operators, id_or_dash, incident_field_refs, insert_ids, text, text_for};
use crate::constants::is_built_in_field;
use crate::id_set::Entry;

fn insert_operators(record: &mut Map<String, Value>, doc: &Map<String, Value>) {
    let (filters, transformers) = complex_operators(&Value::Object(doc.clone()));
    insert_ids(record, "transformers", transformers);
    insert_ids(record, "filters", filters);
}

/// Classifiers are named by `brandName` when present.
pub fn extract_classifier(ctx: &ExtractContext<'_>, doc: &Map<String, Value>) -> Result<Entry> {
    let id = id_or_dash(doc, "id");
    let name = text(doc, "brandName").or_else(|| text_for(ctx, doc, "name"));
    let mut record = common_record(ctx, doc, name, None);

    let mut incident_types: BTreeSet<String> = text(doc, "defaultIncidentType").map(str::to_string).into_iter().collect();
    if let Some(key_type_map) = ctx.mapping_at(doc, "keyTypeMap")? {
        incident_types.extend(key_type_map.values().filter_map(Value::as_str).map(str::to_string));
    }
    insert_ids(&mut record, "incident_types", incident_types);
    insert_ids(&mut record, "incident_fields", incident_field_refs(&Value::Object(doc.clone())));
    insert_operators(&mut record, doc);
    Ok((id, record))
}

/// Mappers list every type they map and every field an `internalMapping` writes.
pub fn extract_mapper(ctx: &ExtractContext<'_>, doc: &Map<String, Value>) -> Result<Entry> {
    let id = id_or_dash(doc, "id");
    let mut record = common_record(ctx, doc, text_for(ctx, doc, "name"), None);

    let mut incident_types: BTreeSet<String> = text(doc, "defaultIncidentType").map(str::to_string).into_iter().collect();
    let mut incident_fields = BTreeSet::new();
    if let Some(mapping) = ctx.mapping_at(doc, "mapping")? {
        for (incident_type, entry) in mapping {
            incident_types.insert(incident_type.clone());
            let Some(entry) = entry.as_object() else {
                return Err(ctx.malformed(format!("mapping of '{incident_type}' must be a mapping")));
            };
            if let Some(internal) = ctx.mapping_at(entry, "internalMapping")? {
                incident_fields.extend(internal.keys().filter(|f| !is_built_in_field(f)).cloned());
                incident_fields.extend(incident_field_refs(&Value::Object(internal.clone())));
            }
        }
    }
    insert_ids(&mut record, "incident_types", incident_types);
    insert_ids(&mut record, "incident_fields", incident_fields);
    insert_operators(&mut record, doc);
    Ok((id, record))
}
