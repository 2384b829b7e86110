//! Incident/indicator fields and types.

use serde_json::{Map, Value};
use std::collections::BTreeSet;

use super::ExtractContext;
use super::common::{common_record, id_or_dash, insert_ids, insert_text, text, text_for};
use crate::content::node::string_list;
use crate::id_set::Entry;

/// Placeholder an indicator type uses for "no script".
const NULL_SCRIPT: &str = "null";

/// Incident and indicator fields.
///
/// `incident_types` keeps `all` as-is; it is expanded once every incident type is known.
pub fn extract_field(ctx: &ExtractContext<'_>, doc: &Map<String, Value>) -> Entry {
    let id = id_or_dash(doc, "id");
    let mut record = common_record(ctx, doc, text_for(ctx, doc, "name"), None);

    let types: BTreeSet<String> = string_list(doc.get("associatedTypes"))
        .into_iter()
        .chain(string_list(doc.get("systemAssociatedTypes")))
        .collect();
    insert_ids(&mut record, "incident_types", types);

    let scripts: BTreeSet<String> =
        ["script", "fieldCalcScript"].iter().filter_map(|key| text(doc, key)).map(str::to_string).collect();
    insert_ids(&mut record, "scripts", scripts);
    insert_ids(&mut record, "aliases", string_list(doc.get("cliName")).into_iter().collect());
    (id, record)
}

pub fn extract_incident_type(ctx: &ExtractContext<'_>, doc: &Map<String, Value>) -> Entry {
    let id = id_or_dash(doc, "id");
    let mut record = common_record(ctx, doc, text_for(ctx, doc, "name"), None);
    insert_ids(&mut record, "playbooks", string_list(doc.get("playbookId")).into_iter().collect());
    insert_ids(&mut record, "scripts", string_list(doc.get("preProcessingScript")).into_iter().collect());
    (id, record)
}

/// Indicator types are named by `details`.
///
/// `reputation_command` is kept so integrations running it can be linked later.
pub fn extract_indicator_type(ctx: &ExtractContext<'_>, doc: &Map<String, Value>) -> Entry {
    let id = id_or_dash(doc, "id");
    let mut record = common_record(ctx, doc, text_for(ctx, doc, "details"), None);

    let scripts: BTreeSet<String> = string_list(doc.get("reputationScriptName"))
        .into_iter()
        .chain(string_list(doc.get("enhancementScriptNames")))
        .filter(|script| script != NULL_SCRIPT)
        .collect();
    insert_ids(&mut record, "scripts", scripts);
    insert_text(&mut record, "reputation_command", text(doc, "reputationCommand"));
    (id, record)
}
