//! Content-kind detection from a file path and its body.
//!
//! Detection is a table of `(extension, predicate, kind)` rows evaluated in order.
//! Kinds the body cannot distinguish (jobs, wizards, rules, generic objects, …) are
//! recognised from the pack sub-directory that holds them.

use serde_json::Value;
use std::path::Path;

use super::kind::ContentKind;
use crate::constants::{API_MODULES_PACK, PACK_METADATA_FILE, TEST_PLAYBOOKS_DIR};
use crate::utils::fs::{read_json_lenient, read_yaml_lenient};

/// File extension class used by the discriminator table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ext {
    Yml,
    Json,
}

struct Rule {
    ext: Ext,
    matches: fn(&Value) -> bool,
    kind: ContentKind,
}

fn has(body: &Value, key: &str) -> bool {
    body.get(key).is_some()
}

fn id_starts_with(body: &Value, prefix: &str) -> bool {
    body.get("id").and_then(Value::as_str).is_some_and(|id| id.starts_with(prefix))
}

const BODY_RULES: &[Rule] = &[
    Rule {
        ext: Ext::Yml,
        matches: |b| has(b, "category"),
        kind: ContentKind::Integration,
    },
    Rule {
        ext: Ext::Yml,
        matches: |b| has(b, "script"),
        kind: ContentKind::Script,
    },
    Rule {
        ext: Ext::Yml,
        matches: |b| has(b, "tasks"),
        kind: ContentKind::Playbook,
    },
    Rule {
        ext: Ext::Json,
        matches: |b| has(b, "widgetType"),
        kind: ContentKind::Widget,
    },
    Rule {
        ext: Ext::Json,
        matches: |b| has(b, "reportType"),
        kind: ContentKind::Report,
    },
    Rule {
        ext: Ext::Json,
        matches: |b| has(b, "preProcessingScript"),
        kind: ContentKind::IncidentType,
    },
    Rule {
        ext: Ext::Json,
        matches: |b| has(b, "regex"),
        kind: ContentKind::IndicatorType,
    },
    Rule {
        ext: Ext::Json,
        matches: |b| has(b, "mapping") || has(b, "unclassifiedCases"),
        kind: ContentKind::Classifier,
    },
    Rule {
        ext: Ext::Json,
        matches: |b| has(b, "layout") && (has(b, "kind") || has(b, "typeId")),
        kind: ContentKind::Layout,
    },
    Rule {
        ext: Ext::Json,
        matches: |b| has(b, "layout"),
        kind: ContentKind::Dashboard,
    },
    Rule {
        ext: Ext::Json,
        matches: |b| id_starts_with(b, "incident"),
        kind: ContentKind::IncidentField,
    },
    Rule {
        ext: Ext::Json,
        matches: |b| id_starts_with(b, "indicator"),
        kind: ContentKind::IndicatorField,
    },
];

/// Kinds whose body the table cannot tell apart; their directory decides.
fn is_directory_decided(kind: ContentKind) -> bool {
    matches!(
        kind,
        ContentKind::Job
            | ContentKind::Wizard
            | ContentKind::ParsingRule
            | ContentKind::ModelingRule
            | ContentKind::CorrelationRule
            | ContentKind::XsiamDashboard
            | ContentKind::XsiamReport
            | ContentKind::Trigger
            | ContentKind::XdrcTemplate
            | ContentKind::LayoutRule
            | ContentKind::GenericField
            | ContentKind::GenericType
            | ContentKind::GenericDefinition
            | ContentKind::GenericModule
    )
}

fn ext_of(path: &Path) -> Option<Ext> {
    match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
        "yml" | "yaml" => Some(Ext::Yml),
        "json" => Some(Ext::Json),
        _ => None,
    }
}

fn has_component(path: &Path, name: &str) -> bool {
    path.components().any(|c| c.as_os_str() == name)
}

/// Kind implied by the nearest recognised ancestor directory.
fn directory_kind(path: &Path) -> Option<ContentKind> {
    path.ancestors()
        .skip(1)
        .take(3)
        .filter_map(|dir| dir.file_name()?.to_str())
        .find_map(ContentKind::from_dir_name)
}

fn is_api_module_path(path: &Path) -> bool {
    has_component(path, API_MODULES_PACK)
        || path
            .parent()
            .and_then(Path::file_name)
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with("ApiModule"))
}

/// Detects the kind of an already-parsed document.
#[must_use]
pub fn detect_kind_from(path: &Path, body: &Value) -> Option<ContentKind> {
    if path.file_name().is_some_and(|n| n == PACK_METADATA_FILE) {
        return Some(ContentKind::PackMetadata);
    }
    let ext = ext_of(path)?;
    let dir_kind = directory_kind(path);

    if let Some(kind) = dir_kind
        && is_directory_decided(kind)
    {
        return Some(kind);
    }

    let from_body = BODY_RULES.iter().find(|rule| rule.ext == ext && (rule.matches)(body)).map(|r| r.kind);

    let kind = match from_body {
        Some(ContentKind::Playbook) if has_component(path, TEST_PLAYBOOKS_DIR) => ContentKind::TestPlaybook,
        Some(ContentKind::Script) if is_api_module_path(path) => ContentKind::ApiModule,
        Some(ContentKind::Classifier)
            if body.get("type").and_then(Value::as_str).is_some_and(|t| t.starts_with("mapping")) =>
        {
            ContentKind::Mapper
        }
        Some(kind) => kind,
        None => match dir_kind? {
            ContentKind::Layout if has(body, "group") => ContentKind::LayoutsContainer,
            kind => kind,
        },
    };
    Some(kind)
}

/// Reads `path` and detects its kind. Unreadable documents fall back to the directory.
#[must_use]
pub fn detect_kind(path: &Path) -> Option<ContentKind> {
    let body = match ext_of(path)? {
        Ext::Yml => crate::content::node::yaml_to_node(&read_yaml_lenient(path)).ok()?,
        Ext::Json => read_json_lenient(path),
    };
    detect_kind_from(path, &body)
}
