//! Per-kind record extraction.
//!
//! Each extractor turns one parsed content document into an `(id, record)` pair.
//! Every record starts from [`common::common_record`]; the kind-specific modules
//! add the reference fields other items are resolved against.

pub mod classifier;
pub mod common;
pub mod dashboards;
pub mod fields;
pub mod generic;
pub mod integration;
pub mod layout;
pub mod misc;
pub mod pack;
pub mod playbook;
pub mod script;

use anyhow::Result;
use serde_json::{Map, Value};
use std::path::Path;

use super::{Entry, RepoSource};
use crate::content::{ContentKind, Marketplace, MarketplaceSet};
use crate::core::ContentError;

static NO_MARKETPLACES: MarketplaceSet = MarketplaceSet::EMPTY;
static NO_SOURCE: RepoSource = RepoSource {
    host: String::new(),
    namespace: String::new(),
    repo: String::new(),
};

/// Where a document came from and what surrounds it.
#[derive(Debug, Clone)]
pub struct ExtractContext<'a> {
    /// Document location on disk.
    pub path: &'a Path,
    /// Location recorded in `file_path`, relative to the repository root.
    pub file_path: String,
    /// Owning pack name; `None` outside `Packs/`.
    pub pack: Option<&'a str>,
    /// Marketplaces declared by the owning pack.
    pub pack_marketplaces: &'a MarketplaceSet,
    pub source: &'a RepoSource,
    /// Active marketplace, selecting `_x2` overrides.
    pub marketplace: Option<Marketplace>,
    /// Code read from a package's code file, when the manifest does not inline it.
    pub code: Option<&'a str>,
}

impl<'a> ExtractContext<'a> {
    pub fn new(path: &'a Path, file_path: impl Into<String>) -> Self {
        Self {
            path,
            file_path: file_path.into(),
            pack: None,
            pack_marketplaces: &NO_MARKETPLACES,
            source: &NO_SOURCE,
            marketplace: None,
            code: None,
        }
    }

    #[must_use]
    pub fn pack(mut self, pack: Option<&'a str>) -> Self {
        self.pack = pack;
        self
    }

    #[must_use]
    pub fn pack_marketplaces(mut self, marketplaces: &'a MarketplaceSet) -> Self {
        self.pack_marketplaces = marketplaces;
        self
    }

    #[must_use]
    pub fn source(mut self, source: &'a RepoSource) -> Self {
        self.source = source;
        self
    }

    #[must_use]
    pub fn marketplace(mut self, marketplace: Option<Marketplace>) -> Self {
        self.marketplace = marketplace;
        self
    }

    #[must_use]
    pub fn code(mut self, code: Option<&'a str>) -> Self {
        self.code = code;
        self
    }

    /// A `MalformedDocument` error for this document.
    pub fn malformed(&self, reason: impl Into<String>) -> anyhow::Error {
        ContentError::MalformedDocument {
            path: self.path.display().to_string(),
            reason: reason.into(),
        }
        .into()
    }

    /// The mapping at `key`, an empty mapping when absent, an error for any other shape.
    pub fn mapping_at<'d>(&self, doc: &'d Map<String, Value>, key: &str) -> Result<Option<&'d Map<String, Value>>> {
        match doc.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Object(map)) => Ok(Some(map)),
            Some(_) => Err(self.malformed(format!("'{key}' must be a mapping"))),
        }
    }
}

/// Extracts the record of one document of `kind`.
///
/// Returns `Ok(None)` for documents that do not produce a record, such as the
/// legacy `reputations.json` bundle. Structural violations are `MalformedDocument`.
pub fn extract_record(kind: ContentKind, ctx: &ExtractContext<'_>, doc: &Value) -> Result<Option<Entry>> {
    let Value::Object(doc) = doc else {
        return Err(ctx.malformed("the document is not a mapping"));
    };

    let entry = match kind {
        ContentKind::Integration => integration::extract(ctx, doc)?,
        ContentKind::Script | ContentKind::ApiModule => script::extract(ctx, doc)?,
        ContentKind::Playbook | ContentKind::TestPlaybook => playbook::extract(ctx, doc)?,
        ContentKind::IncidentField | ContentKind::IndicatorField => fields::extract_field(ctx, doc),
        ContentKind::IncidentType => fields::extract_incident_type(ctx, doc),
        ContentKind::IndicatorType => {
            if ctx.path.file_name().is_some_and(|n| n == "reputations.json") {
                return Ok(None);
            }
            fields::extract_indicator_type(ctx, doc)
        }
        ContentKind::Layout => layout::extract_layout(ctx, doc),
        ContentKind::LayoutsContainer => layout::extract_container(ctx, doc),
        ContentKind::Classifier => classifier::extract_classifier(ctx, doc)?,
        ContentKind::Mapper => classifier::extract_mapper(ctx, doc)?,
        ContentKind::Widget => dashboards::extract_widget(ctx, doc),
        ContentKind::Dashboard => dashboards::extract_dashboard(ctx, doc)?,
        ContentKind::Report => dashboards::extract_report(ctx, doc)?,
        ContentKind::GenericField => generic::extract_field(ctx, doc),
        ContentKind::GenericType => generic::extract_type(ctx, doc),
        ContentKind::GenericModule => generic::extract_module(ctx, doc),
        ContentKind::GenericDefinition => generic::extract_definition(ctx, doc),
        ContentKind::Job => misc::extract_job(ctx, doc),
        ContentKind::Wizard => misc::extract_wizard(ctx, doc),
        ContentKind::ParsingRule
        | ContentKind::ModelingRule
        | ContentKind::CorrelationRule
        | ContentKind::XsiamDashboard
        | ContentKind::XsiamReport
        | ContentKind::Trigger
        | ContentKind::XdrcTemplate
        | ContentKind::LayoutRule => misc::extract_minimal(kind, ctx, doc)?,
        ContentKind::PackMetadata => pack::extract(ctx, doc),
    };
    Ok(Some(entry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_non_mapping_documents_are_malformed() {
        let ctx = ExtractContext::new(Path::new("Packs/P/Scripts/s.yml"), "Packs/P/Scripts/s.yml");
        let err = extract_record(ContentKind::Script, &ctx, &json!(["not", "a", "map"])).unwrap_err();
        assert!(matches!(err.downcast_ref::<ContentError>(), Some(ContentError::MalformedDocument { .. })));
    }

    #[test]
    fn test_legacy_reputations_bundle_is_ignored() {
        let ctx = ExtractContext::new(Path::new("Packs/P/IndicatorTypes/reputations.json"), "x");
        assert!(extract_record(ContentKind::IndicatorType, &ctx, &json!({"id": "x"})).unwrap().is_none());
    }

    #[test]
    fn test_mapping_at() {
        let ctx = ExtractContext::new(Path::new("a.yml"), "a.yml");
        let doc = json!({"commonfields": "oops", "script": {"type": "python"}});
        let doc = doc.as_object().unwrap();
        assert!(ctx.mapping_at(doc, "commonfields").is_err());
        assert!(ctx.mapping_at(doc, "script").unwrap().is_some());
        assert!(ctx.mapping_at(doc, "missing").unwrap().is_none());
    }
}
