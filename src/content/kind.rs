//! The closed set of content kinds and their id-set buckets.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Every kind of content item a pack can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Integration,
    Script,
    Playbook,
    TestPlaybook,
    IncidentField,
    IndicatorField,
    IncidentType,
    IndicatorType,
    Layout,
    LayoutsContainer,
    Classifier,
    Mapper,
    Widget,
    Dashboard,
    Report,
    Wizard,
    Job,
    ParsingRule,
    ModelingRule,
    CorrelationRule,
    #[serde(rename = "xsiamdashboard")]
    XsiamDashboard,
    #[serde(rename = "xsiamreport")]
    XsiamReport,
    Trigger,
    #[serde(rename = "xdrctemplate")]
    XdrcTemplate,
    LayoutRule,
    GenericField,
    GenericType,
    GenericDefinition,
    GenericModule,
    PackMetadata,
    ApiModule,
}

impl ContentKind {
    /// All kinds, in declaration order.
    pub const ALL: [ContentKind; 31] = [
        Self::Integration,
        Self::Script,
        Self::Playbook,
        Self::TestPlaybook,
        Self::IncidentField,
        Self::IndicatorField,
        Self::IncidentType,
        Self::IndicatorType,
        Self::Layout,
        Self::LayoutsContainer,
        Self::Classifier,
        Self::Mapper,
        Self::Widget,
        Self::Dashboard,
        Self::Report,
        Self::Wizard,
        Self::Job,
        Self::ParsingRule,
        Self::ModelingRule,
        Self::CorrelationRule,
        Self::XsiamDashboard,
        Self::XsiamReport,
        Self::Trigger,
        Self::XdrcTemplate,
        Self::LayoutRule,
        Self::GenericField,
        Self::GenericType,
        Self::GenericDefinition,
        Self::GenericModule,
        Self::PackMetadata,
        Self::ApiModule,
    ];

    /// Lower-case tag used in logs, exclusion tables, and error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Integration => "integration",
            Self::Script => "script",
            Self::Playbook => "playbook",
            Self::TestPlaybook => "testplaybook",
            Self::IncidentField => "incidentfield",
            Self::IndicatorField => "indicatorfield",
            Self::IncidentType => "incidenttype",
            Self::IndicatorType => "indicatortype",
            Self::Layout => "layout",
            Self::LayoutsContainer => "layoutscontainer",
            Self::Classifier => "classifier",
            Self::Mapper => "mapper",
            Self::Widget => "widget",
            Self::Dashboard => "dashboard",
            Self::Report => "report",
            Self::Wizard => "wizard",
            Self::Job => "job",
            Self::ParsingRule => "parsingrule",
            Self::ModelingRule => "modelingrule",
            Self::CorrelationRule => "correlationrule",
            Self::XsiamDashboard => "xsiamdashboard",
            Self::XsiamReport => "xsiamreport",
            Self::Trigger => "trigger",
            Self::XdrcTemplate => "xdrctemplate",
            Self::LayoutRule => "layoutrule",
            Self::GenericField => "genericfield",
            Self::GenericType => "generictype",
            Self::GenericDefinition => "genericdefinition",
            Self::GenericModule => "genericmodule",
            Self::PackMetadata => "packmetadata",
            Self::ApiModule => "apimodule",
        }
    }

    /// The id-set bucket records of this kind are stored in.
    #[must_use]
    pub const fn id_set_key(self) -> IdSetKey {
        match self {
            Self::Integration => IdSetKey::Integrations,
            Self::Script | Self::ApiModule => IdSetKey::Scripts,
            Self::Playbook => IdSetKey::Playbooks,
            Self::TestPlaybook => IdSetKey::TestPlaybooks,
            Self::IncidentField => IdSetKey::IncidentFields,
            Self::IndicatorField => IdSetKey::IndicatorFields,
            Self::IncidentType => IdSetKey::IncidentTypes,
            Self::IndicatorType => IdSetKey::IndicatorTypes,
            Self::Layout | Self::LayoutsContainer => IdSetKey::Layouts,
            Self::Classifier => IdSetKey::Classifiers,
            Self::Mapper => IdSetKey::Mappers,
            Self::Widget => IdSetKey::Widgets,
            Self::Dashboard => IdSetKey::Dashboards,
            Self::Report => IdSetKey::Reports,
            Self::Wizard => IdSetKey::Wizards,
            Self::Job => IdSetKey::Jobs,
            Self::ParsingRule => IdSetKey::ParsingRules,
            Self::ModelingRule => IdSetKey::ModelingRules,
            Self::CorrelationRule => IdSetKey::CorrelationRules,
            Self::XsiamDashboard => IdSetKey::XsiamDashboards,
            Self::XsiamReport => IdSetKey::XsiamReports,
            Self::Trigger => IdSetKey::Triggers,
            Self::XdrcTemplate => IdSetKey::XdrcTemplates,
            Self::LayoutRule => IdSetKey::LayoutRules,
            Self::GenericField => IdSetKey::GenericFields,
            Self::GenericType => IdSetKey::GenericTypes,
            Self::GenericDefinition => IdSetKey::GenericDefinitions,
            Self::GenericModule => IdSetKey::GenericModules,
            Self::PackMetadata => IdSetKey::Packs,
        }
    }

    /// Prefix of the default unified file name (`<prefix>-<name>.yml`), if the kind has one.
    #[must_use]
    pub const fn unified_prefix(self) -> Option<&'static str> {
        match self {
            Self::Integration => Some("integration"),
            Self::Script | Self::ApiModule => Some("script"),
            Self::Playbook | Self::TestPlaybook => Some("playbook"),
            Self::ModelingRule => Some("modelingrule"),
            Self::ParsingRule => Some("parsingrule"),
            _ => None,
        }
    }

    /// True for the yml kinds that can exist as a package directory.
    #[must_use]
    pub const fn is_packageable(self) -> bool {
        matches!(
            self,
            Self::Integration
                | Self::Script
                | Self::ApiModule
                | Self::ModelingRule
                | Self::ParsingRule
        )
    }

    /// True for rule kinds whose package carries `.xif` / schema / samples files.
    #[must_use]
    pub const fn is_rule(self) -> bool {
        matches!(self, Self::ModelingRule | Self::ParsingRule)
    }

    /// Kinds stored under a pack sub-directory, keyed by that directory's name.
    ///
    /// `Classifiers` and `Layouts` hold two kinds each; the body decides which.
    #[must_use]
    pub fn from_dir_name(dir: &str) -> Option<Self> {
        let kind = match dir {
            "Integrations" => Self::Integration,
            "Scripts" => Self::Script,
            "Playbooks" => Self::Playbook,
            "TestPlaybooks" => Self::TestPlaybook,
            "IncidentFields" => Self::IncidentField,
            "IndicatorFields" => Self::IndicatorField,
            "IncidentTypes" => Self::IncidentType,
            "IndicatorTypes" => Self::IndicatorType,
            "Layouts" => Self::Layout,
            "Classifiers" => Self::Classifier,
            "Widgets" => Self::Widget,
            "Dashboards" => Self::Dashboard,
            "Reports" => Self::Report,
            "Wizards" => Self::Wizard,
            "Jobs" => Self::Job,
            "ParsingRules" => Self::ParsingRule,
            "ModelingRules" => Self::ModelingRule,
            "CorrelationRules" => Self::CorrelationRule,
            "XSIAMDashboards" => Self::XsiamDashboard,
            "XSIAMReports" => Self::XsiamReport,
            "Triggers" => Self::Trigger,
            "XDRCTemplates" => Self::XdrcTemplate,
            "LayoutRules" => Self::LayoutRule,
            "GenericFields" => Self::GenericField,
            "GenericTypes" => Self::GenericType,
            "GenericDefinitions" => Self::GenericDefinition,
            "GenericModules" => Self::GenericModule,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == lower)
            .ok_or_else(|| anyhow::anyhow!("Unknown content kind: {s}"))
    }
}

/// Top-level keys of an id-set, in emission order.
///
/// The derived `Ord` follows declaration order, so a `BTreeMap<IdSetKey, _>`
/// serializes its buckets in this fixed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IdSetKey {
    Scripts,
    Playbooks,
    Integrations,
    TestPlaybooks,
    Classifiers,
    Dashboards,
    IncidentFields,
    IncidentTypes,
    IndicatorFields,
    IndicatorTypes,
    Layouts,
    Reports,
    Widgets,
    Mappers,
    GenericTypes,
    GenericFields,
    GenericModules,
    GenericDefinitions,
    Jobs,
    Wizards,
    ParsingRules,
    ModelingRules,
    CorrelationRules,
    XsiamDashboards,
    XsiamReports,
    Triggers,
    XdrcTemplates,
    LayoutRules,
    Packs,
}

impl IdSetKey {
    /// Every list-shaped bucket (all keys but `Packs`), in emission order.
    pub const LISTS: [IdSetKey; 28] = [
        Self::Scripts,
        Self::Playbooks,
        Self::Integrations,
        Self::TestPlaybooks,
        Self::Classifiers,
        Self::Dashboards,
        Self::IncidentFields,
        Self::IncidentTypes,
        Self::IndicatorFields,
        Self::IndicatorTypes,
        Self::Layouts,
        Self::Reports,
        Self::Widgets,
        Self::Mappers,
        Self::GenericTypes,
        Self::GenericFields,
        Self::GenericModules,
        Self::GenericDefinitions,
        Self::Jobs,
        Self::Wizards,
        Self::ParsingRules,
        Self::ModelingRules,
        Self::CorrelationRules,
        Self::XsiamDashboards,
        Self::XsiamReports,
        Self::Triggers,
        Self::XdrcTemplates,
        Self::LayoutRules,
    ];

    /// The JSON key of the bucket.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scripts => "scripts",
            Self::Playbooks => "playbooks",
            Self::Integrations => "integrations",
            Self::TestPlaybooks => "TestPlaybooks",
            Self::Classifiers => "Classifiers",
            Self::Dashboards => "Dashboards",
            Self::IncidentFields => "IncidentFields",
            Self::IncidentTypes => "IncidentTypes",
            Self::IndicatorFields => "IndicatorFields",
            Self::IndicatorTypes => "IndicatorTypes",
            Self::Layouts => "Layouts",
            Self::Reports => "Reports",
            Self::Widgets => "Widgets",
            Self::Mappers => "Mappers",
            Self::GenericTypes => "GenericTypes",
            Self::GenericFields => "GenericFields",
            Self::GenericModules => "GenericModules",
            Self::GenericDefinitions => "GenericDefinitions",
            Self::Jobs => "Jobs",
            Self::Wizards => "Wizards",
            Self::ParsingRules => "ParsingRules",
            Self::ModelingRules => "ModelingRules",
            Self::CorrelationRules => "CorrelationRules",
            Self::XsiamDashboards => "XSIAMDashboards",
            Self::XsiamReports => "XSIAMReports",
            Self::Triggers => "Triggers",
            Self::XdrcTemplates => "XDRCTemplates",
            Self::LayoutRules => "LayoutRules",
            Self::Packs => "Packs",
        }
    }

    /// Parses a JSON bucket key.
    #[must_use]
    pub fn parse(key: &str) -> Option<Self> {
        if key == "Packs" {
            return Some(Self::Packs);
        }
        Self::LISTS.into_iter().find(|k| k.as_str() == key)
    }
}

impl fmt::Display for IdSetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
