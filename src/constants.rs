//! Global constants used throughout the Packsmith codebase.
//!
//! This module contains directory names, default version bounds, environment
//! variable names, and other literal values that are shared between the
//! unifier, the splitter, and the catalog builder. Defining them centrally
//! keeps the on-disk conventions in one place.

/// Top-level directory holding every pack of a content repository.
pub const PACKS_DIR: &str = "Packs";

/// Pack that hosts shared API-module sources.
pub const API_MODULES_PACK: &str = "ApiModules";

/// Directory (inside a pack) holding scripts.
pub const SCRIPTS_DIR: &str = "Scripts";

/// Directory (inside a pack) holding integrations.
pub const INTEGRATIONS_DIR: &str = "Integrations";

/// Directory holding test playbooks, both inside packs and at the repository root.
pub const TEST_PLAYBOOKS_DIR: &str = "TestPlaybooks";

/// Directory (inside a pack) holding modeling rules.
pub const MODELING_RULES_DIR: &str = "ModelingRules";

/// Directory (inside a pack) holding parsing rules.
pub const PARSING_RULES_DIR: &str = "ParsingRules";

/// Pack manifest file name.
pub const PACK_METADATA_FILE: &str = "pack_metadata.json";

/// Default output location of the id-set, relative to the repository root.
pub const DEFAULT_ID_SET_PATH: &str = "Tests/id_set.json";

/// Inclusive lower version bound used when an item declares none.
pub const DEFAULT_FROM_VERSION: &str = "0.0.0";

/// Inclusive upper version bound used when an item declares none.
pub const DEFAULT_TO_VERSION: &str = "99.99.99";

/// Split point between legacy (4.5) and current (5.0) server versions.
pub const DOCKER45_SPLIT_VERSION: &str = "5.0.0";

/// Upper bound written on the legacy output of a dual emission.
pub const DOCKER45_TO_VERSION: &str = "4.5.9";

/// `fromversion` stamped on split PowerShell items that declare none.
pub const POWERSHELL_FROM_VERSION: &str = "5.5.0";

/// Prefix of an inlined integration image.
pub const IMAGE_PREFIX: &str = "data:image/png;base64,";

/// Base URL of the integration reference documentation.
pub const INTEGRATION_DOCS_URL: &str = "https://xsoar.pan.dev/docs/reference/integrations/";

/// Text of the documentation link appended to integration descriptions.
pub const DOCS_LINK_TEXT: &str = "[View Integration Documentation]";

/// Environment variable selecting the active marketplace.
pub const ENV_DEMISTO_SDK_MARKETPLACE: &str = "DEMISTO_SDK_MARKETPLACE";

/// Environment variable pointing at an alternative configuration file.
pub const ENV_PACKSMITH_CONFIG: &str = "PACKSMITH_CONFIG";

/// Environment variable disabling progress bars.
pub const ENV_PACKSMITH_NO_PROGRESS: &str = "PACKSMITH_NO_PROGRESS";

/// Default CPU core count when detection fails.
///
/// Used as a fallback when `std::thread::available_parallelism()` returns an error.
pub const FALLBACK_CORE_COUNT: usize = 4;

/// Incident fields that ship with the platform and are never reported as
/// content dependencies.
pub const BUILT_IN_FIELDS: &[&str] = &[
    "name",
    "details",
    "severity",
    "owner",
    "dbotCreatedBy",
    "type",
    "dbotSource",
    "category",
    "dbotStatus",
    "playbookId",
    "dbotCreated",
    "dbotClosed",
    "occurred",
    "dbotDueDate",
    "dbotModified",
    "dbotTotalTime",
    "reason",
    "closeReason",
    "closeNotes",
    "closingUserId",
    "reminder",
    "phase",
    "roles",
    "labels",
    "attachment",
    "runStatus",
    "sourceBrand",
    "sourceInstance",
    "CustomFields",
    "droppedCount",
    "linkedCount",
    "feedBased",
    "id",
    "xsoarReadOnlyRoles",
    "dbotMirrorId",
    "dbotMirrorInstance",
    "dbotMirrorDirection",
    "dbotMirrorTags",
    "dbotMirrorLastSync",
];

/// Returns true if `field` is one of [`BUILT_IN_FIELDS`].
#[must_use]
pub fn is_built_in_field(field: &str) -> bool {
    BUILT_IN_FIELDS.contains(&field)
}

/// Default worker count for the catalog walk: one less than the available cores, at least one.
#[must_use]
pub fn default_worker_count() -> usize {
    let cores =
        std::thread::available_parallelism().map(std::num::NonZero::get).unwrap_or(FALLBACK_CORE_COUNT);
    cores.saturating_sub(1).max(1)
}
