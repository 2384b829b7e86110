//! The repository walk producing an id-set.
//!
//! Each pack under `Packs/` is one unit of work, and so is the top-level
//! `TestPlaybooks/` directory. Units run on the blocking pool with at most
//! `workers` in flight; their partial id-sets are absorbed by the driver one at
//! a time, then a few passes resolve references that need the whole catalog.
//!
//! Cancellation is cooperative: a unit that has not started when the flag is
//! raised contributes nothing, and the id-set of finished packs is returned.

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::extract::{ExtractContext, extract_record};
use super::marketplace::{GateItem, record_exclusion};
use super::{Entry, Exclusions, IdSet, RepoSource, should_skip_item_by_mp};
use crate::constants::{PACK_METADATA_FILE, PACKS_DIR, TEST_PLAYBOOKS_DIR, default_worker_count};
use crate::content::node::yaml_to_node;
use crate::content::{ContentKind, IdSetKey, ItemForm, Marketplace, MarketplaceSet, detect_kind_from};
use crate::unify::code::{CodeType, find_code_file, is_inlined_code};
use crate::unify::find_manifest;
use crate::utils::fs::{list_dir_sorted, read_json_file, read_text_file_normalized, read_yaml_file};
use crate::utils::progress::ProgressBar;

/// Options for [`build_id_set`].
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Active marketplace; `None` keeps every item.
    pub marketplace: Option<Marketplace>,
    /// Packs processed concurrently.
    pub workers: usize,
    /// Provenance stamped on records; resolved from the repository's git remote when `None`.
    pub source: Option<RepoSource>,
    /// Raised by the caller to stop the walk at the next pack boundary.
    pub cancel: Option<Arc<AtomicBool>>,
    pub show_progress: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            marketplace: None,
            workers: default_worker_count(),
            source: None,
            cancel: None,
            show_progress: false,
        }
    }
}

/// An item that could not be read or extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Result of a walk.
#[derive(Debug, Default)]
pub struct IdSetBuild {
    pub id_set: IdSet,
    /// Items left out by marketplace gating.
    pub exclusions: Exclusions,
    /// Items skipped because they could not be read or extracted.
    pub failures: Vec<ItemFailure>,
    /// True when the walk stopped early.
    pub cancelled: bool,
}

/// Settings shared by every unit of one walk.
struct WalkSettings {
    repo_root: PathBuf,
    marketplace: Option<Marketplace>,
    source: RepoSource,
}

#[derive(Default)]
struct UnitResult {
    id_set: IdSet,
    exclusions: Exclusions,
    failures: Vec<ItemFailure>,
}

/// Walks `repo_root` and builds its id-set.
///
/// # Errors
///
/// Fails when `repo_root` is not a directory or its `Packs/` directory cannot be
/// listed. Per-item problems are reported in [`IdSetBuild::failures`].
pub async fn build_id_set(repo_root: &Path, options: &BuildOptions) -> Result<IdSetBuild> {
    if !repo_root.is_dir() {
        return Err(crate::core::ContentError::InvalidInput {
            path: repo_root.display().to_string(),
            reason: "expected a content repository root".to_string(),
        }
        .into());
    }

    let source = RepoSource::resolve(options.source.as_ref(), repo_root);
    let settings = Arc::new(WalkSettings {
        repo_root: repo_root.to_path_buf(),
        marketplace: options.marketplace,
        source,
    });

    let packs_dir = repo_root.join(PACKS_DIR);
    let mut units: Vec<Option<PathBuf>> = if packs_dir.is_dir() {
        list_dir_sorted(&packs_dir)
            .with_context(|| format!("Failed to list {}", packs_dir.display()))?
            .into_iter()
            .filter(|p| p.is_dir())
            .map(Some)
            .collect()
    } else {
        tracing::warn!(target: "id_set::walk", "No {PACKS_DIR} directory in {}", repo_root.display());
        Vec::new()
    };
    if repo_root.join(TEST_PLAYBOOKS_DIR).is_dir() {
        units.push(None);
    }

    tracing::info!(
        target: "id_set::walk",
        "Building id-set for {} packs with {} workers",
        units.len(),
        options.workers.max(1)
    );

    let progress = if options.show_progress {
        ProgressBar::new(units.len() as u64)
    } else {
        ProgressBar::hidden()
    };
    progress.set_prefix("id-set");

    let cancel = options.cancel.clone();
    let results: Vec<Option<UnitResult>> = stream::iter(units)
        .map(|pack_dir| {
            let settings = Arc::clone(&settings);
            let cancel = cancel.clone();
            let progress = progress.clone();
            async move {
                if cancel.as_ref().is_some_and(|c| c.load(Ordering::Relaxed)) {
                    return None;
                }
                let label = pack_dir
                    .as_deref()
                    .and_then(Path::file_name)
                    .map_or_else(|| TEST_PLAYBOOKS_DIR.to_string(), |n| n.to_string_lossy().into_owned());
                let result = tokio::task::spawn_blocking(move || match pack_dir {
                    Some(dir) => walk_pack(&settings, &dir),
                    None => walk_test_playbooks(&settings),
                })
                .await;
                progress.set_message(label.clone());
                progress.inc(1);
                match result {
                    Ok(unit) => Some(unit),
                    Err(e) => {
                        tracing::warn!(target: "id_set::walk", "Worker for {label} failed: {e}");
                        None
                    }
                }
            }
        })
        .buffer_unordered(options.workers.max(1))
        .collect()
        .await;
    progress.finish_and_clear();

    let mut build = IdSetBuild {
        cancelled: cancel.as_ref().is_some_and(|c| c.load(Ordering::Relaxed)),
        ..IdSetBuild::default()
    };
    for unit in results.into_iter().flatten() {
        build.id_set.absorb(unit.id_set);
        for (pack, items) in unit.exclusions {
            build.exclusions.entry(pack).or_default().extend(items);
        }
        build.failures.extend(unit.failures);
    }

    link_indicator_types(&mut build.id_set);
    expand_all_incident_types(&mut build.id_set);
    resolve_generic_types(&mut build.id_set);
    build.id_set.sort_buckets();

    tracing::info!(
        target: "id_set::walk",
        "Id-set holds {} records ({} excluded, {} failed)",
        build.id_set.len(),
        build.exclusions.values().map(BTreeSet::len).sum::<usize>(),
        build.failures.len()
    );
    Ok(build)
}

/// Path of `path` relative to the repository root, with `/` separators.
fn relative_path(repo_root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(repo_root).unwrap_or(path);
    relative.components().map(|c| c.as_os_str().to_string_lossy()).collect::<Vec<_>>().join("/")
}

fn is_document(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()).is_some_and(|e| matches!(e, "yml" | "yaml" | "json"))
}

/// Items of one kind directory: package directories and yml/json documents.
fn items_of(kind_dir: &Path, dir_kind: ContentKind) -> Result<Vec<ItemForm>> {
    let mut items = Vec::new();
    for entry in list_dir_sorted(kind_dir)? {
        if entry.is_dir() {
            if dir_kind.is_packageable() {
                items.push(ItemForm::Package(entry));
            } else {
                tracing::debug!(target: "id_set::walk", "Skipping directory {}", entry.display());
            }
        } else if is_document(&entry) {
            items.push(ItemForm::Unified(entry));
        }
    }
    Ok(items)
}

/// A parsed item: the document it was read from, its body, and package code if any.
struct LoadedItem {
    path: PathBuf,
    doc: Value,
    code: Option<String>,
}

fn read_document(path: &Path) -> Result<Value> {
    if path.extension().is_some_and(|e| e == "json") {
        read_json_file(path)
    } else {
        let yaml: serde_yaml::Value = read_yaml_file(path)?;
        yaml_to_node(&yaml)
    }
}

/// Code of a package whose manifest leaves the code field blank.
fn package_code(package_dir: &Path, doc: &Value) -> Option<String> {
    let holder = match doc.get("script") {
        Some(script @ Value::Object(_)) => script,
        _ => doc,
    };
    let inlined = holder.get("script").and_then(Value::as_str).is_some_and(is_inlined_code);
    if inlined {
        return None;
    }
    let code_type = CodeType::from_yml(holder.get("type").and_then(Value::as_str)?)?;
    match find_code_file(package_dir, code_type).and_then(|path| read_text_file_normalized(&path)) {
        Ok(code) => Some(code),
        Err(e) => {
            tracing::debug!(target: "id_set::walk", "No code for {}: {e}", package_dir.display());
            None
        }
    }
}

fn load_item(item: &ItemForm) -> Result<LoadedItem> {
    match item {
        ItemForm::Package(dir) => {
            let manifest = find_manifest(dir)?;
            let doc = read_document(&manifest)?;
            let code = package_code(dir, &doc);
            Ok(LoadedItem {
                path: manifest,
                doc,
                code,
            })
        }
        ItemForm::Unified(path) => Ok(LoadedItem {
            path: path.clone(),
            doc: read_document(path)?,
            code: None,
        }),
    }
}

/// Where an item lives and how its pack is gated.
struct PackScope<'a> {
    name: Option<&'a str>,
    marketplaces: &'a MarketplaceSet,
    /// False when the whole pack is unavailable in the active marketplace.
    allowed: bool,
}

fn process_item(
    settings: &WalkSettings,
    scope: &PackScope<'_>,
    item: &ItemForm,
    dir_kind: ContentKind,
    out: &mut UnitResult,
) -> Result<()> {
    let loaded = load_item(item)?;
    let kind = match detect_kind_from(&loaded.path, &loaded.doc) {
        Some(ContentKind::PackMetadata) | None => dir_kind,
        Some(kind) => kind,
    };
    let ctx = ExtractContext::new(&loaded.path, relative_path(&settings.repo_root, &loaded.path))
        .pack(scope.name)
        .pack_marketplaces(scope.marketplaces)
        .source(&settings.source)
        .marketplace(settings.marketplace)
        .code(loaded.code.as_deref());
    let Some((id, record)) = extract_record(kind, &ctx, &loaded.doc)? else {
        return Ok(());
    };

    if !scope.allowed {
        record_exclusion(&mut out.exclusions, scope.name, kind, &id);
        return Ok(());
    }
    let gate = GateItem {
        kind,
        id: &id,
        pack: scope.name,
        doc: &loaded.doc,
        pack_marketplaces: scope.marketplaces,
    };
    if should_skip_item_by_mp(&loaded.path, gate, settings.marketplace, &mut out.exclusions) {
        return Ok(());
    }

    tracing::debug!(target: "id_set::walk", "Adding {kind} {id} from {}", ctx.file_path);
    out.id_set.push(kind.id_set_key(), id, record);
    Ok(())
}

fn process_dir(
    settings: &WalkSettings,
    scope: &PackScope<'_>,
    kind_dir: &Path,
    dir_kind: ContentKind,
    out: &mut UnitResult,
) {
    let items = match items_of(kind_dir, dir_kind) {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!(target: "id_set::walk", "Cannot list {}: {e}", kind_dir.display());
            out.failures.push(ItemFailure {
                path: kind_dir.to_path_buf(),
                error: format!("{e:#}"),
            });
            return;
        }
    };
    for item in items {
        if let Err(e) = process_item(settings, scope, &item, dir_kind, out) {
            tracing::warn!(target: "id_set::walk", "Skipping {}: {e:#}", item.path().display());
            out.failures.push(ItemFailure {
                path: item.path().to_path_buf(),
                error: format!("{e:#}"),
            });
        }
    }
}

/// Walks one pack end-to-end.
fn walk_pack(settings: &WalkSettings, pack_dir: &Path) -> UnitResult {
    let mut out = UnitResult::default();
    let name = pack_dir.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();

    let metadata_path = pack_dir.join(PACK_METADATA_FILE);
    if !metadata_path.is_file() {
        tracing::warn!(target: "id_set::walk", "Pack {name} has no {PACK_METADATA_FILE}, skipping it");
        return out;
    }
    let metadata: Value = match read_json_file(&metadata_path) {
        Ok(metadata) => metadata,
        Err(e) => {
            tracing::warn!(target: "id_set::walk", "Skipping pack {name}: {e:#}");
            out.failures.push(ItemFailure {
                path: metadata_path,
                error: format!("{e:#}"),
            });
            return out;
        }
    };

    let marketplaces = MarketplaceSet::from_value(metadata.get("marketplaces"));
    let allowed = settings.marketplace.is_none_or(|mp| marketplaces.allows(mp));
    if !allowed {
        tracing::debug!(target: "id_set::walk", "Pack {name} is not available in the active marketplace");
    }
    let scope = PackScope {
        name: Some(&name),
        marketplaces: &marketplaces,
        allowed,
    };

    let ctx = ExtractContext::new(&metadata_path, relative_path(&settings.repo_root, &metadata_path))
        .pack(Some(&name))
        .pack_marketplaces(&marketplaces)
        .source(&settings.source);
    match extract_record(ContentKind::PackMetadata, &ctx, &metadata) {
        Ok(Some((id, record))) if allowed => out.id_set.push(IdSetKey::Packs, id, record),
        Ok(_) => {}
        Err(e) => out.failures.push(ItemFailure {
            path: metadata_path.clone(),
            error: format!("{e:#}"),
        }),
    }

    let kind_dirs = match list_dir_sorted(pack_dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(target: "id_set::walk", "Cannot list pack {name}: {e:#}");
            return out;
        }
    };
    for kind_dir in kind_dirs.iter().filter(|p| p.is_dir()) {
        let Some(dir_kind) = kind_dir.file_name().and_then(|n| n.to_str()).and_then(ContentKind::from_dir_name)
        else {
            continue;
        };
        process_dir(settings, &scope, kind_dir, dir_kind, &mut out);
    }
    tracing::debug!(target: "id_set::walk", "Pack {name}: {} records", out.id_set.len());
    out
}

/// Walks the top-level `TestPlaybooks/` directory, which belongs to no pack.
fn walk_test_playbooks(settings: &WalkSettings) -> UnitResult {
    let mut out = UnitResult::default();
    let scope = PackScope {
        name: None,
        marketplaces: &MarketplaceSet::EMPTY,
        allowed: true,
    };
    let dir = settings.repo_root.join(TEST_PLAYBOOKS_DIR);
    process_dir(settings, &scope, &dir, ContentKind::TestPlaybook, &mut out);
    out
}

fn string_ids(record: &super::Record, key: &str) -> Vec<String> {
    match record.get(key) {
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).map(str::to_string).collect(),
        _ => Vec::new(),
    }
}

fn set_ids(record: &mut super::Record, key: &str, ids: BTreeSet<String>) {
    if ids.is_empty() {
        record.remove(key);
    } else {
        record.insert(key.to_string(), Value::Array(ids.into_iter().map(Value::String).collect()));
    }
}

/// Lists on each indicator type the integrations implementing its reputation command.
fn link_indicator_types(id_set: &mut IdSet) {
    let integrations: Vec<(String, BTreeSet<String>)> = id_set
        .bucket(IdSetKey::Integrations)
        .iter()
        .map(|(id, record)| (id.clone(), string_ids(record, "commands").into_iter().collect()))
        .collect();

    for (_, record) in id_set.bucket_mut(IdSetKey::IndicatorTypes).iter_mut() {
        let Some(Value::String(command)) = record.remove("reputation_command") else {
            continue;
        };
        let linked: BTreeSet<String> = integrations
            .iter()
            .filter(|(_, commands)| commands.contains(&command))
            .map(|(id, _)| id.clone())
            .collect();
        set_ids(record, "integrations", linked);
    }
}

/// Replaces an incident field's `all` association with every known incident type.
fn expand_all_incident_types(id_set: &mut IdSet) {
    let all_types: BTreeSet<String> =
        id_set.bucket(IdSetKey::IncidentTypes).iter().map(|(id, _)| id.clone()).collect();
    for (_, record) in id_set.bucket_mut(IdSetKey::IncidentFields).iter_mut() {
        if string_ids(record, "incident_types").iter().any(|t| t == "all") {
            set_ids(record, "incident_types", all_types.clone());
        }
    }
}

/// Narrows each generic field's `generic_types` to types of the same definition.
fn resolve_generic_types(id_set: &mut IdSet) {
    let types: Vec<Entry> = id_set.bucket(IdSetKey::GenericTypes).to_vec();
    for (_, record) in id_set.bucket_mut(IdSetKey::GenericFields).iter_mut() {
        let definition = record.get("definitionId").and_then(Value::as_str).map(str::to_string);
        let declared: BTreeSet<String> = string_ids(record, "generic_types").into_iter().collect();
        let known: BTreeSet<String> = types
            .iter()
            .filter(|(_, t)| t.get("definitionId").and_then(Value::as_str) == definition.as_deref())
            .map(|(id, _)| id.clone())
            .filter(|id| declared.contains(id))
            .collect();
        set_ids(record, "generic_types", known);
    }
}
