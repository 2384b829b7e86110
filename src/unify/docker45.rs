//! Dual emission for items that still ship a legacy 4.5 docker image.

use anyhow::Result;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use crate::constants::{DOCKER45_SPLIT_VERSION, DOCKER45_TO_VERSION};
use crate::content::LooseVersion;
use crate::content::node::scalar_to_string;
use crate::core::ContentError;

const DOCKERIMAGE45: &str = "dockerimage45";

/// The mapping holding the docker fields: a nested `script` section, else the root.
fn docker_holder(doc: &mut Map<String, Value>, script_section: bool) -> Option<&mut Map<String, Value>> {
    if script_section {
        doc.get_mut("script").and_then(Value::as_object_mut)
    } else {
        Some(doc)
    }
}

/// Splits `doc` into a 5.0+ document and a legacy document when `dockerimage45` is set.
///
/// Returns `[(dest, doc)]` when no legacy image is declared, otherwise the current
/// document at `dest` and the legacy document at `dest` with `.yml` → `_45.yml`.
pub fn emit_with_docker45(
    mut doc: Map<String, Value>,
    dest: &Path,
    script_section: bool,
) -> Result<Vec<(PathBuf, Map<String, Value>)>> {
    let Some(legacy_image) =
        docker_holder(&mut doc, script_section).and_then(|holder| holder.get(DOCKERIMAGE45).cloned())
    else {
        return Ok(vec![(dest.to_path_buf(), doc)]);
    };

    normalize_bound(&mut doc, "fromversion");
    normalize_bound(&mut doc, "toversion");

    let split = LooseVersion::parse(DOCKER45_SPLIT_VERSION);
    if let Some(from) = doc.get("fromversion").and_then(Value::as_str)
        && LooseVersion::parse(from) >= split
    {
        return Err(ContentError::VersionBoundsConflict {
            bound: "fromversion".to_string(),
            value: from.to_string(),
            relation: "at or above".to_string(),
            split: DOCKER45_SPLIT_VERSION.to_string(),
        }
        .into());
    }
    if let Some(to) = doc.get("toversion").and_then(Value::as_str)
        && LooseVersion::parse(to) < split
    {
        return Err(ContentError::VersionBoundsConflict {
            bound: "toversion".to_string(),
            value: to.to_string(),
            relation: "below".to_string(),
            split: DOCKER45_SPLIT_VERSION.to_string(),
        }
        .into());
    }

    if let Some(holder) = docker_holder(&mut doc, script_section) {
        holder.shift_remove(DOCKERIMAGE45);
    }
    let mut legacy = doc.clone();

    doc.insert("fromversion".to_string(), Value::String(DOCKER45_SPLIT_VERSION.to_string()));
    legacy.insert("toversion".to_string(), Value::String(DOCKER45_TO_VERSION.to_string()));
    if let Some(holder) = docker_holder(&mut legacy, script_section) {
        let empty = legacy_image.is_null() || legacy_image.as_str().is_some_and(str::is_empty);
        if empty {
            holder.shift_remove("dockerimage");
        } else {
            holder.insert("dockerimage".to_string(), legacy_image);
        }
    }

    let legacy_dest = legacy_path(dest);
    Ok(vec![(dest.to_path_buf(), doc), (legacy_dest, legacy)])
}

/// Rewrites an unquoted numeric bound (`fromversion: 5.5`) as a string.
fn normalize_bound(doc: &mut Map<String, Value>, key: &str) {
    if let Some(value) = doc.get(key).filter(|v| !v.is_string())
        && let Some(text) = scalar_to_string(value)
    {
        doc.insert(key.to_string(), Value::String(text));
    }
}

/// `out/integration-X.yml` → `out/integration-X_45.yml`.
#[must_use]
pub fn legacy_path(dest: &Path) -> PathBuf {
    let text = dest.to_string_lossy();
    match text.strip_suffix(".yml") {
        Some(stem) => PathBuf::from(format!("{stem}_45.yml")),
        None => PathBuf::from(format!("{text}_45")),
    }
}
