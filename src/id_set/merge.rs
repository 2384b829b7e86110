//! Merging two id-sets built from disjoint subtrees.

use anyhow::Result;
use std::path::Path;

use super::duplicates::{Duplicate, find_collision};
use super::{Entry, IdSet};
use crate::content::IdSetKey;

/// Merges `second` into a copy of `first`.
///
/// Records of an id already present in `first` are checked for collisions; the
/// first duplicate aborts the merge and `(None, [duplicate])` is returned. Pack
/// records merge by name, and a name present on both sides is a duplicate.
#[must_use]
pub fn merge_id_sets(first: &IdSet, second: &IdSet) -> (Option<IdSet>, Vec<Duplicate>) {
    let mut merged = first.clone();

    for bucket in IdSetKey::LISTS {
        let existing = first.bucket(bucket);
        for (id, record) in second.bucket(bucket) {
            let mut candidates: Vec<Entry> = existing.iter().filter(|(e, _)| e == id).cloned().collect();
            if !candidates.is_empty() {
                candidates.push((id.clone(), record.clone()));
                if let Some(duplicate) = find_collision(&candidates, id, bucket, false) {
                    tracing::warn!(target: "id_set::merge", "{}", duplicate.to_error());
                    return (None, vec![duplicate]);
                }
            }
            merged.push(bucket, id.clone(), record.clone());
        }
    }

    for (name, record) in second.packs() {
        if first.packs().contains_key(name) {
            let duplicate = Duplicate {
                id: name.clone(),
                bucket: IdSetKey::Packs,
                first: "the first id-set".to_string(),
                second: "the second id-set".to_string(),
            };
            tracing::warn!(target: "id_set::merge", "{}", duplicate.to_error());
            return (None, vec![duplicate]);
        }
        if let Some(record) = record.as_object() {
            merged.insert_pack(name.clone(), record.clone());
        }
    }

    tracing::debug!(
        target: "id_set::merge",
        "Merged {} records into {} records",
        second.len(),
        first.len()
    );
    (Some(merged), Vec::new())
}

/// Reads two id-set files, merges them, and writes the result to `output` on success.
///
/// Nothing is written when the merge finds a duplicate.
pub fn merge_id_sets_from_files(
    first_path: &Path,
    second_path: &Path,
    output: &Path,
) -> Result<(Option<IdSet>, Vec<Duplicate>)> {
    let first = IdSet::load(first_path)?;
    let second = IdSet::load(second_path)?;
    let (merged, duplicates) = merge_id_sets(&first, &second);
    if let Some(id_set) = &merged {
        id_set.save(output)?;
        tracing::info!(target: "id_set::merge", "Wrote merged id-set to {}", output.display());
    }
    Ok((merged, duplicates))
}
