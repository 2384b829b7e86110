//! Collision rules between records of one id-set bucket.
//!
//! Two records of a bucket collide when they share an id, overlap in
//! `[fromversion, toversion]`, overlap in marketplaces, and come from the same
//! source and pack. Layouts additionally key on their `kind`.

use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

use super::{Entry, IdSet, Record};
use crate::content::node::scalar_to_string;
use crate::content::{IdSetKey, MarketplaceSet, VersionRange};
use crate::core::ContentError;

/// A duplicated id together with the two records that collide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Duplicate {
    pub id: String,
    pub bucket: IdSetKey,
    /// Pack (or source) of the first record.
    pub first: String,
    /// Pack (or source) of the second record.
    pub second: String,
}

impl Duplicate {
    fn new(id: &str, bucket: IdSetKey, a: &Record, b: &Record) -> Self {
        Self {
            id: id.to_string(),
            bucket,
            first: describe_origin(a),
            second: describe_origin(b),
        }
    }

    /// The user-facing error for this duplicate.
    #[must_use]
    pub fn to_error(&self) -> ContentError {
        ContentError::DuplicateContentId {
            id: self.id.clone(),
            kind: self.bucket.as_str().to_string(),
            first: self.first.clone(),
            second: self.second.clone(),
        }
    }
}

/// Pack name, else the source triple, else the file path of a record.
fn describe_origin(record: &Record) -> String {
    if let Some(pack) = record.get("pack").and_then(Value::as_str).filter(|p| !p.is_empty()) {
        return format!("pack {pack}");
    }
    if let Some(Value::Array(parts)) = record.get("source") {
        let joined: Vec<&str> = parts.iter().filter_map(Value::as_str).filter(|p| !p.is_empty()).collect();
        if !joined.is_empty() {
            return format!("source {}", joined.join("/"));
        }
    }
    record.get("file_path").and_then(Value::as_str).unwrap_or("an unknown location").to_string()
}

fn version_range(record: &Record) -> VersionRange {
    let from = record.get("fromversion").and_then(scalar_to_string);
    let to = record.get("toversion").and_then(scalar_to_string);
    VersionRange::new(from.as_deref(), to.as_deref())
}

fn layout_kind(record: &Record) -> &str {
    record.get("kind").and_then(Value::as_str).unwrap_or_default()
}

/// True when two records with the same id may not coexist.
fn collide(a: &Record, b: &Record) -> bool {
    version_range(a).overlaps(&version_range(b))
        && MarketplaceSet::from_value(a.get("marketplaces")).overlaps(&MarketplaceSet::from_value(b.get("marketplaces")))
        && a.get("source") == b.get("source")
        && a.get("pack") == b.get("pack")
}

/// Pairs of records with `id` that are compared: same id, and for Layouts the same kind.
fn candidate_pairs<'a>(
    records: &'a [Entry],
    id: &str,
    bucket: IdSetKey,
) -> Vec<(&'a Record, &'a Record)> {
    let same_id: Vec<&Record> = records.iter().filter(|(entry_id, _)| entry_id == id).map(|(_, r)| r).collect();
    let mut pairs = Vec::new();
    for (i, a) in same_id.iter().enumerate() {
        for b in &same_id[i + 1..] {
            if bucket == IdSetKey::Layouts && layout_kind(a) != layout_kind(b) {
                continue;
            }
            pairs.push((*a, *b));
        }
    }
    pairs
}

/// Finds the first colliding pair of records carrying `id`.
///
/// With `is_create_new`, any two comparable records collide: a freshly created pack
/// must not reintroduce an existing id.
#[must_use]
pub fn find_collision(records: &[Entry], id: &str, bucket: IdSetKey, is_create_new: bool) -> Option<Duplicate> {
    candidate_pairs(records, id, bucket)
        .into_iter()
        .find(|(a, b)| is_create_new || collide(a, b))
        .map(|(a, b)| Duplicate::new(id, bucket, a, b))
}

/// True when `records` holds two colliding records with `id`.
#[must_use]
pub fn has_duplicate(records: &[Entry], id: &str, bucket: IdSetKey, is_create_new: bool) -> bool {
    find_collision(records, id, bucket, is_create_new).is_some()
}

/// Every duplicated id, per bucket. Buckets without duplicates are omitted.
#[must_use]
pub fn find_duplicates(id_set: &IdSet) -> BTreeMap<IdSetKey, Vec<Duplicate>> {
    let mut found = BTreeMap::new();
    for bucket in IdSetKey::LISTS {
        let records = id_set.bucket(bucket);
        let ids: BTreeSet<&str> = records.iter().map(|(id, _)| id.as_str()).collect();
        let duplicates: Vec<Duplicate> =
            ids.into_iter().filter_map(|id| find_collision(records, id, bucket, false)).collect();
        if !duplicates.is_empty() {
            tracing::debug!("Found {} duplicated ids in {bucket}", duplicates.len());
            found.insert(bucket, duplicates);
        }
    }
    found
}
