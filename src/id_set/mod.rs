//! Catalog builder: the id-set cross-reference index over a content repository.
//!
//! An id-set maps each bucket name (`scripts`, `integrations`, `Layouts`, …) to a
//! list of single-key `{id: record}` mappings, plus a `Packs` mapping of pack name
//! to pack record. The list shape lets several versions of one id coexist.
//!
//! # Modules
//!
//! - [`extract`] - per-kind record extraction
//! - [`walk`] - the parallel repository walk producing an [`IdSetBuild`]
//! - [`duplicates`] - collision rules between records of one bucket
//! - [`merge`] - combining two id-sets
//! - [`marketplace`] - marketplace gating and the exclusions table
//! - [`source`] - the provenance triple stamped on every record

pub mod duplicates;
pub mod extract;
pub mod marketplace;
pub mod merge;
pub mod source;
pub mod walk;

pub use duplicates::{find_duplicates, has_duplicate};
pub use marketplace::{Exclusions, should_skip_item_by_mp};
pub use merge::{merge_id_sets, merge_id_sets_from_files};
pub use source::RepoSource;
pub use walk::{BuildOptions, IdSetBuild, ItemFailure, build_id_set};

use anyhow::Result;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

use crate::content::IdSetKey;
use crate::core::ContentError;
use crate::utils::fs::{read_json_file, write_json_file};

/// The attributes of one content item.
pub type Record = Map<String, Value>;

/// A bucket entry: the item id and its record.
pub type Entry = (String, Record);

/// The id-set of a repository or of a subtree of it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdSet {
    buckets: BTreeMap<IdSetKey, Vec<Entry>>,
    packs: Record,
}

impl IdSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record to a list bucket, or stores it as a pack record for `Packs`.
    pub fn push(&mut self, key: IdSetKey, id: impl Into<String>, record: Record) {
        let id = id.into();
        if key == IdSetKey::Packs {
            self.packs.insert(id, Value::Object(record));
        } else {
            self.buckets.entry(key).or_default().push((id, record));
        }
    }

    /// Entries of a list bucket; `Packs` has none.
    #[must_use]
    pub fn bucket(&self, key: IdSetKey) -> &[Entry] {
        self.buckets.get(&key).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn bucket_mut(&mut self, key: IdSetKey) -> &mut Vec<Entry> {
        self.buckets.entry(key).or_default()
    }

    /// Pack records keyed by pack name.
    #[must_use]
    pub fn packs(&self) -> &Record {
        &self.packs
    }

    /// Stores a pack record, returning the record it replaced.
    pub fn insert_pack(&mut self, name: impl Into<String>, record: Record) -> Option<Value> {
        self.packs.insert(name.into(), Value::Object(record))
    }

    /// True when `id` has at least one record in `key`.
    #[must_use]
    pub fn contains(&self, key: IdSetKey, id: &str) -> bool {
        if key == IdSetKey::Packs {
            return self.packs.contains_key(id);
        }
        self.bucket(key).iter().any(|(entry_id, _)| entry_id == id)
    }

    /// Number of records per bucket, in emission order, `Packs` last.
    #[must_use]
    pub fn counts(&self) -> Vec<(IdSetKey, usize)> {
        IdSetKey::LISTS
            .iter()
            .map(|key| (*key, self.bucket(*key).len()))
            .chain(std::iter::once((IdSetKey::Packs, self.packs.len())))
            .collect()
    }

    /// Total number of records, pack records included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum::<usize>() + self.packs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends every record of `other` without any duplicate check.
    pub fn absorb(&mut self, other: IdSet) {
        for (key, entries) in other.buckets {
            self.buckets.entry(key).or_default().extend(entries);
        }
        for (name, record) in other.packs {
            self.packs.insert(name, record);
        }
    }

    /// Sorts every bucket by lower-cased id; equal ids keep their relative order.
    pub fn sort_buckets(&mut self) {
        for entries in self.buckets.values_mut() {
            entries.sort_by_cached_key(|(id, _)| id.to_lowercase());
        }
        let mut packs: Vec<(String, Value)> = std::mem::take(&mut self.packs).into_iter().collect();
        packs.sort_by(|(a, _), (b, _)| a.cmp(b));
        self.packs = packs.into_iter().collect();
    }

    /// The JSON form: every list bucket in emission order, then `Packs`.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut out = Map::new();
        for key in IdSetKey::LISTS {
            let items = self
                .bucket(key)
                .iter()
                .map(|(id, record)| {
                    let mut single = Map::new();
                    single.insert(id.clone(), Value::Object(record.clone()));
                    Value::Object(single)
                })
                .collect();
            out.insert(key.as_str().to_string(), Value::Array(items));
        }
        out.insert(IdSetKey::Packs.as_str().to_string(), Value::Object(self.packs.clone()));
        Value::Object(out)
    }

    /// Parses the JSON form. Unknown top-level keys are ignored with a warning.
    pub fn from_value(value: &Value, origin: &str) -> Result<Self> {
        let malformed = |reason: String| ContentError::MalformedDocument {
            path: origin.to_string(),
            reason,
        };
        let Value::Object(top) = value else {
            return Err(malformed("an id-set must be a JSON object".to_string()).into());
        };

        let mut id_set = Self::new();
        for (name, bucket) in top {
            let Some(key) = IdSetKey::parse(name) else {
                tracing::warn!("Ignoring unknown id-set key '{name}' in {origin}");
                continue;
            };
            if key == IdSetKey::Packs {
                let Value::Object(packs) = bucket else {
                    return Err(malformed("'Packs' must map pack names to records".to_string()).into());
                };
                id_set.packs = packs.clone();
                continue;
            }

            let Value::Array(items) = bucket else {
                return Err(malformed(format!("'{name}' must be a list")).into());
            };
            for item in items {
                let single = item.as_object().filter(|m| m.len() == 1);
                let Some((id, Value::Object(record))) = single.and_then(|m| m.iter().next()) else {
                    return Err(malformed(format!("'{name}' entries must be single-key {{id: record}} mappings")).into());
                };
                id_set.push(key, id.clone(), record.clone());
            }
        }
        Ok(id_set)
    }

    /// Reads an id-set JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let value: Value = read_json_file(path)?;
        Self::from_value(&value, &path.display().to_string())
    }

    /// Writes the id-set as indented JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        write_json_file(path, &self.to_value(), true)
    }
}

impl serde::Serialize for IdSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_emission_order_and_shape() {
        let mut id_set = IdSet::new();
        id_set.push(IdSetKey::Integrations, "B", record(json!({"name": "B"})));
        id_set.push(IdSetKey::Scripts, "a", record(json!({"name": "a"})));
        id_set.push(IdSetKey::Packs, "Demo", record(json!({"name": "Demo"})));

        let value = id_set.to_value();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys.first().unwrap().as_str(), "scripts");
        assert_eq!(keys.last().unwrap().as_str(), "Packs");
        assert_eq!(keys.len(), IdSetKey::LISTS.len() + 1);
        assert_eq!(value["scripts"], json!([{"a": {"name": "a"}}]));
        assert_eq!(value["Packs"]["Demo"]["name"], "Demo");
    }

    #[test]
    fn test_from_value_round_trip() {
        let mut id_set = IdSet::new();
        id_set.push(IdSetKey::Layouts, "urlRep", record(json!({"kind": "details"})));
        id_set.push(IdSetKey::Layouts, "urlRep", record(json!({"kind": "edit"})));
        id_set.insert_pack("Demo", record(json!({"name": "Demo"})));

        let parsed = IdSet::from_value(&id_set.to_value(), "test").unwrap();
        assert_eq!(parsed, id_set);
        assert_eq!(parsed.bucket(IdSetKey::Layouts).len(), 2);
    }

    #[test]
    fn test_from_value_rejects_bad_shapes() {
        let err = IdSet::from_value(&json!({"scripts": {"a": {}}}), "x.json").unwrap_err();
        assert!(matches!(err.downcast_ref::<ContentError>(), Some(ContentError::MalformedDocument { .. })));

        let err = IdSet::from_value(&json!({"scripts": [{"a": {}, "b": {}}]}), "x.json").unwrap_err();
        assert!(err.to_string().contains("single-key"));

        assert!(IdSet::from_value(&json!([]), "x.json").is_err());
    }

    #[test]
    fn test_sort_buckets_is_case_insensitive() {
        let mut id_set = IdSet::new();
        for id in ["beta", "Alpha", "gamma"] {
            id_set.push(IdSetKey::Scripts, id, Record::new());
        }
        id_set.sort_buckets();
        let ids: Vec<&str> = id_set.bucket(IdSetKey::Scripts).iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["Alpha", "beta", "gamma"]);
    }

    #[test]
    fn test_counts_and_contains() {
        let mut id_set = IdSet::new();
        id_set.push(IdSetKey::Scripts, "a", Record::new());
        id_set.push(IdSetKey::Scripts, "b", Record::new());
        id_set.insert_pack("P", Record::new());

        assert_eq!(id_set.len(), 3);
        assert!(id_set.contains(IdSetKey::Scripts, "a"));
        assert!(id_set.contains(IdSetKey::Packs, "P"));
        assert!(!id_set.contains(IdSetKey::Playbooks, "a"));
        let counts = id_set.counts();
        assert_eq!(counts[0], (IdSetKey::Scripts, 2));
        assert_eq!(counts.last(), Some(&(IdSetKey::Packs, 1)));
    }
}
