//! Loose dotted version ordering.
//!
//! Content items declare `fromversion`/`toversion` as dotted strings that are usually,
//! but not always, strict semver (`6.0`, `5.5.0`, `99.99.99`). Comparison splits on
//! `.` and `-`, compares numeric components numerically, and orders numbers before
//! words, so `6.0` < `6.0.1` and `5.9.9` < `6.0.0`.

use std::cmp::Ordering;
use std::fmt;

use crate::constants::{DEFAULT_FROM_VERSION, DEFAULT_TO_VERSION};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Component {
    Num(u64),
    Alpha(String),
}

impl PartialOrd for Component {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Component {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Num(a), Self::Num(b)) => a.cmp(b),
            (Self::Alpha(a), Self::Alpha(b)) => a.cmp(b),
            (Self::Num(_), Self::Alpha(_)) => Ordering::Less,
            (Self::Alpha(_), Self::Num(_)) => Ordering::Greater,
        }
    }
}

/// A version compared component by component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LooseVersion {
    raw: String,
    parts: Vec<Component>,
}

impl LooseVersion {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let parts = raw
            .trim()
            .split(['.', '-'])
            .filter(|p| !p.is_empty())
            .map(|p| p.parse::<u64>().map_or_else(|_| Component::Alpha(p.to_string()), Component::Num))
            .collect();
        Self {
            raw: raw.trim().to_string(),
            parts,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl PartialOrd for LooseVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LooseVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.parts.cmp(&other.parts)
    }
}

impl fmt::Display for LooseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Inclusive `[from, to]` version bounds with the catalog defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    pub from: LooseVersion,
    pub to: LooseVersion,
}

impl VersionRange {
    /// Builds a range, defaulting missing or empty bounds.
    #[must_use]
    pub fn new(from: Option<&str>, to: Option<&str>) -> Self {
        let from = from.filter(|s| !s.trim().is_empty()).unwrap_or(DEFAULT_FROM_VERSION);
        let to = to.filter(|s| !s.trim().is_empty()).unwrap_or(DEFAULT_TO_VERSION);
        Self {
            from: LooseVersion::parse(from),
            to: LooseVersion::parse(to),
        }
    }

    /// True when the two inclusive ranges share at least one version.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.from <= other.to && other.from <= self.to
    }
}
