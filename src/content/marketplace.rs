//! Marketplace tags and marketplace sets.
//!
//! A marketplace is a deployment target controlling which content items are visible.
//! Items declare the marketplaces they ship to; an empty declaration means "all".

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// The closed set of marketplace tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Marketplace {
    Xsoar,
    #[serde(rename = "marketplacev2")]
    MarketplaceV2,
    Xpanse,
    XsoarOnPrem,
    XsoarSaas,
}

impl Marketplace {
    pub const ALL: [Marketplace; 5] =
        [Self::Xsoar, Self::MarketplaceV2, Self::Xpanse, Self::XsoarOnPrem, Self::XsoarSaas];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Xsoar => "xsoar",
            Self::MarketplaceV2 => "marketplacev2",
            Self::Xpanse => "xpanse",
            Self::XsoarOnPrem => "xsoar_on_prem",
            Self::XsoarSaas => "xsoar_saas",
        }
    }

    /// True when `k_x2` keys override `k` for this marketplace.
    #[must_use]
    pub const fn uses_alternative_keys(self) -> bool {
        matches!(self, Self::MarketplaceV2)
    }
}

impl fmt::Display for Marketplace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Marketplace {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xsoar" => Ok(Self::Xsoar),
            "marketplacev2" | "mpv2" => Ok(Self::MarketplaceV2),
            "xpanse" => Ok(Self::Xpanse),
            "xsoar_on_prem" => Ok(Self::XsoarOnPrem),
            "xsoar_saas" => Ok(Self::XsoarSaas),
            other => Err(anyhow::anyhow!(
                "Unknown marketplace '{other}' (expected one of: xsoar, marketplacev2, xpanse, xsoar_on_prem, xsoar_saas)"
            )),
        }
    }
}

/// A set of marketplaces where the empty set means every marketplace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarketplaceSet(BTreeSet<Marketplace>);

impl MarketplaceSet {
    /// The unconstrained set, usable in `static` items.
    pub const EMPTY: MarketplaceSet = MarketplaceSet(BTreeSet::new());

    /// The unconstrained set.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Reads a `marketplaces` value. Unknown tags are ignored with a debug log.
    #[must_use]
    pub fn from_value(value: Option<&Value>) -> Self {
        let mut set = BTreeSet::new();
        match value {
            Some(Value::Array(items)) => {
                for item in items {
                    if let Some(tag) = item.as_str() {
                        match tag.parse::<Marketplace>() {
                            Ok(mp) => {
                                set.insert(mp);
                            }
                            Err(_) => tracing::debug!("Ignoring unknown marketplace tag '{tag}'"),
                        }
                    }
                }
            }
            Some(Value::String(tag)) => {
                if let Ok(mp) = tag.parse::<Marketplace>() {
                    set.insert(mp);
                }
            }
            _ => {}
        }
        Self(set)
    }

    #[must_use]
    pub fn is_unconstrained(&self) -> bool {
        self.0.is_empty()
    }

    /// True when `mp` may see items carrying this set.
    #[must_use]
    pub fn allows(&self, mp: Marketplace) -> bool {
        self.0.is_empty() || self.0.contains(&mp)
    }

    /// Non-disjointness, treating the empty set as "all".
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.0.is_empty() || other.0.is_empty() || !self.0.is_disjoint(&other.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = Marketplace> + '_ {
        self.0.iter().copied()
    }

    /// Serializes as a JSON array of tags.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Array(self.0.iter().map(|mp| Value::String(mp.as_str().to_string())).collect())
    }
}

impl FromIterator<Marketplace> for MarketplaceSet {
    fn from_iter<I: IntoIterator<Item = Marketplace>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
