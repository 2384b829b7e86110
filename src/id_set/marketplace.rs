//! Marketplace gating of catalog items.

use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::content::{ContentKind, Marketplace, MarketplaceSet};

/// Items left out of an id-set by marketplace gating, grouped by pack.
///
/// Serializes as `{pack: [[kind, id], ...]}`.
pub type Exclusions = BTreeMap<String, BTreeSet<(ContentKind, String)>>;

/// One content item as seen by the gate.
#[derive(Debug, Clone, Copy)]
pub struct GateItem<'a> {
    pub kind: ContentKind,
    pub id: &'a str,
    /// Owning pack; `None` for items outside `Packs/`.
    pub pack: Option<&'a str>,
    /// The item's own document.
    pub doc: &'a Value,
    /// Marketplaces declared by the owning pack's metadata.
    pub pack_marketplaces: &'a MarketplaceSet,
}

/// Marketplaces of an item: its own `marketplaces` list, else its pack's.
#[must_use]
pub fn item_marketplaces(doc: &Value, pack_marketplaces: &MarketplaceSet) -> MarketplaceSet {
    let own = MarketplaceSet::from_value(doc.get("marketplaces"));
    if own.is_unconstrained() { pack_marketplaces.clone() } else { own }
}

/// Decides whether `item` is left out for `active`, recording it in `exclusions` when it is.
pub fn should_skip_item_by_mp(
    path: &Path,
    item: GateItem<'_>,
    active: Option<Marketplace>,
    exclusions: &mut Exclusions,
) -> bool {
    let Some(active) = active else {
        return false;
    };
    let marketplaces = item_marketplaces(item.doc, item.pack_marketplaces);
    if marketplaces.allows(active) {
        return false;
    }

    tracing::debug!(
        target: "id_set::walk",
        "Skipping {} {}: not available in {active}",
        item.kind,
        path.display()
    );
    record_exclusion(exclusions, item.pack, item.kind, item.id);
    true
}

/// Records `(kind, id)` under `pack`; pack metadata itself is never recorded.
pub fn record_exclusion(exclusions: &mut Exclusions, pack: Option<&str>, kind: ContentKind, id: &str) {
    if kind == ContentKind::PackMetadata {
        return;
    }
    exclusions.entry(pack.unwrap_or_default().to_string()).or_default().insert((kind, id.to_string()));
}
