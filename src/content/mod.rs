//! Content model shared by the unifier, the splitter, and the catalog builder.
//!
//! - [`kind`] - the closed set of content kinds and id-set buckets
//! - [`detect`] - kind detection from path and body
//! - [`marketplace`] - marketplace tags and sets
//! - [`version`] - loose dotted version ordering
//! - [`node`] - generic visitors over document trees
//! - [`naming`] - pascal case, documentation slugs
//!
//! A content item exists on disk either as a package directory or as a single
//! unified yml; [`ItemForm`] names the two shapes.

pub mod detect;
pub mod kind;
pub mod marketplace;
pub mod naming;
pub mod node;
pub mod version;

pub use detect::{detect_kind, detect_kind_from};
pub use kind::{ContentKind, IdSetKey};
pub use marketplace::{Marketplace, MarketplaceSet};
pub use version::{LooseVersion, VersionRange};

use std::path::{Path, PathBuf};

/// The two on-disk shapes of a content item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemForm {
    /// A package directory holding a manifest yml and sibling files.
    Package(PathBuf),
    /// A single yml or json document.
    Unified(PathBuf),
}

impl ItemForm {
    /// The directory or file this form points at.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Package(p) | Self::Unified(p) => p,
        }
    }
}
