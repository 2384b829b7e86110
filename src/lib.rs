//! Packsmith - unify, split, and catalog security-orchestration content packs
//!
//! A content repository holds packs (`Packs/<Pack>/`), each with a
//! `pack_metadata.json` and directories of content items: integrations, scripts,
//! playbooks, incident fields, layouts, and two dozen more kinds. Packsmith
//! provides three operations over such a repository:
//!
//! - **Unify**: merge a package directory (manifest yml, code file, image,
//!   description, README) into one self-contained yml, splicing imported API
//!   modules into the code.
//! - **Split**: the inverse, breaking a unified yml back into a package
//!   directory.
//! - **Catalog**: walk every pack and build the id-set, a cross-reference index
//!   of every item's identity, versions, marketplaces, and references. Two
//!   id-sets can be merged, with duplicated ids rejected.
//!
//! # Core Modules
//!
//! - [`content`] - content kinds, kind detection, marketplaces, loose versions
//! - [`unify`] - package directory to unified yml
//! - [`split`] - unified yml to package directory
//! - [`id_set`] - catalog extraction, the parallel walk, duplicates, and merging
//!
//! ## Supporting Modules
//! - [`cli`] - command-line interface
//! - [`config`] - global configuration (~/.packsmith/config.toml)
//! - [`core`] - error types and user-facing error reporting
//! - [`constants`] - directory names, defaults, and environment variables
//! - [`utils`] - atomic writes, format-aware file IO, progress bars
//!
//! # Command-Line Usage
//!
//! ```bash
//! # Unify a package into Packs/HelloWorld/Integrations/HelloWorld/integration-HelloWorld.yml
//! packsmith unify Packs/HelloWorld/Integrations/HelloWorld
//!
//! # Split it back into a package directory
//! packsmith split integration-HelloWorld.yml -o Packs/HelloWorld/Integrations --auto-create-dir
//!
//! # Build the id-set of the repository for one marketplace
//! packsmith id-set . -m marketplacev2 --exclusions excluded.json
//!
//! # Merge two id-sets
//! packsmith merge-id-sets a.json b.json -o merged.json
//! ```
//!
//! # Library Usage
//!
//! ```rust,no_run
//! use packsmith_cli::id_set::{BuildOptions, build_id_set};
//! use std::path::Path;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let build = build_id_set(Path::new("."), &BuildOptions::default()).await?;
//! for (bucket, count) in build.id_set.counts() {
//!     println!("{bucket}: {count}");
//! }
//! build.id_set.save(Path::new("Tests/id_set.json"))?;
//! # Ok(())
//! # }
//! ```

// Core functionality
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;

// Content operations
pub mod content;
pub mod id_set;
pub mod split;
pub mod unify;

// Supporting modules
pub mod utils;

// Test utilities (only compiled for tests or with the test-utils feature)
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
