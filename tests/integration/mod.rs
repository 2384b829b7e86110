//! Integration test suite for Packsmith
//!
//! End-to-end tests that run the `packsmith` binary against temporary content
//! repositories.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **unify**: package directories to unified documents
//! - **split**: unified documents back to package directories
//! - **id_set**: catalog builds, marketplace gating, duplicates
//! - **merge**: merging id-set files
//! - **config**: global configuration and marketplace resolution

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;
#[path = "../fixtures/mod.rs"]
mod fixtures;

mod config;
mod id_set;
mod merge;
mod split;
mod unify;
