//! Content repository builder for test setup
//!
//! Lays out a temporary repository with packs, metadata and item files through
//! a fluent API.

use anyhow::Result;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::constants::{PACK_METADATA_FILE, PACKS_DIR};
use crate::utils::fs::{read_json_file, write_json_file, write_text_file};

/// A builder for temporary content repositories
pub struct ContentRepoBuilder {
    temp_dir: TempDir,
    files: Vec<(String, Vec<u8>)>,
}

impl ContentRepoBuilder {
    /// Create a builder over a fresh temporary directory
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
            files: Vec::new(),
        })
    }

    /// Add `Packs/<name>/pack_metadata.json`
    pub fn with_pack(self, name: &str, metadata: &Value) -> Result<Self> {
        let content = serde_json::to_string_pretty(metadata)?;
        Ok(self.with_file(format!("{PACKS_DIR}/{name}/{PACK_METADATA_FILE}"), content))
    }

    /// Add a file at a repository-relative path
    pub fn with_file(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.files.push((path.into(), content.into().into_bytes()));
        self
    }

    /// Add a binary file at a repository-relative path
    pub fn with_bytes(mut self, path: impl Into<String>, content: &[u8]) -> Self {
        self.files.push((path.into(), content.to_vec()));
        self
    }

    /// Write every file and return the repository
    pub fn build(self) -> Result<ContentRepo> {
        let root = self.temp_dir.path().to_path_buf();
        for (path, content) in &self.files {
            let full = root.join(path);
            if let Some(parent) = full.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&full, content)?;
        }
        Ok(ContentRepo {
            _temp_dir: self.temp_dir,
            root,
        })
    }
}

/// A temporary content repository, removed on drop
pub struct ContentRepo {
    _temp_dir: TempDir,
    root: PathBuf,
}

impl ContentRepo {
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of a repository-relative path
    #[must_use]
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Write a text file after the repository was built
    pub fn write(&self, relative: &str, content: &str) -> Result<PathBuf> {
        let path = self.path(relative);
        write_text_file(&path, content)?;
        Ok(path)
    }

    /// Write a JSON file after the repository was built
    pub fn write_json(&self, relative: &str, value: &Value) -> Result<PathBuf> {
        let path = self.path(relative);
        write_json_file(&path, value, true)?;
        Ok(path)
    }

    pub fn read_json(&self, relative: &str) -> Result<Value> {
        read_json_file(&self.path(relative))
    }

    pub fn read_to_string(&self, relative: &str) -> Result<String> {
        Ok(std::fs::read_to_string(self.path(relative))?)
    }
}
