//! Common test utilities for Packsmith integration tests
//!
//! [`TestRepo`] wraps a temporary content repository and runs the `packsmith`
//! binary inside it with an isolated configuration file.

// Not every helper is used by every test module
#![allow(dead_code)]

use anyhow::Result;
use assert_cmd::Command;
use packsmith_cli::test_utils::{ContentRepo, ContentRepoBuilder, sample_repo};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Captured result of a command run
#[derive(Debug)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
}

/// A content repository plus an isolated config location
pub struct TestRepo {
    pub repo: ContentRepo,
    config_dir: TempDir,
}

impl TestRepo {
    /// The sample repository from `packsmith_cli::test_utils::fixtures`
    pub fn sample() -> Result<Self> {
        Self::from_repo(sample_repo()?)
    }

    /// A repository laid out by `builder`
    pub fn from_builder(builder: ContentRepoBuilder) -> Result<Self> {
        Self::from_repo(builder.build()?)
    }

    fn from_repo(repo: ContentRepo) -> Result<Self> {
        Ok(Self {
            repo,
            config_dir: TempDir::new()?,
        })
    }

    pub fn root(&self) -> &Path {
        self.repo.root()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.repo.path(relative)
    }

    /// Path of the (possibly absent) global config used by [`TestRepo::command`]
    pub fn config_path(&self) -> PathBuf {
        self.config_dir.path().join("config.toml")
    }

    pub fn write_config(&self, content: &str) -> Result<()> {
        std::fs::write(self.config_path(), content)?;
        Ok(())
    }

    /// A `packsmith` command running in the repository root
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("packsmith").expect("packsmith binary is built");
        cmd.current_dir(self.root())
            .env("PACKSMITH_CONFIG", self.config_path())
            .env("PACKSMITH_NO_PROGRESS", "1")
            .env("NO_COLOR", "1")
            .env_remove("DEMISTO_SDK_MARKETPLACE")
            .env_remove("RUST_LOG");
        cmd
    }

    /// Run `packsmith` with `args` and capture its output
    pub fn run_packsmith(&self, args: &[&str]) -> Result<CommandOutput> {
        let output = self.command().args(args).output()?;
        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            success: output.status.success(),
        })
    }
}
