//! Command-line interface for Packsmith.
//!
//! Each command lives in its own module with its argument structure and an
//! `execute` method. Commands are thin: they resolve configuration, call into
//! [`crate::unify`], [`crate::split`] or [`crate::id_set`], and print the
//! produced paths on stdout.
//!
//! # Available Commands
//!
//! - `unify` - merge a package directory into a unified yml
//! - `split` - break a unified yml back into a package directory
//! - `id-set` - build the cross-reference catalog of a content repository
//! - `merge-id-sets` - combine two id-set files
//! - `config` - show, create, or locate the global configuration
//!
//! # Examples
//!
//! ```bash
//! packsmith unify Packs/HelloWorld/Integrations/HelloWorld
//! packsmith split integration-HelloWorld.yml --auto-create-dir -o Packs/HelloWorld/Integrations
//! packsmith --no-progress id-set . -m marketplacev2 --fail-duplicates
//! packsmith merge-id-sets a.json b.json -o merged.json
//! ```

mod config;
mod id_set;
mod merge;
mod split;
mod unify;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::constants::{ENV_PACKSMITH_CONFIG, ENV_PACKSMITH_NO_PROGRESS};

/// Runtime settings derived from the global flags.
///
/// Built by [`Cli::build_config`] and applied once before the command runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Log level used for the subscriber when `RUST_LOG` is unset.
    pub log_level: String,

    /// Disables the progress bar of the catalog walk by setting `PACKSMITH_NO_PROGRESS`.
    pub no_progress: bool,

    /// Custom path to the global configuration file, exported as `PACKSMITH_CONFIG`.
    pub config_path: Option<String>,
}

impl CliConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            log_level: "info".to_string(),
            ..Self::default()
        }
    }

    /// Apply this configuration to the process environment.
    ///
    /// Must be called before any worker threads are spawned.
    pub fn apply_to_env(&self) {
        // SAFETY: called once from the main task before the walk starts any workers.
        unsafe {
            if self.no_progress {
                std::env::set_var(ENV_PACKSMITH_NO_PROGRESS, "1");
            }

            if let Some(path) = &self.config_path {
                std::env::set_var(ENV_PACKSMITH_CONFIG, path);
            }
        }
    }
}

/// Packsmith: unify, split, and catalog security-orchestration content packs.
#[derive(Parser)]
#[command(
    name = "packsmith",
    about = "Packsmith - unify, split, and catalog security-orchestration content packs",
    version,
    author,
    long_about = "Packsmith merges content packages into unified documents, splits them back, and builds the id-set catalog of a content repository."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output (debug logging).
    ///
    /// Mutually exclusive with `--quiet`.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only report errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to a custom global configuration file.
    ///
    /// Overrides the default location (`~/.packsmith/config.toml`).
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Disable progress bars for automation.
    #[arg(long, global = true)]
    no_progress: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge a package directory into a single unified yml.
    ///
    /// See [`unify::UnifyCommand`] for options.
    Unify(unify::UnifyCommand),

    /// Split a unified yml back into a package directory.
    ///
    /// See [`split::SplitCommand`] for options.
    Split(split::SplitCommand),

    /// Build the id-set catalog of a content repository.
    ///
    /// See [`id_set::IdSetCommand`] for options.
    IdSet(id_set::IdSetCommand),

    /// Merge two id-set files, refusing duplicated ids.
    MergeIdSets(merge::MergeCommand),

    /// Manage the global configuration (~/.packsmith/config.toml).
    Config(config::ConfigCommand),
}

impl Cli {
    /// Execute the parsed command with the configuration of its global flags.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Translate the global flags into a [`CliConfig`].
    ///
    /// `--verbose` maps to `debug`, `--quiet` to `error`, otherwise `info`.
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "info"
        };

        CliConfig {
            log_level: log_level.to_string(),
            no_progress: self.no_progress,
            config_path: self.config.clone(),
        }
    }

    /// Execute the command with an explicit configuration.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.apply_to_env();

        match self.command {
            Commands::Unify(cmd) => cmd.execute().await,
            Commands::Split(cmd) => cmd.execute().await,
            Commands::IdSet(cmd) => cmd.execute().await,
            Commands::MergeIdSets(cmd) => cmd.execute().await,
            Commands::Config(cmd) => cmd.execute().await,
        }
    }
}
