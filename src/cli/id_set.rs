//! `packsmith id-set`: build the catalog of a content repository.

use anyhow::{Result, bail};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::{GlobalConfig, resolve_marketplace};
use crate::constants::DEFAULT_ID_SET_PATH;
use crate::content::Marketplace;
use crate::core::ErrorContext;
use crate::id_set::{BuildOptions, build_id_set, find_duplicates};
use crate::utils::fs::write_json_file;
use crate::utils::progress::is_progress_disabled;

/// Walk every pack of a repository and write its id-set.
///
/// The id-set is written even when duplicates are found; `--fail-duplicates`
/// then turns them into a failing exit status.
///
/// # Examples
///
/// ```bash
/// packsmith id-set .
/// packsmith id-set ~/dev/content -m marketplacev2 -o /tmp/id_set.json
/// packsmith id-set . --fail-duplicates --exclusions /tmp/excluded.json
/// ```
#[derive(Args)]
pub struct IdSetCommand {
    /// Root of the content repository (the directory holding `Packs/`).
    #[arg(default_value = ".")]
    repo_root: PathBuf,

    /// Destination file [default: <REPO_ROOT>/Tests/id_set.json]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Active marketplace; items not available in it are left out.
    #[arg(short, long)]
    marketplace: Option<String>,

    /// Exit with an error when the id-set holds duplicated ids.
    #[arg(long)]
    fail_duplicates: bool,

    /// Write the items left out by marketplace gating to this file.
    #[arg(long)]
    exclusions: Option<PathBuf>,
}

impl IdSetCommand {
    pub async fn execute(self) -> Result<()> {
        let config = GlobalConfig::load().await?;
        let flag = self.marketplace.as_deref().map(str::parse::<Marketplace>).transpose()?;

        let cancel = Arc::new(AtomicBool::new(false));
        let signal_flag = Arc::clone(&cancel);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!(target: "id_set::walk", "Interrupted, finishing the packs in flight");
                signal_flag.store(true, Ordering::Relaxed);
            }
        });

        let mut options = BuildOptions {
            marketplace: resolve_marketplace(flag, &config)?,
            source: config.source.clone(),
            cancel: Some(cancel),
            show_progress: !is_progress_disabled(),
            ..BuildOptions::default()
        };
        if let Some(workers) = config.workers {
            options.workers = workers;
        }

        let build = build_id_set(&self.repo_root, &options).await?;
        if build.cancelled {
            bail!("Id-set build was cancelled; nothing was written");
        }

        for failure in &build.failures {
            tracing::warn!(target: "id_set::walk", "Skipped {}: {}", failure.path.display(), failure.error);
        }

        let output = self.output.unwrap_or_else(|| self.repo_root.join(DEFAULT_ID_SET_PATH));
        build.id_set.save(&output)?;

        if let Some(path) = &self.exclusions {
            write_json_file(path, &build.exclusions, true)?;
            println!("{}", path.display());
        }

        println!("{}", "Id-set summary".bold());
        for (key, count) in build.id_set.counts() {
            if count > 0 {
                println!("  {:<20} {count}", key.as_str());
            }
        }
        if !build.failures.is_empty() {
            println!("  {} {}", format!("{:<20}", "skipped items").yellow(), build.failures.len());
        }
        println!("{}", output.display());

        let duplicates = find_duplicates(&build.id_set);
        let total: usize = duplicates.values().map(Vec::len).sum();
        if total > 0 {
            for duplicate in duplicates.values().flatten() {
                tracing::warn!(target: "id_set::walk", "{}", duplicate.to_error());
                if self.fail_duplicates {
                    ErrorContext::new(duplicate.to_error()).display();
                }
            }
            if self.fail_duplicates {
                bail!("Found {total} duplicated id(s) in {}", output.display());
            }
        }
        Ok(())
    }
}
