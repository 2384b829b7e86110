//! `packsmith merge-id-sets`: combine two id-set files.

use anyhow::{Result, bail};
use clap::Args;
use std::path::PathBuf;

use crate::core::ErrorContext;
use crate::id_set::merge_id_sets_from_files;

/// Merge two id-sets into one file.
///
/// Nothing is written when an id of the second id-set collides with one of the
/// first; every collision is reported and the command fails.
///
/// # Examples
///
/// ```bash
/// packsmith merge-id-sets content/Tests/id_set.json private/Tests/id_set.json -o merged.json
/// ```
#[derive(Args)]
pub struct MergeCommand {
    /// The first id-set.
    first: PathBuf,

    /// The id-set merged into the first.
    second: PathBuf,

    /// Destination of the merged id-set.
    #[arg(short, long)]
    output: PathBuf,
}

impl MergeCommand {
    pub async fn execute(self) -> Result<()> {
        let (merged, duplicates) = merge_id_sets_from_files(&self.first, &self.second, &self.output)?;

        if merged.is_none() {
            for duplicate in &duplicates {
                ErrorContext::new(duplicate.to_error())
                    .with_suggestion("Rename one of the items or restrict their versions or marketplaces")
                    .display();
            }
            bail!("Found {} duplicated id(s); {} was not written", duplicates.len(), self.output.display());
        }

        println!("{}", self.output.display());
        Ok(())
    }
}
