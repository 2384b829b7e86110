//! `packsmith split`: break a unified yml back into a package directory.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use crate::split::{SplitOptions, split};

/// Split a unified integration, script, or rule document into a package
/// directory.
///
/// # Examples
///
/// ```bash
/// packsmith split integration-HelloWorld.yml
/// packsmith split integration-HelloWorld.yml -o Packs/HelloWorld/Integrations --auto-create-dir
/// packsmith split script-Echo.yml --no-readme --no-prologue
/// ```
#[derive(Args)]
pub struct SplitCommand {
    /// The unified yml to split.
    input: PathBuf,

    /// Target directory; defaults to a sibling directory named after the item.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Create the package directory inside `--output` when it is a kind directory.
    #[arg(long)]
    auto_create_dir: bool,

    /// Do not copy or create a README.md.
    #[arg(long)]
    no_readme: bool,

    /// Skip the code formatting pass.
    #[arg(long)]
    no_code_format: bool,

    /// Do not prepend the test-mock and CommonServer import lines.
    #[arg(long)]
    no_prologue: bool,

    /// Write into a non-empty output directory.
    #[arg(short, long)]
    force: bool,
}

impl SplitCommand {
    pub async fn execute(self) -> Result<()> {
        let options = SplitOptions {
            output: self.output,
            auto_create_dir: self.auto_create_dir,
            no_readme: self.no_readme,
            no_code_format: self.no_code_format,
            no_prologue: self.no_prologue,
            force: self.force,
        };

        let input = self.input;
        let dir = tokio::task::spawn_blocking(move || split(&input, &options)).await??;
        println!("{}", dir.display());
        Ok(())
    }
}
