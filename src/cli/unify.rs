//! `packsmith unify`: merge a package directory into a unified yml.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use crate::config::{GlobalConfig, resolve_marketplace};
use crate::content::Marketplace;
use crate::unify::api_module::repo_root_of;
use crate::unify::{UnifyOptions, unify};

/// Merge a package directory (manifest, code, image, description, README) into
/// one unified document.
///
/// # Examples
///
/// ```bash
/// packsmith unify Packs/HelloWorld/Integrations/HelloWorld
/// packsmith unify Packs/HelloWorld/Scripts/Echo -o out/ --custom Beta
/// packsmith unify Packs/HelloWorld/Integrations/HelloWorld -m marketplacev2 --force
/// ```
#[derive(Args)]
pub struct UnifyCommand {
    /// Package directory holding the manifest yml.
    package_dir: PathBuf,

    /// Destination file, or an existing directory for the default file name.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite existing outputs and already-inlined fields.
    #[arg(short, long)]
    force: bool,

    /// Active marketplace, used to resolve per-marketplace `hidden` parameters.
    #[arg(short, long)]
    marketplace: Option<String>,

    /// Suffix appended to the name, id and display of the unified item.
    #[arg(long)]
    custom: Option<String>,
}

impl UnifyCommand {
    pub async fn execute(self) -> Result<()> {
        let config = GlobalConfig::load().await?;
        let flag = self.marketplace.as_deref().map(str::parse::<Marketplace>).transpose()?;
        let marketplace = resolve_marketplace(flag, &config)?;
        let api_modules_dir =
            config.api_modules_dir.as_ref().map(|_| config.api_modules_dir(&repo_root_of(&self.package_dir)));

        let options = UnifyOptions {
            output: self.output,
            force: self.force,
            marketplace,
            custom: self.custom,
            api_modules_dir,
        };

        let package_dir = self.package_dir;
        let written = tokio::task::spawn_blocking(move || unify(&package_dir, &options)).await??;
        for path in written {
            println!("{}", path.display());
        }
        Ok(())
    }
}
