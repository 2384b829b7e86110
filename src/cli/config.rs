//! Global configuration management.
//!
//! # Subcommands
//!
//! - `show` - print the effective configuration (the default)
//! - `init` - write an example configuration file
//! - `path` - print where the configuration file lives
//!
//! # Examples
//!
//! ```bash
//! packsmith config
//! packsmith config init --force
//! packsmith --config ./ci.toml config path
//! ```

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use crate::config::GlobalConfig;

/// Command to manage the global Packsmith configuration.
///
/// Defaults to `show` when no subcommand is given.
#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    command: Option<ConfigSubcommands>,
}

#[derive(Subcommand)]
enum ConfigSubcommands {
    /// Write an example configuration.
    ///
    /// Refuses to overwrite an existing file unless `--force` is given.
    Init {
        /// Overwrite an existing configuration file.
        #[arg(long)]
        force: bool,
    },

    /// Display the current configuration.
    Show,

    /// Print the configuration file location.
    Path,
}

impl ConfigCommand {
    pub async fn execute(self) -> Result<()> {
        self.execute_with_path(None).await
    }

    /// Runs the subcommand against `config_path`, or the default location when `None`.
    pub async fn execute_with_path(self, config_path: Option<PathBuf>) -> Result<()> {
        let config_path = match config_path {
            Some(path) => path,
            None => GlobalConfig::default_path()?,
        };

        match self.command {
            Some(ConfigSubcommands::Init { force }) => Self::init(force, config_path).await,
            Some(ConfigSubcommands::Show) | None => Self::show(config_path).await,
            Some(ConfigSubcommands::Path) => {
                println!("{}", config_path.display());
                Ok(())
            }
        }
    }

    async fn init(force: bool, config_path: PathBuf) -> Result<()> {
        if config_path.exists() && !force {
            println!("Global config already exists at: {}", config_path.display());
            println!("   Use --force to overwrite");
            return Ok(());
        }

        let config = GlobalConfig::init_example();
        config.save_to(&config_path).await?;

        println!("Created global config at: {}", config_path.display());
        println!("\n{}", "Example configuration:".bold());
        println!("{}", toml::to_string_pretty(&config)?);
        println!("{}", "Next steps:".yellow());
        println!("  1. Set 'marketplace' to the marketplace you build for");
        println!("  2. Point [source] at the repository your id-sets describe");

        Ok(())
    }

    async fn show(config_path: PathBuf) -> Result<()> {
        let config = GlobalConfig::load_with_optional(Some(config_path.clone())).await?;

        println!("{}", "Global Configuration".bold());
        println!("Location: {}\n", config_path.display());

        if config == GlobalConfig::default() {
            println!("No settings configured; built-in defaults apply.");
            println!("\n{}", "Tip:".yellow());
            println!("  Run 'packsmith config init' to create an example configuration");
        } else {
            println!("{}", toml::to_string_pretty(&config)?);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn command(sub: ConfigSubcommands) -> ConfigCommand {
        ConfigCommand { command: Some(sub) }
    }

    #[tokio::test]
    async fn test_init_writes_example() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");

        command(ConfigSubcommands::Init { force: false })
            .execute_with_path(Some(path.clone()))
            .await
            .unwrap();

        let loaded = GlobalConfig::load_from(&path).await.unwrap();
        assert_eq!(loaded, GlobalConfig::init_example());
    }

    #[tokio::test]
    async fn test_init_keeps_existing_without_force() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        tokio::fs::write(&path, "workers = 2\n").await.unwrap();

        command(ConfigSubcommands::Init { force: false })
            .execute_with_path(Some(path.clone()))
            .await
            .unwrap();
        assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), "workers = 2\n");

        command(ConfigSubcommands::Init { force: true })
            .execute_with_path(Some(path.clone()))
            .await
            .unwrap();
        assert_eq!(GlobalConfig::load_from(&path).await.unwrap(), GlobalConfig::init_example());
    }

    #[tokio::test]
    async fn test_show_missing_file() {
        let temp = TempDir::new().unwrap();
        let result = ConfigCommand { command: None }
            .execute_with_path(Some(temp.path().join("absent.toml")))
            .await;
        assert!(result.is_ok());
    }
}
