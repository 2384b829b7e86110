//! Global configuration for Packsmith.
//!
//! The global configuration file (`~/.packsmith/config.toml`) holds user-wide
//! defaults for the commands: the active marketplace, the catalog-walk worker
//! count, the API-module source directory, and the provenance triple stamped on
//! id-set records. Every field is optional; a missing file is the default config.
//!
//! # File Format
//!
//! ```toml
//! marketplace = "xsoar"
//! workers = 4
//! api_modules_dir = "Packs/ApiModules/Scripts"
//!
//! [source]
//! host = "github.com"
//! namespace = "demisto"
//! repo = "content"
//! ```
//!
//! # Examples
//!
//! ```rust,no_run
//! use packsmith_cli::config::GlobalConfig;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let mut config = GlobalConfig::load().await?;
//! config.workers = Some(8);
//! config.save().await?;
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::constants::{API_MODULES_PACK, ENV_PACKSMITH_CONFIG, PACKS_DIR, SCRIPTS_DIR};
use crate::content::Marketplace;
use crate::id_set::RepoSource;

/// Global configuration structure for Packsmith.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct GlobalConfig {
    /// Default active marketplace tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marketplace: Option<String>,

    /// Worker count of the catalog walk. Defaults to one less than the available cores.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,

    /// API-module source directory, relative to the repository root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_modules_dir: Option<PathBuf>,

    /// Provenance triple stamped on id-set records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<RepoSource>,
}

impl GlobalConfig {
    /// Loads the configuration from [`GlobalConfig::default_path`].
    ///
    /// A missing file yields the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load() -> Result<Self> {
        Self::load_with_optional(None).await
    }

    /// Loads from `path` when given, else from the default location.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => Self::default_path()?,
        };
        if path.exists() {
            Self::load_from(&path).await
        } else {
            tracing::debug!("No config file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Loads the configuration file at `path`.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        config.validate().with_context(|| format!("Invalid config in {}", path.display()))?;
        Ok(config)
    }

    /// Saves the configuration to [`GlobalConfig::default_path`].
    pub async fn save(&self) -> Result<()> {
        let path = Self::default_path()?;
        self.save_to(&path).await
    }

    /// Writes the configuration as pretty TOML, creating parent directories.
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        Ok(())
    }

    /// Location of the configuration file.
    ///
    /// `PACKSMITH_CONFIG` wins when set (tilde-expanded), else `~/.packsmith/config.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn default_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(ENV_PACKSMITH_CONFIG)
            && !path.is_empty()
        {
            return Ok(expand_path(&path));
        }
        let home = dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?;
        Ok(home.join(".packsmith").join("config.toml"))
    }

    /// Rejects values that cannot be used.
    pub fn validate(&self) -> Result<()> {
        if let Some(tag) = &self.marketplace {
            tag.parse::<Marketplace>()?;
        }
        if self.workers == Some(0) {
            anyhow::bail!("'workers' must be at least 1");
        }
        Ok(())
    }

    /// The configured marketplace; unknown tags were rejected when loading.
    #[must_use]
    pub fn marketplace(&self) -> Option<Marketplace> {
        self.marketplace.as_deref().and_then(|tag| tag.parse().ok())
    }

    /// API-module directory for a repository rooted at `repo_root`.
    #[must_use]
    pub fn api_modules_dir(&self, repo_root: &Path) -> PathBuf {
        match &self.api_modules_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => repo_root.join(dir),
            None => repo_root.join(PACKS_DIR).join(API_MODULES_PACK).join(SCRIPTS_DIR),
        }
    }

    /// An example configuration written by `packsmith config init`.
    #[must_use]
    pub fn init_example() -> Self {
        Self {
            marketplace: Some(Marketplace::Xsoar.as_str().to_string()),
            workers: Some(crate::constants::default_worker_count()),
            api_modules_dir: Some(PathBuf::from(PACKS_DIR).join(API_MODULES_PACK).join(SCRIPTS_DIR)),
            source: Some(RepoSource::new("github.com", "demisto", "content")),
        }
    }
}

/// Expands `~` and environment variables in a configured path.
#[must_use]
pub fn expand_path(path: &str) -> PathBuf {
    match shellexpand::full(path) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(e) => {
            tracing::debug!("Cannot expand {path}: {e}");
            PathBuf::from(shellexpand::tilde(path).as_ref())
        }
    }
}
