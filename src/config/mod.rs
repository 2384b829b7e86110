//! Configuration management for Packsmith.
//!
//! Settings come from three layers, highest priority first:
//!
//! 1. Command-line flags (`--marketplace`, `--config`, ...)
//! 2. Environment variables (`DEMISTO_SDK_MARKETPLACE`, `PACKSMITH_CONFIG`)
//! 3. The global configuration file (`~/.packsmith/config.toml`), see [`GlobalConfig`]
//!
//! Nothing is read from the content repository itself except its git remote,
//! which supplies the id-set source triple when the config does not.

mod global;

pub use global::{GlobalConfig, expand_path};

use anyhow::Result;

use crate::constants::ENV_DEMISTO_SDK_MARKETPLACE;
use crate::content::Marketplace;

/// The active marketplace: the explicit flag, then `DEMISTO_SDK_MARKETPLACE`, then the config.
///
/// An empty environment value counts as unset. `None` means unconstrained.
///
/// # Errors
///
/// Returns an error if the environment variable holds an unknown tag.
pub fn resolve_marketplace(flag: Option<Marketplace>, config: &GlobalConfig) -> Result<Option<Marketplace>> {
    if flag.is_some() {
        return Ok(flag);
    }
    if let Ok(value) = std::env::var(ENV_DEMISTO_SDK_MARKETPLACE)
        && !value.trim().is_empty()
    {
        return Ok(Some(value.to_lowercase().parse()?));
    }
    Ok(config.marketplace())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_wins() {
        let config = GlobalConfig {
            marketplace: Some("xpanse".to_string()),
            ..GlobalConfig::default()
        };
        let resolved = resolve_marketplace(Some(Marketplace::Xsoar), &config).unwrap();
        assert_eq!(resolved, Some(Marketplace::Xsoar));
    }
}
