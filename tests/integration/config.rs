//! Integration tests for `packsmith config` and marketplace resolution.

use packsmith_cli::config::{GlobalConfig, resolve_marketplace};
use packsmith_cli::content::Marketplace;
use predicates::prelude::*;
use serial_test::serial;

use crate::common::TestRepo;

/// Sets or clears `DEMISTO_SDK_MARKETPLACE` for the duration of a test.
struct MarketplaceEnv(Option<String>);

impl MarketplaceEnv {
    fn set(value: Option<&str>) -> Self {
        let saved = std::env::var("DEMISTO_SDK_MARKETPLACE").ok();
        // SAFETY: tests touching the environment are #[serial]
        unsafe {
            match value {
                Some(value) => std::env::set_var("DEMISTO_SDK_MARKETPLACE", value),
                None => std::env::remove_var("DEMISTO_SDK_MARKETPLACE"),
            }
        }
        Self(saved)
    }
}

impl Drop for MarketplaceEnv {
    fn drop(&mut self) {
        // SAFETY: see MarketplaceEnv::set
        unsafe {
            match &self.0 {
                Some(value) => std::env::set_var("DEMISTO_SDK_MARKETPLACE", value),
                None => std::env::remove_var("DEMISTO_SDK_MARKETPLACE"),
            }
        }
    }
}

fn configured(tag: &str) -> GlobalConfig {
    GlobalConfig {
        marketplace: Some(tag.to_string()),
        ..GlobalConfig::default()
    }
}

#[test]
#[serial]
fn test_marketplace_resolution_order() {
    let config = configured("xpanse");

    let _env = MarketplaceEnv::set(Some("marketplacev2"));
    assert_eq!(resolve_marketplace(Some(Marketplace::Xsoar), &config).unwrap(), Some(Marketplace::Xsoar));
    assert_eq!(resolve_marketplace(None, &config).unwrap(), Some(Marketplace::MarketplaceV2));
}

#[test]
#[serial]
fn test_marketplace_falls_back_to_config() {
    let _env = MarketplaceEnv::set(None);
    assert_eq!(resolve_marketplace(None, &configured("xpanse")).unwrap(), Some(Marketplace::Xpanse));
    assert_eq!(resolve_marketplace(None, &GlobalConfig::default()).unwrap(), None);
}

#[test]
#[serial]
fn test_invalid_marketplace_env() {
    let _env = MarketplaceEnv::set(Some("moon"));
    let err = resolve_marketplace(None, &GlobalConfig::default()).unwrap_err();
    assert!(err.to_string().contains("Unknown marketplace 'moon'"));
}

#[test]
fn test_config_init_show_path() {
    let repo = TestRepo::sample().unwrap();
    let config_path = repo.config_path();

    repo.command()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(config_path.to_string_lossy().as_ref()));

    repo.command()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("packsmith config init"));

    repo.command().args(["config", "init"]).assert().success();
    assert!(config_path.is_file());

    repo.command()
        .args(["config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("marketplace = \"xsoar\""))
        .stdout(predicate::str::contains("[source]"));
}

#[test]
fn test_config_flag_overrides_location() {
    let repo = TestRepo::sample().unwrap();
    let custom = repo.path("custom.toml");

    repo.command()
        .args(["--config", custom.to_str().unwrap(), "config", "init"])
        .assert()
        .success();
    assert!(custom.is_file());
    assert!(!repo.config_path().exists());
}

#[test]
fn test_invalid_config_is_reported() {
    let repo = TestRepo::sample().unwrap();
    repo.write_config("workers = 0\n").unwrap();

    repo.command()
        .args(["id-set", "."])
        .assert()
        .failure()
        .stderr(predicate::str::contains("'workers' must be at least 1"));
}
