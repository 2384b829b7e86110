//! Argument parsing and configuration-building tests for the CLI.

use super::{Cli, CliConfig, Commands};
use clap::Parser;

#[test]
fn test_cli_parsing() {
    assert!(Cli::try_parse_from(["packsmith", "--help"]).is_err());
    assert!(Cli::try_parse_from(["packsmith", "id-set"]).is_ok());
    assert!(Cli::try_parse_from(["packsmith", "frobnicate"]).is_err());
}

#[test]
fn test_verbose_and_quiet_conflict() {
    assert!(Cli::try_parse_from(["packsmith", "-v", "-q", "id-set"]).is_err());
}

#[test]
fn test_build_config_levels() {
    let cli = Cli::try_parse_from(["packsmith", "--verbose", "id-set"]).unwrap();
    assert_eq!(cli.build_config().log_level, "debug");

    let cli = Cli::try_parse_from(["packsmith", "--quiet", "id-set"]).unwrap();
    assert_eq!(cli.build_config().log_level, "error");

    let cli = Cli::try_parse_from(["packsmith", "id-set"]).unwrap();
    assert_eq!(cli.build_config(), CliConfig::new());
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from(["packsmith", "split", "x.yml", "--no-progress", "-c", "/tmp/p.toml"]).unwrap();
    let config = cli.build_config();
    assert!(config.no_progress);
    assert_eq!(config.config_path.as_deref(), Some("/tmp/p.toml"));
}

#[test]
fn test_subcommand_routing() {
    let cli = Cli::try_parse_from(["packsmith", "unify", "Packs/P/Scripts/S", "-f", "--custom", "Beta"]).unwrap();
    assert!(matches!(cli.command, Commands::Unify(_)));

    let cli = Cli::try_parse_from(["packsmith", "merge-id-sets", "a.json", "b.json", "-o", "out.json"]).unwrap();
    assert!(matches!(cli.command, Commands::MergeIdSets(_)));

    let cli = Cli::try_parse_from(["packsmith", "config", "init", "--force"]).unwrap();
    assert!(matches!(cli.command, Commands::Config(_)));
}

#[test]
fn test_merge_requires_output() {
    assert!(Cli::try_parse_from(["packsmith", "merge-id-sets", "a.json", "b.json"]).is_err());
}
