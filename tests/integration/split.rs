//! Integration tests for `packsmith split`.

use packsmith_cli::test_utils::fixtures::{HELLO_WORLD_DESCRIPTION, PNG_BYTES};
use predicates::prelude::*;
use serde_json::Value;
use std::path::PathBuf;

use crate::common::TestRepo;
use crate::fixtures::{UNIFIED_PARSING_RULE, UNIFIED_POWERSHELL_SCRIPT};

fn split_dir(repo: &TestRepo, args: &[&str]) -> PathBuf {
    let output = repo.run_packsmith(args).unwrap();
    assert!(output.success, "split failed: {}", output.stderr);
    repo.root().join(output.stdout.trim())
}

#[test]
fn test_split_unified_integration() {
    let repo = TestRepo::sample().unwrap();
    repo.command()
        .args(["unify", "Packs/HelloWorld/Integrations/HelloWorld", "-o", "integration-HelloWorld.yml"])
        .assert()
        .success();

    let dir = split_dir(&repo, &["split", "integration-HelloWorld.yml", "-o", "restored"]);
    assert!(dir.ends_with("restored"));

    let code = std::fs::read_to_string(dir.join("restored.py")).unwrap();
    assert!(code.starts_with("import demistomock as demisto  # noqa: F401\nfrom CommonServerPython import *"));
    assert!(code.contains("from HTTPApiModule import *  # noqa: E402\n"));
    assert!(!code.contains("GENERATED CODE"));
    assert!(!code.contains("register_module_line"));

    assert_eq!(std::fs::read(dir.join("restored_image.png")).unwrap(), PNG_BYTES);
    assert_eq!(std::fs::read_to_string(dir.join("restored_description.md")).unwrap(), HELLO_WORLD_DESCRIPTION);

    let manifest: Value =
        serde_yaml::from_str(&std::fs::read_to_string(dir.join("restored.yml")).unwrap()).unwrap();
    assert_eq!(manifest["script"]["script"], "");
    assert!(manifest.get("image").is_none());
    assert!(manifest.get("detaileddescription").is_none());
    assert!(dir.join("README.md").is_file());
}

#[test]
fn test_split_powershell_script_defaults() {
    let repo = TestRepo::sample().unwrap();
    std::fs::write(repo.path("script-Greet.yml"), UNIFIED_POWERSHELL_SCRIPT).unwrap();

    let dir = split_dir(&repo, &["split", "script-Greet.yml"]);
    assert!(dir.ends_with("Greet"));

    let code = std::fs::read_to_string(dir.join("Greet.ps1")).unwrap();
    assert_eq!(code, ". $PSScriptRoot\\CommonServerPowerShell.ps1\nWrite-Output 'hello'\n");

    let manifest: Value = serde_yaml::from_str(&std::fs::read_to_string(dir.join("Greet.yml")).unwrap()).unwrap();
    assert_eq!(manifest["fromversion"], "5.5.0");
    assert_eq!(std::fs::read_to_string(dir.join("README.md")).unwrap(), "");
}

#[test]
fn test_split_no_readme_and_no_prologue() {
    let repo = TestRepo::sample().unwrap();
    std::fs::write(repo.path("script-Greet.yml"), UNIFIED_POWERSHELL_SCRIPT).unwrap();

    let dir = split_dir(&repo, &["split", "script-Greet.yml", "--no-readme", "--no-prologue"]);
    assert_eq!(std::fs::read_to_string(dir.join("Greet.ps1")).unwrap(), "Write-Output 'hello'\n");
    assert!(!dir.join("README.md").exists());
}

#[test]
fn test_split_parsing_rule_into_kind_dir() {
    let repo = TestRepo::sample().unwrap();
    std::fs::write(repo.path("parsingrule-Acme.yml"), UNIFIED_PARSING_RULE).unwrap();
    std::fs::create_dir_all(repo.path("Packs/HelloWorld/ParsingRules")).unwrap();

    let dir = split_dir(
        &repo,
        &["split", "parsingrule-Acme.yml", "-o", "Packs/HelloWorld/ParsingRules", "--auto-create-dir"],
    );
    assert!(dir.parent().unwrap().ends_with("ParsingRules"));

    let base = dir.file_name().unwrap().to_string_lossy().into_owned();
    let rules = std::fs::read_to_string(dir.join(format!("{base}.xif"))).unwrap();
    assert!(rules.starts_with("[INGEST:vendor=acme"));
    assert_eq!(std::fs::read_to_string(dir.join(format!("{base}.json"))).unwrap(), "{\"acme_fw_raw\": []}");
    assert!(!dir.join("README.md").exists());
}

#[test]
fn test_split_refuses_non_empty_output() {
    let repo = TestRepo::sample().unwrap();
    std::fs::write(repo.path("script-Greet.yml"), UNIFIED_POWERSHELL_SCRIPT).unwrap();
    std::fs::create_dir(repo.path("taken")).unwrap();
    std::fs::write(repo.path("taken/keep.txt"), "x").unwrap();

    repo.command()
        .args(["split", "script-Greet.yml", "-o", "taken"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Output already exists"));

    repo.command().args(["split", "script-Greet.yml", "-o", "taken", "--force"]).assert().success();
    assert!(repo.path("taken/taken.ps1").is_file());
}

#[test]
fn test_split_rejects_bad_fromversion() {
    let repo = TestRepo::sample().unwrap();
    let doc = UNIFIED_POWERSHELL_SCRIPT.replace("tags: []", "fromversion: six");
    std::fs::write(repo.path("script-Greet.yml"), doc).unwrap();

    repo.command()
        .args(["split", "script-Greet.yml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid version 'six'"));
}
