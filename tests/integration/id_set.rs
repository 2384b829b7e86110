//! Integration tests for `packsmith id-set`.

use packsmith_cli::test_utils::fixtures::sample_repo_builder;
use predicates::prelude::*;
use serde_json::{Value, json};

use crate::common::TestRepo;

/// Ids of a bucket, in file order.
fn ids(id_set: &Value, bucket: &str) -> Vec<String> {
    id_set[bucket]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|entry| entry.as_object()?.keys().next().cloned())
        .collect()
}

/// The record of `id` in `bucket`.
fn record<'a>(id_set: &'a Value, bucket: &str, id: &str) -> &'a Value {
    id_set[bucket].as_array().unwrap().iter().find_map(|entry| entry.get(id)).unwrap()
}

#[test]
fn test_build_sample_repository() {
    let repo = TestRepo::sample().unwrap();

    repo.command()
        .args(["id-set", "."])
        .assert()
        .success()
        .stdout(predicate::str::contains("Id-set summary"))
        .stdout(predicate::str::contains("Tests/id_set.json"));

    let id_set: Value = serde_json::from_str(&std::fs::read_to_string(repo.path("Tests/id_set.json")).unwrap()).unwrap();
    let keys: Vec<&String> = id_set.as_object().unwrap().keys().collect();
    assert_eq!(keys[0], "scripts");
    assert_eq!(keys.last().unwrap().as_str(), "Packs");

    assert_eq!(ids(&id_set, "scripts"), ["Echo", "ExpanseOnly", "HTTPApiModule"]);
    assert_eq!(ids(&id_set, "integrations"), ["HelloWorld"]);
    assert_eq!(ids(&id_set, "playbooks"), ["Say Hello"]);

    let hello = record(&id_set, "integrations", "HelloWorld");
    assert_eq!(hello["api_modules"], json!(["HTTPApiModule"]));
    assert_eq!(hello["pack"], "HelloWorld");
    assert_eq!(hello["file_path"], "Packs/HelloWorld/Integrations/HelloWorld/HelloWorld.yml");

    let ip = record(&id_set, "IndicatorTypes", "IP");
    assert_eq!(ip["integrations"], json!(["HelloWorld"]));

    let playbook = record(&id_set, "playbooks", "Say Hello");
    assert_eq!(playbook["implementing_scripts"], json!(["Echo"]));
    assert_eq!(playbook["command_to_integration"], json!({"helloworld-say-hello": "HelloWorld"}));
    assert_eq!(playbook["skippable_tasks"], json!(["helloworld-say-hello"]));

    let packs = id_set["Packs"].as_object().unwrap();
    assert_eq!(packs.keys().collect::<Vec<_>>(), ["ApiModules", "Expanse", "HelloWorld"]);
    assert_eq!(packs["HelloWorld"]["certification"], "certified");
}

#[test]
fn test_marketplace_gating_and_exclusions() {
    let repo = TestRepo::sample().unwrap();

    repo.command()
        .args(["id-set", ".", "-m", "marketplacev2", "-o", "out/id_set.json", "--exclusions", "out/excluded.json"])
        .assert()
        .success();

    let id_set = serde_json::from_str::<Value>(&std::fs::read_to_string(repo.path("out/id_set.json")).unwrap()).unwrap();
    assert_eq!(ids(&id_set, "scripts"), ["Echo", "HTTPApiModule"]);
    assert!(id_set["Packs"].get("Expanse").is_none());

    let excluded: Value =
        serde_json::from_str(&std::fs::read_to_string(repo.path("out/excluded.json")).unwrap()).unwrap();
    assert_eq!(excluded, json!({"Expanse": [["script", "ExpanseOnly"]]}));
}

#[test]
fn test_marketplace_from_environment() {
    let repo = TestRepo::sample().unwrap();

    repo.command().env("DEMISTO_SDK_MARKETPLACE", "XPANSE").args(["id-set", "."]).assert().success();

    let id_set = serde_json::from_str::<Value>(&std::fs::read_to_string(repo.path("Tests/id_set.json")).unwrap()).unwrap();
    assert_eq!(ids(&id_set, "scripts"), ["ExpanseOnly", "HTTPApiModule"]);
    assert!(ids(&id_set, "integrations").is_empty());
}

#[test]
fn test_configured_source_is_stamped() {
    let repo = TestRepo::sample().unwrap();
    repo.write_config("[source]\nhost = \"github.com\"\nnamespace = \"acme\"\nrepo = \"content\"\n").unwrap();

    repo.command().args(["id-set", "."]).assert().success();

    let id_set = serde_json::from_str::<Value>(&std::fs::read_to_string(repo.path("Tests/id_set.json")).unwrap()).unwrap();
    assert_eq!(record(&id_set, "scripts", "Echo")["source"], json!(["github.com", "acme", "content"]));
}

#[test]
fn test_fail_duplicates() {
    let builder = sample_repo_builder().unwrap().with_file(
        "Packs/HelloWorld/Scripts/script-EchoCopy.yml",
        "commonfields:\n  id: Echo\nname: Echo\ntype: python\nscript: print(1)\nfromversion: 5.0.0\n",
    );
    let repo = TestRepo::from_builder(builder).unwrap();

    repo.command().args(["id-set", "."]).assert().success();

    repo.command()
        .args(["id-set", ".", "--fail-duplicates"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Duplicate scripts id 'Echo'"));
    assert!(repo.path("Tests/id_set.json").is_file());
}

#[test]
fn test_malformed_item_is_skipped() {
    let builder = sample_repo_builder()
        .unwrap()
        .with_file("Packs/HelloWorld/Scripts/script-Broken.yml", "commonfields: [1, 2]\nname: Broken\n");
    let repo = TestRepo::from_builder(builder).unwrap();

    repo.command()
        .args(["id-set", "."])
        .assert()
        .success()
        .stdout(predicate::str::contains("skipped items"));

    let id_set = serde_json::from_str::<Value>(&std::fs::read_to_string(repo.path("Tests/id_set.json")).unwrap()).unwrap();
    assert!(!ids(&id_set, "scripts").contains(&"Broken".to_string()));
}

#[test]
fn test_missing_repository_root() {
    let repo = TestRepo::sample().unwrap();
    repo.command()
        .args(["id-set", "does-not-exist"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected a content repository root"));
}
