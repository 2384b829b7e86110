//! Integration tests for `packsmith unify`.

use predicates::prelude::*;
use serde_json::Value;

use crate::common::TestRepo;

const PACKAGE: &str = "Packs/HelloWorld/Integrations/HelloWorld";
const UNIFIED: &str = "Packs/HelloWorld/Integrations/HelloWorld/integration-HelloWorld.yml";

fn read_unified(repo: &TestRepo, relative: &str) -> Value {
    let text = std::fs::read_to_string(repo.path(relative)).unwrap();
    serde_yaml::from_str(&text).unwrap()
}

#[test]
fn test_unify_integration_package() {
    let repo = TestRepo::sample().unwrap();

    repo.command()
        .args(["unify", PACKAGE])
        .assert()
        .success()
        .stdout(predicate::str::contains("integration-HelloWorld.yml"));

    let doc = read_unified(&repo, UNIFIED);
    let code = doc["script"]["script"].as_str().unwrap();
    assert!(code.contains("### GENERATED CODE ###: from HTTPApiModule import *  # noqa: E402"));
    assert!(code.contains("class BaseHTTPClient"));
    assert!(code.contains("register_module_line('HelloWorld', 'start', __line__())"));
    assert!(!code.contains("import demistomock"));

    assert!(doc["image"].as_str().unwrap().starts_with("data:image/png;base64,"));
    let description = doc["detaileddescription"].as_str().unwrap();
    assert!(description.starts_with("Configure the server URL"));
    assert!(description.ends_with(
        "[View Integration Documentation](https://xsoar.pan.dev/docs/reference/integrations/helloworld)"
    ));
}

#[test]
fn test_unify_refuses_existing_output() {
    let repo = TestRepo::sample().unwrap();
    repo.command().args(["unify", PACKAGE]).assert().success();

    repo.command()
        .args(["unify", PACKAGE])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Output already exists"))
        .stderr(predicate::str::contains("--force"));

    repo.command().args(["unify", PACKAGE, "--force"]).assert().success();
}

#[test]
fn test_unify_resolves_hidden_for_marketplace() {
    let repo = TestRepo::sample().unwrap();
    repo.command().args(["unify", PACKAGE, "-m", "marketplacev2"]).assert().success();

    let doc = read_unified(&repo, UNIFIED);
    let params = doc["configuration"].as_array().unwrap();
    let fetch = params.iter().find(|p| p["name"] == "isFetch").unwrap();
    assert_eq!(fetch["hidden"], Value::Bool(true));
}

#[test]
fn test_unify_custom_suffix_and_output_dir() {
    let repo = TestRepo::sample().unwrap();
    std::fs::create_dir(repo.path("out")).unwrap();

    repo.command()
        .args(["unify", "Packs/HelloWorld/Scripts/Echo", "-o", "out", "--custom", "Beta"])
        .assert()
        .success()
        .stdout(predicate::str::contains("script-Echo.yml"));

    let doc = read_unified(&repo, "out/script-Echo.yml");
    assert_eq!(doc["name"], "Echo - Beta");
    assert_eq!(doc["commonfields"]["id"], "Echo - Beta");
    assert!(doc["script"].as_str().unwrap().contains("return_results"));
}

#[test]
fn test_unify_missing_api_module() {
    let repo = TestRepo::sample().unwrap();
    std::fs::remove_dir_all(repo.path("Packs/ApiModules")).unwrap();

    repo.command()
        .args(["unify", PACKAGE])
        .assert()
        .failure()
        .stderr(predicate::str::contains("API module 'HTTPApiModule' was not found"));
}

#[test]
fn test_unify_uses_configured_api_modules_dir() {
    let repo = TestRepo::sample().unwrap();
    std::fs::rename(repo.path("Packs/ApiModules/Scripts"), repo.path("vendored")).unwrap();
    repo.write_config("api_modules_dir = \"vendored\"\n").unwrap();

    repo.command().args(["unify", PACKAGE]).assert().success();
    let doc = read_unified(&repo, UNIFIED);
    assert!(doc["script"]["script"].as_str().unwrap().contains("class BaseHTTPClient"));
}
