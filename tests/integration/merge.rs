//! Integration tests for `packsmith merge-id-sets`.

use packsmith_cli::content::IdSetKey;
use packsmith_cli::id_set::{IdSet, merge_id_sets_from_files};
use predicates::prelude::*;

use crate::common::TestRepo;
use crate::fixtures::id_set_with_scripts;

fn write(repo: &TestRepo, name: &str, value: &serde_json::Value) {
    std::fs::write(repo.path(name), serde_json::to_string_pretty(value).unwrap()).unwrap();
}

#[test]
fn test_merge_disjoint_id_sets() {
    let repo = TestRepo::sample().unwrap();
    write(&repo, "a.json", &id_set_with_scripts(&[("Alpha", "PackA", "5.0.0")]));
    write(&repo, "b.json", &id_set_with_scripts(&[("Beta", "PackB", "5.0.0"), ("Alpha", "PackB", "6.0.0")]));

    repo.command()
        .args(["merge-id-sets", "a.json", "b.json", "-o", "merged.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("merged.json"));

    let merged = IdSet::load(&repo.path("merged.json")).unwrap();
    assert_eq!(merged.bucket(IdSetKey::Scripts).len(), 3);
    assert_eq!(merged.packs().len(), 2);
}

#[test]
fn test_merge_reports_duplicates() {
    let repo = TestRepo::sample().unwrap();
    write(&repo, "a.json", &id_set_with_scripts(&[("Alpha", "PackA", "5.0.0")]));
    write(&repo, "b.json", &id_set_with_scripts(&[("Alpha", "PackA", "6.0.0")]));

    repo.command()
        .args(["merge-id-sets", "a.json", "b.json", "-o", "merged.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Duplicate scripts id 'Alpha'"));
    assert!(!repo.path("merged.json").exists());
}

#[test]
fn test_merge_from_files_api() {
    let repo = TestRepo::sample().unwrap();
    write(&repo, "a.json", &id_set_with_scripts(&[("Alpha", "PackA", "5.0.0")]));
    write(&repo, "b.json", &id_set_with_scripts(&[("Gamma", "PackC", "5.0.0")]));

    let (merged, duplicates) =
        merge_id_sets_from_files(&repo.path("a.json"), &repo.path("b.json"), &repo.path("out/merged.json")).unwrap();
    assert!(duplicates.is_empty());
    assert!(merged.unwrap().contains(IdSetKey::Scripts, "Gamma"));
    assert!(repo.path("out/merged.json").is_file());
}

#[test]
fn test_merge_requires_output_flag() {
    let repo = TestRepo::sample().unwrap();
    repo.command()
        .args(["merge-id-sets", "a.json", "b.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--output"));
}
