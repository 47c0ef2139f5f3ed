//! End-to-end tests for the CLI binary surface.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_list_enumerates_datasets_without_downloading() {
    let mut cmd = Command::cargo_bin("sante-dl").expect("binary should build");
    cmd.arg("--list")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("rpps")
                .and(predicate::str::contains("bdpm"))
                .and(predicate::str::contains("transparence_sante"))
                .and(predicate::str::contains("ansm")),
        );
}

#[test]
fn test_help_mentions_dataset_selection() {
    let mut cmd = Command::cargo_bin("sante-dl").expect("binary should build");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--datasets").and(predicate::str::contains("--list")));
}

#[test]
fn test_unknown_flag_fails() {
    let mut cmd = Command::cargo_bin("sante-dl").expect("binary should build");
    cmd.arg("--definitely-not-a-flag").assert().failure();
}
