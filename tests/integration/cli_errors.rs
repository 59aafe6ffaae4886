use predicates::prelude::*;
use test_support;

#[test]
fn missing_subcommand_fails() {
  let mut cmd = test_support::cmd_bin("pr-testability");
  cmd.assert().failure().stderr(predicate::str::contains("Provide a subcommand"));
}

#[test]
fn fetch_rejects_malformed_project() {
  let td = test_support::tempdir();
  let cached = td.path().join("cache");
  let mut cmd = test_support::cmd_bin("pr-testability");
  cmd
    .args(["fetch", "--project", "not-a-project", "--cached"])
    .arg(&cached)
    .assert()
    .failure()
    .stderr(predicate::str::contains("expected owner/name"));
}

#[test]
fn fetch_without_projects_fails() {
  let td = test_support::tempdir();
  let mut cmd = test_support::cmd_bin("pr-testability");
  cmd
    .args(["fetch", "--cached"])
    .arg(td.path())
    .assert()
    .failure()
    .stderr(predicate::str::contains("at least one --project"));
}

#[test]
fn scan_requires_existing_cache_dir() {
  let td = test_support::tempdir();
  let mut cmd = test_support::cmd_bin("pr-testability");
  cmd
    .args(["scan", "--cached"])
    .arg(td.path().join("nope"))
    .assert()
    .failure()
    .stderr(predicate::str::contains("is not a directory"));
}

#[test]
fn scan_rejects_latex() {
  let cached = test_support::fixtures_dir().join("cached");
  let mut cmd = test_support::cmd_bin("pr-testability");
  cmd
    .args(["scan", "--format", "latex", "--cached"])
    .arg(&cached)
    .assert()
    .failure()
    .stderr(predicate::str::contains("only available for compare"));
}

#[test]
fn compare_rejects_conflicting_type_filters() {
  let fx = test_support::fixtures_dir();
  let mut cmd = test_support::cmd_bin("pr-testability");
  cmd
    .args(["compare", "--keep-all-types", "--exclude-type", "MOVE_CLASS", "--cached"])
    .arg(fx.join("cached"))
    .arg("--mined")
    .arg(fx.join("mined"))
    .assert()
    .failure();
}
