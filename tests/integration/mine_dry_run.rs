use test_support;

fn dry_run(mined: &std::path::Path, extra: &[&str]) -> Vec<String> {
  let cached = test_support::fixtures_dir().join("cached");
  let mut cmd = test_support::cmd_bin("pr-testability");
  let out = cmd
    .args(["mine", "--dry-run", "--cached"])
    .arg(&cached)
    .arg("--mined")
    .arg(mined)
    .args(extra)
    .output()
    .unwrap();
  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
  String::from_utf8(out.stdout).unwrap().lines().map(str::to_string).collect()
}

#[test]
fn dry_run_prints_one_command_per_unmined_pr() {
  let td = test_support::tempdir();
  let mined = td.path().join("mined");
  let lines = dry_run(&mined, &[]);
  assert_eq!(lines.len(), 6);
  assert!(mined.is_dir(), "mined dir is created up front");

  let first = &lines[0];
  assert!(first.starts_with("mvn com.github.anonauthor:refminer-mvn-plugin:prminer -DrefminerFilename="));
  assert!(first.ends_with("acme_widgets_1.csv -DgitURL=https://github.com/acme/widgets.git -DpullRequest=1"));
  assert!(lines[5].ends_with("-DpullRequest=7"));
  assert!(std::fs::read_dir(&mined).unwrap().next().is_none(), "dry run writes nothing");
}

#[test]
fn relevant_only_and_existing_output_shrink_the_plan() {
  let td = test_support::tempdir();
  let mined = td.path().join("mined");
  let relevant = dry_run(&mined, &["--relevant-only"]);
  let numbers: Vec<&str> = relevant.iter().map(|l| l.rsplit('=').next().unwrap()).collect();
  assert_eq!(numbers, ["1", "2", "7"]);

  let copied = test_support::copy_fixture_dir("mined", td.path());
  let remaining = dry_run(&copied, &[]);
  assert_eq!(remaining.len(), 1);
  assert!(remaining[0].ends_with("-DpullRequest=6"));
}

#[test]
fn custom_program_is_invoked_and_summarized() {
  let td = test_support::tempdir();
  let mined = td.path().join("mined");
  let summary = td.path().join("mine.json");
  let cached = test_support::fixtures_dir().join("cached");
  let mut cmd = test_support::cmd_bin("pr-testability");
  cmd
    .args(["mine", "--relevant-only", "--program", "false", "--cached"])
    .arg(&cached)
    .arg("--mined")
    .arg(&mined)
    .arg("--summary")
    .arg(&summary)
    .assert()
    .success();

  let v: serde_json::Value = serde_json::from_slice(&std::fs::read(&summary).unwrap()).unwrap();
  assert_eq!(v["command"], "mine");
  assert_eq!(v["mining"]["planned"], 3);
  assert_eq!(v["mining"]["invoked"], 3);
  assert_eq!(v["mining"]["succeeded"], 0);
  assert_eq!(v["mining"]["not_relevant"], 3);
  assert_eq!(v["diagnostics"]["failed_invocations"], 3);
}
