use test_support;

#[test]
fn scan_csv_snapshot() {
  let cached = test_support::fixtures_dir().join("cached");
  let mut cmd = test_support::cmd_bin("pr-testability");
  let out = cmd.args(["scan", "--cached"]).arg(&cached).output().unwrap();
  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
  let text = String::from_utf8(out.stdout).unwrap();
  test_support::insta_settings().bind(|| insta::assert_snapshot!("scan_csv", text));
}
