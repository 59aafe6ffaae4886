use test_support;

#[test]
fn compare_manifest_snapshot() {
  let fx = test_support::fixtures_dir();
  let td = test_support::tempdir();
  let summary = td.path().join("runs/compare.json");
  let mut cmd = test_support::cmd_bin("pr-testability");
  let out = cmd
    .args(["compare", "--cached"])
    .arg(fx.join("cached"))
    .arg("--mined")
    .arg(fx.join("mined"))
    .arg("--summary")
    .arg(&summary)
    .output()
    .unwrap();
  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

  let v: serde_json::Value = serde_json::from_slice(&std::fs::read(&summary).unwrap()).unwrap();
  test_support::insta_settings().bind(|| {
    insta::assert_json_snapshot!("compare_manifest", v, {
      ".generated_at" => "[generated_at]",
      ".version" => "[version]",
      ".inputs.cached" => "[cached]",
      ".inputs.mined" => "[mined]",
    })
  });
}

#[test]
fn keep_all_types_shows_up_in_manifest() {
  let fx = test_support::fixtures_dir();
  let td = test_support::tempdir();
  let summary = td.path().join("compare.json");
  let mut cmd = test_support::cmd_bin("pr-testability");
  cmd
    .args(["compare", "--keep-all-types", "--cached"])
    .arg(fx.join("cached"))
    .arg("--mined")
    .arg(fx.join("mined"))
    .arg("--summary")
    .arg(&summary)
    .assert()
    .success();

  let v: serde_json::Value = serde_json::from_slice(&std::fs::read(&summary).unwrap()).unwrap();
  assert_eq!(v["inputs"]["excluded_types"], serde_json::json!([]));
  // ADD_CONSTRUCTOR_PARAMETER joins MOVE_CLASS below the minimum count
  assert_eq!(v["diagnostics"]["insufficient_rows"], 2);
  assert_eq!(v["rows"], 2);
}

#[test]
fn header_only_mined_file_is_read_not_skipped() {
  let mined = test_support::read_fixture_text("mined/acme_widgets_7.csv");
  assert_eq!(mined.lines().count(), 1, "fixture should hold only the miner header");

  let fx = test_support::fixtures_dir();
  let td = test_support::tempdir();
  let summary = td.path().join("compare.json");
  let mut cmd = test_support::cmd_bin("pr-testability");
  let out = cmd
    .args(["compare", "--cached"])
    .arg(fx.join("cached"))
    .arg("--mined")
    .arg(fx.join("mined"))
    .arg("--summary")
    .arg(&summary)
    .output()
    .unwrap();
  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
  let v: serde_json::Value = serde_json::from_slice(&std::fs::read(&summary).unwrap()).unwrap();
  // two cached pages and six mined files are read; only broken.json is skipped
  assert_eq!(v["diagnostics"]["documents_read"], 8);
  assert_eq!(v["diagnostics"]["skipped_documents"], 1);
}
