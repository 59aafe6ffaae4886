use test_support;

fn compare(extra: &[&str]) -> std::process::Output {
  let fx = test_support::fixtures_dir();
  let mut cmd = test_support::cmd_bin("pr-testability");
  let out = cmd
    .args(["compare", "--cached"])
    .arg(fx.join("cached"))
    .arg("--mined")
    .arg(fx.join("mined"))
    .args(extra)
    .output()
    .unwrap();
  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
  out
}

#[test]
fn compare_csv_snapshot() {
  let out = compare(&[]);
  let text = String::from_utf8(out.stdout).unwrap();
  test_support::insta_settings().bind(|| insta::assert_snapshot!("compare_csv", text));
}

#[test]
fn compare_latex_snapshot() {
  let out = compare(&["--format", "latex"]);
  let text = String::from_utf8(out.stdout).unwrap();
  test_support::insta_settings().bind(|| insta::assert_snapshot!("compare_latex", text));
}

#[test]
fn compare_json_rows_are_sorted_by_ratio() {
  let out = compare(&["--format", "json"]);
  let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
  assert_eq!(v["groups"]["with_pairs"], 2);
  assert_eq!(v["groups"]["without_pairs"], 2);

  let rows = v["rows"].as_array().unwrap();
  let types: Vec<&str> = rows.iter().map(|r| r["refactoring_type"].as_str().unwrap()).collect();
  assert_eq!(types, ["RENAME_METHOD", "EXTRACT_METHOD"]);

  let rename = &rows[0];
  assert_eq!(rename["count_with_pairs"], 6);
  assert_eq!(rename["count_without_pairs"], 12);
  assert_eq!(rename["prs_without_pairs"], 1);
  assert!((rename["ratio"].as_f64().unwrap() - 0.5).abs() < 1e-12);
  // occurrence counts exceed the two PRs per group, so no proportion test applies
  assert!(rename["p_value"].is_null());
  assert!(rows[1]["p_value"].is_null());
}

#[test]
fn keeping_test_classes_counts_them() {
  let out = compare(&["--format", "json", "--keep-test-classes"]);
  let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
  let extract = v["rows"]
    .as_array()
    .unwrap()
    .iter()
    .find(|r| r["refactoring_type"] == "EXTRACT_METHOD")
    .unwrap()
    .clone();
  assert_eq!(extract["count_with_pairs"], 7);
}

#[test]
fn raising_min_count_drops_rows() {
  let out = compare(&["--min-count", "7"]);
  let text = String::from_utf8(out.stdout).unwrap();
  assert!(text.trim().is_empty(), "no type reaches 7 in both groups: {text}");
}
