use test_support;

fn scan_json(extra: &[&str]) -> Vec<serde_json::Value> {
  let cached = test_support::fixtures_dir().join("cached");
  let mut cmd = test_support::cmd_bin("pr-testability");
  let out = cmd
    .args(["scan", "--format", "json", "--cached"])
    .arg(&cached)
    .args(extra)
    .output()
    .unwrap();
  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
  serde_json::from_slice(&out.stdout).expect("json rows")
}

#[test]
fn pr_view_skips_broken_documents_and_empty_prs() {
  let rows = scan_json(&[]);
  let urls: Vec<&str> = rows.iter().map(|r| r["url"].as_str().unwrap()).collect();
  assert_eq!(urls.len(), 6);
  assert!(urls.iter().all(|u| u.starts_with("https://github.com/acme/widgets/pull/")));
  assert!(!urls.iter().any(|u| u.ends_with("/5")), "PR without files must not produce a record");

  let paired: Vec<&str> = rows.iter().filter(|r| r["test_pairs"] == 1).map(|r| r["prid"].as_str().unwrap()).collect();
  assert_eq!(paired, ["acme_widgets_1", "acme_widgets_2", "acme_widgets_7"]);
}

#[test]
fn strict_strategy_tags_every_text() {
  let rows = scan_json(&["--title-strategy", "strict", "--body-strategy", "strict"]);
  let pr1 = rows.iter().find(|r| r["prid"] == "acme_widgets_1").unwrap();
  assert_eq!(pr1["title_reason"], "Easier to test");
  let pr3 = rows.iter().find(|r| r["prid"] == "acme_widgets_3").unwrap();
  assert_eq!(pr3["title_reason"], "Fix");
  let pr6 = rows.iter().find(|r| r["prid"] == "acme_widgets_6").unwrap();
  assert_eq!(pr6["title_reason"], "other");
  assert_eq!(pr6["title_relevant"], false);
  assert!(rows.iter().all(|r| r["body_reason"].is_string()));
}

#[test]
fn pair_view_carries_line_counts() {
  let rows = scan_json(&["--view", "pair"]);
  assert_eq!(rows.len(), 3);
  let foo = &rows[0];
  assert_eq!(foo["production_file"], "src/main/java/acme/Foo.java");
  assert_eq!(foo["test_file"], "src/test/java/acme/FooTest.java");
  assert_eq!(foo["production_additions"], 20);
  assert_eq!(foo["production_deletions"], 5);
  assert_eq!(foo["test_additions"], 40);
  assert_eq!(foo["title_reason"], "simplify testing");
}

#[test]
fn pair_view_size_cap_drops_large_prs() {
  let rows = scan_json(&["--view", "pair", "--max-changed-files", "3"]);
  let prids: Vec<&str> = rows.iter().map(|r| r["prid"].as_str().unwrap()).collect();
  assert_eq!(prids, ["acme_widgets_1", "acme_widgets_7"]);
}

#[test]
fn out_file_receives_dataset() {
  let td = test_support::tempdir();
  let out_path = td.path().join("nested/prs.csv");
  let mut cmd = test_support::cmd_bin("pr-testability");
  let out = cmd
    .args(["scan", "--cached"])
    .arg(test_support::fixtures_dir().join("cached"))
    .arg("--out")
    .arg(&out_path)
    .output()
    .unwrap();
  assert!(out.status.success());
  assert!(out.stdout.is_empty(), "data goes to --out, not stdout");
  let text = std::fs::read_to_string(&out_path).unwrap();
  assert_eq!(text.lines().count(), 7);
  assert!(text.starts_with("url,prid,title,"));
}
