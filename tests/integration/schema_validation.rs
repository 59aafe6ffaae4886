use jsonschema::validator_for;
use test_support;

fn compile_schema(name: &str) -> jsonschema::Validator {
  let path = test_support::schemas_dir().join(name);
  let data = std::fs::read(&path).expect("schema file");
  let schema: serde_json::Value = serde_json::from_slice(&data).expect("valid schema JSON");
  validator_for(&schema).expect("compile schema")
}

fn manifest_for(args: &[&str]) -> serde_json::Value {
  let fx = test_support::fixtures_dir();
  let td = test_support::tempdir();
  let summary = td.path().join("run.json");
  let mut cmd = test_support::cmd_bin("pr-testability");
  cmd
    .args(args)
    .arg("--cached")
    .arg(fx.join("cached"))
    .arg("--summary")
    .arg(&summary)
    .assert()
    .success();
  serde_json::from_slice(&std::fs::read(&summary).unwrap()).unwrap()
}

#[test]
fn scan_manifest_conforms_to_schema() {
  let v = manifest_for(&["scan", "--view", "pair", "--format", "json", "--verbose"]);
  assert_eq!(v["inputs"]["view"], "pair");
  assert_eq!(v["inputs"]["verbose"], true);
  assert_eq!(v["rows"], 3);
  let compiled = compile_schema("run-manifest.schema.json");
  compiled.validate(&v).expect("schema validation failed for scan manifest");
}

#[test]
fn compare_manifest_conforms_to_schema() {
  let mined = test_support::fixtures_dir().join("mined");
  let v = manifest_for(&["compare", "--mined", mined.to_str().unwrap()]);
  let compiled = compile_schema("run-manifest.schema.json");
  compiled.validate(&v).expect("schema validation failed for compare manifest");
}

#[test]
fn manifest_missing_diagnostics_is_rejected() {
  let mut v = manifest_for(&["scan"]);
  v.as_object_mut().unwrap().remove("diagnostics");
  let compiled = compile_schema("run-manifest.schema.json");
  assert!(!compiled.is_valid(&v));
}
