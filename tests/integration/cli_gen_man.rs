use test_support;

#[test]
fn gen_man_outputs_troff() {
  test_support::init_tracing();
  let mut cmd = test_support::cmd_bin("pr-testability");
  let out = cmd.args(["--gen-man"]).output().unwrap();
  assert!(out.status.success());
  let text = String::from_utf8_lossy(&out.stdout);
  // roff preamble precedes the title line
  assert!(text.contains(".TH"), "expected troff title header");
  assert!(text.contains("pr\\-testability") || text.contains("pr-testability"));
  assert!(text.contains("compare"));
}
