// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Pair changed production files with their test files by file-name convention (Foo.java <-> FooTest.java)
// role: pairing/heuristics
// inputs: Changed-file paths of one pull request
// outputs: BTreeMap production_path -> test_path; per-side counts
// invariants:
// - Paths are processed in lexicographic order; on a base-name collision the last path wins
// - A production path never carries the test suffix; a test path always does
// - Unmatched files never appear in the output
// errors: None (pure)
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::{BTreeMap, HashMap};

/// File-name convention linking a production file to its test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Convention {
  /// Source extension including the dot, e.g. `.java`.
  pub extension: String,
  /// Suffix inserted before the extension for test files, e.g. `Test`.
  pub test_suffix: String,
}

impl Default for Convention {
  fn default() -> Self {
    Self { extension: ".java".into(), test_suffix: "Test".into() }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileRole {
  Production,
  Test,
  Other,
}

impl Convention {
  fn test_ending(&self) -> String {
    format!("{}{}", self.test_suffix, self.extension)
  }

  pub fn role(&self, path: &str) -> FileRole {
    if path.ends_with(&self.test_ending()) {
      FileRole::Test
    } else if path.ends_with(&self.extension) {
      FileRole::Production
    } else {
      FileRole::Other
    }
  }

  pub fn is_source(&self, path: &str) -> bool {
    path.ends_with(&self.extension)
  }

  /// Base name with the role-specific ending removed (`src/FooTest.java` -> `Foo`).
  pub fn stem<'a>(&self, path: &'a str) -> Option<&'a str> {
    let file = path.rsplit('/').next().unwrap_or(path);
    let stem = match self.role(path) {
      FileRole::Test => file.strip_suffix(self.test_ending().as_str()),
      FileRole::Production => file.strip_suffix(self.extension.as_str()),
      FileRole::Other => None,
    };
    stem.filter(|s| !s.is_empty())
  }
}

/// Result of pairing one PR's files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pairing {
  pub pairs: BTreeMap<String, String>,
  pub production_files: usize,
  pub test_files: usize,
  pub source_files: usize,
  /// Paths dropped because another path on the same side shared their stem.
  pub collisions: usize,
}

/// Pair production files with test files.
pub fn pair_files<S: AsRef<str>>(paths: &[S], convention: &Convention) -> Pairing {
  let mut ordered: Vec<&str> = paths.iter().map(|p| p.as_ref()).collect();
  ordered.sort_unstable();
  ordered.dedup();

  let mut production: HashMap<&str, &str> = HashMap::new();
  let mut tests: HashMap<&str, &str> = HashMap::new();
  let mut out = Pairing::default();

  for path in ordered {
    if convention.is_source(path) {
      out.source_files += 1;
    }
    let side = match convention.role(path) {
      FileRole::Production => {
        out.production_files += 1;
        &mut production
      }
      FileRole::Test => {
        out.test_files += 1;
        &mut tests
      }
      FileRole::Other => continue,
    };
    if let Some(stem) = convention.stem(path) {
      if side.insert(stem, path).is_some() {
        out.collisions += 1;
      }
    }
  }

  out.pairs = tests
    .iter()
    .filter_map(|(stem, test)| production.get(stem).map(|prod| (prod.to_string(), test.to_string())))
    .collect();
  out
}
