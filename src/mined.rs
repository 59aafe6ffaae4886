// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Load the external miner's per-PR refactoring tables and filter out records that would skew comparisons
// role: input/mined
// inputs: Directory of `<prid>.csv` files (semicolon-delimited; refactoringType, classesBefore, classesAfter, commit)
// outputs: RefactoringRecord rows tagged with their prid; filtered subsets
// side_effects: Reads files
// invariants:
// - Files under MIN_MINED_BYTES are empty miner runs and contribute nothing
// - An unreadable file is skipped and counted, never fatal
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::error::{Diagnostics, PipelineError};
use crate::model::RefactoringRecord;

/// Miner output smaller than this holds at most a header line.
pub const MIN_MINED_BYTES: u64 = 100;

pub fn mined_path(dir: &Path, prid: &str) -> PathBuf {
  dir.join(format!("{}.csv", prid))
}

pub fn load_mined_file(path: &Path) -> Result<Vec<RefactoringRecord>, PipelineError> {
  let name = path.display().to_string();
  let malformed = |reason: String| PipelineError::MalformedInput { source_name: name.clone(), reason };
  let prid = path
    .file_stem()
    .map(|s| s.to_string_lossy().to_string())
    .ok_or_else(|| malformed("no file stem".into()))?;

  let mut rdr = csv::ReaderBuilder::new()
    .delimiter(b';')
    .flexible(true)
    .from_path(path)
    .map_err(|e| malformed(e.to_string()))?;

  let mut out = Vec::new();
  for row in rdr.deserialize::<RefactoringRecord>() {
    let mut rec = row.map_err(|e| malformed(e.to_string()))?;
    rec.prid = prid.clone();
    out.push(rec);
  }
  Ok(out)
}

/// All refactorings under `dir`, in file-name order.
pub fn load_mined_dir(dir: &Path) -> Result<(Vec<RefactoringRecord>, Diagnostics)> {
  let mut paths: Vec<PathBuf> = Vec::new();
  for entry in std::fs::read_dir(dir).with_context(|| format!("reading mined dir {}", dir.display()))? {
    let path = entry?.path();
    if path.extension().is_some_and(|e| e == "csv") {
      paths.push(path);
    }
  }
  paths.sort();

  let mut diag = Diagnostics::default();
  let mut out = Vec::new();
  for path in paths {
    let size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
    if size < MIN_MINED_BYTES {
      continue;
    }
    diag.documents_read += 1;
    match load_mined_file(&path) {
      Ok(rows) => out.extend(rows),
      Err(e) => diag.record(&e),
    }
  }
  tracing::info!(dir = %dir.display(), refactorings = out.len(), files = diag.documents_read, "loaded mined refactorings");
  Ok((out, diag))
}

/// Record-level exclusions applied before aggregation.
#[derive(Debug, Clone)]
pub struct RefactoringFilter {
  /// Drop refactorings whose resulting class is a test class.
  pub exclude_test_classes: bool,
  pub excluded_types: BTreeSet<String>,
  /// Drop commits touching more classes than the PR changed source files.
  pub exclude_large_commits: bool,
}

impl Default for RefactoringFilter {
  fn default() -> Self {
    Self {
      exclude_test_classes: true,
      excluded_types: ["ADD_CONSTRUCTOR_PARAMETER".to_string()].into_iter().collect(),
      exclude_large_commits: true,
    }
  }
}

fn is_test_class(classes_after: Option<&str>) -> bool {
  classes_after.is_some_and(|c| c.trim().ends_with("Test"))
}

impl RefactoringFilter {
  /// `source_files` maps prid to the PR's changed source-file count.
  pub fn apply(&self, records: Vec<RefactoringRecord>, source_files: &HashMap<String, usize>) -> Vec<RefactoringRecord> {
    let before = records.len();
    let mut kept: Vec<RefactoringRecord> = records
      .into_iter()
      .filter(|r| !(self.exclude_test_classes && is_test_class(r.classes_after.as_deref())))
      .filter(|r| !self.excluded_types.contains(&r.refactoring_type))
      .collect();

    if self.exclude_large_commits {
      let mut classes: HashMap<(&str, &str), HashSet<&str>> = HashMap::new();
      for r in &kept {
        classes
          .entry((r.prid.as_str(), r.commit.as_str()))
          .or_default()
          .insert(r.classes_after.as_deref().unwrap_or(""));
      }
      let oversized: HashSet<(String, String)> = classes
        .into_iter()
        .filter(|((prid, _), set)| source_files.get(*prid).is_some_and(|n| set.len() > *n))
        .map(|((prid, commit), _)| (prid.to_string(), commit.to_string()))
        .collect();
      if !oversized.is_empty() {
        tracing::debug!(commits = oversized.len(), "dropping oversized commits");
        kept.retain(|r| !oversized.contains(&(r.prid.clone(), r.commit.clone())));
      }
    }

    tracing::debug!(before, after = kept.len(), "filtered refactorings");
    kept
  }
}
