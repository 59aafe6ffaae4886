// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Define the raw forge shapes (listing pages, PRs, changed files) and the derived rows (enriched PRs, pairs, refactorings, aggregates)
// role: model/types
// outputs: Serde structs with stable field names shared by scan, mine, compare and rendering
// invariants: Raw shapes mirror the GraphQL field names; derived rows are flat so they export to CSV unchanged; test_pairs <= min(production_files, test_files)
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
  #[serde(default)]
  pub end_cursor: Option<String>,
  #[serde(default)]
  pub has_next_page: bool,
}

/// GraphQL `{ totalCount, nodes }` wrapper; both halves may be absent or null.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Connection<T> {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub total_count: Option<i64>,
  pub nodes: Option<Vec<T>>,
}

impl<T> Connection<T> {
  pub fn items(&self) -> &[T] {
    self.nodes.as_deref().unwrap_or(&[])
  }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChangedFile {
  #[serde(default)]
  pub path: String,
  #[serde(default)]
  pub additions: u64,
  #[serde(default)]
  pub deletions: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Label {
  pub name: String,
}

/// One pull request node as returned by the forge listing query.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PullRequest {
  pub url: String,
  #[serde(default)]
  pub number: i64,
  #[serde(default)]
  pub id: Option<String>,
  #[serde(default)]
  pub title: Option<String>,
  #[serde(default)]
  pub body_text: Option<String>,
  #[serde(default)]
  pub state: Option<String>,
  #[serde(default)]
  pub changed_files: i64,
  #[serde(default)]
  pub files: Option<Connection<ChangedFile>>,
  #[serde(default)]
  pub labels: Option<Connection<Label>>,
}

impl PullRequest {
  /// Changed-file records in listing order; empty when the forge returned none.
  pub fn changed_file_records(&self) -> &[ChangedFile] {
    self.files.as_ref().map(|c| c.items()).unwrap_or(&[])
  }

  pub fn file_paths(&self) -> Vec<&str> {
    self.changed_file_records().iter().map(|f| f.path.as_str()).collect()
  }

  pub fn label_names(&self) -> Vec<&str> {
    self
      .labels
      .as_ref()
      .map(|c| c.items().iter().map(|l| l.name.as_str()).collect())
      .unwrap_or_default()
  }
}

/// Classifier output for a single text field.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct RelevanceResult {
  pub relevant: bool,
  pub reason: Option<String>,
}

impl RelevanceResult {
  pub fn new(relevant: bool, reason: Option<&str>) -> Self {
    Self { relevant, reason: reason.map(str::to_string) }
  }
}

/// Per-PR row of the tabular dataset.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EnrichedPrRecord {
  pub url: String,
  pub prid: String,
  pub title: String,
  pub state: String,
  /// Label names joined with `|`.
  pub labels: String,
  pub changed_files: i64,
  pub listed_files: usize,
  pub source_files: usize,
  pub production_files: usize,
  pub test_files: usize,
  pub test_pairs: usize,
  pub title_relevant: bool,
  pub title_reason: Option<String>,
  pub body_relevant: bool,
  pub body_reason: Option<String>,
}

impl EnrichedPrRecord {
  pub fn has_test_pairs(&self) -> bool {
    self.test_pairs > 0
  }

  pub fn is_relevant(&self) -> bool {
    self.title_relevant || self.body_relevant
  }
}

/// Per-pair row: one per (PR, production file, test file).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PairRecord {
  pub url: String,
  pub prid: String,
  pub title: String,
  pub title_reason: Option<String>,
  pub body_reason: Option<String>,
  pub production_file: String,
  pub test_file: String,
  pub test_pairs: usize,
  pub changed_files: i64,
  pub production_additions: u64,
  pub production_deletions: u64,
  pub test_additions: u64,
  pub test_deletions: u64,
}

/// One refactoring detected by the external miner; `prid` comes from the output file name.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RefactoringRecord {
  #[serde(rename = "refactoringType")]
  pub refactoring_type: String,
  #[serde(rename = "classesBefore", default)]
  pub classes_before: Option<String>,
  #[serde(rename = "classesAfter", default)]
  pub classes_after: Option<String>,
  #[serde(default)]
  pub commit: String,
  #[serde(skip)]
  pub prid: String,
}

/// One row of the comparison table, per refactoring type.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AggregateRow {
  pub refactoring_type: String,
  pub mean_with_pairs: f64,
  pub mean_without_pairs: f64,
  pub count_with_pairs: u64,
  pub count_without_pairs: u64,
  pub prs_with_pairs: u64,
  pub prs_without_pairs: u64,
  pub ratio: f64,
  pub p_value: Option<f64>,
}
