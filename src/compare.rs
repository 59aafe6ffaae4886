// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Compare refactoring frequencies between PRs with and without test pairs
// role: aggregation/comparison
// inputs: Enriched PR records, mined refactoring records, CompareOptions (threshold, record filter)
// outputs: Comparison { rows sorted by ratio, group sizes, diagnostics }
// invariants:
// - Group sizes count PRs with at least one joined refactoring (cross-tab rows)
// - A row with an empty group, a zero baseline mean, or a raw count under min_count is dropped, not fatal
// - Output order is a total order: ratio ascending, then type name
// errors: None; dropped rows and unjoined records are tallied in diagnostics
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

use crate::error::{Diagnostics, PipelineError};
use crate::mined::RefactoringFilter;
use crate::model::{AggregateRow, EnrichedPrRecord, RefactoringRecord};
use crate::stats::{round_to, two_proportion_ztest};

pub const DEFAULT_MIN_COUNT: u64 = 5;

#[derive(Debug, Clone)]
pub struct CompareOptions {
  pub min_count: u64,
  pub filter: RefactoringFilter,
}

impl Default for CompareOptions {
  fn default() -> Self {
    Self { min_count: DEFAULT_MIN_COUNT, filter: RefactoringFilter::default() }
  }
}

/// PR x refactoring-type occurrence table; absent cells are zero.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CrossTab {
  rows: BTreeMap<String, BTreeMap<String, u64>>,
}

impl CrossTab {
  pub fn add(&mut self, prid: &str, refactoring_type: &str) {
    *self
      .rows
      .entry(prid.to_string())
      .or_default()
      .entry(refactoring_type.to_string())
      .or_insert(0) += 1;
  }

  pub fn row_count(&self) -> u64 {
    self.rows.len() as u64
  }

  pub fn columns(&self) -> BTreeSet<&str> {
    self.rows.values().flat_map(|r| r.keys().map(String::as_str)).collect()
  }

  pub fn column_sum(&self, col: &str) -> u64 {
    self.rows.values().filter_map(|r| r.get(col)).sum()
  }

  /// Rows with a non-zero cell in `col`.
  pub fn rows_with(&self, col: &str) -> u64 {
    self.rows.values().filter(|r| r.contains_key(col)).count() as u64
  }

  pub fn column_mean(&self, col: &str) -> Option<f64> {
    match self.row_count() {
      0 => None,
      n => Some(self.column_sum(col) as f64 / n as f64),
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupSizes {
  pub with_pairs: u64,
  pub without_pairs: u64,
}

#[derive(Debug, Clone, Default)]
pub struct Comparison {
  pub rows: Vec<AggregateRow>,
  pub groups: GroupSizes,
  pub diagnostics: Diagnostics,
}

/// Split joined refactorings into the with-pairs and without-pairs cross-tabs.
pub fn build_crosstabs(
  records: &[EnrichedPrRecord],
  refactorings: &[RefactoringRecord],
  diag: &mut Diagnostics,
) -> (CrossTab, CrossTab) {
  let mut by_prid: HashMap<&str, &EnrichedPrRecord> = HashMap::new();
  for r in records {
    by_prid.entry(r.prid.as_str()).or_insert(r);
  }

  let mut with_pairs = CrossTab::default();
  let mut without_pairs = CrossTab::default();
  for rf in refactorings {
    match by_prid.get(rf.prid.as_str()) {
      Some(rec) if rec.has_test_pairs() => with_pairs.add(&rf.prid, &rf.refactoring_type),
      Some(_) => without_pairs.add(&rf.prid, &rf.refactoring_type),
      None => diag.record(&PipelineError::MissingJoinKey { prid: rf.prid.clone() }),
    }
  }
  (with_pairs, without_pairs)
}

fn aggregate_row(
  ty: &str,
  with_pairs: &CrossTab,
  without_pairs: &CrossTab,
  min_count: u64,
) -> Result<AggregateRow, PipelineError> {
  let insufficient = |reason: String| PipelineError::InsufficientData { refactoring_type: ty.to_string(), reason };

  let (Some(mean_with), Some(mean_without)) = (with_pairs.column_mean(ty), without_pairs.column_mean(ty)) else {
    return Err(insufficient("a group has no pull requests".into()));
  };
  let count_with = with_pairs.column_sum(ty);
  let count_without = without_pairs.column_sum(ty);
  if count_with < min_count || count_without < min_count {
    return Err(insufficient(format!(
      "counts {}/{} below minimum {}",
      count_with, count_without, min_count
    )));
  }
  if mean_without == 0.0 {
    return Err(insufficient("zero baseline mean".into()));
  }

  let prs_with = with_pairs.rows_with(ty);
  let prs_without = without_pairs.rows_with(ty);
  // Occurrence counts against group sizes; None when a count exceeds its group.
  let p_value = two_proportion_ztest([count_with, count_without], [with_pairs.row_count(), without_pairs.row_count()])
    .map(|p| round_to(p, 4));

  Ok(AggregateRow {
    refactoring_type: ty.to_string(),
    mean_with_pairs: mean_with,
    mean_without_pairs: mean_without,
    count_with_pairs: count_with,
    count_without_pairs: count_without,
    prs_with_pairs: prs_with,
    prs_without_pairs: prs_without,
    ratio: mean_with / mean_without,
    p_value,
  })
}

pub fn compare(records: &[EnrichedPrRecord], refactorings: Vec<RefactoringRecord>, opts: &CompareOptions) -> Comparison {
  let mut diag = Diagnostics::default();

  let source_files: HashMap<String, usize> = records.iter().map(|r| (r.prid.clone(), r.source_files)).collect();
  let refactorings = opts.filter.apply(refactorings, &source_files);

  let (with_pairs, without_pairs) = build_crosstabs(records, &refactorings, &mut diag);
  let types: BTreeSet<&str> = with_pairs.columns().union(&without_pairs.columns()).copied().collect();

  let mut rows: Vec<AggregateRow> = Vec::new();
  for ty in types {
    match aggregate_row(ty, &with_pairs, &without_pairs, opts.min_count) {
      Ok(row) => rows.push(row),
      Err(e) => diag.record(&e),
    }
  }
  rows.sort_by(|a, b| a.ratio.total_cmp(&b.ratio).then_with(|| a.refactoring_type.cmp(&b.refactoring_type)));

  Comparison {
    rows,
    groups: GroupSizes { with_pairs: with_pairs.row_count(), without_pairs: without_pairs.row_count() },
    diagnostics: diag,
  }
}
