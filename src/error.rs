// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Typed unit-scoped failures and the per-run tally of skipped units
// role: errors/diagnostics
// outputs: PipelineError (thiserror) and Diagnostics (serializable counters)
// invariants: A PipelineError never aborts a run; every recorded error bumps exactly one Diagnostics counter
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
  #[error("malformed input {source_name}: {reason}")]
  MalformedInput { source_name: String, reason: String },
  #[error("insufficient data for type {refactoring_type}: {reason}")]
  InsufficientData { refactoring_type: String, reason: String },
  #[error("no enriched record for prid {prid}")]
  MissingJoinKey { prid: String },
  #[error("miner failed for {prid}: {reason}")]
  MinerFailed { prid: String, reason: String },
  #[error("fetch failed for {project}: {reason}")]
  FetchFailed { project: String, reason: String },
}

/// Counts of units skipped or dropped during a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
  pub documents_read: usize,
  pub skipped_documents: usize,
  pub skipped_nodes: usize,
  pub pull_requests_without_files: usize,
  pub ambiguous_pairings: usize,
  pub insufficient_rows: usize,
  pub records_without_join_key: usize,
  pub failed_invocations: usize,
  pub failed_projects: usize,
}

impl Diagnostics {
  /// Log `err` and bump the matching counter.
  pub fn record(&mut self, err: &PipelineError) {
    match err {
      PipelineError::MalformedInput { .. } => {
        tracing::warn!("{}", err);
        self.skipped_documents += 1;
      }
      PipelineError::InsufficientData { .. } => {
        tracing::debug!("{}", err);
        self.insufficient_rows += 1;
      }
      PipelineError::MissingJoinKey { .. } => {
        tracing::debug!("{}", err);
        self.records_without_join_key += 1;
      }
      PipelineError::MinerFailed { .. } => {
        tracing::warn!("{}", err);
        self.failed_invocations += 1;
      }
      PipelineError::FetchFailed { .. } => {
        tracing::warn!("{}", err);
        self.failed_projects += 1;
      }
    }
  }

  pub fn skipped_total(&self) -> usize {
    self.skipped_documents
      + self.skipped_nodes
      + self.pull_requests_without_files
      + self.insufficient_rows
      + self.records_without_join_key
      + self.failed_invocations
      + self.failed_projects
  }

  pub fn log_summary(&self, command: &str) {
    tracing::info!(
      command,
      documents = self.documents_read,
      skipped = self.skipped_total(),
      skipped_documents = self.skipped_documents,
      skipped_nodes = self.skipped_nodes,
      without_files = self.pull_requests_without_files,
      ambiguous_pairings = self.ambiguous_pairings,
      insufficient_rows = self.insufficient_rows,
      without_join_key = self.records_without_join_key,
      failed_invocations = self.failed_invocations,
      failed_projects = self.failed_projects,
      "run finished"
    );
  }
}

impl AddAssign for Diagnostics {
  fn add_assign(&mut self, o: Self) {
    self.documents_read += o.documents_read;
    self.skipped_documents += o.skipped_documents;
    self.skipped_nodes += o.skipped_nodes;
    self.pull_requests_without_files += o.pull_requests_without_files;
    self.ambiguous_pairings += o.ambiguous_pairings;
    self.insufficient_rows += o.insufficient_rows;
    self.records_without_join_key += o.records_without_join_key;
    self.failed_invocations += o.failed_invocations;
    self.failed_projects += o.failed_projects;
  }
}
