// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Plan and run the external refactoring miner once per pull request that has no mined output yet
// role: processing/mine
// inputs: EnrichedPrRecord rows; MineOptions (mined dir, program, goal, relevant-only, dry-run, failure pause)
// outputs: Invocation plan; MineReport with per-run tallies; `<mined>/<prid>.csv` written by the miner
// side_effects: Spawns the miner subprocess; sleeps after failures when configured
// invariants:
// - At most one invocation per prid; existing output files are never re-mined
// - A failed invocation is recorded and the run continues with the next PR
// errors: Per-PR failures are PipelineError::MinerFailed; only mined-dir creation is fatal
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use serde::Serialize;

use crate::error::{Diagnostics, PipelineError};
use crate::identity::PrIdentity;
use crate::mined::mined_path;
use crate::model::EnrichedPrRecord;
use crate::util;

pub const DEFAULT_PROGRAM: &str = "mvn";
pub const DEFAULT_GOAL: &str = "com.github.anonauthor:refminer-mvn-plugin:prminer";

#[derive(Debug, Clone)]
pub struct MineOptions {
  pub mined_dir: PathBuf,
  pub relevant_only: bool,
  pub dry_run: bool,
  pub program: String,
  pub goal: String,
  pub failure_pause: Duration,
}

/// One planned miner run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invocation {
  pub prid: String,
  pub mined_file: PathBuf,
  pub clone_url: String,
  pub number: u64,
}

impl Invocation {
  pub fn args(&self, goal: &str) -> Vec<String> {
    vec![
      goal.to_string(),
      format!("-DrefminerFilename={}", self.mined_file.display()),
      format!("-DgitURL={}", self.clone_url),
      format!("-DpullRequest={}", self.number),
    ]
  }

  pub fn command_line(&self, program: &str, goal: &str) -> String {
    std::iter::once(program.to_string()).chain(self.args(goal)).collect::<Vec<_>>().join(" ")
  }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MineReport {
  pub planned: usize,
  pub already_mined: usize,
  pub not_relevant: usize,
  pub invoked: usize,
  pub succeeded: usize,
  #[serde(skip)]
  pub diagnostics: Diagnostics,
}

/// Invocations for records without mined output, ordered by prid.
pub fn plan(records: &[EnrichedPrRecord], opts: &MineOptions, report: &mut MineReport) -> Vec<Invocation> {
  let mut by_prid: BTreeMap<String, Invocation> = BTreeMap::new();
  for rec in records {
    if opts.relevant_only && !rec.is_relevant() {
      report.not_relevant += 1;
      continue;
    }
    let Some(id) = PrIdentity::parse(&rec.url) else {
      tracing::debug!(url = %rec.url, "not a GitHub pull request URL; not mining");
      continue;
    };
    let prid = id.prid();
    let mined_file = mined_path(&opts.mined_dir, &prid);
    if mined_file.exists() {
      report.already_mined += 1;
      continue;
    }
    if by_prid.contains_key(&prid) {
      continue;
    }
    tracing::debug!(project = %id.project(), pr = %id.url(), prid = %prid, "planned miner run");
    let inv = Invocation { prid: prid.clone(), mined_file, clone_url: id.clone_url(), number: id.number };
    by_prid.insert(prid, inv);
  }
  report.planned = by_prid.len();
  by_prid.into_values().collect()
}

fn invoke(inv: &Invocation, opts: &MineOptions) -> Result<(), PipelineError> {
  util::run_command(&opts.program, &inv.args(&opts.goal))
    .map(|_| ())
    .map_err(|e| PipelineError::MinerFailed { prid: inv.prid.clone(), reason: format!("{:#}", e) })
}

/// Run the plan sequentially; in dry-run mode only the command lines are returned.
pub fn run(records: &[EnrichedPrRecord], opts: &MineOptions) -> Result<(MineReport, Vec<String>)> {
  util::ensure_dir(&opts.mined_dir)?;

  let mut report = MineReport::default();
  let invocations = plan(records, opts, &mut report);
  let lines: Vec<String> = invocations.iter().map(|i| i.command_line(&opts.program, &opts.goal)).collect();

  if opts.dry_run {
    tracing::info!(planned = report.planned, already_mined = report.already_mined, "dry run; miner not invoked");
    return Ok((report, lines));
  }

  for (inv, line) in invocations.iter().zip(&lines) {
    tracing::info!(prid = %inv.prid, "{}", line);
    report.invoked += 1;
    match invoke(inv, opts) {
      Ok(()) => report.succeeded += 1,
      Err(e) => {
        report.diagnostics.record(&e);
        remove_partial(&inv.mined_file);
        if !opts.failure_pause.is_zero() {
          std::thread::sleep(opts.failure_pause);
        }
      }
    }
  }
  Ok((report, lines))
}

// A partial file would be mistaken for finished output on the next run.
fn remove_partial(path: &Path) {
  if path.exists() {
    if let Err(e) = std::fs::remove_file(path) {
      tracing::warn!(path = %path.display(), error = %e, "could not remove partial miner output");
    }
  }
}
