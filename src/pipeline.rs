// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Orchestrate one subcommand end to end: gather inputs, run the core, write output, write the run manifest
// role: processing/orchestrator
// inputs: EffectiveConfig (normalized Action + global flags)
// outputs: Dataset/table bytes on --out (or stdout); cache pages; miner runs; optional manifest at --summary
// side_effects: Reads cache and mined dirs; writes files; prints data to stdout; network and subprocesses via fetch/mine
// invariants:
// - Stdout carries only data output (tables, dry-run command lines)
// - Diagnostics from every stage are merged before logging and before the manifest is written
// - A run completes unless a directory cannot be read or an output cannot be written
// errors: Propagates IO/serialization errors with path context; per-unit failures are counted, not raised
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Result, anyhow};
use chrono::Local;

use crate::classify::Strategy;
use crate::cli::{Action, EffectiveConfig, View};
use crate::compare::{CompareOptions, compare};
use crate::enrich::EnrichOptions;
use crate::error::Diagnostics;
use crate::forge::{self, FetchOptions};
use crate::manifest::RunManifest;
use crate::mine::{self, MineOptions};
use crate::mined::{RefactoringFilter, load_mined_dir};
use crate::render::{render_comparison, render_rows, write_output};
use crate::scan::scan_dir;

pub fn run(cfg: &EffectiveConfig) -> Result<()> {
  let command = cfg.action.name();
  let (mut manifest, diag) = match &cfg.action {
    Action::Fetch { projects, cached, page_size, rate_limit_pause_secs, request_pause_ms } => {
      let opts = FetchOptions {
        cached_dir: cached.into(),
        page_size: *page_size,
        rate_limit_pause: Duration::from_secs(*rate_limit_pause_secs),
        request_pause: Duration::from_millis(*request_pause_ms),
      };
      run_fetch(projects, &opts)?
    }
    Action::Scan { cached, view, title_strategy, body_strategy, max_changed_files, format, out } => {
      let opts = enrich_options(*title_strategy, *body_strategy, *max_changed_files);
      let outcome = scan_dir(Path::new(cached), &opts)?;
      let (bytes, rows) = match view {
        View::Pr => (render_rows(&outcome.records, *format)?, outcome.records.len()),
        View::Pair => (render_rows(&outcome.pairs, *format)?, outcome.pairs.len()),
      };
      write_output(out, &bytes)?;
      tracing::info!(rows, view = ?view, out = %out, "wrote dataset");

      let mut m = RunManifest::new(command, Local::now(), out);
      m.input("cached", cached.as_str())
        .input("view", serde_json::to_value(view)?)
        .input("title_strategy", serde_json::to_value(title_strategy)?)
        .input("body_strategy", serde_json::to_value(body_strategy)?);
      m.extra("rows", &rows)?;
      m.diagnostics(&outcome.diagnostics)?;
      (m, outcome.diagnostics)
    }
    Action::Mine { cached, mined, title_strategy, body_strategy, relevant_only, dry_run, program, goal, failure_pause_secs } => {
      let opts = MineOptions {
        mined_dir: mined.into(),
        relevant_only: *relevant_only,
        dry_run: *dry_run,
        program: program.clone(),
        goal: goal.clone(),
        failure_pause: Duration::from_secs(*failure_pause_secs),
      };
      run_mine(cached, &enrich_options(*title_strategy, *body_strategy, None), &opts)?
    }
    Action::Compare { cached, mined, min_count, exclude_test_classes, excluded_types, exclude_large_commits, format, out } => {
      let opts = CompareOptions {
        min_count: *min_count,
        filter: RefactoringFilter {
          exclude_test_classes: *exclude_test_classes,
          excluded_types: excluded_types.iter().cloned().collect(),
          exclude_large_commits: *exclude_large_commits,
        },
      };
      let outcome = scan_dir(Path::new(cached), &EnrichOptions::default())?;
      let (refactorings, mined_diag) = load_mined_dir(Path::new(mined))?;
      let cmp = compare(&outcome.records, refactorings, &opts);
      write_output(out, &render_comparison(&cmp, *format)?)?;
      tracing::info!(rows = cmp.rows.len(), with_pairs = cmp.groups.with_pairs, without_pairs = cmp.groups.without_pairs, out = %out, "wrote comparison");

      let mut diag = outcome.diagnostics;
      diag += mined_diag;
      diag += cmp.diagnostics.clone();

      let mut m = RunManifest::new(command, Local::now(), out);
      m.input("cached", cached.as_str())
        .input("mined", mined.as_str())
        .input("min_count", *min_count)
        .input("excluded_types", excluded_types.clone());
      m.extra("groups", &cmp.groups)?;
      m.extra("rows", &cmp.rows.len())?;
      m.diagnostics(&diag)?;
      (m, diag)
    }
  };

  diag.log_summary(command);

  if let Some(path) = &cfg.summary {
    manifest.input("verbose", cfg.verbose);
    let written = manifest.write_to(Path::new(path))?;
    tracing::info!(path = %written.display(), "wrote run manifest");
  }
  Ok(())
}

fn enrich_options(title: Strategy, body: Strategy, max_changed_files: Option<usize>) -> EnrichOptions {
  EnrichOptions { title_strategy: title, body_strategy: body, max_changed_files, ..Default::default() }
}

fn run_fetch(projects: &[String], opts: &FetchOptions) -> Result<(RunManifest, Diagnostics)> {
  let api = forge::build_api(forge::get_github_token)
    .ok_or_else(|| anyhow!("No GitHub token: set GITHUB_TOKEN or GH_TOKEN, or log in with `gh auth login`"))?;

  let (done, diag) = forge::fetch_all(api.as_ref(), projects, opts);
  let per_project: BTreeMap<String, forge::ProjectFetch> = done.into_iter().collect();

  let cached = opts.cached_dir.to_string_lossy().to_string();
  let mut m = RunManifest::new("fetch", Local::now(), &cached);
  m.input("projects", projects.to_vec()).input("page_size", opts.page_size);
  m.extra("fetched", &per_project)?;
  m.diagnostics(&diag)?;
  Ok((m, diag))
}

fn run_mine(cached: &str, enrich: &EnrichOptions, opts: &MineOptions) -> Result<(RunManifest, Diagnostics)> {
  let outcome = scan_dir(Path::new(cached), enrich)?;
  let (report, lines) = mine::run(&outcome.records, opts)?;

  if opts.dry_run {
    let mut text = lines.join("\n");
    if !text.is_empty() {
      text.push('\n');
    }
    write_output("-", text.as_bytes())?;
  }
  tracing::info!(
    planned = report.planned,
    invoked = report.invoked,
    succeeded = report.succeeded,
    already_mined = report.already_mined,
    "mining finished"
  );

  let mut diag = outcome.diagnostics;
  diag += report.diagnostics.clone();

  let mined = opts.mined_dir.to_string_lossy().to_string();
  let mut m = RunManifest::new("mine", Local::now(), &mined);
  m.input("cached", cached)
    .input("relevant_only", opts.relevant_only)
    .input("dry_run", opts.dry_run)
    .input("program", opts.program.as_str());
  m.extra("mining", &report)?;
  m.diagnostics(&diag)?;
  Ok((m, diag))
}
