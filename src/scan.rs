// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Read cached PR listing pages and build the tabular PR dataset in parallel chunks
// role: processing/scan
// inputs: Directory of cached listing documents (*.json), EnrichOptions
// outputs: ScanOutcome { records, pairs, diagnostics } sorted by PR URL
// side_effects: Reads files
// invariants:
// - A malformed document or node is skipped and counted; the scan always completes
// - Chunks share no state; their outcomes are concatenated once, then sorted
// errors: Only listing the directory can fail the scan
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Deserialize;

use crate::enrich::{EnrichOptions, enrich_full, pair_rows};
use crate::error::{Diagnostics, PipelineError};
use crate::ext::serde_json::JsonFetch;
use crate::model::{EnrichedPrRecord, PairRecord, PullRequest};

pub const DEFAULT_CHUNK_SIZE: usize = 16;

#[derive(Debug, Default)]
pub struct ScanOutcome {
  pub records: Vec<EnrichedPrRecord>,
  pub pairs: Vec<PairRecord>,
  pub diagnostics: Diagnostics,
}

impl ScanOutcome {
  fn sort(&mut self) {
    self.records.sort_by(|a, b| a.url.cmp(&b.url));
    self.pairs.sort_by(|a, b| (&a.url, &a.production_file).cmp(&(&b.url, &b.production_file)));
  }

  fn concat(parts: Vec<ScanOutcome>) -> ScanOutcome {
    let mut out = ScanOutcome {
      records: Vec::with_capacity(parts.iter().map(|p| p.records.len()).sum()),
      pairs: Vec::with_capacity(parts.iter().map(|p| p.pairs.len()).sum()),
      diagnostics: Diagnostics::default(),
    };
    for p in parts {
      out.records.extend(p.records);
      out.pairs.extend(p.pairs);
      out.diagnostics += p.diagnostics;
    }
    out.sort();
    out
  }
}

/// Cached listing documents in `dir`, sorted by file name.
pub fn list_documents(dir: &Path) -> Result<Vec<PathBuf>> {
  let mut out = Vec::new();
  for entry in std::fs::read_dir(dir).with_context(|| format!("reading cache dir {}", dir.display()))? {
    let path = entry?.path();
    if path.is_file() && path.extension().is_some_and(|e| e == "json") {
      out.push(path);
    }
  }
  out.sort();
  Ok(out)
}

/// Pull request nodes of one listing document, plus the number of nodes that failed to parse.
pub fn parse_document(source_name: &str, text: &str) -> Result<(Vec<PullRequest>, usize), PipelineError> {
  let malformed = |reason: String| PipelineError::MalformedInput { source_name: source_name.to_string(), reason };

  let doc: serde_json::Value = serde_json::from_str(text).map_err(|e| malformed(e.to_string()))?;

  if !doc.fetch("errors").elements().is_empty() {
    return Err(malformed("response carries errors".into()));
  }
  if !doc.fetch("data.repository").is_present() {
    return Err(malformed("missing data.repository".into()));
  }

  let mut prs = Vec::new();
  let mut bad = 0usize;
  for node in doc.fetch("data.repository.pullRequests.nodes").elements() {
    match PullRequest::deserialize(node) {
      Ok(pr) => prs.push(pr),
      Err(e) => {
        tracing::debug!(source = source_name, error = %e, "skipping pull request node");
        bad += 1;
      }
    }
  }
  Ok((prs, bad))
}

fn scan_pull_requests(prs: &[PullRequest], opts: &EnrichOptions, out: &mut ScanOutcome) {
  for pr in prs {
    let Some(enriched) = enrich_full(pr, opts) else {
      out.diagnostics.pull_requests_without_files += 1;
      continue;
    };
    if enriched.pairing.collisions > 0 {
      tracing::debug!(url = %pr.url, collisions = enriched.pairing.collisions, "ambiguous test pairing");
      out.diagnostics.ambiguous_pairings += enriched.pairing.collisions;
    }
    out.pairs.extend(pair_rows(pr, &enriched, opts));
    out.records.push(enriched.record);
  }
}

fn scan_chunk(paths: &[PathBuf], opts: &EnrichOptions) -> ScanOutcome {
  let mut out = ScanOutcome::default();
  for path in paths {
    let name = path.display().to_string();
    out.diagnostics.documents_read += 1;
    let parsed = std::fs::read_to_string(path)
      .map_err(|e| PipelineError::MalformedInput { source_name: name.clone(), reason: e.to_string() })
      .and_then(|text| parse_document(&name, &text));
    match parsed {
      Ok((prs, bad)) => {
        out.diagnostics.skipped_nodes += bad;
        scan_pull_requests(&prs, opts, &mut out);
      }
      Err(e) => out.diagnostics.record(&e),
    }
  }
  out
}

pub fn scan_documents(paths: &[PathBuf], opts: &EnrichOptions, chunk_size: usize) -> ScanOutcome {
  let parts: Vec<ScanOutcome> = paths
    .par_chunks(chunk_size.max(1))
    .map(|chunk| scan_chunk(chunk, opts))
    .collect();
  ScanOutcome::concat(parts)
}

pub fn scan_dir(dir: &Path, opts: &EnrichOptions) -> Result<ScanOutcome> {
  let paths = list_documents(dir)?;
  tracing::info!(dir = %dir.display(), documents = paths.len(), "scanning cached listings");
  Ok(scan_documents(&paths, opts, DEFAULT_CHUNK_SIZE))
}
