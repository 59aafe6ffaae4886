// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Turn one fetched pull request into its dataset rows (per-PR record, per-pair records)
// role: enrichment/records
// inputs: PullRequest, EnrichOptions (classifier strategies, pairing convention, pair-view size cap)
// outputs: Enriched (record + pairing) or None; PairRecord rows
// invariants:
// - A PR with zero changed files or no file records yields None, never a default record
// - record.test_pairs == pair_files(record's paths).pairs.len()
// errors: None; absence is reported by the caller
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::HashMap;

use crate::classify::Strategy;
use crate::identity::prid_for_url;
use crate::model::{ChangedFile, EnrichedPrRecord, PairRecord, PullRequest};
use crate::pairing::{Convention, Pairing, pair_files};

#[derive(Debug, Clone, Default)]
pub struct EnrichOptions {
  pub title_strategy: Strategy,
  pub body_strategy: Strategy,
  pub convention: Convention,
  /// Pair rows are only produced for PRs listing fewer files than this.
  pub max_changed_files: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct Enriched {
  pub record: EnrichedPrRecord,
  pub pairing: Pairing,
}

pub fn enrich_full(pr: &PullRequest, opts: &EnrichOptions) -> Option<Enriched> {
  // Guard: nothing to pair or count
  let files = pr.changed_file_records();
  if pr.changed_files <= 0 || files.is_empty() {
    return None;
  }

  let pairing = pair_files(&pr.file_paths(), &opts.convention);
  let title = opts.title_strategy.classify(pr.title.as_deref());
  let body = opts.body_strategy.classify(pr.body_text.as_deref());

  let record = EnrichedPrRecord {
    url: pr.url.clone(),
    prid: prid_for_url(&pr.url),
    title: pr.title.clone().unwrap_or_default(),
    state: pr.state.clone().unwrap_or_default(),
    labels: pr.label_names().join("|"),
    changed_files: pr.changed_files,
    listed_files: files.len(),
    source_files: pairing.source_files,
    production_files: pairing.production_files,
    test_files: pairing.test_files,
    test_pairs: pairing.pairs.len(),
    title_relevant: title.relevant,
    title_reason: title.reason,
    body_relevant: body.relevant,
    body_reason: body.reason,
  };

  Some(Enriched { record, pairing })
}

/// One row per test pair of an enriched PR.
pub fn pair_rows(pr: &PullRequest, enriched: &Enriched, opts: &EnrichOptions) -> Vec<PairRecord> {
  let rec = &enriched.record;
  if let Some(cap) = opts.max_changed_files {
    if rec.listed_files >= cap {
      return Vec::new();
    }
  }

  let by_path: HashMap<&str, &ChangedFile> =
    pr.changed_file_records().iter().map(|f| (f.path.as_str(), f)).collect();
  let stats = |p: &str| by_path.get(p).map(|f| (f.additions, f.deletions)).unwrap_or((0, 0));

  enriched
    .pairing
    .pairs
    .iter()
    .map(|(prod, test)| {
      let (pa, pd) = stats(prod);
      let (ta, td) = stats(test);
      PairRecord {
        url: rec.url.clone(),
        prid: rec.prid.clone(),
        title: rec.title.clone(),
        title_reason: rec.title_reason.clone(),
        body_reason: rec.body_reason.clone(),
        production_file: prod.clone(),
        test_file: test.clone(),
        test_pairs: rec.test_pairs,
        changed_files: rec.changed_files,
        production_additions: pa,
        production_deletions: pd,
        test_additions: ta,
        test_deletions: td,
      }
    })
    .collect()
}
