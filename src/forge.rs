// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Harvest pull request listing pages from the GitHub GraphQL API into the on-disk page cache
// role: input/forge
// inputs: owner/name projects; cache directory; env GITHUB_TOKEN / GH_TOKEN; optional `gh` CLI for token fallback
// outputs: One JSON document per page at <cached>/<owner_name[_cursor]>.json; per-project fetch tallies
// side_effects: Network calls to api.github.com; spawns `gh` subprocess when needed; writes cache files; sleeps on rate limits
// invariants:
// - A cached page is reused verbatim and never re-requested
// - Only responses that parse as a listing page are written to the cache
// - A 403 pauses, then abandons the project for this run; other projects continue
// - Token discovery prefers GITHUB_TOKEN, then GH_TOKEN, then `gh auth token`
// errors: Per-project failures are PipelineError::FetchFailed; only cache-dir creation is fatal
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Diagnostics, PipelineError};
use crate::ext::serde_json::JsonFetch;
use crate::identity::page_stem;
use crate::model::PageInfo;
use crate::scan::parse_document;

pub const GRAPHQL_URL: &str = "https://api.github.com/graphql";
pub const DEFAULT_PAGE_SIZE: usize = 100;
pub const MOCK_ENV: &str = "PRT_TEST_PAGES_JSON";

/// Listing query for one page of a repository's pull requests.
pub fn build_query(owner: &str, name: &str, page_size: usize, cursor: Option<&str>) -> String {
  let after = cursor.map(|c| format!(", after: \"{}\"", c)).unwrap_or_default();
  format!(
    r#"{{
  repository(owner: "{owner}", name: "{name}") {{
    pullRequests(first: {page_size}{after}) {{
      pageInfo {{ endCursor hasNextPage }}
      totalCount
      nodes {{
        url number title state id bodyText changedFiles
        files(first: 100) {{ totalCount nodes {{ additions deletions path }} }}
        labels(first: 100) {{ nodes {{ name }} }}
      }}
    }}
  }}
}}"#
  )
}

#[derive(Debug, thiserror::Error)]
pub enum ForgeFailure {
  #[error("rate limited (HTTP 403)")]
  RateLimited,
  #[error("HTTP {0}: {1}")]
  Status(u16, String),
  #[error("transport: {0}")]
  Transport(String),
}

// --- Trait seam for the forge API ---
pub trait ForgeApi {
  /// Raw response body for one listing page.
  fn post_query(&self, project: &str, cursor: Option<&str>, query: &str) -> Result<String, ForgeFailure>;
}

/// Discover a GitHub token: env vars first, then `gh auth token` if available.
pub fn get_github_token() -> Option<String> {
  for key in ["GITHUB_TOKEN", "GH_TOKEN"] {
    if let Ok(t) = std::env::var(key) {
      if !t.trim().is_empty() {
        return Some(t.trim().to_string());
      }
    }
  }

  if let Ok(output) = std::process::Command::new("gh").args(["auth", "token"]).output() {
    if output.status.success() {
      let t = String::from_utf8_lossy(&output.stdout).trim().to_string();

      if !t.is_empty() {
        return Some(t);
      }
    }
  }

  None
}

struct GithubGraphqlApi {
  agent: ureq::Agent,
  token: String,
}

impl GithubGraphqlApi {
  fn new(token: String) -> Self {
    let agent = ureq::AgentBuilder::new().timeout(Duration::from_secs(60)).build();
    Self { agent, token }
  }
}

impl ForgeApi for GithubGraphqlApi {
  fn post_query(&self, _project: &str, _cursor: Option<&str>, query: &str) -> Result<String, ForgeFailure> {
    let resp = self
      .agent
      .post(GRAPHQL_URL)
      .set("Accept", "application/json")
      .set("User-Agent", "pr-testability")
      .set("Authorization", &format!("bearer {}", self.token))
      .send_json(serde_json::json!({ "query": query }));

    match resp {
      Ok(r) => r.into_string().map_err(|e| ForgeFailure::Transport(e.to_string())),
      Err(ureq::Error::Status(403, _)) => Err(ForgeFailure::RateLimited),
      Err(ureq::Error::Status(code, r)) => Err(ForgeFailure::Status(code, r.into_string().unwrap_or_default())),
      Err(e) => Err(ForgeFailure::Transport(e.to_string())),
    }
  }
}

/// Pages served from `PRT_TEST_PAGES_JSON`: an object keyed by `owner/name`
/// (first page) or `owner/name#cursor`; a numeric value is an HTTP status.
struct GithubEnvApi;

impl ForgeApi for GithubEnvApi {
  fn post_query(&self, project: &str, cursor: Option<&str>, _query: &str) -> Result<String, ForgeFailure> {
    let raw = std::env::var(MOCK_ENV).map_err(|e| ForgeFailure::Transport(e.to_string()))?;
    let pages: serde_json::Value = serde_json::from_str(&raw).map_err(|e| ForgeFailure::Transport(e.to_string()))?;
    let key = match cursor {
      Some(c) => format!("{}#{}", project, c),
      None => project.to_string(),
    };
    match pages.get(&key) {
      Some(serde_json::Value::Number(n)) if n.as_u64() == Some(403) => Err(ForgeFailure::RateLimited),
      Some(serde_json::Value::Number(n)) => Err(ForgeFailure::Status(n.as_u64().unwrap_or(0) as u16, String::new())),
      Some(v) => Ok(v.to_string()),
      None => Err(ForgeFailure::Status(404, format!("no mock page for {}", key))),
    }
  }
}

pub fn env_wants_mock() -> bool {
  std::env::var(MOCK_ENV).is_ok()
}

/// Env mock when requested, else the HTTP API when `token` yields one.
pub fn build_api(token: impl FnOnce() -> Option<String>) -> Option<Box<dyn ForgeApi>> {
  if env_wants_mock() {
    return Some(Box::new(GithubEnvApi));
  }
  token().map(|t| Box::new(GithubGraphqlApi::new(t)) as Box<dyn ForgeApi>)
}

#[derive(Debug, Clone)]
pub struct FetchOptions {
  pub cached_dir: PathBuf,
  pub page_size: usize,
  pub rate_limit_pause: Duration,
  /// Pause after every network request.
  pub request_pause: Duration,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct ProjectFetch {
  pub pages: usize,
  pub fetched: usize,
  pub reused: usize,
  pub pull_requests: usize,
}

pub fn page_path(dir: &Path, project: &str, cursor: Option<&str>) -> PathBuf {
  dir.join(format!("{}.json", page_stem(project, cursor)))
}

/// Walk every listing page of `project`, reusing cached pages.
pub fn fetch_project(api: &dyn ForgeApi, project: &str, opts: &FetchOptions) -> Result<ProjectFetch, PipelineError> {
  let fail = |reason: String| PipelineError::FetchFailed { project: project.to_string(), reason };
  let (owner, name) = project.split_once('/').ok_or_else(|| fail("expected owner/name".into()))?;

  let mut out = ProjectFetch::default();
  let mut cursor: Option<String> = None;

  loop {
    let path = page_path(&opts.cached_dir, project, cursor.as_deref());
    let source_name = path.display().to_string();

    let text = if path.is_file() {
      out.reused += 1;
      std::fs::read_to_string(&path).map_err(|e| fail(format!("reading {}: {}", source_name, e)))?
    } else {
      let query = build_query(owner, name, opts.page_size, cursor.as_deref());
      let body = match api.post_query(project, cursor.as_deref(), &query) {
        Ok(b) => b,
        Err(ForgeFailure::RateLimited) => {
          tracing::warn!(project, pause_secs = opts.rate_limit_pause.as_secs(), "rate limited; pausing");
          std::thread::sleep(opts.rate_limit_pause);
          return Err(fail(ForgeFailure::RateLimited.to_string()));
        }
        Err(e) => return Err(fail(e.to_string())),
      };
      if !opts.request_pause.is_zero() {
        std::thread::sleep(opts.request_pause);
      }
      parse_document(&source_name, &body).map_err(|e| fail(e.to_string()))?;
      std::fs::write(&path, &body).map_err(|e| fail(format!("writing {}: {}", source_name, e)))?;
      out.fetched += 1;
      body
    };

    let doc: serde_json::Value = serde_json::from_str(&text).map_err(|e| fail(format!("{}: {}", source_name, e)))?;
    let conn = doc.fetch("data.repository.pullRequests");
    if !conn.is_present() {
      return Err(fail(format!("{}: no pullRequests connection", source_name)));
    }
    out.pages += 1;
    out.pull_requests += doc.fetch("data.repository.pullRequests.nodes").elements().len();
    tracing::debug!(project, page = out.pages, cursor = cursor.as_deref().unwrap_or(""), "listing page");

    let info: PageInfo = doc.fetch("data.repository.pullRequests.pageInfo").to().unwrap_or_default();
    match info.end_cursor {
      Some(next) if info.has_next_page && cursor.as_deref() != Some(next.as_str()) => cursor = Some(next),
      _ => break,
    }
  }

  Ok(out)
}

/// Fetch each project in turn; failures are tallied and the next project proceeds.
pub fn fetch_all(api: &dyn ForgeApi, projects: &[String], opts: &FetchOptions) -> (Vec<(String, ProjectFetch)>, Diagnostics) {
  let mut diag = Diagnostics::default();
  let mut done = Vec::new();
  for project in projects {
    match fetch_project(api, project, opts) {
      Ok(f) => {
        tracing::info!(project = %project, pages = f.pages, fetched = f.fetched, reused = f.reused, pull_requests = f.pull_requests, "fetched project");
        diag.documents_read += f.pages;
        done.push((project.clone(), f));
      }
      Err(e) => diag.record(&e),
    }
  }
  (done, diag)
}
