// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Derive stable identifiers (project, clone URL, pull number, prid) from forge PR URLs
// role: identity/parsing
// outputs: PrIdentity values; prid is the join key between enriched records and mined refactorings
// invariants: prid is file-name safe (owner_repo_number); non-GitHub URLs yield None
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use once_cell::sync::Lazy;
use regex::Regex;

static RE_PULL: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"^https?://github\.com/([^/]+)/([^/]+)/pull/([0-9]+)").expect("pull url regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrIdentity {
  pub owner: String,
  pub repo: String,
  pub number: u64,
}

impl PrIdentity {
  pub fn parse(url: &str) -> Option<Self> {
    let c = RE_PULL.captures(url.trim())?;
    Some(Self {
      owner: c.get(1)?.as_str().to_string(),
      repo: c.get(2)?.as_str().to_string(),
      number: c.get(3)?.as_str().parse().ok()?,
    })
  }

  pub fn project(&self) -> String {
    format!("{}/{}", self.owner, self.repo)
  }

  /// Normalized PR URL without trailing path segments (`/files`, `#issuecomment`, ...).
  pub fn url(&self) -> String {
    format!("https://github.com/{}/{}/pull/{}", self.owner, self.repo, self.number)
  }

  pub fn clone_url(&self) -> String {
    format!("https://github.com/{}/{}.git", self.owner, self.repo)
  }

  pub fn prid(&self) -> String {
    format!("{}_{}_{}", self.owner, self.repo, self.number).replace('/', "_")
  }
}

/// prid for a URL, falling back to a sanitized URL for non-GitHub hosts.
pub fn prid_for_url(url: &str) -> String {
  match PrIdentity::parse(url) {
    Some(id) => id.prid(),
    None => url
      .chars()
      .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '.' { c } else { '_' })
      .collect(),
  }
}

/// Cache-file stem for a project listing page (`owner/name` -> `owner_name[_cursor]`).
///
/// Cursors are base64; they are mapped onto the URL-safe alphabet without
/// padding so the stem stays a single path component.
pub fn page_stem(project: &str, cursor: Option<&str>) -> String {
  let base = project.replace('/', "_");
  match cursor {
    Some(c) => {
      let safe: String = c
        .chars()
        .filter(|ch| *ch != '=')
        .map(|ch| match ch {
          '/' => '_',
          '+' => '-',
          other => other,
        })
        .collect();
      format!("{}_{}", base, safe)
    }
    None => base,
  }
}
