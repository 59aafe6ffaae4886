// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Tag PR titles and descriptions as testability-related using ordered keyword rule tables
// role: classification/heuristics
// inputs: Optional free text (title or body)
// outputs: RelevanceResult (relevant flag + reason tag)
// invariants:
// - Rules are evaluated in table order; the first matching rule decides
// - Case-sensitive markers are checked against the raw text, all other rules against lowercase text
// - Absent text yields the strategy's fallback result
// errors: None (pure)
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::model::RelevanceResult;

const TEST_WORDS: &[&str] = &["test", "junit"];

/// How the reason tag of a matching rule is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
  Fixed(&'static str),
  /// The keyword that matched.
  Matched,
  /// A prefix followed by the keyword that matched.
  Prefixed(&'static str),
}

/// A single keyword rule.
///
/// When `guard` is non-empty the text must contain at least one guard keyword
/// before `keywords` are considered. The first entry of `keywords` (in table
/// order) found in the text is the match.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
  pub name: &'static str,
  pub case_sensitive: bool,
  pub guard: &'static [&'static str],
  pub keywords: &'static [&'static str],
  pub relevant: bool,
  pub tag: Tag,
}

impl Rule {
  const fn any(name: &'static str, keywords: &'static [&'static str], tag: Tag) -> Self {
    Self { name, case_sensitive: false, guard: &[], keywords, relevant: true, tag }
  }

  const fn with_test(name: &'static str, guard: &'static [&'static str], tag: Tag) -> Self {
    Self { name, case_sensitive: false, guard, keywords: TEST_WORDS, relevant: true, tag }
  }

  const fn marker(name: &'static str, marker: &'static [&'static str], relevant: bool) -> Self {
    Self { name, case_sensitive: true, guard: &[], keywords: marker, relevant, tag: Tag::Matched }
  }

  /// Returns the result of this rule if it fires. `lowered` must be `raw.to_lowercase()`.
  pub fn apply(&self, raw: &str, lowered: &str) -> Option<RelevanceResult> {
    let text = if self.case_sensitive { raw } else { lowered };
    if !self.guard.is_empty() && !self.guard.iter().any(|g| text.contains(g)) {
      return None;
    }
    let hit = self.keywords.iter().find(|k| text.contains(*k))?;
    let reason = match self.tag {
      Tag::Fixed(s) => s.to_string(),
      Tag::Matched => hit.to_string(),
      Tag::Prefixed(p) => format!("{}{}", p, hit),
    };
    Some(RelevanceResult { relevant: self.relevant, reason: Some(reason) })
  }
}

/// Permissive table: explicit annotations first, then phrase matches, then verb + test word.
pub const PERMISSIVE_RULES: &[Rule] = &[
  Rule::marker("not-testable-marker", &["@Testable"], false),
  Rule::marker("visible-for-testing", &["VisibleForTesting"], true),
  Rule::any(
    "testability-phrase",
    &["testability", "testable", "easier to test", "simplify testing", "cover"],
    Tag::Matched,
  ),
  Rule::with_test("refactor", &["refactor"], Tag::Prefixed("refactor_")),
  Rule::with_test("add", &["add"], Tag::Prefixed("add_")),
  Rule::with_test("fix", &["fix"], Tag::Prefixed("fix_")),
  Rule::any("test-word", TEST_WORDS, Tag::Matched),
];

/// Strict table: categorical tags, most rules need a test word alongside the topic keyword.
pub const STRICT_RULES: &[Rule] = &[
  Rule::any("m1-testability", &["testabilit", "testable"], Tag::Fixed("testability")),
  Rule::with_test("m2-easier", &["simpl", "visibl", "eas"], Tag::Fixed("Easier to test")),
  Rule::with_test("m3-refactor", &["refactor"], Tag::Fixed("Refactor for test")),
  Rule::with_test("m4-dependency", &["depend"], Tag::Fixed("Dependency")),
  Rule::with_test("m5-concurrency", &["concurren", "thread", "sleep", "latch"], Tag::Fixed("Concurrency")),
  Rule::with_test("m6-singleton", &["singleton"], Tag::Fixed("Singleton")),
  Rule::with_test("m7-injection", &["inject", "wire", "wiring"], Tag::Fixed("Injection")),
  Rule::with_test("m8-network", &["network", "socket", "connectivity", "connection"], Tag::Fixed("Network")),
  Rule::any("fix", &["fix"], Tag::Fixed("Fix")),
  Rule::any("test", &["test"], Tag::Fixed("test")),
];

#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize, ValueEnum, Default)]
#[serde(rename_all = "lowercase")]
#[value(rename_all = "lowercase")]
pub enum Strategy {
  /// First-match keyword table; reason is the matched keyword.
  #[default]
  Permissive,
  /// Conjunctive table with categorical reasons.
  Strict,
}

impl Strategy {
  pub fn rules(self) -> &'static [Rule] {
    match self {
      Strategy::Permissive => PERMISSIVE_RULES,
      Strategy::Strict => STRICT_RULES,
    }
  }

  /// Result when the text is absent or no rule fires.
  pub fn fallback(self) -> RelevanceResult {
    match self {
      Strategy::Permissive => RelevanceResult::new(false, None),
      Strategy::Strict => RelevanceResult::new(false, Some("other")),
    }
  }

  pub fn classify(self, text: Option<&str>) -> RelevanceResult {
    let Some(raw) = text else {
      return self.fallback();
    };
    let lowered = raw.to_lowercase();
    self
      .rules()
      .iter()
      .find_map(|rule| rule.apply(raw, &lowered))
      .unwrap_or_else(|| self.fallback())
  }
}
