use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::classify::Strategy;
use crate::compare::DEFAULT_MIN_COUNT;
use crate::forge::DEFAULT_PAGE_SIZE;
use crate::mine::{DEFAULT_GOAL, DEFAULT_PROGRAM};
use crate::render::OutputFormat;
use crate::util;

#[derive(Parser, Debug)]
#[command(
    name = "pr-testability",
    version,
    about = "Classify pull requests by testability intent, pair production/test files, and compare refactoring frequencies",
    long_about = None
)]
pub struct Cli {
  #[command(subcommand)]
  pub command: Option<Command>,

  /// Debug-level logging (RUST_LOG overrides)
  #[arg(long, global = true)]
  pub verbose: bool,

  /// Write a JSON run manifest (inputs, output, skipped-unit counts) to this path
  #[arg(long, global = true)]
  pub summary: Option<PathBuf>,

  /// Emit a troff man page to stdout (internal; for packaging)
  #[arg(long, hide = true)]
  pub gen_man: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Harvest pull request listing pages into the cache directory
  Fetch(FetchArgs),
  /// Build the PR dataset from cached listing pages
  Scan(ScanArgs),
  /// Run the refactoring miner for PRs without mined output
  Mine(MineArgs),
  /// Compare refactoring frequencies between PRs with and without test pairs
  Compare(CompareArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ClassifyArgs {
  /// Rule table applied to PR titles
  #[arg(long, value_enum, default_value_t = Strategy::Permissive)]
  pub title_strategy: Strategy,

  /// Rule table applied to PR descriptions
  #[arg(long, value_enum, default_value_t = Strategy::Permissive)]
  pub body_strategy: Strategy,
}

#[derive(Args, Debug)]
pub struct FetchArgs {
  /// Project as owner/name (repeatable)
  #[arg(long = "project")]
  pub projects: Vec<String>,

  /// File with one owner/name per line (`#` comments allowed)
  #[arg(long)]
  pub projects_file: Option<PathBuf>,

  /// Page cache directory (created if missing)
  #[arg(long)]
  pub cached: PathBuf,

  /// Pull requests per listing page (1-100)
  #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
  pub page_size: usize,

  /// Cool-down after a 403 before moving to the next project
  #[arg(long, default_value_t = 120)]
  pub rate_limit_pause_secs: u64,

  /// Pause after every request
  #[arg(long, default_value_t = 500)]
  pub request_pause_ms: u64,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize, ValueEnum, Default)]
#[serde(rename_all = "lowercase")]
#[value(rename_all = "lowercase")]
pub enum View {
  /// One row per pull request
  #[default]
  Pr,
  /// One row per (pull request, production file, test file)
  Pair,
}

#[derive(Args, Debug)]
pub struct ScanArgs {
  /// Page cache directory
  #[arg(long)]
  pub cached: PathBuf,

  #[arg(long, value_enum, default_value_t = View::Pr)]
  pub view: View,

  #[command(flatten)]
  pub classify: ClassifyArgs,

  /// Pair view only: skip PRs listing this many files or more
  #[arg(long)]
  pub max_changed_files: Option<usize>,

  #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
  pub format: OutputFormat,

  /// Output file (default stdout "-")
  #[arg(long, default_value = "-")]
  pub out: String,
}

#[derive(Args, Debug)]
pub struct MineArgs {
  /// Page cache directory
  #[arg(long)]
  pub cached: PathBuf,

  /// Directory receiving <prid>.csv miner output (created if missing)
  #[arg(long)]
  pub mined: PathBuf,

  #[command(flatten)]
  pub classify: ClassifyArgs,

  /// Only mine PRs whose title or description is testability-related
  #[arg(long)]
  pub relevant_only: bool,

  /// Print the planned commands without running them
  #[arg(long)]
  pub dry_run: bool,

  #[arg(long, default_value = DEFAULT_PROGRAM)]
  pub program: String,

  #[arg(long, default_value = DEFAULT_GOAL)]
  pub goal: String,

  /// Pause after a failed invocation
  #[arg(long, default_value_t = 0)]
  pub failure_pause_secs: u64,
}

#[derive(Args, Debug)]
pub struct CompareArgs {
  /// Page cache directory
  #[arg(long)]
  pub cached: PathBuf,

  /// Directory of <prid>.csv miner output
  #[arg(long)]
  pub mined: PathBuf,

  /// Rows where either group has fewer occurrences are dropped
  #[arg(long, default_value_t = DEFAULT_MIN_COUNT)]
  pub min_count: u64,

  /// Keep refactorings of test classes
  #[arg(long)]
  pub keep_test_classes: bool,

  /// Refactoring type to exclude (repeatable; replaces the default)
  #[arg(long = "exclude-type", default_values = ["ADD_CONSTRUCTOR_PARAMETER"])]
  pub exclude_types: Vec<String>,

  /// Exclude no refactoring types
  #[arg(long, conflicts_with = "exclude_types")]
  pub keep_all_types: bool,

  /// Keep commits touching more classes than the PR changed source files
  #[arg(long)]
  pub keep_large_commits: bool,

  #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
  pub format: OutputFormat,

  /// Output file (default stdout "-")
  #[arg(long, default_value = "-")]
  pub out: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum Action {
  Fetch {
    projects: Vec<String>,
    cached: String,
    page_size: usize,
    rate_limit_pause_secs: u64,
    request_pause_ms: u64,
  },
  Scan {
    cached: String,
    view: View,
    title_strategy: Strategy,
    body_strategy: Strategy,
    max_changed_files: Option<usize>,
    format: OutputFormat,
    out: String,
  },
  Mine {
    cached: String,
    mined: String,
    title_strategy: Strategy,
    body_strategy: Strategy,
    relevant_only: bool,
    dry_run: bool,
    program: String,
    goal: String,
    failure_pause_secs: u64,
  },
  Compare {
    cached: String,
    mined: String,
    min_count: u64,
    exclude_test_classes: bool,
    excluded_types: Vec<String>,
    exclude_large_commits: bool,
    format: OutputFormat,
    out: String,
  },
}

impl Action {
  pub fn name(&self) -> &'static str {
    match self {
      Action::Fetch { .. } => "fetch",
      Action::Scan { .. } => "scan",
      Action::Mine { .. } => "mine",
      Action::Compare { .. } => "compare",
    }
  }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EffectiveConfig {
  pub verbose: bool,
  pub summary: Option<String>,
  pub action: Action,
}

fn existing_dir(flag: &str, p: &Path) -> Result<String> {
  if !p.is_dir() {
    bail!("{} {} is not a directory", flag, p.display());
  }
  Ok(util::canonicalize_lossy(p))
}

fn normalize_fetch(a: FetchArgs) -> Result<Action> {
  let mut projects = a.projects;
  if let Some(file) = &a.projects_file {
    projects.extend(util::read_projects(file)?);
  }
  let projects = util::dedup_ordered(projects.into_iter().map(|p| p.trim().to_string()));
  if projects.is_empty() {
    bail!("Provide at least one --project or a --projects-file");
  }
  if let Some(bad) = projects.iter().find(|p| !util::is_project_name(p)) {
    bail!("Invalid project {:?}: expected owner/name", bad);
  }
  if a.page_size == 0 || a.page_size > 100 {
    bail!("--page-size must be between 1 and 100 (got {})", a.page_size);
  }
  util::ensure_dir(&a.cached)?;

  Ok(Action::Fetch {
    projects,
    cached: util::canonicalize_lossy(&a.cached),
    page_size: a.page_size,
    rate_limit_pause_secs: a.rate_limit_pause_secs,
    request_pause_ms: a.request_pause_ms,
  })
}

fn normalize_scan(a: ScanArgs) -> Result<Action> {
  if a.format == OutputFormat::Latex {
    bail!("--format latex is only available for compare");
  }
  if a.max_changed_files.is_some() && a.view != View::Pair {
    bail!("--max-changed-files only applies to --view pair");
  }
  Ok(Action::Scan {
    cached: existing_dir("--cached", &a.cached)?,
    view: a.view,
    title_strategy: a.classify.title_strategy,
    body_strategy: a.classify.body_strategy,
    max_changed_files: a.max_changed_files,
    format: a.format,
    out: a.out,
  })
}

fn normalize_mine(a: MineArgs) -> Result<Action> {
  if a.program.trim().is_empty() {
    bail!("--program must not be empty");
  }
  Ok(Action::Mine {
    cached: existing_dir("--cached", &a.cached)?,
    mined: util::canonicalize_lossy(&a.mined),
    title_strategy: a.classify.title_strategy,
    body_strategy: a.classify.body_strategy,
    relevant_only: a.relevant_only,
    dry_run: a.dry_run,
    program: a.program,
    goal: a.goal,
    failure_pause_secs: a.failure_pause_secs,
  })
}

fn normalize_compare(a: CompareArgs) -> Result<Action> {
  let excluded_types = if a.keep_all_types { Vec::new() } else { util::dedup_ordered(a.exclude_types) };
  Ok(Action::Compare {
    cached: existing_dir("--cached", &a.cached)?,
    mined: existing_dir("--mined", &a.mined)?,
    min_count: a.min_count,
    exclude_test_classes: !a.keep_test_classes,
    excluded_types,
    exclude_large_commits: !a.keep_large_commits,
    format: a.format,
    out: a.out,
  })
}

pub fn normalize(cli: Cli) -> Result<EffectiveConfig> {
  let action = match cli.command {
    Some(Command::Fetch(a)) => normalize_fetch(a)?,
    Some(Command::Scan(a)) => normalize_scan(a)?,
    Some(Command::Mine(a)) => normalize_mine(a)?,
    Some(Command::Compare(a)) => normalize_compare(a)?,
    None => bail!("Provide a subcommand: fetch | scan | mine | compare"),
  };

  Ok(EffectiveConfig {
    verbose: cli.verbose,
    summary: cli.summary.as_deref().map(util::canonicalize_lossy),
    action,
  })
}
