// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Utilities for paths, subprocesses, project lists, and man page rendering
// role: utilities/helpers
// inputs: Paths; program + args; clap CommandFactory
// outputs: Canonicalized paths, command output, project names, man page text
// side_effects: run_command invokes subprocesses; ensure_dir creates directories
// invariants:
// - read_projects ignores blank lines and `#` comments and keeps first-seen order without duplicates
// - canonicalize_lossy never fails; unresolvable paths are joined onto the cwd
// errors: run_command surfaces command + stderr; IO errors bubble with context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use clap::CommandFactory;

pub fn canonicalize_lossy<P: AsRef<Path>>(p: P) -> String {
  let p = p.as_ref();
  let pb: PathBuf = match std::fs::canonicalize(p) {
    Ok(x) => x,
    Err(_) => match std::env::current_dir() {
      Ok(cwd) => cwd.join(p),
      Err(_) => PathBuf::from(p),
    },
  };
  pb.to_string_lossy().to_string()
}

pub fn ensure_dir(dir: &Path) -> Result<()> {
  std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))
}

/// Run `program args...` to completion; stdout on success, an error naming the command otherwise.
pub fn run_command(program: &str, args: &[String]) -> Result<String> {
  let out = Command::new(program)
    .args(args)
    .output()
    .with_context(|| format!("spawning {} {:?}", program, args))?;

  if out.status.success() {
    Ok(String::from_utf8_lossy(&out.stdout).to_string())
  } else {
    let stderr = String::from_utf8_lossy(&out.stderr);
    anyhow::bail!("{} {:?} failed ({}): {}", program, args, out.status, stderr.trim())
  }
}

/// `owner/name` entries from a projects file, one per line.
pub fn read_projects(path: &Path) -> Result<Vec<String>> {
  let text = std::fs::read_to_string(path).with_context(|| format!("reading projects file {}", path.display()))?;
  Ok(dedup_ordered(
    text
      .lines()
      .map(str::trim)
      .filter(|l| !l.is_empty() && !l.starts_with('#'))
      .map(str::to_string),
  ))
}

pub fn dedup_ordered<I: IntoIterator<Item = String>>(items: I) -> Vec<String> {
  let mut seen = std::collections::HashSet::new();
  items.into_iter().filter(|p| seen.insert(p.clone())).collect()
}

pub fn is_project_name(s: &str) -> bool {
  let mut parts = s.split('/');
  matches!(
    (parts.next(), parts.next(), parts.next()),
    (Some(o), Some(n), None) if !o.is_empty() && !n.is_empty()
  )
}

/// Render a section-1 man page for a clap `CommandFactory` implementor.
/// Returns the troff content as a UTF-8 string.
pub fn render_man_page<T: CommandFactory>() -> anyhow::Result<String> {
  let cmd = T::command();
  let man = clap_mangen::Man::new(cmd);
  let mut buf: Vec<u8> = Vec::new();

  man.render(&mut buf)?;

  Ok(String::from_utf8_lossy(&buf).to_string())
}
