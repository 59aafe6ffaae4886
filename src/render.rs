// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Serialize dataset rows and comparison tables as CSV, JSON or LaTeX and write them to a file or stdout
// role: output/render
// inputs: Serializable rows; Comparison; OutputFormat; destination ("-" = stdout)
// outputs: Bytes written to the destination
// side_effects: Writes files / stdout; creates parent directories
// invariants: CSV headers follow struct field order; LaTeX numbers are rounded to two decimals
// errors: IO and serialization errors bubble with the destination path as context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::compare::Comparison;
use crate::model::AggregateRow;
use crate::stats::round_to;

#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize, ValueEnum, Default)]
#[serde(rename_all = "lowercase")]
#[value(rename_all = "lowercase")]
pub enum OutputFormat {
  #[default]
  Csv,
  Json,
  Latex,
}

pub fn rows_to_csv<T: Serialize>(rows: &[T]) -> Result<Vec<u8>> {
  let mut w = csv::Writer::from_writer(Vec::new());
  for r in rows {
    w.serialize(r)?;
  }
  w.into_inner().map_err(|e| anyhow::anyhow!("flushing csv: {}", e))
}

/// `EXTRACT_METHOD` -> `Extract Method`.
pub fn as_title(refactoring_type: &str) -> String {
  refactoring_type
    .split('_')
    .filter(|w| !w.is_empty())
    .map(|w| {
      let lower = w.to_lowercase();
      let mut cs = lower.chars();
      match cs.next() {
        Some(first) => first.to_uppercase().chain(cs).collect::<String>(),
        None => String::new(),
      }
    })
    .collect::<Vec<_>>()
    .join(" ")
}

/// Title with a significance marker: ` *` below 0.05 (or undefined), ` +` at 0.5 and above.
pub fn title_with_significance(row: &AggregateRow) -> String {
  let marker = match row.p_value {
    None => " *",
    Some(p) if p < 0.05 => " *",
    Some(p) if p >= 0.5 => " +",
    Some(_) => "",
  };
  format!("{}{}", as_title(&row.refactoring_type), marker)
}

fn latex_escape(s: &str) -> String {
  s.replace('\\', "\\textbackslash{}").replace('_', "\\_").replace('&', "\\&").replace('%', "\\%").replace('#', "\\#")
}

fn num2(v: f64) -> String {
  format!("{:.2}", round_to(v, 2))
}

/// A bordered `tabular` with one line per refactoring type.
pub fn comparison_to_latex(cmp: &Comparison) -> String {
  let header = [
    "Refactoring",
    "Without pairs",
    "With pairs",
    "Count without",
    "Count with",
    "Ratio",
    "p",
  ];
  let cols = format!("|l|{}", "r|".repeat(header.len() - 1));
  let mut out = String::new();
  out.push_str(&format!("\\begin{{tabular}}{{{}}}\n\\hline\n", cols));
  out.push_str(&header.join(" & "));
  out.push_str(" \\\\\n\\hline\n");
  for r in &cmp.rows {
    let p = r.p_value.map(num2).unwrap_or_else(|| "--".into());
    out.push_str(&format!(
      "{} & {} & {} & {} & {} & {} & {} \\\\\n",
      latex_escape(&title_with_significance(r)),
      num2(r.mean_without_pairs),
      num2(r.mean_with_pairs),
      r.count_without_pairs,
      r.count_with_pairs,
      num2(r.ratio),
      p
    ));
  }
  out.push_str("\\hline\n\\end{tabular}\n");
  out
}

pub fn comparison_to_json(cmp: &Comparison) -> Result<Vec<u8>> {
  let v = serde_json::json!({
    "groups": cmp.groups,
    "rows": cmp.rows,
  });
  Ok(serde_json::to_vec_pretty(&v)?)
}

pub fn render_comparison(cmp: &Comparison, format: OutputFormat) -> Result<Vec<u8>> {
  match format {
    OutputFormat::Csv => rows_to_csv(&cmp.rows),
    OutputFormat::Json => comparison_to_json(cmp),
    OutputFormat::Latex => Ok(comparison_to_latex(cmp).into_bytes()),
  }
}

pub fn render_rows<T: Serialize>(rows: &[T], format: OutputFormat) -> Result<Vec<u8>> {
  match format {
    OutputFormat::Csv => rows_to_csv(rows),
    OutputFormat::Json => Ok(serde_json::to_vec_pretty(rows)?),
    OutputFormat::Latex => anyhow::bail!("latex output is only available for comparison tables"),
  }
}

/// Write to `out`, or stdout when `out` is "-".
pub fn write_output(out: &str, bytes: &[u8]) -> Result<()> {
  if out == "-" {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(bytes)?;
    stdout.flush()?;
    return Ok(());
  }
  let path = Path::new(out);
  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
  }
  std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))
}
