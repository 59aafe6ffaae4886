// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Build and write the run manifest summarizing one command invocation
// role: persistence/manifest
// inputs: command name, generated_at, inputs map, output location, Diagnostics, command-specific extras
// outputs: manifest JSON file written at the --summary path
// side_effects: Writes to filesystem
// invariants:
// - generated_at is serialized in %Y-%m-%dT%H:%M:%S (local)
// - diagnostics always carries every counter, zero or not
// errors: IO errors surfaced with full path context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};

use crate::error::Diagnostics;

/// Helper to build and write the manifest for one run.
pub struct RunManifest {
  value: serde_json::Value,
}

impl RunManifest {
  pub fn new(command: &str, generated_at: DateTime<Local>, output: &str) -> Self {
    let v = serde_json::json!({
      "tool": env!("CARGO_PKG_NAME"),
      "version": env!("CARGO_PKG_VERSION"),
      "command": command,
      "generated_at": generated_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
      "inputs": {},
      "output": output,
      "diagnostics": Diagnostics::default(),
    });
    Self { value: v }
  }

  pub fn input(&mut self, key: &str, value: impl Into<serde_json::Value>) -> &mut Self {
    if let Some(inputs) = self.value["inputs"].as_object_mut() {
      inputs.insert(key.to_string(), value.into());
    }
    self
  }

  pub fn diagnostics(&mut self, diag: &Diagnostics) -> Result<&mut Self> {
    self.value["diagnostics"] = serde_json::to_value(diag)?;
    Ok(self)
  }

  /// Command-specific section (`groups`, `projects`, `mining`, ...).
  pub fn extra<T: serde::Serialize>(&mut self, key: &str, value: &T) -> Result<&mut Self> {
    self.value[key] = serde_json::to_value(value)?;
    Ok(self)
  }

  pub fn write_to(&self, path: &Path) -> Result<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
      std::fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    std::fs::write(path, serde_json::to_vec_pretty(&self.value)?)
      .with_context(|| format!("writing manifest {}", path.display()))?;
    Ok(path.to_path_buf())
  }

  #[allow(dead_code)]
  pub fn as_value(&self) -> &serde_json::Value {
    &self.value
  }
}
