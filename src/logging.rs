//! stderr logging. Stdout carries data output only.

use anyhow::Result;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// `RUST_LOG` wins; otherwise `info`, or `debug` with `--verbose`.
pub fn filter(verbose: bool) -> EnvFilter {
  let default = if verbose { "debug" } else { "info" };
  EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

pub fn init(verbose: bool) -> Result<()> {
  let subscriber = tracing_subscriber::registry().with(filter(verbose)).with(
    fmt::layer()
      .with_writer(std::io::stderr)
      .with_ansi(false)
      .with_target(false)
      .compact(),
  );

  tracing::subscriber::set_global_default(subscriber)
    .map_err(|e| anyhow::anyhow!("Failed to set global subscriber: {}", e))?;

  Ok(())
}
