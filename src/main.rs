use anyhow::Result;
use clap::Parser;

mod classify;
mod cli;
mod compare;
mod enrich;
mod error;
mod ext;
mod forge;
mod identity;
mod logging;
mod manifest;
mod mine;
mod mined;
mod model;
mod pairing;
mod pipeline;
mod render;
mod scan;
mod stats;
mod util;

use crate::cli::{Cli, normalize};

fn main() -> Result<()> {
  let cli = Cli::parse();

  if cli.gen_man {
    let page = util::render_man_page::<Cli>()?;
    print!("{}", page);
    return Ok(());
  }

  // Phase 1: normalize CLI
  let cfg = normalize(cli)?;

  // Phase 2: logging to stderr
  logging::init(cfg.verbose)?;
  tracing::debug!(config = ?cfg, "effective config");

  // Phase 3: run the subcommand
  pipeline::run(&cfg)
}
