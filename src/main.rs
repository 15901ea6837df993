//! Dupeseek CLI: find and purge byte-identical duplicate files.

use anyhow::Result;
use clap::Parser;
use dupeseek::engine::arg_parser::Cli;
use dupeseek::engine::cli::handle_run;

fn main() -> Result<()> {
    let cli = Cli::parse();
    handle_run(&cli)
}
