//! CLI command handler: find duplicates; --purge deletes the extras of each class.

use anyhow::Result;
use colored::Colorize;
use log::warn;
use std::io::Write;
use std::path::Path;

use crate::engine::arg_parser::Cli;
use crate::engine::progress::StageBars;
use crate::types::{FindOpts, Hooks, ResultSet};
use crate::utils::dupeseek_toml::{apply_file_to_opts, load_dupeseek_toml};
use crate::utils::setup_logging;
use crate::{find_with_hooks, purge_with_hooks};

/// Turn an opts flag on only when the user passed the CLI flag.
macro_rules! enable_opt {
    ($cli:expr, $opts:expr, $flag:ident => $field:ident) => {
        if $cli.$flag {
            $opts.$field = true;
        }
    };
}

/// Turn an opts flag off only when the user passed the CLI flag.
macro_rules! disable_opt {
    ($cli:expr, $opts:expr, $flag:ident => $field:ident) => {
        if $cli.$flag {
            $opts.$field = false;
        }
    };
}

/// Setup options: load .dupeseek.toml into opts, then overwrite with CLI only
/// when the user passed a flag.
fn setup_opts(cli: &Cli) -> FindOpts {
    let mut opts = FindOpts {
        recursive: false,
        ..FindOpts::default()
    };
    if let Ok(cwd) = std::env::current_dir()
        && let Some(file) = load_dupeseek_toml(&cwd)
    {
        apply_file_to_opts(&file, &mut opts);
    }
    if let Some(v) = cli.min_size {
        opts.min_size = v;
    }
    if let Some(v) = cli.max_size {
        opts.max_size = v;
    }
    if !cli.include.is_empty() {
        opts.include = cli.include.clone();
    }
    if !cli.exclude.is_empty() {
        opts.exclude = cli.exclude.clone();
    }
    enable_opt!(cli, opts, compare_name => compare_name);
    enable_opt!(cli, opts, compare_mtime => compare_mtime);
    enable_opt!(cli, opts, compare_mode => compare_mode);
    enable_opt!(cli, opts, recursive => recursive);
    enable_opt!(cli, opts, follow_links => follow_links);
    enable_opt!(cli, opts, scan_links => scan_links);
    enable_opt!(cli, opts, scan_empties => scan_empties);
    disable_opt!(cli, opts, ignore_system => scan_system);
    disable_opt!(cli, opts, ignore_archived => scan_archived);
    disable_opt!(cli, opts, ignore_hidden => scan_hidden);
    opts
}

/// Run find (default) or purge when --purge. Exit is nonzero only on a
/// configuration error; per-file failures are reported in the summary.
pub fn handle_run(cli: &Cli) -> Result<()> {
    setup_logging(cli.verbose);
    let opts = setup_opts(cli);
    let mut bars = StageBars::new(cli.verbose && !cli.json);
    let result = {
        let mut on_error = |err: &anyhow::Error, path: &Path| warn!("{}: {}", path.display(), err);
        let mut notify = |label: &'static str, n: usize| bars.observe(label, n);
        let mut hooks = Hooks {
            on_error: Some(&mut on_error),
            on_delete: None,
            notify: Some(&mut notify),
        };
        if cli.purge {
            purge_with_hooks(&cli.paths, &opts, !cli.no_trash, &mut hooks)?
        } else {
            find_with_hooks(&cli.paths, &opts, &mut hooks)?
        }
    };
    bars.finish();
    print_result(&result, cli.json)
}

fn print_result(result: &ResultSet, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }
    {
        let mut out = std::io::stdout().lock();
        for class in &result.dups {
            for path in class {
                writeln!(out, "{}", path.display())?;
            }
            writeln!(out)?;
        }
    }
    let extras: usize = result.dups.iter().map(|class| class.len() - 1).sum();
    log::info!(
        "{} | {} | {}",
        format!("Classes: {}", result.dups.len()).green(),
        format!("Extras: {}", extras).yellow(),
        format!("Deleted: {}", result.deleted.len()).red()
    );
    let issues =
        result.scan_errors.len() + result.probe_errors.len() + result.delete_errors.len();
    if issues > 0 {
        warn!(
            "{} paths could not be processed (scan {}, probe {}, delete {})",
            issues,
            result.scan_errors.len(),
            result.probe_errors.len(),
            result.delete_errors.len()
        );
    }
    Ok(())
}
