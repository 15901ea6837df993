//! Logging setup. Findings go to stdout; everything here goes to stderr so
//! piped output stays clean: bare info lines for the run summary, colored
//! `warning:`/`error:` prefixes for per-file failures reported through the
//! on_error hook, and dimmed module-tagged lines at debug level.

use colored::Colorize;
use env_logger::Builder;
use log::{Level, LevelFilter};
use std::io::Write;

pub fn setup_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    Builder::from_default_env()
        .filter_level(LevelFilter::Warn) // dependencies: warnings only
        .filter_module(env!("CARGO_PKG_NAME"), level)
        .format(|buf, record| {
            let prog = env!("CARGO_PKG_NAME");
            match record.level() {
                Level::Error => {
                    writeln!(buf, "{prog}: {} {}", "error:".red().bold(), record.args())
                }
                Level::Warn => writeln!(
                    buf,
                    "{prog}: {} {}",
                    "warning:".yellow().bold(),
                    record.args()
                ),
                Level::Info => writeln!(buf, "{prog}: {}", record.args()),
                Level::Debug | Level::Trace => writeln!(
                    buf,
                    "{}",
                    format!("{prog}[{}]: {}", record.target(), record.args()).dimmed()
                ),
            }
        })
        .init();
}
