//! Enumerator and admission: classify roots, walk, admit, partition by the
//! identity key.

pub mod admission;
pub mod context;
pub mod walk;

pub use admission::AdmissionMatcher;
pub use context::{ScanContext, ScanOutcome};
pub use walk::{SplitPaths, spawn_scan_thread, split_paths};

use anyhow::Result;
use std::path::PathBuf;

use crate::engine::bucket::{Bucket, GroupBuilder};
use crate::types::{BucketKey, FilterKind, FindOpts, Hooks};

/// Drain the scan thread into the identity partition. Returns the root bucket
/// (singleton size classes already pruned) and the scan-error list.
pub fn scan_dups(
    roots: Vec<PathBuf>,
    opts: &FindOpts,
    hooks: &mut Hooks<'_>,
) -> Result<(Bucket, Vec<PathBuf>)> {
    let matcher = AdmissionMatcher::new(&opts.include, &opts.exclude)?;
    let (tx, rx) = context::create_scan_channel();
    let ctx = ScanContext {
        roots,
        opts: opts.clone(),
        matcher,
    };
    let handle = spawn_scan_thread(tx, ctx);

    let mut builder = GroupBuilder::new(FilterKind::Ident);
    let mut scan_errors = Vec::new();
    let mut received = 0_usize;
    while let Ok(outcome) = rx.recv() {
        match outcome {
            ScanOutcome::Entry(entry) => {
                received += 1;
                hooks.progress(FilterKind::Ident.label(), received);
                let (ifmt, size) = entry.id_key();
                builder.push(BucketKey::Ident(ifmt, size), entry);
            }
            ScanOutcome::Error { msg, path } => {
                hooks.report_error(&anyhow::anyhow!(msg), &path);
                scan_errors.push(path);
            }
        }
    }
    handle
        .join()
        .map_err(|_| anyhow::anyhow!("scan thread panicked"))?;
    Ok((builder.finish(), scan_errors))
}
