//! Dupeseek: multi-stage duplicate file finder.
//!
//! Candidates are partitioned by `(file-type, size)`, then progressively split
//! by cheap-to-expensive discriminators: optional attribute refiners, a
//! head/tail signature, mid-file side-sums for very large files, a streaming
//! whole-file sum, and a final byte-for-byte compare. Singletons are pruned
//! after every stage, so each stage only reads survivors of the previous one.

pub mod blockdev;
pub mod engine;
pub mod fsattr;
pub mod pipeline;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

use anyhow::{Result, bail};
use std::path::PathBuf;

use crate::blockdev::DeviceCache;
use crate::engine::bucket::Bucket;
use crate::engine::{filter_dups, purge_dups, shape_results};

/// Find duplicate classes under `paths`.
///
/// The only fatal errors are configuration errors (empty `paths`, unbuildable
/// wildcard patterns); per-file failures land in the result's error lists.
pub fn find(paths: &[PathBuf], opts: &FindOpts) -> Result<ResultSet> {
    find_with_hooks(paths, opts, &mut Hooks::default())
}

/// [`find`] with observation hooks.
pub fn find_with_hooks(
    paths: &[PathBuf],
    opts: &FindOpts,
    hooks: &mut Hooks<'_>,
) -> Result<ResultSet> {
    let (root, scan_errors) = run_refinement(paths, opts, hooks)?;
    Ok(finalize(&root, scan_errors, Vec::new(), Vec::new(), hooks))
}

/// Find duplicates, then delete the extras of each class. With `to_trash`,
/// files go to the platform trash; otherwise they are removed permanently.
/// Deleted files stay listed in their class; see [`ResultSet::deleted`].
pub fn purge(paths: &[PathBuf], opts: &FindOpts, to_trash: bool) -> Result<ResultSet> {
    purge_with_hooks(paths, opts, to_trash, &mut Hooks::default())
}

/// [`purge`] with observation hooks; `on_delete` can veto individual files.
pub fn purge_with_hooks(
    paths: &[PathBuf],
    opts: &FindOpts,
    to_trash: bool,
    hooks: &mut Hooks<'_>,
) -> Result<ResultSet> {
    let (root, scan_errors) = run_refinement(paths, opts, hooks)?;
    let (deleted, delete_errors) = purge_dups(&root, to_trash, hooks);
    Ok(finalize(&root, scan_errors, deleted, delete_errors, hooks))
}

/// Enumerate, partition, refine. The device cache is held across the four I/O
/// stages and released (with opportunistic eviction) when they finish; probes
/// inside each leaf run on a worker pool capped by CPU count and FD limit.
fn run_refinement(
    paths: &[PathBuf],
    opts: &FindOpts,
    hooks: &mut Hooks<'_>,
) -> Result<(Bucket, Vec<PathBuf>)> {
    if paths.is_empty() {
        bail!("paths must not be empty");
    }
    let roots: Vec<PathBuf> = paths.iter().map(|p| engine::fullpath(p)).collect();
    let (mut root, scan_errors) = pipeline::scan_dups(roots, opts, hooks)?;

    let cache = DeviceCache::new();
    if opts.compare_mode {
        filter_dups(FilterKind::Mode, &mut root, &cache, hooks);
    }
    if opts.compare_mtime {
        filter_dups(FilterKind::Mtime, &mut root, &cache, hooks);
    }
    if opts.compare_name {
        filter_dups(FilterKind::Name, &mut root, &cache, hooks);
    }

    let pool = utils::worker_pool()?;
    {
        let _hold = cache.hold();
        pool.install(|| {
            filter_dups(FilterKind::Signature, &mut root, &cache, hooks);
            filter_dups(FilterKind::Rule, &mut root, &cache, hooks);
            filter_dups(FilterKind::Hash, &mut root, &cache, hooks);
            filter_dups(FilterKind::Binary, &mut root, &cache, hooks);
        });
    }
    Ok((root, scan_errors))
}

fn finalize(
    root: &Bucket,
    scan_errors: Vec<PathBuf>,
    deleted: Vec<PathBuf>,
    delete_errors: Vec<PathBuf>,
    hooks: &mut Hooks<'_>,
) -> ResultSet {
    hooks.progress("finalizing results", 0);
    let (dups, probe_errors) = shape_results(root);
    ResultSet {
        dups,
        deleted,
        scan_errors,
        probe_errors,
        delete_errors,
    }
}
