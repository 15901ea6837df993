//! Delete the extras of every confirmed class, keeping one survivor each.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::engine::bucket::Bucket;
use crate::engine::tools::is_not_found;
use crate::types::{FileEntry, Hooks};

/// Stage label reported through the notify hook during a purge.
pub const PURGE_LABEL: &str = "purging duplicates";

/// Per class: order by `(index, newest-first mtime, path)`, keep the first
/// entry, delete the rest. The keep choice is a pure function of the class, so
/// it is deterministic regardless of worker scheduling.
///
/// Returns `(deleted, delete_errors)`. Vetoed and vanished files are skipped;
/// the pass never halts on a failure.
pub fn purge_dups(
    root: &Bucket,
    to_trash: bool,
    hooks: &mut Hooks<'_>,
) -> (Vec<PathBuf>, Vec<PathBuf>) {
    let mut deleted = Vec::new();
    let mut failed = Vec::new();

    for leaf in root.leaves() {
        let mut members: Vec<&FileEntry> = leaf.iter().collect();
        members.sort_by(|a, b| {
            a.index
                .cmp(&b.index)
                .then_with(|| b.mtime_ns.cmp(&a.mtime_ns))
                .then_with(|| a.path.cmp(&b.path))
        });
        for entry in &members[1..] {
            if !hooks.allow_delete(&entry.path) {
                continue;
            }
            match remove_path(&entry.path, to_trash, entry.is_symlink) {
                Ok(()) => deleted.push(entry.path.clone()),
                Err(err) => {
                    hooks.report_error(&err, &entry.path);
                    if !is_not_found(&err) {
                        failed.push(entry.path.clone());
                    }
                }
            }
        }
        hooks.progress(PURGE_LABEL, deleted.len());
    }

    (deleted, failed)
}

/// Symlinks are always unlinked in place; everything else honors the trash flag.
fn remove_path(path: &Path, to_trash: bool, is_symlink: bool) -> Result<()> {
    if is_symlink {
        fs::remove_file(path)?;
    } else if to_trash {
        trash::delete(path)?;
    } else if path.is_dir() {
        fs::remove_dir_all(path)?;
    } else {
        fs::remove_file(path)?;
    }
    Ok(())
}
