//! Path classification and the recursive walk loop. The walk runs on one
//! dedicated thread so enumeration order, and therefore every entry index, is
//! single-threaded and stable before any refinement begins.

use crossbeam_channel::Sender;
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use walkdir::WalkDir;

use crate::pipeline::admission;
use crate::pipeline::context::{ScanContext, ScanOutcome};
use crate::types::FileEntry;

/// User-supplied roots classified before scanning.
#[derive(Default)]
pub struct SplitPaths {
    pub dirs: Vec<PathBuf>,
    pub files: Vec<PathBuf>,
    pub links: Vec<PathBuf>,
    pub others: Vec<PathBuf>,
    pub missing: Vec<(PathBuf, String)>,
}

/// Classify roots into directories, regular files, symlinks-to-files, other
/// node types, and unreachable paths. A symlink to a directory counts as a
/// directory only when links are followed; otherwise it is dropped. Exact
/// duplicate roots keep their first position.
pub fn split_paths(paths: &[PathBuf], follow_links: bool) -> SplitPaths {
    let mut out = SplitPaths::default();
    let mut seen = HashSet::new();
    for path in paths {
        if !seen.insert(path.clone()) {
            continue;
        }
        let meta = match fs::symlink_metadata(path) {
            Ok(meta) => meta,
            Err(err) => {
                out.missing.push((path.clone(), err.to_string()));
                continue;
            }
        };
        let ft = meta.file_type();
        if ft.is_dir() {
            out.dirs.push(path.clone());
        } else if ft.is_file() {
            out.files.push(path.clone());
        } else if ft.is_symlink() {
            match fs::metadata(path) {
                Ok(target) if target.is_file() => out.links.push(path.clone()),
                Ok(target) if target.is_dir() => {
                    if follow_links {
                        out.dirs.push(path.clone());
                    }
                }
                Ok(_) => out.others.push(path.clone()),
                Err(err) => out.missing.push((path.clone(), err.to_string())),
            }
        } else {
            out.others.push(path.clone());
        }
    }
    out
}

pub fn spawn_scan_thread(tx: Sender<ScanOutcome>, ctx: ScanContext) -> JoinHandle<()> {
    thread::spawn(move || run_scan(tx, ctx))
}

/// Explicit files first (in input order), then recursive directory walks.
/// Every send checks the channel so a dropped receiver stops the walk.
fn run_scan(tx: Sender<ScanOutcome>, ctx: ScanContext) {
    let mut counter = 0_u64;
    let split = split_paths(&ctx.roots, ctx.opts.follow_links);

    for (path, msg) in split.missing {
        if tx.send(ScanOutcome::Error { msg, path }).is_err() {
            return;
        }
    }

    let mut candidates = split.files;
    if ctx.opts.scan_links {
        candidates.extend(split.links);
    }
    for path in &candidates {
        if !admit_file(&mut counter, path, &ctx, &tx) {
            return;
        }
    }

    if !ctx.opts.recursive {
        return;
    }
    let mut seen = HashSet::new();
    for dir in &split.dirs {
        if !walk_root(dir, &mut seen, &mut counter, &ctx, &tx) {
            return;
        }
    }
}

/// Stat one candidate, assign its index, and send it if admitted. Returns
/// false only when the channel is gone. Vanished files are dropped silently;
/// other stat failures are reported.
fn admit_file(counter: &mut u64, path: &Path, ctx: &ScanContext, tx: &Sender<ScanOutcome>) -> bool {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(err) => {
            if err.kind() == ErrorKind::NotFound {
                return true;
            }
            return tx
                .send(ScanOutcome::Error {
                    msg: err.to_string(),
                    path: path.to_path_buf(),
                })
                .is_ok();
        }
    };
    *counter += 1;
    let entry = FileEntry::from_meta(*counter, path.to_path_buf(), &meta);
    if admission::check(&entry, &ctx.matcher, &ctx.opts) {
        return tx.send(ScanOutcome::Entry(entry)).is_ok();
    }
    true
}

/// Walk one root. The shared visited set holds canonical directory paths so
/// overlapping roots and directory-symlink cycles are each scanned once.
fn walk_root(
    dir: &Path,
    seen: &mut HashSet<PathBuf>,
    counter: &mut u64,
    ctx: &ScanContext,
    tx: &Sender<ScanOutcome>,
) -> bool {
    let mut it = WalkDir::new(dir)
        .follow_links(ctx.opts.follow_links)
        .into_iter();
    loop {
        let item = match it.next() {
            None => break,
            Some(item) => item,
        };
        match item {
            Ok(entry) => {
                if entry.file_type().is_dir() {
                    let real = entry
                        .path()
                        .canonicalize()
                        .unwrap_or_else(|_| entry.path().to_path_buf());
                    if !seen.insert(real) {
                        it.skip_current_dir();
                    }
                    continue;
                }
                if entry.path_is_symlink() {
                    if !ctx.opts.scan_links {
                        continue;
                    }
                    match fs::metadata(entry.path()) {
                        Ok(target) if target.is_file() => {}
                        _ => continue,
                    }
                } else if !entry.file_type().is_file() {
                    continue;
                }
                if !admit_file(counter, entry.path(), ctx, tx) {
                    return false;
                }
            }
            Err(err) => {
                let path = err
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| dir.to_path_buf());
                if tx
                    .send(ScanOutcome::Error {
                        msg: err.to_string(),
                        path,
                    })
                    .is_err()
                {
                    return false;
                }
            }
        }
    }
    true
}
