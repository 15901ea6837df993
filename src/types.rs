//! Public and internal types for the dupeseek API and pipeline.

use std::ffi::OsString;
use std::fs::Metadata;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Immutable metadata for one candidate file, captured at admission.
///
/// `index` is assigned in enumeration order by the single scan thread and is the
/// primary tiebreaker everywhere ordering matters (result shaping, purge keep rule).
#[derive(Clone, Debug)]
pub struct FileEntry {
    /// Strictly increasing enumeration counter, starting at 1.
    pub index: u64,
    /// Absolute path.
    pub path: PathBuf,
    /// Basename.
    pub name: OsString,
    /// Parent directory.
    pub dir: PathBuf,
    /// Permission bits (`st_mode & 0o7777`; synthesized on Windows).
    pub mode: u32,
    /// File-type bits (`st_mode & S_IFMT`; synthesized on Windows).
    pub ifmt: u32,
    /// Device id from lstat (0 on Windows).
    pub dev: u64,
    /// Inode from lstat (0 on Windows).
    pub ino: u64,
    /// Modification time in nanoseconds since epoch.
    pub mtime_ns: i64,
    /// Size in bytes (for symlinks, the length of the target text).
    pub size: u64,
    /// True when the entry itself is a symlink (lstat, not the referent).
    pub is_symlink: bool,
}

impl FileEntry {
    /// Build an entry from lstat metadata. The caller supplies the enumeration index.
    pub fn from_meta(index: u64, path: PathBuf, meta: &Metadata) -> Self {
        let name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        let dir = path.parent().map(|p| p.to_path_buf()).unwrap_or_default();
        let (mode, ifmt, dev, ino) = stat_bits(meta);
        FileEntry {
            index,
            name,
            dir,
            mode,
            ifmt,
            dev,
            ino,
            mtime_ns: mtime_ns(meta),
            size: meta.len(),
            is_symlink: meta.file_type().is_symlink(),
            path,
        }
    }

    /// Primary partition key: same file-type bits and same size.
    pub fn id_key(&self) -> (u32, u64) {
        (self.ifmt, self.size)
    }
}

#[cfg(unix)]
fn stat_bits(meta: &Metadata) -> (u32, u32, u64, u64) {
    use std::os::unix::fs::MetadataExt;
    let mode = meta.mode();
    (mode & 0o7777, mode & (libc::S_IFMT as u32), meta.dev(), meta.ino())
}

#[cfg(windows)]
fn stat_bits(meta: &Metadata) -> (u32, u32, u64, u64) {
    const S_IFREG: u32 = 0o100000;
    const S_IFDIR: u32 = 0o040000;
    const S_IFLNK: u32 = 0o120000;
    let ft = meta.file_type();
    let ifmt = if ft.is_symlink() {
        S_IFLNK
    } else if ft.is_dir() {
        S_IFDIR
    } else {
        S_IFREG
    };
    let mode = if meta.permissions().readonly() { 0o444 } else { 0o666 };
    (mode, ifmt, 0, 0)
}

#[cfg(unix)]
fn mtime_ns(meta: &Metadata) -> i64 {
    use std::os::unix::fs::MetadataExt;
    meta.mtime()
        .saturating_mul(1_000_000_000)
        .saturating_add(meta.mtime_nsec())
}

#[cfg(not(unix))]
fn mtime_ns(meta: &Metadata) -> i64 {
    meta.modified()
        .ok()
        .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
        .map(|d| d.as_nanos() as i64)
        .unwrap_or(0)
}

/// Discriminator that produced a bucket. Refinement drives on this tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterKind {
    Ident,
    Mode,
    Mtime,
    Name,
    Signature,
    Rule,
    Hash,
    Binary,
}

impl FilterKind {
    /// Stage label reported through the notify hook.
    pub fn label(self) -> &'static str {
        match self {
            FilterKind::Ident => "scanning for similar files",
            FilterKind::Mode => "filtering files by permission mode",
            FilterKind::Mtime => "filtering files by modification time",
            FilterKind::Name => "filtering files by name",
            FilterKind::Signature => "filtering files by signature",
            FilterKind::Rule => "filtering files by rule",
            FilterKind::Hash => "filtering files by hash",
            FilterKind::Binary => "filtering files by content",
        }
    }
}

/// Sub-key produced by a refiner, tagged per discriminator.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum BucketKey {
    Ident(u32, u64),
    Mode(u32),
    Mtime(i64),
    Name(OsString),
    Sum(u64),
    Pair(u64, u64),
    Equal,
}

/// Options for [`find`](crate::find) and [`purge`](crate::purge). All fields have
/// working defaults; `..Default::default()` the rest.
#[derive(Clone, Debug)]
pub struct FindOpts {
    /// Minimum file size admitted (bytes).
    pub min_size: u64,
    /// Maximum file size admitted (bytes).
    pub max_size: u64,
    /// Wildcard patterns; when non-empty, only matching paths are admitted.
    pub include: Vec<String>,
    /// Wildcard patterns; matching paths are rejected.
    pub exclude: Vec<String>,
    /// Also require equal basename.
    pub compare_name: bool,
    /// Also require equal modification time.
    pub compare_mtime: bool,
    /// Also require equal permission mode.
    pub compare_mode: bool,
    /// Descend into directories.
    pub recursive: bool,
    /// Follow symbolic links pointing to directories.
    pub follow_links: bool,
    /// Include symbolic links pointing to files as candidates.
    pub scan_links: bool,
    /// Include zero-byte files. Only effective together with `min_size == 0`.
    pub scan_empties: bool,
    /// Include OS/system files. Default true.
    pub scan_system: bool,
    /// Include archived files. Default true.
    pub scan_archived: bool,
    /// Include hidden files. Default true.
    pub scan_hidden: bool,
}

impl Default for FindOpts {
    fn default() -> Self {
        use crate::utils::config::SizeConsts;
        FindOpts {
            min_size: SizeConsts::DEFAULT_MIN_SIZE,
            max_size: SizeConsts::DEFAULT_MAX_SIZE,
            include: Vec::new(),
            exclude: Vec::new(),
            compare_name: false,
            compare_mtime: false,
            compare_mode: false,
            recursive: true,
            follow_links: false,
            scan_links: false,
            scan_empties: false,
            scan_system: true,
            scan_archived: true,
            scan_hidden: true,
        }
    }
}

/// Flattened outcome of a run.
///
/// Classes in `dups` are sorted by cardinality descending (ties by lowest member
/// index); within a class, paths are in `(index, path)` order. Purged files stay
/// listed in their class; `deleted` records what was actually removed.
#[derive(Debug, Default, Serialize)]
pub struct ResultSet {
    /// Confirmed duplicate classes.
    pub dups: Vec<Vec<PathBuf>>,
    /// Paths deleted by a purge.
    pub deleted: Vec<PathBuf>,
    /// Paths where enumeration or stat failed.
    pub scan_errors: Vec<PathBuf>,
    /// Paths where a signature/hash/compare probe failed.
    pub probe_errors: Vec<PathBuf>,
    /// Paths where deletion failed.
    pub delete_errors: Vec<PathBuf>,
}

/// Callbacks observed during a run. All optional; invoked serially from the engine.
#[derive(Default)]
pub struct Hooks<'a> {
    /// Invoked on every caught failure with the offending path.
    pub on_error: Option<&'a mut (dyn FnMut(&anyhow::Error, &Path) + Send)>,
    /// Invoked before each deletion; return false to keep that file.
    pub on_delete: Option<&'a mut (dyn FnMut(&Path) -> bool + Send)>,
    /// Stage progress: label and entries processed so far in that stage.
    pub notify: Option<&'a mut (dyn FnMut(&'static str, usize) + Send)>,
}

impl Hooks<'_> {
    pub(crate) fn report_error(&mut self, err: &anyhow::Error, path: &Path) {
        if let Some(f) = self.on_error.as_mut() {
            f(err, path);
        }
    }

    pub(crate) fn progress(&mut self, label: &'static str, n: usize) {
        if let Some(f) = self.notify.as_mut() {
            f(label, n);
        }
    }

    pub(crate) fn allow_delete(&mut self, path: &Path) -> bool {
        match self.on_delete.as_mut() {
            Some(f) => f(path),
            None => true,
        }
    }
}
