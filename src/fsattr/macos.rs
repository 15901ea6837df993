//! Attribute probes for macOS: BSD file flags via lstat, plus the Finder and
//! Time Machine housekeeping names.

use std::ffi::CString;
use std::mem::MaybeUninit;
use std::os::unix::ffi::OsStrExt;
use std::sync::OnceLock;

use crate::engine::tools::{CardSet, compile_cards};
use crate::types::FileEntry;

const SYSTEM_WILDCARDS: &[&str] = &[
    ".DS_Store",
    ".AppleDouble",
    ".LSOverride",
    "Icon",
    "._*",
    ".DocumentRevisions-V100",
    ".fseventsd",
    ".Spotlight-V100",
    ".TemporaryItems",
    ".Trashes",
    ".VolumeIcon.icns",
    ".com.apple.timemachine.donotpresent",
    ".AppleDB",
    ".AppleDesktop",
    "Network Trash Folder",
    "Temporary Items",
    ".apdisk",
];

fn system_cards() -> &'static CardSet {
    static CARDS: OnceLock<CardSet> = OnceLock::new();
    CARDS.get_or_init(|| compile_cards(SYSTEM_WILDCARDS).expect("system wildcards compile"))
}

fn st_flags(entry: &FileEntry) -> Option<u32> {
    let cpath = CString::new(entry.path.as_os_str().as_bytes()).ok()?;
    let mut st = MaybeUninit::<libc::stat>::uninit();
    if unsafe { libc::lstat(cpath.as_ptr(), st.as_mut_ptr()) } != 0 {
        return None;
    }
    Some(unsafe { st.assume_init() }.st_flags)
}

pub(super) fn has_hidden_attribute(entry: &FileEntry) -> bool {
    st_flags(entry).is_some_and(|flags| flags & libc::UF_HIDDEN != 0)
}

/// BSD inverts the NT convention: SF_ARCHIVED clear means "changed since the
/// last archive pass", which is what the archived gate filters on.
pub(super) fn has_archive_attribute(entry: &FileEntry) -> bool {
    st_flags(entry).is_some_and(|flags| flags & libc::SF_ARCHIVED == 0)
}

pub(super) fn has_system_attribute(entry: &FileEntry) -> bool {
    system_cards().matches(&entry.name.to_string_lossy())
}
