//! Attribute probes for Windows: NTFS file attributes via lstat, plus the
//! shell housekeeping names.

use std::sync::OnceLock;

use crate::engine::tools::{CardSet, compile_cards};
use crate::types::FileEntry;

const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;
const FILE_ATTRIBUTE_SYSTEM: u32 = 0x4;
const FILE_ATTRIBUTE_ARCHIVE: u32 = 0x20;

const SYSTEM_WILDCARDS: &[&str] = &[
    "Thumbs.db",
    "ehthumbs.db",
    "ehthumbs_vista.db",
    "*.stackdump",
    "Desktop.ini",
    "$RECYCLE.BIN",
    "*.lnk",
];

fn system_cards() -> &'static CardSet {
    static CARDS: OnceLock<CardSet> = OnceLock::new();
    CARDS.get_or_init(|| compile_cards(SYSTEM_WILDCARDS).expect("system wildcards compile"))
}

fn attributes(entry: &FileEntry) -> Option<u32> {
    use std::os::windows::fs::MetadataExt;
    std::fs::symlink_metadata(&entry.path)
        .ok()
        .map(|meta| meta.file_attributes())
}

pub(super) fn has_hidden_attribute(entry: &FileEntry) -> bool {
    attributes(entry).is_some_and(|attrs| attrs & FILE_ATTRIBUTE_HIDDEN != 0)
}

pub(super) fn has_archive_attribute(entry: &FileEntry) -> bool {
    attributes(entry).is_some_and(|attrs| attrs & FILE_ATTRIBUTE_ARCHIVE != 0)
}

pub(super) fn has_system_attribute(entry: &FileEntry) -> bool {
    attributes(entry).is_some_and(|attrs| attrs & FILE_ATTRIBUTE_SYSTEM != 0)
        || system_cards().matches(&entry.name.to_string_lossy())
}
