//! Hidden, archived, and system attribute probes, per platform.

use crate::types::FileEntry;

#[cfg(target_os = "macos")]
mod macos;
#[cfg(all(unix, not(target_os = "macos")))]
mod unix;
#[cfg(windows)]
mod windows;

#[cfg(target_os = "macos")]
use macos as imp;
#[cfg(all(unix, not(target_os = "macos")))]
use unix as imp;
#[cfg(windows)]
use windows as imp;

/// True for dot-prefixed names or entries carrying the platform hidden attribute.
pub fn is_hidden(entry: &FileEntry) -> bool {
    entry.name.as_encoded_bytes().starts_with(b".") || imp::has_hidden_attribute(entry)
}

pub fn is_archived(entry: &FileEntry) -> bool {
    imp::has_archive_attribute(entry)
}

/// True for entries the OS owns: attribute-flagged on Windows, well-known
/// housekeeping names everywhere.
pub fn is_system(entry: &FileEntry) -> bool {
    imp::has_system_attribute(entry)
}
