//! Attribute probes for Linux and other non-Apple Unixes: no file flags, so
//! hidden is the dot convention and system is a name-pattern match.

use std::sync::OnceLock;

use crate::engine::tools::{CardSet, compile_cards};
use crate::types::FileEntry;

const SYSTEM_WILDCARDS: &[&str] = &["*~", ".fuse_hidden*", ".directory", ".Trash-*", ".nfs*"];

fn system_cards() -> &'static CardSet {
    static CARDS: OnceLock<CardSet> = OnceLock::new();
    CARDS.get_or_init(|| compile_cards(SYSTEM_WILDCARDS).expect("system wildcards compile"))
}

pub(super) fn has_hidden_attribute(_entry: &FileEntry) -> bool {
    false
}

pub(super) fn has_archive_attribute(_entry: &FileEntry) -> bool {
    false
}

pub(super) fn has_system_attribute(entry: &FileEntry) -> bool {
    system_cards().matches(&entry.name.to_string_lossy())
}
