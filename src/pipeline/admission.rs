//! Per-entry admission predicate: size bounds, wildcard patterns, attribute
//! policy. Evaluated in that order, short-circuiting; rejections are silently
//! dropped.

use anyhow::Result;
use std::path::Path;

use crate::engine::tools::{CardSet, compile_cards};
use crate::fsattr;
use crate::types::{FileEntry, FindOpts};

/// Compiled include/exclude wildcard pair. An empty include list admits
/// everything; an empty exclude list rejects nothing.
pub struct AdmissionMatcher {
    include: Option<CardSet>,
    exclude: Option<CardSet>,
}

impl AdmissionMatcher {
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self> {
        Ok(AdmissionMatcher {
            include: if include.is_empty() {
                None
            } else {
                Some(compile_cards(include)?)
            },
            exclude: if exclude.is_empty() {
                None
            } else {
                Some(compile_cards(exclude)?)
            },
        })
    }

    pub fn admits(&self, path: &Path) -> bool {
        let text = path.to_string_lossy();
        if let Some(excluded) = &self.exclude
            && excluded.matches(&text)
        {
            return false;
        }
        if let Some(included) = &self.include
            && !included.matches(&text)
        {
            return false;
        }
        true
    }
}

/// Size gate. A zero-byte file is retained only when empties are scanned AND
/// the minimum size is zero.
pub fn size_admits(size: u64, opts: &FindOpts) -> bool {
    if size == 0 && !opts.scan_empties {
        return false;
    }
    opts.min_size <= size && size <= opts.max_size
}

fn attrs_admit(entry: &FileEntry, opts: &FindOpts) -> bool {
    if !opts.scan_hidden && fsattr::is_hidden(entry) {
        return false;
    }
    if !opts.scan_archived && fsattr::is_archived(entry) {
        return false;
    }
    if !opts.scan_system && fsattr::is_system(entry) {
        return false;
    }
    true
}

/// Full admission predicate for one stat'ed entry.
pub fn check(entry: &FileEntry, matcher: &AdmissionMatcher, opts: &FindOpts) -> bool {
    size_admits(entry.size, opts) && matcher.admits(&entry.path) && attrs_admit(entry, opts)
}
