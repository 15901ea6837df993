//! Bucket tree: sets of files believed equivalent under the discriminators
//! applied so far, nested one level per refinement stage.
//!
//! No parent back-pointers. Refinement replaces a leaf with a refined node and
//! the parent retains only non-empty children afterwards, so empties collapse
//! upward as the recursion unwinds.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::collections::hash_map::Entry as MapEntry;
use std::path::PathBuf;

use crate::types::{BucketKey, FileEntry, FilterKind};

/// A child of a bucket: either a surviving group or a node a later stage refined.
#[derive(Debug)]
pub enum Node {
    Leaf(Vec<FileEntry>),
    Refined(Bucket),
}

/// One refinement layer. `children` keeps first-seen insertion order so every
/// downstream ordering is a pure function of entry indexes, never of map iteration.
#[derive(Debug)]
pub struct Bucket {
    pub kind: FilterKind,
    pub children: Vec<(BucketKey, Node)>,
    /// Entries whose probe failed at this stage; reported, never treated as dups.
    pub errors: Vec<FileEntry>,
}

impl Bucket {
    pub fn new(kind: FilterKind) -> Self {
        Bucket {
            kind,
            children: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// A bucket with no children and no errors is removed from its parent.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty() && self.errors.is_empty()
    }

    /// All surviving leaves, depth-first.
    pub fn leaves(&self) -> Vec<&[FileEntry]> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a [FileEntry]>) {
        for (_, node) in &self.children {
            match node {
                Node::Leaf(entries) => {
                    if !entries.is_empty() {
                        out.push(entries);
                    }
                }
                Node::Refined(child) => child.collect_leaves(out),
            }
        }
    }

    /// All probe-error entries in the tree, depth-first.
    pub fn error_entries(&self) -> Vec<&FileEntry> {
        let mut out = Vec::new();
        self.collect_errors(&mut out);
        out
    }

    fn collect_errors<'a>(&'a self, out: &mut Vec<&'a FileEntry>) {
        out.extend(self.errors.iter());
        for (_, node) in &self.children {
            if let Node::Refined(child) = node {
                child.collect_errors(out);
            }
        }
    }
}

/// Accumulates `(key, entry)` pairs for one stage, preserving first-seen key
/// order, then prunes singletons on [`finish`](GroupBuilder::finish).
pub struct GroupBuilder {
    kind: FilterKind,
    groups: Vec<(BucketKey, Vec<FileEntry>)>,
    slots: HashMap<BucketKey, usize>,
    errors: Vec<FileEntry>,
}

impl GroupBuilder {
    pub fn new(kind: FilterKind) -> Self {
        GroupBuilder {
            kind,
            groups: Vec::new(),
            slots: HashMap::new(),
            errors: Vec::new(),
        }
    }

    pub fn push(&mut self, key: BucketKey, entry: FileEntry) {
        match self.slots.entry(key.clone()) {
            MapEntry::Occupied(slot) => self.groups[*slot.get()].1.push(entry),
            MapEntry::Vacant(slot) => {
                slot.insert(self.groups.len());
                self.groups.push((key, vec![entry]));
            }
        }
    }

    pub fn push_error(&mut self, entry: FileEntry) {
        self.errors.push(entry);
    }

    pub fn finish(self) -> Bucket {
        Bucket {
            kind: self.kind,
            children: self
                .groups
                .into_iter()
                .filter(|(_, group)| group.len() > 1)
                .map(|(key, group)| (key, Node::Leaf(group)))
                .collect(),
            errors: self.errors,
        }
    }
}

fn entry_order(a: &&FileEntry, b: &&FileEntry) -> Ordering {
    a.index.cmp(&b.index).then_with(|| a.path.cmp(&b.path))
}

/// Flatten the tree into `(dups, probe_errors)`.
///
/// Each leaf becomes a class sorted by `(index, path)`; classes are sorted by
/// cardinality descending with the lowest member index breaking ties, so the
/// result is deterministic regardless of worker scheduling.
pub fn shape_results(root: &Bucket) -> (Vec<Vec<PathBuf>>, Vec<PathBuf>) {
    let mut classes: Vec<Vec<&FileEntry>> = root
        .leaves()
        .into_iter()
        .map(|leaf| {
            let mut members: Vec<&FileEntry> = leaf.iter().collect();
            members.sort_by(entry_order);
            members
        })
        .collect();
    classes.sort_by(|a, b| {
        b.len()
            .cmp(&a.len())
            .then_with(|| a[0].index.cmp(&b[0].index))
    });
    let dups = classes
        .into_iter()
        .map(|members| members.into_iter().map(|e| e.path.clone()).collect())
        .collect();

    let mut failed = root.error_entries();
    failed.sort_by(entry_order);
    let probe_errors = failed.into_iter().map(|e| e.path.clone()).collect();

    (dups, probe_errors)
}
