//! Stage drivers: apply one discriminator across every leaf of the bucket tree.
//!
//! Contract per stage: iterate leaves in any order, honor the stage's minimum
//! leaf cardinality and skip rule, divert failed probes to the replacement
//! node's error slot, prune groups below two members, and let empty nodes
//! collapse upward through the parent's retain pass.

use std::mem;

use anyhow::Result;
use rayon::prelude::*;

use crate::blockdev::DeviceCache;
use crate::engine::bucket::{Bucket, GroupBuilder, Node};
use crate::engine::tools::is_not_found;
use crate::engine::{compare, hashing};
use crate::types::{BucketKey, FileEntry, FilterKind, Hooks};
use crate::utils::config::SizeConsts;

struct RefineCtx<'a, 'h> {
    cache: &'a DeviceCache,
    hooks: &'a mut Hooks<'h>,
    processed: usize,
}

/// Refine every leaf of `root` with the given discriminator.
pub fn filter_dups(
    stage: FilterKind,
    root: &mut Bucket,
    cache: &DeviceCache,
    hooks: &mut Hooks<'_>,
) {
    let mut ctx = RefineCtx {
        cache,
        hooks,
        processed: 0,
    };
    refine_node(root, stage, &mut ctx);
}

fn refine_node(bucket: &mut Bucket, stage: FilterKind, ctx: &mut RefineCtx<'_, '_>) {
    for (_, node) in bucket.children.iter_mut() {
        match node {
            Node::Refined(child) => refine_node(child, stage, ctx),
            Node::Leaf(entries) => {
                if let Some(replacement) = refine_leaf(entries, stage, ctx) {
                    *node = Node::Refined(replacement);
                }
            }
        }
    }
    bucket.children.retain(|(_, node)| match node {
        Node::Leaf(entries) => entries.len() > 1,
        Node::Refined(child) => !child.is_empty(),
    });
}

fn min_leaf(stage: FilterKind) -> usize {
    // With only two candidates, hashing both buys nothing over comparing bytes.
    match stage {
        FilterKind::Hash => 3,
        _ => 2,
    }
}

fn is_io(stage: FilterKind) -> bool {
    matches!(
        stage,
        FilterKind::Signature | FilterKind::Rule | FilterKind::Hash
    )
}

/// Leaf-level skip rules, evaluated on the representative entry (all members of
/// a leaf share file-type bits and size).
fn skip_leaf(stage: FilterKind, entries: &[FileEntry]) -> bool {
    let first = &entries[0];
    match stage {
        FilterKind::Signature => {
            first.size == 0
                || (SizeConsts::LOW_SIZE < first.size && first.size < SizeConsts::LITTLE_SIZE)
        }
        FilterKind::Rule => first.size < SizeConsts::BIG_SIZE || first.is_symlink,
        FilterKind::Hash => first.size == 0,
        _ => false,
    }
}

/// Produce the replacement node for one leaf, or `None` to leave it untouched.
fn refine_leaf(
    entries: &mut Vec<FileEntry>,
    stage: FilterKind,
    ctx: &mut RefineCtx<'_, '_>,
) -> Option<Bucket> {
    if entries.len() < min_leaf(stage) || skip_leaf(stage, entries) {
        return None;
    }
    if stage == FilterKind::Binary {
        return binary_leaf(entries, ctx);
    }

    let chunk = match stage {
        FilterKind::Rule => {
            hashing::chunk_size(entries[0].size, ctx.cache.block_size_for(&entries[0]))
        }
        _ => 0,
    };
    let owned = mem::take(entries);
    let count = owned.len();
    let cache = ctx.cache;
    let probed: Vec<(FileEntry, Result<BucketKey>)> = if is_io(stage) {
        owned
            .into_par_iter()
            .map(|entry| {
                let key = probe_key(stage, &entry, chunk, cache);
                (entry, key)
            })
            .collect()
    } else {
        owned
            .into_iter()
            .map(|entry| {
                let key = probe_key(stage, &entry, chunk, cache);
                (entry, key)
            })
            .collect()
    };

    let mut builder = GroupBuilder::new(stage);
    for (entry, key) in probed {
        match key {
            Ok(key) => builder.push(key, entry),
            Err(err) => {
                ctx.hooks.report_error(&err, &entry.path);
                if !is_not_found(&err) {
                    builder.push_error(entry);
                }
            }
        }
    }
    ctx.processed += count;
    ctx.hooks.progress(stage.label(), ctx.processed);
    Some(builder.finish())
}

fn probe_key(
    stage: FilterKind,
    entry: &FileEntry,
    chunk: u64,
    cache: &DeviceCache,
) -> Result<BucketKey> {
    match stage {
        FilterKind::Mode => Ok(BucketKey::Mode(entry.mode)),
        FilterKind::Mtime => Ok(BucketKey::Mtime(entry.mtime_ns)),
        FilterKind::Name => Ok(BucketKey::Name(entry.name.clone())),
        FilterKind::Signature => hashing::signature(entry).map(BucketKey::Sum),
        FilterKind::Rule => {
            hashing::sidesum(entry, chunk).map(|(head, tail)| BucketKey::Pair(head, tail))
        }
        FilterKind::Hash => {
            hashing::checksum(entry, cache.block_size_for(entry)).map(BucketKey::Sum)
        }
        FilterKind::Ident | FilterKind::Binary => {
            unreachable!("{stage:?} is not probed per entry")
        }
    }
}

/// Byte-for-byte confirmation of a pair. Leaves of three or more hash-equal
/// members pass through unchanged; zero-size pairs are already equal.
fn binary_leaf(entries: &mut Vec<FileEntry>, ctx: &mut RefineCtx<'_, '_>) -> Option<Bucket> {
    if entries.len() != 2 || entries[0].size == 0 {
        return None;
    }
    let pair = mem::take(entries);
    let outcome = compare::files_equal(&pair[0].path, &pair[1].path);
    ctx.processed += 2;
    let bucket = match outcome {
        Ok(true) => {
            let mut confirmed = Bucket::new(FilterKind::Binary);
            confirmed.children.push((BucketKey::Equal, Node::Leaf(pair)));
            confirmed
        }
        Ok(false) => Bucket::new(FilterKind::Binary),
        Err(err) => {
            let path = pair[0].path.clone();
            ctx.hooks.report_error(&err, &path);
            let mut failed = Bucket::new(FilterKind::Binary);
            if is_not_found(&err) {
                failed.errors = pair;
            }
            failed
        }
    };
    ctx.hooks
        .progress(FilterKind::Binary.label(), ctx.processed);
    Some(bucket)
}
