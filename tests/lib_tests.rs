use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use dupeseek::FindOpts;
use dupeseek::blockdev::{BlockResolver, DeviceCache};
use dupeseek::engine::bucket::{Bucket, GroupBuilder, Node, shape_results};
use dupeseek::engine::compile_cards;
use dupeseek::engine::filter_dups;
use dupeseek::engine::hashing::{chunk_size, content_sum, hash_bufsize};
use dupeseek::pipeline::admission::size_admits;
use dupeseek::types::{BucketKey, FileEntry, FilterKind, Hooks};

fn entry(index: u64, path: &str, size: u64, mode: u32, mtime_ns: i64) -> FileEntry {
    let path = PathBuf::from(path);
    let name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(OsString::new);
    let dir = path.parent().map(|p| p.to_path_buf()).unwrap_or_default();
    FileEntry {
        index,
        name,
        dir,
        mode,
        ifmt: 0o100000,
        dev: 1,
        ino: index,
        mtime_ns,
        size,
        is_symlink: false,
        path,
    }
}

fn ident_bucket(entries: Vec<FileEntry>) -> Bucket {
    let mut builder = GroupBuilder::new(FilterKind::Ident);
    for e in entries {
        let (ifmt, size) = e.id_key();
        builder.push(BucketKey::Ident(ifmt, size), e);
    }
    builder.finish()
}

// --- wildcard matching ---

#[test]
fn test_cards_star_and_question() {
    let cards = compile_cards(&["*.log", "report-?.txt"]).unwrap();
    assert!(cards.matches("foo.log"));
    assert!(cards.matches("/var/tmp/foo.log"));
    assert!(cards.matches("report-1.txt"));
    assert!(!cards.matches("report-10.txt"));
    assert!(!cards.matches("foo.log.bak"));
}

#[test]
fn test_cards_literal_dots_escaped() {
    let cards = compile_cards(&["a.b"]).unwrap();
    assert!(cards.matches("a.b"));
    assert!(!cards.matches("axb"));
}

#[test]
fn test_cards_character_class() {
    let cards = compile_cards(&["img[0-9].png"]).unwrap();
    assert!(cards.matches("img3.png"));
    assert!(!cards.matches("imgx.png"));

    let negated = compile_cards(&["img[!0-9].png"]).unwrap();
    assert!(negated.matches("imgx.png"));
    assert!(!negated.matches("img3.png"));
}

#[test]
fn test_cards_unterminated_class_is_literal() {
    let cards = compile_cards(&["a[b"]).unwrap();
    assert!(cards.matches("a[b"));
    assert!(!cards.matches("ab"));
}

// --- admission size gate ---

#[test]
fn test_size_admits_bounds() {
    let opts = FindOpts {
        min_size: 100,
        max_size: 1000,
        ..FindOpts::default()
    };
    assert!(!size_admits(99, &opts));
    assert!(size_admits(100, &opts));
    assert!(size_admits(1000, &opts));
    assert!(!size_admits(1001, &opts));
}

#[test]
fn test_size_admits_empties_require_min_size_zero() {
    let scan_empties = FindOpts {
        min_size: 0,
        scan_empties: true,
        ..FindOpts::default()
    };
    assert!(size_admits(0, &scan_empties));

    // scan_empties alone is not enough; the minimum size must also be zero
    let nonzero_min = FindOpts {
        min_size: 100,
        scan_empties: true,
        ..FindOpts::default()
    };
    assert!(!size_admits(0, &nonzero_min));

    let no_empties = FindOpts {
        min_size: 0,
        scan_empties: false,
        ..FindOpts::default()
    };
    assert!(!size_admits(0, &no_empties));
}

// --- side-sum chunk arithmetic ---

#[test]
fn test_chunk_size_block_snapped() {
    // 100 MiB at 10% is exactly block aligned at 4 KiB
    let chunk = chunk_size(100 << 20, 4096);
    assert_eq!(chunk, (100 << 20) / 10 / 2);

    // unaligned sample gets snapped down to a block multiple before halving
    let chunk = chunk_size(1_000_001, 4096);
    let sampled = 100_001_u64; // ceil(1_000_001 / 10)
    let snapped = sampled - sampled % 4096;
    assert_eq!(chunk, snapped / 2);
}

#[test]
fn test_chunk_size_small_sample_not_snapped() {
    // sample below one block is left alone
    assert_eq!(chunk_size(1000, 4096), 50);
}

#[test]
fn test_hash_bufsize_formula() {
    // block size larger than the base buffer wins outright
    assert_eq!(hash_bufsize(100_000), 100_000);
    // base buffer is snapped down to a block multiple
    assert_eq!(hash_bufsize(4096), 32 << 10);
    assert_eq!(hash_bufsize(3000), (32 << 10) - (32 << 10) % 3000);
    // degenerate block size falls back to the base buffer
    assert_eq!(hash_bufsize(0), 32 << 10);
}

#[test]
fn test_content_sum_differs_on_content() {
    assert_eq!(content_sum(b"hello"), content_sum(b"hello"));
    assert_ne!(content_sum(b"hello"), content_sum(b"hellO"));
}

// --- bucket tree ---

#[test]
fn test_ident_bucket_prunes_singletons() {
    let root = ident_bucket(vec![
        entry(1, "/t/a", 10, 0o644, 0),
        entry(2, "/t/b", 10, 0o644, 0),
        entry(3, "/t/c", 20, 0o644, 0),
    ]);
    let leaves = root.leaves();
    assert_eq!(leaves.len(), 1);
    assert_eq!(leaves[0].len(), 2);
}

#[test]
fn test_mode_refiner_splits_and_collapses() {
    let cache = DeviceCache::new();
    let mut hooks = Hooks::default();

    // two entries with differing modes: the leaf dissolves entirely
    let mut root = ident_bucket(vec![
        entry(1, "/t/a", 10, 0o644, 0),
        entry(2, "/t/b", 10, 0o600, 0),
    ]);
    filter_dups(FilterKind::Mode, &mut root, &cache, &mut hooks);
    assert!(root.is_empty());

    // three entries, two sharing a mode: the pair survives
    let mut root = ident_bucket(vec![
        entry(1, "/t/a", 10, 0o644, 0),
        entry(2, "/t/b", 10, 0o644, 0),
        entry(3, "/t/c", 10, 0o600, 0),
    ]);
    filter_dups(FilterKind::Mode, &mut root, &cache, &mut hooks);
    let leaves = root.leaves();
    assert_eq!(leaves.len(), 1);
    assert_eq!(leaves[0].len(), 2);
}

#[test]
fn test_attribute_refiners_never_read_content() {
    // paths do not exist on disk; only CPU refiners run, so equal attributes
    // group the entries without any I/O
    let cache = DeviceCache::new();
    let mut hooks = Hooks::default();
    let mut root = ident_bucket(vec![
        entry(1, "/nowhere/a/file.bin", 999, 0o644, 42),
        entry(2, "/nowhere/b/file.bin", 999, 0o644, 42),
    ]);
    filter_dups(FilterKind::Mode, &mut root, &cache, &mut hooks);
    filter_dups(FilterKind::Mtime, &mut root, &cache, &mut hooks);
    filter_dups(FilterKind::Name, &mut root, &cache, &mut hooks);
    let (dups, probe_errors) = shape_results(&root);
    assert_eq!(dups.len(), 1);
    assert_eq!(dups[0].len(), 2);
    assert!(probe_errors.is_empty());
}

#[test]
fn test_shape_results_ordering() {
    let mut root = Bucket::new(FilterKind::Ident);
    root.children.push((
        BucketKey::Ident(0o100000, 10),
        Node::Leaf(vec![entry(5, "/t/e", 10, 0, 0), entry(3, "/t/c", 10, 0, 0)]),
    ));
    root.children.push((
        BucketKey::Ident(0o100000, 20),
        Node::Leaf(vec![
            entry(4, "/t/d", 20, 0, 0),
            entry(1, "/t/a", 20, 0, 0),
            entry(2, "/t/b", 20, 0, 0),
        ]),
    ));
    let (dups, _) = shape_results(&root);
    // larger class first, members in (index, path) order
    assert_eq!(dups.len(), 2);
    assert_eq!(
        dups[0],
        vec![
            PathBuf::from("/t/a"),
            PathBuf::from("/t/b"),
            PathBuf::from("/t/d")
        ]
    );
    assert_eq!(dups[1], vec![PathBuf::from("/t/c"), PathBuf::from("/t/e")]);
}

#[test]
fn test_shape_results_error_ordering() {
    let mut root = Bucket::new(FilterKind::Ident);
    let mut child = Bucket::new(FilterKind::Signature);
    child.errors.push(entry(7, "/t/z", 10, 0, 0));
    root.errors.push(entry(2, "/t/y", 10, 0, 0));
    root.children
        .push((BucketKey::Ident(0o100000, 10), Node::Refined(child)));
    let (_, probe_errors) = shape_results(&root);
    assert_eq!(
        probe_errors,
        vec![PathBuf::from("/t/y"), PathBuf::from("/t/z")]
    );
}

// --- device cache ---

struct CountingResolver {
    device_calls: AtomicUsize,
    size_calls: AtomicUsize,
}

impl CountingResolver {
    fn new() -> Self {
        CountingResolver {
            device_calls: AtomicUsize::new(0),
            size_calls: AtomicUsize::new(0),
        }
    }
}

impl BlockResolver for CountingResolver {
    fn block_device(&self, _path: &std::path::Path) -> anyhow::Result<String> {
        self.device_calls.fetch_add(1, Ordering::SeqCst);
        Ok("mock0".to_string())
    }

    fn block_size(&self, _path: &std::path::Path) -> anyhow::Result<u64> {
        self.size_calls.fetch_add(1, Ordering::SeqCst);
        Ok(4096)
    }
}

#[test]
fn test_device_cache_resolves_once_per_device() {
    let cache = DeviceCache::with_resolver(Box::new(CountingResolver::new()), 128);
    let a = entry(1, "/t/a", 10, 0, 0);
    let b = entry(2, "/t/b", 10, 0, 0);
    assert_eq!(cache.block_size_for(&a), 4096);
    assert_eq!(cache.block_size_for(&b), 4096);
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_device_cache_bypasses_for_unknown_device() {
    let cache = DeviceCache::with_resolver(Box::new(CountingResolver::new()), 128);
    let mut e = entry(1, "/t/a", 10, 0, 0);
    e.dev = 0;
    assert_eq!(cache.block_size_for(&e), 4096);
    assert_eq!(cache.len(), 0);
}

#[test]
fn test_device_cache_clear_refused_while_held() {
    let cache = DeviceCache::with_resolver(Box::new(CountingResolver::new()), 128);
    let a = entry(1, "/t/a", 10, 0, 0);
    cache.block_size_for(&a);
    let hold = cache.hold();
    assert!(!cache.clear());
    assert_eq!(cache.len(), 1);
    drop(hold);
    assert!(cache.clear());
    assert_eq!(cache.len(), 0);
}

#[test]
fn test_device_cache_evicts_over_capacity_on_release() {
    let cache = DeviceCache::with_resolver(Box::new(CountingResolver::new()), 1);
    let hold = cache.hold();
    let a = entry(1, "/t/a", 10, 0, 0);
    let mut b = entry(2, "/t/b", 10, 0, 0);
    b.dev = 2;
    cache.block_size_for(&a);
    cache.block_size_for(&b);
    assert_eq!(cache.len(), 2);
    drop(hold);
    assert_eq!(cache.len(), 0);
}
