//! End-to-end find tests against real temporary trees.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use dupeseek::utils::dupeseek_toml::{apply_file_to_opts, load_dupeseek_toml};
use dupeseek::{FindOpts, Hooks, ResultSet, find, find_with_hooks};

struct TempTree {
    root: PathBuf,
}

impl TempTree {
    fn new(tag: &str) -> Self {
        let root = std::env::temp_dir().join(format!("dupeseek_{}_{}", tag, std::process::id()));
        let _ = std::fs::remove_dir_all(&root);
        std::fs::create_dir_all(&root).unwrap();
        TempTree { root }
    }

    fn file(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.root.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn roots(&self) -> Vec<PathBuf> {
        vec![self.root.clone()]
    }
}

impl Drop for TempTree {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}

fn small_opts() -> FindOpts {
    FindOpts {
        min_size: 1,
        ..FindOpts::default()
    }
}

fn class_sets(result: &ResultSet) -> Vec<HashSet<PathBuf>> {
    result
        .dups
        .iter()
        .map(|class| class.iter().cloned().collect())
        .collect()
}

fn set_of(paths: &[&Path]) -> HashSet<PathBuf> {
    paths.iter().map(|p| p.to_path_buf()).collect()
}

#[test]
fn test_pair_found_odd_one_out_absent() {
    let tree = TempTree::new("pair");
    let x = tree.file("a/x", &[0xAA; 200_000]);
    let y = tree.file("a/y", &[0xAA; 200_000]);
    let z = tree.file("a/z", &[0xAB; 200_000]);

    let result = find(&tree.roots(), &FindOpts::default()).unwrap();
    assert_eq!(result.dups.len(), 1);
    assert_eq!(class_sets(&result)[0], set_of(&[&x, &y]));
    assert!(!result.dups[0].contains(&z));
    assert!(result.scan_errors.is_empty());
    assert!(result.probe_errors.is_empty());
}

#[test]
fn test_triple_goes_through_hash_stage() {
    let tree = TempTree::new("triple");
    let p = tree.file("p", &[0x42; 200_000]);
    let q = tree.file("q", &[0x42; 200_000]);
    let r = tree.file("r", &[0x42; 200_000]);

    let result = find(&tree.roots(), &small_opts()).unwrap();
    assert_eq!(result.dups.len(), 1);
    assert_eq!(class_sets(&result)[0], set_of(&[&p, &q, &r]));
}

#[test]
fn test_identical_pair_confirmed_by_binary_compare() {
    let tree = TempTree::new("binpair");
    let f1 = tree.file("f1", b"identical small payload, read twice");
    let f2 = tree.file("f2", b"identical small payload, read twice");

    let result = find(&tree.roots(), &small_opts()).unwrap();
    assert_eq!(result.dups.len(), 1);
    assert_eq!(class_sets(&result)[0], set_of(&[&f1, &f2]));
}

#[test]
fn test_same_size_different_middle_byte_rejected() {
    let tree = TempTree::new("middiff");
    let mut a = vec![0x33_u8; 200_000];
    let b = a.clone();
    a[100_000] ^= 0xFF; // differs far from both signature windows
    tree.file("a", &a);
    tree.file("b", &b);

    let result = find(&tree.roots(), &FindOpts::default()).unwrap();
    assert!(result.dups.is_empty());
}

#[test]
fn test_same_size_different_head_rejected_by_signature() {
    let tree = TempTree::new("headdiff");
    let mut a = vec![0x33_u8; 200_000];
    let b = a.clone();
    a[0] ^= 0xFF;
    tree.file("a", &a);
    tree.file("b", &b);

    let result = find(&tree.roots(), &FindOpts::default()).unwrap();
    assert!(result.dups.is_empty());
}

#[test]
fn test_empties_need_scan_empties_and_zero_min_size() {
    let tree = TempTree::new("empties");
    tree.file("e1", b"");
    tree.file("e2", b"");

    let off = FindOpts {
        min_size: 0,
        scan_empties: false,
        ..FindOpts::default()
    };
    assert!(find(&tree.roots(), &off).unwrap().dups.is_empty());

    let on = FindOpts {
        min_size: 0,
        scan_empties: true,
        ..FindOpts::default()
    };
    let result = find(&tree.roots(), &on).unwrap();
    assert_eq!(result.dups.len(), 1);
    assert_eq!(result.dups[0].len(), 2);
}

#[test]
fn test_min_and_max_size_bounds() {
    let tree = TempTree::new("bounds");
    tree.file("a", &[1; 50]);
    tree.file("b", &[1; 50]);

    let too_high = FindOpts {
        min_size: 51,
        ..FindOpts::default()
    };
    assert!(find(&tree.roots(), &too_high).unwrap().dups.is_empty());

    let too_low = FindOpts {
        min_size: 1,
        max_size: 49,
        ..FindOpts::default()
    };
    assert!(find(&tree.roots(), &too_low).unwrap().dups.is_empty());

    assert_eq!(find(&tree.roots(), &small_opts()).unwrap().dups.len(), 1);
}

#[test]
fn test_exclude_pattern_rejects() {
    let tree = TempTree::new("exclude");
    let a = tree.file("a.dat", &[7; 300]);
    let b = tree.file("b.dat", &[7; 300]);
    tree.file("a.tmp", &[9; 300]);
    tree.file("b.tmp", &[9; 300]);

    let opts = FindOpts {
        exclude: vec!["*.tmp".to_string()],
        ..small_opts()
    };
    let result = find(&tree.roots(), &opts).unwrap();
    assert_eq!(result.dups.len(), 1);
    assert_eq!(class_sets(&result)[0], set_of(&[&a, &b]));
}

#[test]
fn test_include_pattern_restricts() {
    let tree = TempTree::new("include");
    tree.file("a.dat", &[7; 300]);
    tree.file("b.dat", &[7; 300]);
    let a = tree.file("a.jpg", &[9; 300]);
    let b = tree.file("b.jpg", &[9; 300]);

    let opts = FindOpts {
        include: vec!["*.jpg".to_string()],
        ..small_opts()
    };
    let result = find(&tree.roots(), &opts).unwrap();
    assert_eq!(result.dups.len(), 1);
    assert_eq!(class_sets(&result)[0], set_of(&[&a, &b]));
}

#[test]
fn test_hidden_files_respect_scan_hidden() {
    let tree = TempTree::new("hidden");
    tree.file(".h1", &[5; 300]);
    tree.file(".h2", &[5; 300]);

    let skip = FindOpts {
        scan_hidden: false,
        ..small_opts()
    };
    assert!(find(&tree.roots(), &skip).unwrap().dups.is_empty());

    let result = find(&tree.roots(), &small_opts()).unwrap();
    assert_eq!(result.dups.len(), 1);
}

#[test]
fn test_compare_name_refiner() {
    let tree = TempTree::new("byname");
    tree.file("one/data.bin", &[3; 300]);
    tree.file("two/other.bin", &[3; 300]);

    let opts = FindOpts {
        compare_name: true,
        ..small_opts()
    };
    assert!(find(&tree.roots(), &opts).unwrap().dups.is_empty());

    // same basename in different directories still groups
    let tree = TempTree::new("byname2");
    let a = tree.file("one/data.bin", &[3; 300]);
    let b = tree.file("two/data.bin", &[3; 300]);
    let opts = FindOpts {
        compare_name: true,
        ..small_opts()
    };
    let result = find(&tree.roots(), &opts).unwrap();
    assert_eq!(class_sets(&result)[0], set_of(&[&a, &b]));
}

#[test]
fn test_non_recursive_ignores_directories() {
    let tree = TempTree::new("norec");
    tree.file("sub/a", &[1; 300]);
    tree.file("sub/b", &[1; 300]);

    let opts = FindOpts {
        recursive: false,
        ..small_opts()
    };
    assert!(find(&tree.roots(), &opts).unwrap().dups.is_empty());
}

#[test]
fn test_explicit_file_paths_scanned_without_recursion() {
    let tree = TempTree::new("explicit");
    let a = tree.file("a", &[1; 300]);
    let b = tree.file("b", &[1; 300]);

    let opts = FindOpts {
        recursive: false,
        ..small_opts()
    };
    let result = find(&[a.clone(), b.clone()], &opts).unwrap();
    assert_eq!(result.dups.len(), 1);
    assert_eq!(result.dups[0], vec![a, b]);
}

#[test]
fn test_missing_root_lands_in_scan_errors() {
    let tree = TempTree::new("missing");
    let a = tree.file("a", &[1; 300]);
    let b = tree.file("b", &[1; 300]);
    let ghost = tree.root.join("no-such-dir");

    let result = find(&[tree.root.clone(), ghost.clone()], &small_opts()).unwrap();
    assert_eq!(result.dups.len(), 1);
    assert_eq!(class_sets(&result)[0], set_of(&[&a, &b]));
    assert_eq!(result.scan_errors, vec![ghost]);
}

#[test]
fn test_empty_paths_is_a_configuration_error() {
    assert!(find(&[], &FindOpts::default()).is_err());
}

#[test]
fn test_find_is_idempotent() {
    let tree = TempTree::new("idem");
    tree.file("x/a", &[8; 300]);
    tree.file("x/b", &[8; 300]);
    tree.file("y/c", &[9; 400]);
    tree.file("y/d", &[9; 400]);

    fn as_sets(result: &ResultSet) -> HashSet<std::collections::BTreeSet<PathBuf>> {
        result
            .dups
            .iter()
            .map(|class| class.iter().cloned().collect())
            .collect()
    }

    let first = find(&tree.roots(), &small_opts()).unwrap();
    let second = find(&tree.roots(), &small_opts()).unwrap();
    assert_eq!(first.dups.len(), second.dups.len());
    assert_eq!(as_sets(&first), as_sets(&second));
}

#[test]
fn test_notify_reports_stage_labels() {
    let tree = TempTree::new("notify");
    tree.file("a", &[2; 300]);
    tree.file("b", &[2; 300]);

    let mut labels: Vec<&'static str> = Vec::new();
    let mut notify = |label: &'static str, _n: usize| {
        if labels.last() != Some(&label) {
            labels.push(label);
        }
    };
    let mut hooks = Hooks {
        notify: Some(&mut notify),
        ..Hooks::default()
    };
    find_with_hooks(&tree.roots(), &small_opts(), &mut hooks).unwrap();
    assert_eq!(labels.first(), Some(&"scanning for similar files"));
    assert!(labels.contains(&"filtering files by content"));
    assert_eq!(labels.last(), Some(&"finalizing results"));
}

#[test]
fn test_dupeseek_toml_layers_under_cli() {
    let tree = TempTree::new("toml");
    tree.file(
        ".dupeseek.toml",
        b"[scan]\nmin_size = 5\nscan_empties = true\ncompare_name = true\nexclude = [\"*.bak\"]\n",
    );
    let file = load_dupeseek_toml(&tree.root).unwrap();
    let mut opts = FindOpts::default();
    apply_file_to_opts(&file, &mut opts);
    assert_eq!(opts.min_size, 5);
    assert!(opts.scan_empties);
    assert!(opts.compare_name);
    assert_eq!(opts.exclude, vec!["*.bak".to_string()]);
    // untouched fields keep their defaults
    assert_eq!(opts.max_size, FindOpts::default().max_size);
    assert!(opts.scan_hidden);
}

#[cfg(unix)]
#[test]
fn test_symlinks_candidates_only_with_scan_links() {
    use std::os::unix::fs::symlink;

    let tree = TempTree::new("links");
    tree.file("target", &[6; 300]);
    symlink("target", tree.root.join("l1")).unwrap();
    symlink("target", tree.root.join("l2")).unwrap();

    assert!(find(&tree.roots(), &small_opts()).unwrap().dups.is_empty());

    let opts = FindOpts {
        scan_links: true,
        ..small_opts()
    };
    let result = find(&tree.roots(), &opts).unwrap();
    assert_eq!(result.dups.len(), 1);
    assert_eq!(
        class_sets(&result)[0],
        set_of(&[&tree.root.join("l1"), &tree.root.join("l2")])
    );
}

#[cfg(unix)]
#[test]
fn test_directory_symlink_cycle_terminates() {
    use std::os::unix::fs::symlink;

    let tree = TempTree::new("cycle");
    tree.file("a", &[4; 300]);
    tree.file("b", &[4; 300]);
    std::fs::create_dir_all(tree.root.join("sub")).unwrap();
    symlink(&tree.root, tree.root.join("sub/loop")).unwrap();

    let opts = FindOpts {
        follow_links: true,
        ..small_opts()
    };
    let result = find(&tree.roots(), &opts).unwrap();
    assert_eq!(result.dups.len(), 1);
    assert_eq!(result.dups[0].len(), 2);
}
