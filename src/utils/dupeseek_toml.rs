//! Load `.dupeseek.toml` defaults from the working directory (CLI only). The
//! library injects options through [`FindOpts`] directly.

use serde::Deserialize;
use std::path::Path;

use crate::FindOpts;

#[derive(Debug, Deserialize)]
pub struct DupeseekToml {
    #[serde(default)]
    scan: ScanSection,
}

#[derive(Debug, Default, Deserialize)]
struct ScanSection {
    min_size: Option<u64>,
    max_size: Option<u64>,
    include: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
    compare_name: Option<bool>,
    compare_mtime: Option<bool>,
    compare_mode: Option<bool>,
    recursive: Option<bool>,
    follow_links: Option<bool>,
    scan_links: Option<bool>,
    scan_empties: Option<bool>,
    scan_system: Option<bool>,
    scan_archived: Option<bool>,
    scan_hidden: Option<bool>,
}

/// Load `.dupeseek.toml` from `dir` if present. Returns None if the file is
/// missing or malformed (malformed files are logged and ignored).
pub fn load_dupeseek_toml(dir: &Path) -> Option<DupeseekToml> {
    let path = dir.join(".dupeseek.toml");
    let s = std::fs::read_to_string(&path).ok()?;
    toml::from_str(&s)
        .map_err(|e| log::warn!("{}: {}", path.display(), e))
        .ok()
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($scan:expr, $opts:expr, $field:ident) => {
        if let Some(v) = $scan.$field {
            $opts.$field = v;
        }
    };
}

/// Apply file config to opts (only fields present in the file). Call before
/// applying CLI flags so the command line wins.
pub fn apply_file_to_opts(file: &DupeseekToml, opts: &mut FindOpts) {
    let scan = &file.scan;
    apply_file_opt!(scan, opts, min_size);
    apply_file_opt!(scan, opts, max_size);
    if let Some(ref v) = scan.include {
        opts.include = v.clone();
    }
    if let Some(ref v) = scan.exclude {
        opts.exclude = v.clone();
    }
    apply_file_opt!(scan, opts, compare_name);
    apply_file_opt!(scan, opts, compare_mtime);
    apply_file_opt!(scan, opts, compare_mode);
    apply_file_opt!(scan, opts, recursive);
    apply_file_opt!(scan, opts, follow_links);
    apply_file_opt!(scan, opts, scan_links);
    apply_file_opt!(scan, opts, scan_empties);
    apply_file_opt!(scan, opts, scan_system);
    apply_file_opt!(scan, opts, scan_archived);
    apply_file_opt!(scan, opts, scan_hidden);
}
