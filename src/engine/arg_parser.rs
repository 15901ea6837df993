use clap::Parser;
use std::path::PathBuf;

/// Multi-stage duplicate file finder.
#[derive(Clone, Parser)]
#[command(name = "dupeseek")]
#[command(about = "Find byte-identical duplicate files; use --purge to delete the extras.")]
pub struct Cli {
    /// Files or directories to scan.
    #[arg(value_name = "PATH", required = true, num_args = 1..)]
    pub paths: Vec<PathBuf>,

    /// Minimum size of files to scan, in bytes. Default: 100 KiB.
    #[arg(long, short = 's')]
    pub min_size: Option<u64>,

    /// Maximum size of files to scan, in bytes. Default: 100 GiB.
    #[arg(long, short = 'S')]
    pub max_size: Option<u64>,

    /// Wildcard pattern of files to include. Can specify multiple: -i '*.jpg' '*.png'
    #[arg(long, short = 'i', num_args = 1..)]
    pub include: Vec<String>,

    /// Wildcard pattern of files to exclude. Can specify multiple: -e '*.tmp' 'cache*'
    #[arg(long, short = 'e', num_args = 1..)]
    pub exclude: Vec<String>,

    /// Group only files that also share their name.
    #[arg(long, short = 'n')]
    pub compare_name: bool,

    /// Group only files that also share their modification time.
    #[arg(long, short = 'm')]
    pub compare_mtime: bool,

    /// Group only files that also share their permission mode.
    #[arg(long, short = 'p')]
    pub compare_mode: bool,

    /// Scan directories recursively.
    #[arg(long, short = 'r')]
    pub recursive: bool,

    /// Follow symbolic links pointing to directories.
    #[arg(long)]
    pub follow_links: bool,

    /// Scan symbolic links pointing to files.
    #[arg(long)]
    pub scan_links: bool,

    /// Scan empty files. Effective together with --min-size 0.
    #[arg(long)]
    pub scan_empties: bool,

    /// Skip OS/system files.
    #[arg(long)]
    pub ignore_system: bool,

    /// Skip archived files.
    #[arg(long)]
    pub ignore_archived: bool,

    /// Skip hidden files.
    #[arg(long)]
    pub ignore_hidden: bool,

    /// Delete the extras of each class, keeping the first-encountered file.
    #[arg(long)]
    pub purge: bool,

    /// With --purge, delete permanently instead of moving to the system trash.
    #[arg(long)]
    pub no_trash: bool,

    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,

    /// Verbose output with per-stage progress. Default: false.
    #[arg(long, short = 'v')]
    pub verbose: bool,
}
