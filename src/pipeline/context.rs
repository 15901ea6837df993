//! Scan context and channel shared between the walk thread and the partitioner.

use crossbeam_channel::{Receiver, Sender, bounded};
use std::path::PathBuf;

use crate::pipeline::admission::AdmissionMatcher;
use crate::types::{FileEntry, FindOpts};
use crate::utils::config::SCAN_CHANNEL_CAP;

/// One result from the scan thread: an admitted candidate or a walk/stat failure.
pub enum ScanOutcome {
    Entry(FileEntry),
    Error { msg: String, path: PathBuf },
}

/// Everything the walk thread needs, moved into it at spawn.
pub struct ScanContext {
    pub roots: Vec<PathBuf>,
    pub opts: FindOpts,
    pub matcher: AdmissionMatcher,
}

pub fn create_scan_channel() -> (Sender<ScanOutcome>, Receiver<ScanOutcome>) {
    bounded(SCAN_CHANNEL_CAP)
}
