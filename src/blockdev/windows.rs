//! Windows block size probe.
//!
//! sysinfo exposes no per-volume cluster facts, so this reports the NTFS
//! default cluster size; the hashing buffer formula absorbs the difference.

use std::path::Path;

use anyhow::Result;

use crate::utils::config::IoConsts;

pub(super) fn block_size(_path: &Path) -> Result<u64> {
    Ok(IoConsts::FALLBACK_BLK)
}
