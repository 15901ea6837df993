//! Per-block-device facts used to size refinement reads.
//!
//! Keyed by the device id from lstat: the first access for a device resolves
//! the underlying block device name from the partition table, then the optimal
//! block size for that device. Both are cached for the rest of the run.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use log::debug;
use sysinfo::Disks;

use crate::types::FileEntry;
use crate::utils::config::{DEVICE_CACHE_CAPACITY, IoConsts};

// Platform-specific block size probes
#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows;

#[cfg(unix)]
use unix as imp;
#[cfg(windows)]
use windows as imp;

/// Resolves device facts for a path. The engine takes this as a trait so tests
/// can inject a mock instead of probing real disks.
pub trait BlockResolver: Send + Sync {
    /// Name of the block device backing the path's mount point.
    fn block_device(&self, path: &Path) -> Result<String>;
    /// Optimal I/O block size for the path's filesystem, in bytes.
    fn block_size(&self, path: &Path) -> Result<u64>;
}

/// Probes the live system: partition table via sysinfo, block size via the
/// platform interface (statvfs on POSIX).
pub struct SystemResolver;

impl BlockResolver for SystemResolver {
    fn block_device(&self, path: &Path) -> Result<String> {
        let disks = Disks::new_with_refreshed_list();
        let path_str = path.to_string_lossy();
        let disk = disks
            .iter()
            .filter(|d| path_str.starts_with(d.mount_point().to_string_lossy().as_ref()))
            .max_by_key(|d| d.mount_point().to_string_lossy().len())
            .with_context(|| format!("no mounted device for {}", path.display()))?;
        let name = disk.name().to_string_lossy();
        let block = name.rsplit('/').next().unwrap_or_default();
        Ok(block.to_string())
    }

    fn block_size(&self, path: &Path) -> Result<u64> {
        imp::block_size(path)
    }
}

#[derive(Default)]
struct CacheState {
    held: usize,
    devices: HashMap<u64, String>,
    info: HashMap<String, u64>,
}

/// Process-scoped cache of `device id → block device → block size`, bounded at
/// `capacity` devices. While a [`CacheHold`] guard is out, [`clear`](Self::clear)
/// refuses; when the last guard drops, the cache evicts if over capacity.
pub struct DeviceCache {
    resolver: Box<dyn BlockResolver>,
    capacity: usize,
    state: Mutex<CacheState>,
}

impl DeviceCache {
    pub fn new() -> Self {
        Self::with_resolver(Box::new(SystemResolver), DEVICE_CACHE_CAPACITY)
    }

    pub fn with_resolver(resolver: Box<dyn BlockResolver>, capacity: usize) -> Self {
        DeviceCache {
            resolver,
            capacity,
            state: Mutex::new(CacheState::default()),
        }
    }

    /// Block size for the entry's device. Entries without a device id (Windows)
    /// bypass the cache and probe per path. Probe failures fall back to
    /// [`IoConsts::FALLBACK_BLK`].
    pub fn block_size_for(&self, entry: &FileEntry) -> u64 {
        if entry.dev == 0 {
            return self
                .resolver
                .block_size(&entry.path)
                .unwrap_or(IoConsts::FALLBACK_BLK);
        }
        let mut state = self.state.lock().unwrap();
        let block = match state.devices.get(&entry.dev) {
            Some(block) => block.clone(),
            None => {
                let block = match self.resolver.block_device(&entry.path) {
                    Ok(block) => block,
                    Err(err) => {
                        debug!("block device lookup failed for {}: {err}", entry.path.display());
                        String::new()
                    }
                };
                state.devices.insert(entry.dev, block.clone());
                block
            }
        };
        match state.info.get(&block) {
            Some(size) => *size,
            None => {
                let size = self
                    .resolver
                    .block_size(&entry.path)
                    .unwrap_or(IoConsts::FALLBACK_BLK);
                state.info.insert(block, size);
                size
            }
        }
    }

    /// Guard spanning a refinement pass; eviction only happens between passes.
    pub fn hold(&self) -> CacheHold<'_> {
        self.state.lock().unwrap().held += 1;
        CacheHold { cache: self }
    }

    /// Drop all cached facts. Refused (returns false) while a hold guard is out.
    pub fn clear(&self) -> bool {
        let mut state = self.state.lock().unwrap();
        if state.held > 0 {
            return false;
        }
        state.devices.clear();
        state.info.clear();
        true
    }

    /// Number of devices currently tracked.
    pub fn len(&self) -> usize {
        self.state.lock().unwrap().devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn release(&self) {
        let mut state = self.state.lock().unwrap();
        state.held = state.held.saturating_sub(1);
        if state.held == 0 && state.devices.len() > self.capacity {
            state.devices.clear();
            state.info.clear();
        }
    }
}

impl Default for DeviceCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Keeps the cache pinned for the duration of a refinement pass.
pub struct CacheHold<'a> {
    cache: &'a DeviceCache,
}

impl Drop for CacheHold<'_> {
    fn drop(&mut self) {
        self.cache.release();
    }
}
