//! Content probes: signature window, side-sum slices, streaming whole-file sum.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use crate::engine::readers::{AlignedBuf, SequentialReader};
use crate::types::FileEntry;
use crate::utils::config::{IoConsts, SizeConsts};

#[cfg(not(target_pointer_width = "32"))]
type SumState = xxhash_rust::xxh64::Xxh64;
#[cfg(target_pointer_width = "32")]
type SumState = xxhash_rust::xxh32::Xxh32;

/// Streaming non-cryptographic content sum (xxh64; xxh32 state on 32-bit hosts).
/// Collisions are tolerable here: a duplicate is only ever confirmed by the
/// byte-for-byte stage.
pub struct ContentSum {
    state: SumState,
}

impl ContentSum {
    pub fn new() -> Self {
        ContentSum {
            state: SumState::new(0),
        }
    }

    pub fn update(&mut self, data: &[u8]) {
        self.state.update(data);
    }

    pub fn digest(&self) -> u64 {
        self.state.digest() as u64
    }
}

impl Default for ContentSum {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot sum of a byte slice.
pub fn content_sum(data: &[u8]) -> u64 {
    let mut sum = ContentSum::new();
    sum.update(data);
    sum.digest()
}

/// Sum of a symlink's target text (the link itself, never the referent).
fn link_sum(path: &Path) -> Result<u64> {
    let target =
        fs::read_link(path).with_context(|| format!("read link {}", path.display()))?;
    Ok(content_sum(target.as_os_str().as_encoded_bytes()))
}

/// Signature: sum over the first and last [`IoConsts::SIGNATURE_WINDOW`] bytes.
/// Files no larger than both windows are summed whole.
pub fn signature(entry: &FileEntry) -> Result<u64> {
    if entry.is_symlink {
        return link_sum(&entry.path);
    }
    let window = IoConsts::SIGNATURE_WINDOW;
    let mut file = File::open(&entry.path)?;
    let mut sum = ContentSum::new();
    if entry.size <= 2 * window as u64 {
        let mut data = Vec::with_capacity(entry.size as usize);
        file.read_to_end(&mut data)?;
        sum.update(&data);
    } else {
        let mut buf = vec![0u8; window];
        file.read_exact(&mut buf)?;
        sum.update(&buf);
        file.seek(SeekFrom::End(-(window as i64)))?;
        file.read_exact(&mut buf)?;
        sum.update(&buf);
    }
    Ok(sum.digest())
}

/// Slice length for the side-sum rule: `SIZE_RATE` percent of the file, snapped
/// down to a block multiple when it exceeds one device block, then halved.
pub fn chunk_size(size: u64, blk: u64) -> u64 {
    let mut n = (size * SizeConsts::SIZE_RATE).div_ceil(100);
    if blk > 0 && blk < n {
        n -= n % blk;
    }
    n / 2
}

/// Side-sum: separate sums over the head `chunk` bytes and the tail `chunk` bytes.
pub fn sidesum(entry: &FileEntry, chunk: u64) -> Result<(u64, u64)> {
    let mut file = File::open(&entry.path)?;
    let mut buf = vec![0u8; chunk as usize];
    file.read_exact(&mut buf)?;
    let head = content_sum(&buf);
    file.seek(SeekFrom::End(-(chunk as i64)))?;
    file.read_exact(&mut buf)?;
    let tail = content_sum(&buf);
    Ok((head, tail))
}

/// Buffer size for streaming hashing: the device block size when it exceeds the
/// base buffer, otherwise the base buffer snapped down to a block multiple.
pub fn hash_bufsize(blk: u64) -> usize {
    let blk = (blk.max(1)) as usize;
    if blk > IoConsts::HASH_BLK {
        blk
    } else {
        IoConsts::HASH_BLK - IoConsts::HASH_BLK % blk
    }
}

/// Whole-file streaming sum through the sequential read path. Symlinks are
/// summed over their target text.
pub fn checksum(entry: &FileEntry, blk: u64) -> Result<u64> {
    if entry.is_symlink {
        return link_sum(&entry.path);
    }
    let mut reader = SequentialReader::open(&entry.path)?;
    let mut buf = AlignedBuf::new(hash_bufsize(blk));
    let mut sum = ContentSum::new();
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        sum.update(&buf[..n]);
    }
    Ok(sum.digest())
}
