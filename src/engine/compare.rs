//! Shallow-false comparison: byte-for-byte equality, stat metadata ignored.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use crate::utils::config::IoConsts;

/// Read until the buffer is full or EOF; short reads and EINTR are retried.
fn read_full(file: &mut File, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut total = 0;
    while total < buf.len() {
        match file.read(&mut buf[total..]) {
            Ok(0) => break,
            Ok(n) => total += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
    Ok(total)
}

/// Stream both files and compare block by block.
pub fn files_equal(a: &Path, b: &Path) -> Result<bool> {
    let mut fa = File::open(a).with_context(|| format!("open {}", a.display()))?;
    let mut fb = File::open(b).with_context(|| format!("open {}", b.display()))?;
    let mut ba = vec![0u8; IoConsts::COMPARE_BLK];
    let mut bb = vec![0u8; IoConsts::COMPARE_BLK];
    loop {
        let na = read_full(&mut fa, &mut ba).with_context(|| format!("read {}", a.display()))?;
        let nb = read_full(&mut fb, &mut bb).with_context(|| format!("read {}", b.display()))?;
        if na != nb || ba[..na] != bb[..nb] {
            return Ok(false);
        }
        if na == 0 {
            return Ok(true);
        }
    }
}
