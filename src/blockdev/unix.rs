//! POSIX block size probe via statvfs.

use std::ffi::CString;
use std::mem::MaybeUninit;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use anyhow::{Context, Result};

pub(super) fn block_size(path: &Path) -> Result<u64> {
    let cpath = CString::new(path.as_os_str().as_bytes())
        .with_context(|| format!("path contains NUL: {}", path.display()))?;
    let mut vfs = MaybeUninit::<libc::statvfs>::uninit();
    if unsafe { libc::statvfs(cpath.as_ptr(), vfs.as_mut_ptr()) } != 0 {
        return Err(std::io::Error::last_os_error())
            .with_context(|| format!("statvfs {}", path.display()));
    }
    let vfs = unsafe { vfs.assume_init() };
    Ok(vfs.f_bsize as u64)
}
