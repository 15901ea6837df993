//! Sequential read path for content probes: direct I/O where the platform
//! offers it, page-cache advice where it does not, plain buffered reads as the
//! uniform fallback. The `read(buffer)` shape is the same on every path so the
//! hashing code never branches.

use std::alloc::{self, Layout};
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom};
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::ptr::NonNull;

/// Buffer alignment required for direct reads (page size on every target we probe).
const BUF_ALIGN: usize = 4096;

/// Heap buffer aligned for `O_DIRECT` reads. Derefs to `[u8]`.
pub struct AlignedBuf {
    ptr: NonNull<u8>,
    layout: Layout,
}

impl AlignedBuf {
    /// Zero-filled buffer of at least `len` bytes, aligned to [`BUF_ALIGN`].
    pub fn new(len: usize) -> Self {
        let layout = Layout::from_size_align(len.max(BUF_ALIGN), BUF_ALIGN)
            .expect("aligned buffer layout");
        let raw = unsafe { alloc::alloc_zeroed(layout) };
        let ptr = NonNull::new(raw).unwrap_or_else(|| alloc::handle_alloc_error(layout));
        AlignedBuf { ptr, layout }
    }
}

impl Deref for AlignedBuf {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.layout.size()) }
    }
}

impl DerefMut for AlignedBuf {
    fn deref_mut(&mut self) -> &mut [u8] {
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.layout.size()) }
    }
}

impl Drop for AlignedBuf {
    fn drop(&mut self) {
        unsafe { alloc::dealloc(self.ptr.as_ptr(), self.layout) }
    }
}

unsafe impl Send for AlignedBuf {}

#[cfg(unix)]
const DIRECT_READ_REJECTED: i32 = libc::EINVAL;
#[cfg(not(unix))]
const DIRECT_READ_REJECTED: i32 = 0;

/// A file opened for one front-to-back scan.
pub struct SequentialReader {
    file: File,
    path: PathBuf,
    offset: u64,
    direct: bool,
}

impl SequentialReader {
    /// Open for sequential scanning. Linux tries `O_DIRECT` first and advises
    /// `POSIX_FADV_SEQUENTIAL`; macOS sets `F_NOCACHE`; Windows opens with
    /// `FILE_FLAG_SEQUENTIAL_SCAN`.
    pub fn open(path: &Path) -> io::Result<Self> {
        #[cfg(target_os = "linux")]
        {
            use std::os::unix::fs::OpenOptionsExt;
            match OpenOptions::new()
                .read(true)
                .custom_flags(libc::O_DIRECT)
                .open(path)
            {
                Ok(file) => {
                    advise_sequential(&file);
                    return Ok(SequentialReader {
                        file,
                        path: path.to_path_buf(),
                        offset: 0,
                        direct: true,
                    });
                }
                Err(err) if err.kind() == io::ErrorKind::NotFound => return Err(err),
                // EINVAL/EPERM: the filesystem refuses direct reads.
                Err(_) => {}
            }
        }
        let file = open_buffered(path)?;
        #[cfg(target_os = "linux")]
        advise_sequential(&file);
        Ok(SequentialReader {
            file,
            path: path.to_path_buf(),
            offset: 0,
            direct: false,
        })
    }

    /// Read the next chunk. With direct I/O active, `buf` must come from an
    /// [`AlignedBuf`]; a kernel rejection mid-stream falls back to buffered
    /// reads at the current offset.
    pub fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = match self.file.read(buf) {
            Ok(n) => n,
            Err(err) if self.direct && err.raw_os_error() == Some(DIRECT_READ_REJECTED) => {
                self.fall_back()?;
                self.file.read(buf)?
            }
            Err(err) => return Err(err),
        };
        self.forget_cached(n);
        self.offset += n as u64;
        Ok(n)
    }

    fn fall_back(&mut self) -> io::Result<()> {
        let mut file = open_buffered(&self.path)?;
        file.seek(SeekFrom::Start(self.offset))?;
        self.file = file;
        self.direct = false;
        Ok(())
    }

    #[cfg(target_os = "linux")]
    fn forget_cached(&self, n: usize) {
        use std::os::fd::AsRawFd;
        if n > 0 {
            unsafe {
                libc::posix_fadvise(
                    self.file.as_raw_fd(),
                    self.offset as i64,
                    n as i64,
                    libc::POSIX_FADV_DONTNEED,
                );
            }
        }
    }

    #[cfg(not(target_os = "linux"))]
    fn forget_cached(&self, _n: usize) {}
}

#[cfg(target_os = "linux")]
fn advise_sequential(file: &File) {
    use std::os::fd::AsRawFd;
    unsafe {
        libc::posix_fadvise(file.as_raw_fd(), 0, 0, libc::POSIX_FADV_SEQUENTIAL);
    }
}

fn open_buffered(path: &Path) -> io::Result<File> {
    #[cfg(target_os = "macos")]
    {
        use std::os::fd::AsRawFd;
        let file = OpenOptions::new().read(true).open(path)?;
        unsafe {
            libc::fcntl(file.as_raw_fd(), libc::F_NOCACHE, 1);
        }
        Ok(file)
    }
    #[cfg(windows)]
    {
        use std::os::windows::fs::OpenOptionsExt;
        const FILE_FLAG_SEQUENTIAL_SCAN: u32 = 0x0800_0000;
        OpenOptions::new()
            .read(true)
            .custom_flags(FILE_FLAG_SEQUENTIAL_SCAN)
            .open(path)
    }
    #[cfg(not(any(target_os = "macos", windows)))]
    {
        OpenOptions::new().read(true).open(path)
    }
}
