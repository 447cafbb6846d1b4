//! Page granularity detection.
//!
//! Mappings of a hugetlbfs-backed descriptor use the huge page size of that
//! filesystem instead of the host page size; callers consult
//! [`fd_page_size`] before choosing an alignment for a file-backed region.

use std::os::unix::io::RawFd;

#[cfg(target_os = "linux")]
const HUGETLBFS_MAGIC: u64 = 0x958458f6;

/// The host's standard page size in bytes.
pub fn host_page_size() -> usize {
  unsafe { libc::sysconf(libc::_SC_PAGESIZE) as usize }
}

/// The page size that mappings of `fd` will use.
///
/// Returns the hugetlbfs block size when `fd` lives on hugetlbfs, and the
/// host's standard page size for any other descriptor or for `None`. Never
/// fails; errors from the filesystem query fall through to the standard
/// page size.
pub fn fd_page_size(fd: Option<RawFd>) -> usize {
  #[cfg(target_os = "linux")]
  if let Some(fd) = fd {
    if let Some(size) = hugetlbfs_page_size(fd) {
      return size;
    }
  }

  #[cfg(not(target_os = "linux"))]
  let _ = fd;

  host_page_size()
}

#[cfg(target_os = "linux")]
fn hugetlbfs_page_size(fd: RawFd) -> Option<usize> {
  use std::{io, mem};

  let mut fs: libc::statfs = unsafe { mem::zeroed() };

  // fstatfs can be interrupted by a signal; retry on EINTR.
  loop {
    let ret = unsafe { libc::fstatfs(fd, &mut fs) };

    if ret == 0 {
      break;
    }

    if io::Error::last_os_error().raw_os_error() != Some(libc::EINTR) {
      return None;
    }
  }

  if fs.f_type as u64 == HUGETLBFS_MAGIC {
    Some(fs.f_bsize as usize)
  } else {
    None
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::fs::File;
  use std::os::unix::io::{AsRawFd, FromRawFd};

  fn memfd() -> File {
    let fd = unsafe { libc::memfd_create(c"mmap-region-test".as_ptr(), 0) };

    assert!(fd >= 0, "memfd_create failed");

    unsafe { File::from_raw_fd(fd) }
  }

  #[test]
  fn test_host_page_size() {
    let page = host_page_size();

    assert!(page.is_power_of_two());
    assert!(page >= 4096);
  }

  #[test]
  fn test_no_fd_reports_host_page_size() {
    assert_eq!(host_page_size(), fd_page_size(None));
  }

  #[test]
  fn test_regular_fd_reports_host_page_size() {
    let file = memfd();

    assert_eq!(host_page_size(), fd_page_size(Some(file.as_raw_fd())));
  }
}
