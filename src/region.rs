use std::io;
use std::os::unix::io::RawFd;
use std::ptr::{self, NonNull};

use libc::c_void;

use crate::align::align_up;
use crate::error::MapError;
use crate::numa;
use crate::page;
use crate::span::Span;

/// Strategy for creating the `PROT_NONE` reservation the aligned region is
/// carved out of.
///
/// Selected once from platform capability detection ([`ReserveMode::host`]);
/// the carving algorithm itself is identical across platforms.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReserveMode {
  /// Reserve with plain anonymous memory.
  Anonymous,
  /// Reserve by mapping the caller's descriptor with `MAP_NORESERVE` when
  /// its page size differs from the host page size. On ppc64, mappings in
  /// the same segment must share a page size, so the reservation for a
  /// huge-page-backed descriptor must itself come from that descriptor.
  MatchFdPageSize,
}

impl ReserveMode {
  pub fn host() -> Self {
    if cfg!(all(target_arch = "powerpc64", target_os = "linux")) {
      ReserveMode::MatchFdPageSize
    } else {
      ReserveMode::Anonymous
    }
  }
}

/// Allocates aligned regions of virtual address space, each followed by one
/// inaccessible guard page.
///
/// The allocator itself is stateless apart from two configuration values
/// fixed at construction, so a single instance may be shared freely across
/// threads.
#[derive(Clone, Copy, Debug)]
pub struct RegionAllocator {
  eager_populate: bool,
  reserve_mode: ReserveMode,
}

impl Default for RegionAllocator {
  fn default() -> Self {
    Self::new()
  }
}

impl RegionAllocator {
  pub fn new() -> Self {
    Self {
      eager_populate: false,
      reserve_mode: ReserveMode::host(),
    }
  }

  /// Zero-fill every region at allocation time, forcing immediate physical
  /// backing instead of lazy fault-in. Off by default.
  pub fn eager_populate(
    mut self,
    on: bool,
  ) -> Self {
    self.eager_populate = on;
    self
  }

  pub fn reserve_mode(
    mut self,
    mode: ReserveMode,
  ) -> Self {
    self.reserve_mode = mode;
    self
  }

  /// Maps `size` bytes aligned to `align`, backed by `fd` if supplied (else
  /// anonymous), shared or private per `shared`, followed by one
  /// inaccessible guard page.
  ///
  /// On success the caller owns the region until it passes the base pointer
  /// and the same `size` to [`release`]. `size` is not rounded; a zero
  /// `size` is passed through to `mmap` untouched and rejecting it is the
  /// caller's responsibility.
  ///
  /// # Panics
  ///
  /// Panics if `align` is not a power of two or is smaller than the host
  /// page size. These are call-site bugs, not recoverable failures.
  pub fn allocate(
    &self,
    fd: Option<RawFd>,
    size: usize,
    align: usize,
    shared: bool,
  ) -> Result<NonNull<u8>, MapError> {
    self.mmap_aligned(fd, size, align, shared, -1)
  }

  /// [`RegionAllocator::allocate`] with anonymous backing plus NUMA
  /// placement of the region's pages on `node` when `node >= 0`.
  ///
  /// Placement is advisory and never turns a successful allocation into a
  /// failure; an out-of-range `node` is logged and ignored.
  pub fn allocate_on_node(
    &self,
    size: usize,
    align: usize,
    shared: bool,
    node: i32,
  ) -> Result<NonNull<u8>, MapError> {
    self.mmap_aligned(None, size, align, shared, node)
  }

  fn mmap_aligned(
    &self,
    fd: Option<RawFd>,
    size: usize,
    align: usize,
    shared: bool,
    node: i32,
  ) -> Result<NonNull<u8>, MapError> {
    let page = page::host_page_size();

    assert!(align.is_power_of_two(), "alignment {} is not a power of two", align);
    assert!(align >= page, "alignment {} is below the host page size {}", align, page);

    // The reservation always has room for an aligned sub-range of `size`
    // bytes, even in the worst case where the kernel places it one byte
    // past an alignment boundary.
    let total = size.checked_add(align).expect("size + alignment overflows usize");

    let reservation = self.reserve(fd, total)?;
    let offset = reservation.aligned_offset(align);

    let usable = unsafe {
      libc::mmap(
        reservation.base().add(offset) as *mut c_void,
        size,
        libc::PROT_READ | libc::PROT_WRITE,
        libc::MAP_FIXED
          | if fd.is_none() { libc::MAP_ANONYMOUS } else { 0 }
          | if shared { libc::MAP_SHARED } else { libc::MAP_PRIVATE },
        fd.unwrap_or(-1),
        0,
      )
    };

    if usable == libc::MAP_FAILED {
      let err = io::Error::last_os_error();

      unsafe {
        libc::munmap(reservation.base() as *mut c_void, reservation.len());
      }

      return Err(MapError::MapFailed(err));
    }

    // Placement covers the pre-trim reservation, matching the fixed
    // mapping's pages plus whatever padding is about to be unmapped.
    numa::place(reservation, node);

    if self.eager_populate {
      unsafe {
        ptr::write_bytes(usable as *mut u8, 0, size);
      }
    }

    let (lead, kept) = reservation.split_at(offset);

    if !lead.is_empty() {
      unsafe {
        libc::munmap(lead.base() as *mut c_void, lead.len());
      }
    }

    // Keep the region's pages plus exactly one trailing PROT_NONE page.
    // That page never received read/write permission in the fixed mapping
    // above, so it is the guard page with no further syscall.
    let keep = align_up(size, page) + page;

    if kept.len() > keep {
      let (_, excess) = kept.split_at(keep);

      unsafe {
        libc::munmap(excess.base() as *mut c_void, excess.len());
      }
    }

    log::trace!(
      "mapped {} bytes aligned to {} at {:p}, guard page at {:p}",
      size,
      align,
      kept.base(),
      kept.base().wrapping_add(keep - page),
    );

    // A MAP_FIXED mapping at a successful reservation's address is never
    // at address zero.
    Ok(unsafe { NonNull::new_unchecked(kept.base()) })
  }

  fn reserve(
    &self,
    fd: Option<RawFd>,
    total: usize,
  ) -> Result<Span, MapError> {
    let (flags, reserve_fd) = match (self.reserve_mode, fd) {
      (ReserveMode::MatchFdPageSize, Some(fd))
        if page::fd_page_size(Some(fd)) != page::host_page_size() =>
      {
        // Reserve address space from the descriptor itself without
        // committing backing store, so the segment keeps a uniform page
        // size.
        (libc::MAP_NORESERVE, fd)
      }
      _ => (libc::MAP_ANONYMOUS, -1),
    };

    let base = unsafe {
      libc::mmap(
        ptr::null_mut(),
        total,
        libc::PROT_NONE,
        flags | libc::MAP_PRIVATE,
        reserve_fd,
        0,
      )
    };

    if base == libc::MAP_FAILED {
      return Err(MapError::ReserveFailed(io::Error::last_os_error()));
    }

    // The kernel rounds the mapping up to whole pages; track what was
    // actually mapped so the tail trim unmaps all of it.
    let mapped = align_up(total, page::host_page_size());

    Ok(Span::new(base as *mut u8, mapped))
  }
}

/// Releases a region previously returned by [`RegionAllocator::allocate`]
/// together with its guard page.
///
/// A null `ptr` is a no-op. `size` must be exactly the value passed to the
/// original allocation; a different value unmaps unrelated address space,
/// which is a caller contract violation, not a detectable error.
///
/// # Safety
///
/// `ptr` must be null or a base pointer obtained from this crate's
/// allocation calls that has not already been released, and `size` must
/// match the original request.
pub unsafe fn release(
  ptr: *mut u8,
  size: usize,
) {
  if ptr.is_null() {
    return;
  }

  // One munmap covers the region and the adjoining guard page.
  unsafe {
    libc::munmap(ptr as *mut c_void, size + page::host_page_size());
  }
}
