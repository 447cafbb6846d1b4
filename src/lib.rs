//! # mmap-region - Aligned, Guarded mmap Regions
//!
//! This crate provides one primitive: a contiguous block of virtual address
//! space, aligned to an arbitrary power-of-two boundary, backed by anonymous
//! memory or a file descriptor, optionally shared across processes,
//! optionally placed on a specific NUMA node, and always followed by one
//! inaccessible guard page that turns tail overruns into immediate faults.
//!
//! ## Overview
//!
//! `mmap` aligns to the page size and nothing more, so an aligned region is
//! carved out of an over-sized `PROT_NONE` reservation:
//!
//! ```text
//!   Carving an aligned region:
//!
//!   reservation (PROT_NONE, size + align bytes)
//!   ┌──────────┬───────────────────────────────┬───────┬───────────────┐
//!   │ leading  │         usable region         │ guard │   trailing    │
//!   │ padding  │        (PROT_READ|WRITE)      │ page  │    excess     │
//!   └──────────┴───────────────────────────────┴───────┴───────────────┘
//!   ▲          ▲                               ▲
//!   │          │                               │
//!   mmap       first align-aligned             left PROT_NONE,
//!   placement  address: returned base          never remapped
//!
//!   Padding and excess are unmapped before the call returns; the usable
//!   region and its guard page stay adjacent until release.
//! ```
//!
//! The reservation is `size + align` bytes, so an aligned `size`-byte
//! sub-range always exists inside it no matter where the kernel places the
//! mapping. The guard page needs no extra syscall: it is simply the one
//! reservation page after the region that never receives read/write
//! permission.
//!
//! ## Crate Structure
//!
//! ```text
//!   mmap-region
//!   ├── align      - alignment arithmetic (align_up)
//!   ├── span       - (base, length) address-range value type
//!   ├── page       - host and per-descriptor page size detection
//!   ├── numa       - advisory NUMA page placement
//!   ├── error      - MapError
//!   └── region     - RegionAllocator and release
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mmap_region::{RegionAllocator, release};
//!
//! let page = mmap_region::host_page_size();
//! let allocator = RegionAllocator::new();
//!
//! let base = allocator.allocate(None, 16 * page, page, false)?;
//!
//! // base is page-aligned; the 16 pages are readable and writable, and
//! // the page right after them faults on any access.
//!
//! unsafe { release(base.as_ptr(), 16 * page) };
//! # Ok::<(), mmap_region::MapError>(())
//! ```
//!
//! For a file on hugetlbfs, ask [`fd_page_size`] for the backing page size
//! and request at least that much alignment.
//!
//! ## Ownership
//!
//! The crate keeps no registry of live regions. The caller owns a returned
//! region until it passes the base pointer and the *original* `size` back to
//! [`release`]; the guard page is bundled with the region and released by
//! the same call. Releasing a null pointer is a safe no-op.
//!
//! ## Limitations
//!
//! - **Unix-only**: built directly on `libc::mmap`; NUMA placement and
//!   hugetlbfs detection are Linux-specific and degrade gracefully
//!   elsewhere.
//! - **No sub-allocation**: every region is its own mapping; this is not a
//!   general-purpose allocator.
//! - **Caller-tracked sizes**: releasing with a different `size` than was
//!   allocated corrupts unrelated address space.

pub mod align;
mod error;
pub mod numa;
pub mod page;
mod region;
mod span;

pub use error::MapError;
pub use page::{fd_page_size, host_page_size};
pub use region::{RegionAllocator, ReserveMode, release};
pub use span::Span;
