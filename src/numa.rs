//! NUMA page placement.
//!
//! Placement is advisory: an out-of-range node identifier is logged and
//! ignored, and the kernel is free to fail the migration of individual
//! pages silently. Placement never fails an allocation.

use crate::span::Span;

/// Highest valid NUMA node identifier on this host.
///
/// Detected by scanning the `/sys/devices/system/node/` entries, so sparse
/// node numbering (`node0`, `node2`, ...) is handled. Hosts without NUMA
/// topology report a single node 0.
pub fn max_node() -> i32 {
  #[cfg(target_os = "linux")]
  {
    sysfs_max_node().unwrap_or(0)
  }

  #[cfg(not(target_os = "linux"))]
  0
}

#[cfg(target_os = "linux")]
fn sysfs_max_node() -> Option<i32> {
  let entries = std::fs::read_dir("/sys/devices/system/node").ok()?;

  entries
    .filter_map(|entry| {
      let name = entry.ok()?.file_name();
      let name = name.to_str()?;

      name.strip_prefix("node")?.parse::<i32>().ok()
    })
    .max()
}

/// Requests that the kernel migrate the physical pages backing `range` to
/// `node`. A negative `node` is a no-op; a node beyond [`max_node`] logs a
/// warning and performs no placement.
pub fn place(
  range: Span,
  node: i32,
) {
  if node < 0 {
    return;
  }

  let max = max_node();

  if node > max {
    log::warn!(
      "cannot place {} bytes on NUMA node {}: host maximum is node {}",
      range.len(),
      node,
      max
    );
    return;
  }

  bind(range, node);
}

#[cfg(target_os = "linux")]
fn bind(
  range: Span,
  node: i32,
) {
  use libc::{c_ulong, c_void};

  const MPOL_BIND: libc::c_int = 2;
  const MPOL_MF_MOVE: libc::c_uint = 1 << 1;
  // Fixed-width nodemask, large enough for any current topology.
  const NODEMASK_BITS: usize = 1024;

  // Placement is advisory and must never panic out of an allocation; a
  // node beyond the mask's capacity is dropped like an out-of-range node.
  if node as usize >= NODEMASK_BITS {
    log::warn!(
      "cannot place {} bytes on NUMA node {}: nodemask capacity is {} nodes",
      range.len(),
      node,
      NODEMASK_BITS
    );
    return;
  }

  let word_bits = 8 * size_of::<c_ulong>();
  let mut mask = [0 as c_ulong; NODEMASK_BITS / (8 * size_of::<c_ulong>())];

  mask[node as usize / word_bits] |= (1 as c_ulong) << (node as usize % word_bits);

  let ret = unsafe {
    libc::syscall(
      libc::SYS_mbind,
      range.base() as *mut c_void,
      range.len() as c_ulong,
      MPOL_BIND,
      mask.as_ptr(),
      NODEMASK_BITS as c_ulong,
      MPOL_MF_MOVE,
    )
  };

  if ret != 0 {
    log::debug!(
      "mbind of {} bytes to node {} failed: {}",
      range.len(),
      node,
      std::io::Error::last_os_error()
    );
  }
}

#[cfg(not(target_os = "linux"))]
fn bind(
  _range: Span,
  _node: i32,
) {
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_max_node_covers_every_sysfs_entry() {
    let max = max_node();

    assert!(max >= 0);

    // Every nodeN entry must be considered valid, including sparse ids.
    #[cfg(target_os = "linux")]
    if let Ok(entries) = std::fs::read_dir("/sys/devices/system/node") {
      for entry in entries.flatten() {
        let name = entry.file_name();

        if let Some(id) = name.to_str().and_then(|n| n.strip_prefix("node")) {
          assert!(id.parse::<i32>().unwrap() <= max);
        }
      }
    }
  }

  #[test]
  fn test_out_of_range_node_is_noop() {
    // No placement side effect to observe; this must simply not crash or
    // touch the (empty) range.
    place(Span::new(std::ptr::null_mut(), 0), i32::MAX);
  }

  #[cfg(target_os = "linux")]
  #[test]
  fn test_bind_beyond_nodemask_capacity_is_noop() {
    // A node id past the fixed nodemask must be dropped, not panic.
    bind(Span::new(std::ptr::null_mut(), 0), 4096);
    bind(Span::new(std::ptr::null_mut(), 0), i32::MAX);
  }
}
