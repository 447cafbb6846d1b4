use crate::align::align_up;

/// A contiguous range of virtual address space, `(base, len)`.
///
/// The carving algorithm in [`crate::RegionAllocator`] is expressed entirely
/// in terms of `Span` operations so that the guard-page boundary never comes
/// out of ad hoc pointer arithmetic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
  base: *mut u8,
  len: usize,
}

impl Span {
  pub fn new(
    base: *mut u8,
    len: usize,
  ) -> Self {
    Self { base, len }
  }

  pub fn base(&self) -> *mut u8 {
    self.base
  }

  pub fn len(&self) -> usize {
    self.len
  }

  pub fn is_empty(&self) -> bool {
    self.len == 0
  }

  /// Distance from `base` to the first `align`-aligned address inside the
  /// span. Always in `[0, align)`; a span of length `size + align` therefore
  /// always contains an aligned sub-span of `size` bytes.
  pub fn aligned_offset(
    &self,
    align: usize,
  ) -> usize {
    let base = self.base as usize;

    align_up(base, align) - base
  }

  /// Splits the span into its first `n` bytes and the remainder.
  ///
  /// # Panics
  ///
  /// Panics if `n > self.len()`.
  pub fn split_at(
    &self,
    n: usize,
  ) -> (Span, Span) {
    assert!(n <= self.len, "split point {} beyond span length {}", n, self.len);

    let front = Span::new(self.base, n);
    let rest = Span::new(self.base.wrapping_add(n), self.len - n);

    (front, rest)
  }
}
