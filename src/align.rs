/// Rounds `value` up to the next multiple of `align`.
///
/// `align` must be a power of two.
///
/// # Examples
///
/// ```rust
/// use mmap_region::align::align_up;
///
/// assert_eq!(align_up(0, 4096), 0);
/// assert_eq!(align_up(1, 4096), 4096);
/// assert_eq!(align_up(4096, 4096), 4096);
/// assert_eq!(align_up(4097, 4096), 8192);
/// ```
#[inline]
pub fn align_up(
  value: usize,
  align: usize,
) -> usize {
  debug_assert!(align.is_power_of_two());

  (value + align - 1) & !(align - 1)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_align_up() {
    let align = 4096;

    let mut cases = Vec::new();

    for i in 0..10 {
      let values = (align * i + 1)..=(align * (i + 1));

      let expected = align * (i + 1);

      cases.push((values, expected));
    }

    for (values, expected) in cases {
      for value in values.step_by(509) {
        assert_eq!(expected, align_up(value, align));
      }
    }
  }

  #[test]
  fn test_align_up_zero() {
    assert_eq!(0, align_up(0, 4096));
    assert_eq!(0, align_up(0, 1));
  }

  #[test]
  fn test_align_up_already_aligned() {
    for shift in 0..20 {
      let align = 1usize << shift;
      assert_eq!(align * 7, align_up(align * 7, align));
    }
  }
}
