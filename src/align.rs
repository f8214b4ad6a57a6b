/// Rounds `value` down to the previous multiple of `align`.
///
/// `align` must be a power of two.
///
/// # Examples
///
/// ```rust
/// use raligned::align_down;
///
/// assert_eq!(align_down!(1028usize, 16), 1024);
/// assert_eq!(align_down!(64usize, 64), 64);
/// ```
#[macro_export]
macro_rules! align_down {
  ($value:expr, $align:expr) => {
    (($value) & !(($align) - 1))
  };
}

/// Rounds `value` up to the next multiple of `align`.
///
/// `align` must be a power of two.
///
/// # Examples
///
/// ```rust
/// use raligned::align_up;
///
/// assert_eq!(align_up!(13usize, 16), 16);
/// assert_eq!(align_up!(0usize, 32), 0);
/// ```
#[macro_export]
macro_rules! align_up {
  ($value:expr, $align:expr) => {
    ((($value) + ($align) - 1) & !(($align) - 1))
  };
}

/// Checks whether `value` is a multiple of `align`.
///
/// `align` must be a power of two.
///
/// # Examples
///
/// ```rust
/// use raligned::is_aligned;
///
/// assert!(is_aligned!(1024usize, 64));
/// assert!(!is_aligned!(1028usize, 64));
/// ```
#[macro_export]
macro_rules! is_aligned {
  ($value:expr, $align:expr) => {
    (($value) & (($align) - 1) == 0)
  };
}

#[cfg(test)]
mod tests {
  #[test]
  fn test_align_up() {
    for align in [1usize, 2, 8, 16, 32, 64, 4096] {
      for value in 0..(3 * align) {
        let rounded = align_up!(value, align);

        assert!(rounded >= value);
        assert!(rounded - value < align);
        assert_eq!(rounded % align, 0);
      }
    }
  }

  #[test]
  fn test_align_down() {
    for align in [1usize, 2, 8, 16, 32, 64, 4096] {
      for value in 0..(3 * align) {
        let rounded = align_down!(value, align);

        assert!(rounded <= value);
        assert!(value - rounded < align);
        assert_eq!(rounded % align, 0);
      }
    }
  }

  #[test]
  fn test_is_aligned() {
    assert!(is_aligned!(0usize, 16));
    assert!(is_aligned!(48usize, 16));
    assert!(!is_aligned!(49usize, 16));
    assert!(is_aligned!(7usize, 1));
  }
}
