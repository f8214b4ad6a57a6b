//! Splitting arrays around vector-block boundaries.
//!
//! A vectorized loop over `[T]` processes `block_size` scalars at a time and
//! wants every block to start on a block boundary. Elements before the first
//! such boundary are handled one by one:
//!
//! ```text
//!   block_size = 4, size_of::<T>() = 4
//!
//!   address  1028 1032 1036 │1040 1044 1048 1052│1056 ... │ ...  end
//!            ┌────┬────┬────┼────┬────┬────┬────┼──── ... ┼────┬────┐
//!            │ s  │ s  │ s  │ v  │ v  │ v  │ v  │ v   ... │ s  │ s  │
//!            └────┴────┴────┴────┴────┴────┴────┴──── ... ┴────┴────┘
//!            ◄─ prologue ──►◄──────────── body ───────────►◄ epilogue►
//!             offset = 3
//! ```

use std::mem;

/// Counts the leading elements of `p[..size]` that come before the first
/// element whose index is a multiple of `block_size`.
///
/// - `block_size <= 1`: every element is a block of its own, returns `0`.
/// - `p` is not a multiple of `size_of::<T>()`: no element can start a block,
///   returns `size`.
/// - otherwise `(block_size - index % block_size) % block_size`, capped at
///   `size`, where `index = p / size_of::<T>()`.
///
/// Element sizes that are not a power of two are handled with a remainder
/// test rather than a bit mask. Zero-sized `T` always yields `0`.
///
/// The result is always in `0..=size`.
///
/// # Examples
///
/// ```rust
/// use raligned::get_alignment_offset;
///
/// let p = 1028 as *const f32;
///
/// assert_eq!(get_alignment_offset(p, 100, 4), 3);
/// assert_eq!(get_alignment_offset(p, 2, 4), 2);
/// assert_eq!(get_alignment_offset(p, 100, 1), 0);
/// assert_eq!(get_alignment_offset(1029 as *const f32, 100, 4), 100);
/// ```
pub fn get_alignment_offset<T>(
  p: *const T,
  size: usize,
  block_size: usize,
) -> usize {
  let scalar = mem::size_of::<T>();

  if block_size <= 1 || scalar == 0 {
    return 0;
  }

  let addr = p as usize;

  if addr % scalar != 0 {
    return size;
  }

  let index = (addr / scalar) % block_size;

  ((block_size - index) % block_size).min(size)
}

/// Splits `slice` into a scalar prologue, a body whose length is a multiple
/// of `block_size` and which starts on a block boundary, and a scalar
/// epilogue.
///
/// # Examples
///
/// ```rust
/// use raligned::split_at_alignment;
///
/// let data = [1u8; 100];
/// let (prologue, body, epilogue) = split_at_alignment(&data, 16);
///
/// assert_eq!(prologue.len() + body.len() + epilogue.len(), 100);
/// assert_eq!(body.len() % 16, 0);
/// assert_eq!(body.as_ptr() as usize % 16, 0);
/// ```
pub fn split_at_alignment<T>(
  slice: &[T],
  block_size: usize,
) -> (&[T], &[T], &[T]) {
  let (head, body) = split_points(slice.as_ptr(), slice.len(), block_size);
  let (prologue, rest) = slice.split_at(head);
  let (body, epilogue) = rest.split_at(body);

  (prologue, body, epilogue)
}

/// Mutable counterpart of [`split_at_alignment`].
pub fn split_at_alignment_mut<T>(
  slice: &mut [T],
  block_size: usize,
) -> (&mut [T], &mut [T], &mut [T]) {
  let (head, body) = split_points(slice.as_ptr(), slice.len(), block_size);
  let (prologue, rest) = slice.split_at_mut(head);
  let (body, epilogue) = rest.split_at_mut(body);

  (prologue, body, epilogue)
}

// Prologue length and body length.
fn split_points<T>(
  p: *const T,
  len: usize,
  block_size: usize,
) -> (usize, usize) {
  let block_size = block_size.max(1);
  let head = get_alignment_offset(p, len, block_size);
  let rest = len - head;

  (head, rest - rest % block_size)
}
