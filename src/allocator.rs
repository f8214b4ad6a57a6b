use std::{
  alloc::Layout,
  fmt,
  marker::PhantomData,
  mem,
  ptr::{self, NonNull},
};

use allocator_api2::alloc::Allocator;
use log::{trace, warn};

use crate::{error::AllocError, is_aligned, raw};

/// Allocator whose blocks all start on an `ALIGN`-byte boundary.
///
/// The type is zero-sized and stateless: every instance with the same
/// `ALIGN` can free what any other one allocated, regardless of `T`.
///
/// ```text
///   AlignedAllocator<f32, 32>::allocate(7)
///       │  size = 7 * size_of::<f32>() = 28 bytes
///       ▼
///   raw::aligned_malloc(28, 32)  ──►  Platform (picked at build time)
///       │
///       ▼
///   0x...20 / 0x...40 / 0x...60 ...   (address % 32 == 0)
/// ```
///
/// `ALIGN` must be a power of two; anything else fails to compile:
///
/// ```compile_fail
/// let _ = raligned::AlignedAllocator::<u8, 48>::new();
/// ```
pub struct AlignedAllocator<T, const ALIGN: usize = 64> {
  _marker: PhantomData<fn() -> T>,
}

/// Type-level rebinding: the allocator for `U` sharing this alignment.
///
/// ```rust
/// use raligned::{AlignedAllocator, Rebind};
///
/// type Floats = AlignedAllocator<f32, 32>;
/// type Nodes = <Floats as Rebind<[u64; 2]>>::Other;
///
/// assert_eq!(Nodes::ALIGNMENT, 32);
/// ```
pub trait Rebind<U> {
  type Other;
}

impl<T, U, const ALIGN: usize> Rebind<U> for AlignedAllocator<T, ALIGN> {
  type Other = AlignedAllocator<U, ALIGN>;
}

impl<T, const ALIGN: usize> AlignedAllocator<T, ALIGN> {
  /// Alignment in bytes guaranteed for every block.
  pub const ALIGNMENT: usize = {
    assert!(ALIGN.is_power_of_two(), "alignment must be a power of two");
    ALIGN
  };

  // Never weaker than what `T` itself needs.
  const BLOCK_ALIGN: usize = if Self::ALIGNMENT > mem::align_of::<T>() {
    Self::ALIGNMENT
  } else {
    mem::align_of::<T>()
  };

  pub const fn new() -> Self {
    let _ = Self::ALIGNMENT;

    Self { _marker: PhantomData }
  }

  /// Returns the equivalent allocator for another element type.
  pub const fn rebind<U>(&self) -> AlignedAllocator<U, ALIGN> {
    AlignedAllocator::new()
  }

  /// Allocates uninitialized storage for `n` elements.
  ///
  /// `n * size_of::<T>()` must not overflow; this is only checked in debug
  /// builds.
  pub fn allocate(
    &self,
    n: usize,
  ) -> Result<NonNull<T>, AllocError> {
    self.allocate_with_hint(n, None)
  }

  /// Same as [`allocate`](Self::allocate). The hint is ignored.
  pub fn allocate_with_hint(
    &self,
    n: usize,
    _hint: Option<NonNull<u8>>,
  ) -> Result<NonNull<T>, AllocError> {
    debug_assert!(n <= self.size_max(), "{n} elements overflow the address space");

    let size = n.wrapping_mul(mem::size_of::<T>());

    self.allocate_bytes(size, Self::BLOCK_ALIGN).map(NonNull::cast)
  }

  /// Releases storage obtained from [`allocate`](Self::allocate).
  ///
  /// `n` is only used for diagnostics; the block size is recovered by the
  /// platform allocator.
  ///
  /// # Safety
  ///
  /// `p` must come from an allocator with the same `ALIGN` and must not have
  /// been deallocated already.
  pub unsafe fn deallocate(
    &self,
    p: NonNull<T>,
    n: usize,
  ) {
    unsafe { self.release(p.cast(), n.wrapping_mul(mem::size_of::<T>())) }
  }

  pub fn address(
    &self,
    r: &T,
  ) -> *const T {
    r
  }

  pub fn address_mut(
    &self,
    r: &mut T,
  ) -> *mut T {
    r
  }

  /// Largest element count whose byte size still fits in `usize`.
  pub const fn size_max(&self) -> usize {
    match mem::size_of::<T>() {
      0 => usize::MAX,
      size => usize::MAX / size,
    }
  }

  /// Moves `value` into the uninitialized slot at `p`.
  ///
  /// # Safety
  ///
  /// `p` must be valid for writes and properly aligned for `U`. Whatever was
  /// at `p` is overwritten without being dropped.
  pub unsafe fn construct<U>(
    &self,
    p: *mut U,
    value: U,
  ) {
    unsafe { ptr::write(p, value) }
  }

  /// Runs the destructor of the value at `p`, leaving the slot
  /// uninitialized.
  ///
  /// # Safety
  ///
  /// `p` must point to an initialized `U` that is not used afterwards.
  pub unsafe fn destroy<U>(
    &self,
    p: *mut U,
  ) {
    unsafe { ptr::drop_in_place(p) }
  }

  fn allocate_bytes(
    &self,
    size: usize,
    align: usize,
  ) -> Result<NonNull<u8>, AllocError> {
    let align = align.max(Self::BLOCK_ALIGN);
    let block = unsafe { raw::aligned_malloc(size, align) };

    let Some(block) = NonNull::new(block) else {
      warn!("{} failed to allocate {size} bytes aligned to {align}", raw::strategy());
      return Err(AllocError { size, align });
    };

    debug_assert!(
      is_aligned!(block.as_ptr() as usize, align),
      "{} returned {block:?} for alignment {align}",
      raw::strategy()
    );

    trace!("allocated {size} bytes aligned to {align} at {block:?}");

    Ok(block)
  }

  unsafe fn release(
    &self,
    block: NonNull<u8>,
    size: usize,
  ) {
    trace!("releasing {size} bytes at {block:?}");

    unsafe { raw::aligned_free(block.as_ptr()) }
  }
}

unsafe impl<T, const ALIGN: usize> Allocator for AlignedAllocator<T, ALIGN> {
  fn allocate(
    &self,
    layout: Layout,
  ) -> Result<NonNull<[u8]>, allocator_api2::alloc::AllocError> {
    let block = self.allocate_bytes(layout.size(), layout.align())?;

    Ok(NonNull::slice_from_raw_parts(block, layout.size()))
  }

  unsafe fn deallocate(
    &self,
    ptr: NonNull<u8>,
    layout: Layout,
  ) {
    unsafe { self.release(ptr, layout.size()) }
  }
}

impl<T, U, const ALIGN: usize> From<&AlignedAllocator<U, ALIGN>> for AlignedAllocator<T, ALIGN> {
  fn from(other: &AlignedAllocator<U, ALIGN>) -> Self {
    other.rebind()
  }
}

impl<T, U, const A: usize, const B: usize> PartialEq<AlignedAllocator<U, B>> for AlignedAllocator<T, A> {
  fn eq(
    &self,
    _: &AlignedAllocator<U, B>,
  ) -> bool {
    A == B
  }
}

impl<T, const ALIGN: usize> Eq for AlignedAllocator<T, ALIGN> {}

impl<T, const ALIGN: usize> Clone for AlignedAllocator<T, ALIGN> {
  fn clone(&self) -> Self {
    *self
  }
}

impl<T, const ALIGN: usize> Copy for AlignedAllocator<T, ALIGN> {}

impl<T, const ALIGN: usize> Default for AlignedAllocator<T, ALIGN> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T, const ALIGN: usize> fmt::Debug for AlignedAllocator<T, ALIGN> {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.debug_struct("AlignedAllocator")
      .field("element", &std::any::type_name::<T>())
      .field("align", &ALIGN)
      .finish()
  }
}
