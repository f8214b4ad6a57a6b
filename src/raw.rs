//! Raw aligned allocation primitives.
//!
//! Every strategy implements [`RawAlloc`], a single `aligned_alloc` /
//! `aligned_free` pair working purely in bytes and power-of-two alignments.
//! Exactly one of them is bound to [`Platform`] when the crate is built:
//!
//! ```text
//!   feature "assume-aligned"  ──► SystemMalloc    malloc / free (unix only)
//!   feature "portable"        ──► Portable        malloc + hidden header
//!   target_os = "linux"       ──► AlignedAlloc    aligned_alloc / free
//!   other unix                ──► PosixMemalign   posix_memalign / free
//!   windows                   ──► WindowsAligned  _aligned_malloc / _aligned_free
//!   anything else             ──► Portable
//! ```
//!
//! All strategies return null on failure and accept null in `aligned_free`.

use std::{fmt, ptr};

use libc::c_void;

use crate::{align_down, header::Header};

/// Names the strategy a [`RawAlloc`] implementation stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
  /// Plain `malloc` up to its guaranteed alignment, `posix_memalign` above.
  SystemMalloc,
  /// The C11 `aligned_alloc` intrinsic.
  AlignedAlloc,
  /// POSIX `posix_memalign`.
  PosixMemalign,
  /// The MSVC CRT `_aligned_malloc` family.
  WindowsAligned,
  /// Over-allocation with a hidden back-pointer.
  Portable,
}

impl fmt::Display for Strategy {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    let name = match self {
      Strategy::SystemMalloc => "malloc",
      Strategy::AlignedAlloc => "aligned_alloc",
      Strategy::PosixMemalign => "posix_memalign",
      Strategy::WindowsAligned => "_aligned_malloc",
      Strategy::Portable => "portable",
    };

    f.write_str(name)
  }
}

/// A pair of functions handing out and taking back aligned memory.
pub trait RawAlloc {
  /// Which strategy this is.
  const STRATEGY: Strategy;

  /// Allocates at least `size` bytes whose address is a multiple of
  /// `alignment`. Returns null on failure.
  ///
  /// # Safety
  ///
  /// `alignment` must be a power of two.
  unsafe fn aligned_alloc(
    size: usize,
    alignment: usize,
  ) -> *mut u8;

  /// Releases a block returned by [`RawAlloc::aligned_alloc`] of the same
  /// implementation. Null is a no-op.
  ///
  /// # Safety
  ///
  /// `ptr` must be null or come from this strategy and not be freed yet.
  unsafe fn aligned_free(ptr: *mut u8);
}

#[cfg(unix)]
const WORD: usize = std::mem::size_of::<*mut c_void>();

/// Plain `malloc`/`free` for alignments the platform `malloc` already
/// guarantees.
///
/// Requests above [`SystemMalloc::MIN_ALIGN`] go to [`PosixMemalign`]; both
/// kinds of block are released with `free`.
#[cfg(unix)]
pub struct SystemMalloc;

#[cfg(unix)]
impl SystemMalloc {
  /// Alignment every `malloc` result is known to have on this target.
  pub const MIN_ALIGN: usize = if cfg!(any(
    target_arch = "x86_64",
    target_arch = "aarch64",
    target_arch = "loongarch64",
    target_arch = "mips64",
    target_arch = "riscv64",
    target_arch = "s390x",
    target_arch = "sparc64"
  )) {
    16
  } else {
    8
  };
}

#[cfg(unix)]
impl RawAlloc for SystemMalloc {
  const STRATEGY: Strategy = Strategy::SystemMalloc;

  unsafe fn aligned_alloc(
    size: usize,
    alignment: usize,
  ) -> *mut u8 {
    if alignment > Self::MIN_ALIGN {
      return unsafe { PosixMemalign::aligned_alloc(size, alignment) };
    }

    unsafe { libc::malloc(size.max(1)) as *mut u8 }
  }

  unsafe fn aligned_free(ptr: *mut u8) {
    unsafe { libc::free(ptr as *mut c_void) }
  }
}

/// C11 `aligned_alloc`.
///
/// The size is rounded up to a multiple of the alignment, which older C
/// libraries require.
#[cfg(target_os = "linux")]
pub struct AlignedAlloc;

#[cfg(target_os = "linux")]
impl RawAlloc for AlignedAlloc {
  const STRATEGY: Strategy = Strategy::AlignedAlloc;

  unsafe fn aligned_alloc(
    size: usize,
    alignment: usize,
  ) -> *mut u8 {
    let alignment = alignment.max(WORD);

    let Some(size) = size.max(1).checked_next_multiple_of(alignment) else {
      return ptr::null_mut();
    };

    unsafe { libc::aligned_alloc(alignment, size) as *mut u8 }
  }

  unsafe fn aligned_free(ptr: *mut u8) {
    unsafe { libc::free(ptr as *mut c_void) }
  }
}

/// POSIX `posix_memalign`. A nonzero error code becomes a null result.
#[cfg(unix)]
pub struct PosixMemalign;

#[cfg(unix)]
impl RawAlloc for PosixMemalign {
  const STRATEGY: Strategy = Strategy::PosixMemalign;

  unsafe fn aligned_alloc(
    size: usize,
    alignment: usize,
  ) -> *mut u8 {
    let mut out: *mut c_void = ptr::null_mut();

    // posix_memalign rejects alignments below sizeof(void *).
    let failed = unsafe { libc::posix_memalign(&mut out, alignment.max(WORD), size.max(1)) };

    if failed != 0 {
      return ptr::null_mut();
    }

    out as *mut u8
  }

  unsafe fn aligned_free(ptr: *mut u8) {
    unsafe { libc::free(ptr as *mut c_void) }
  }
}

/// `_aligned_malloc` / `_aligned_free` from the MSVC runtime.
#[cfg(windows)]
pub struct WindowsAligned;

#[cfg(windows)]
impl RawAlloc for WindowsAligned {
  const STRATEGY: Strategy = Strategy::WindowsAligned;

  unsafe fn aligned_alloc(
    size: usize,
    alignment: usize,
  ) -> *mut u8 {
    unsafe { libc::aligned_malloc(size.max(1), alignment) as *mut u8 }
  }

  unsafe fn aligned_free(ptr: *mut u8) {
    unsafe { libc::aligned_free(ptr as *mut c_void) }
  }
}

/// Aligned allocation on top of plain `malloc`/`free`.
///
/// Requests `size + alignment` bytes, rounds the raw address down to the
/// alignment and steps one full alignment forward. The raw address goes into
/// the [`Header`] word right below the returned pointer.
///
/// ```text
///   raw = malloc(size + alignment)
///   │                       aligned = (raw & !(alignment - 1)) + alignment
///   ▼                       ▼
///   ┌──────────────┬────────┬───────────────────────────┬──────┐
///   │ padding      │ header │ size bytes for the caller │ tail │
///   └──────────────┴────────┴───────────────────────────┴──────┘
///   ◄──── 1..=alignment ────►
/// ```
///
/// Alignments below one machine word are raised to a word so the header
/// always fits between `raw` and the returned address.
pub struct Portable;

impl RawAlloc for Portable {
  const STRATEGY: Strategy = Strategy::Portable;

  unsafe fn aligned_alloc(
    size: usize,
    alignment: usize,
  ) -> *mut u8 {
    let alignment = alignment.max(Header::SIZE);

    let Some(total) = size.checked_add(alignment) else {
      return ptr::null_mut();
    };

    let raw = unsafe { libc::malloc(total) } as *mut u8;

    if raw.is_null() {
      return ptr::null_mut();
    }

    let offset = align_down!(raw as usize, alignment) + alignment - raw as usize;
    debug_assert!(offset >= Header::SIZE && offset <= alignment);

    unsafe {
      let aligned = raw.add(offset);
      Header::store(aligned, raw);
      aligned
    }
  }

  unsafe fn aligned_free(ptr: *mut u8) {
    if ptr.is_null() {
      return;
    }

    unsafe { libc::free(Header::load(ptr) as *mut c_void) }
  }
}

/// The strategy compiled in for this build.
#[cfg(all(feature = "assume-aligned", unix))]
pub type Platform = SystemMalloc;

/// The strategy compiled in for this build.
#[cfg(all(not(all(feature = "assume-aligned", unix)), feature = "portable"))]
pub type Platform = Portable;

/// The strategy compiled in for this build.
#[cfg(all(
  not(any(all(feature = "assume-aligned", unix), feature = "portable")),
  target_os = "linux"
))]
pub type Platform = AlignedAlloc;

/// The strategy compiled in for this build.
#[cfg(all(
  not(any(all(feature = "assume-aligned", unix), feature = "portable")),
  unix,
  not(target_os = "linux")
))]
pub type Platform = PosixMemalign;

/// The strategy compiled in for this build.
#[cfg(all(not(feature = "portable"), windows))]
pub type Platform = WindowsAligned;

/// The strategy compiled in for this build.
#[cfg(all(not(feature = "portable"), not(any(unix, windows))))]
pub type Platform = Portable;

/// Returns the strategy [`Platform`] is bound to.
pub const fn strategy() -> Strategy {
  Platform::STRATEGY
}

/// Allocates `size` bytes aligned to `alignment` through [`Platform`].
///
/// Returns null when the platform allocator fails.
///
/// # Safety
///
/// `alignment` must be a power of two.
#[inline]
pub unsafe fn aligned_malloc(
  size: usize,
  alignment: usize,
) -> *mut u8 {
  debug_assert!(alignment.is_power_of_two());
  unsafe { Platform::aligned_alloc(size, alignment) }
}

/// Releases memory obtained from [`aligned_malloc`].
///
/// # Safety
///
/// `ptr` must be null or come from [`aligned_malloc`] and not be freed yet.
#[inline]
pub unsafe fn aligned_free(ptr: *mut u8) {
  unsafe { Platform::aligned_free(ptr) }
}
