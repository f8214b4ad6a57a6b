use std::{mem, ptr};

/// Hidden header written immediately before every block handed out by the
/// portable fallback.
///
/// ```text
///   raw                      aligned (returned to the caller)
///   │                        │
///   ▼                        ▼
///   ┌──────────┬────────────┬──────────────────────────────┐
///   │ padding  │ Header     │ caller data (size bytes)     │
///   │          │ raw: *mut  │                              │
///   └──────────┴────────────┴──────────────────────────────┘
///               ◄─ 1 word ─►
/// ```
///
/// The header is the only way back to `raw`, so the caller must never write
/// below the address it was given.
#[repr(C)]
pub(crate) struct Header {
  pub raw: *mut u8,
}

impl Header {
  pub const SIZE: usize = mem::size_of::<Header>();

  /// Location of the header belonging to `aligned`.
  ///
  /// # Safety
  ///
  /// `aligned` must be at least [`Header::SIZE`] bytes past the start of
  /// its allocation.
  pub unsafe fn before(aligned: *mut u8) -> *mut Header {
    unsafe { aligned.sub(Self::SIZE) as *mut Header }
  }

  /// Records `raw` as the true block behind `aligned`.
  ///
  /// # Safety
  ///
  /// Same as [`Header::before`]; the header slot must also be writable and
  /// word-aligned.
  pub unsafe fn store(
    aligned: *mut u8,
    raw: *mut u8,
  ) {
    unsafe {
      let slot = Self::before(aligned);
      debug_assert!(slot.is_aligned(), "header slot {slot:?} is not word-aligned");
      ptr::write(slot, Header { raw })
    }
  }

  /// Recovers the true block behind `aligned`.
  ///
  /// # Safety
  ///
  /// `aligned` must have been passed to [`Header::store`] and the header left
  /// untouched since.
  pub unsafe fn load(aligned: *mut u8) -> *mut u8 {
    unsafe {
      let slot = Self::before(aligned);
      debug_assert!(slot.is_aligned(), "header slot {slot:?} is not word-aligned");
      ptr::read(slot).raw
    }
  }
}
