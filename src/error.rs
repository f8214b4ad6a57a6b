use thiserror::Error;

/// The platform allocator could not satisfy a request.
///
/// This is the only failure an [`AlignedAllocator`](crate::AlignedAllocator)
/// reports. It is never retried internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("failed to allocate {size} bytes aligned to {align}")]
pub struct AllocError {
  /// Requested size in bytes.
  pub size: usize,
  /// Requested alignment in bytes.
  pub align: usize,
}

impl From<AllocError> for allocator_api2::alloc::AllocError {
  fn from(_: AllocError) -> Self {
    allocator_api2::alloc::AllocError
  }
}
