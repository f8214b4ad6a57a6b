//! # raligned - SIMD-Aligned Memory Allocation
//!
//! This crate provides an allocator whose blocks always start at an address
//! divisible by a compile-time power-of-two alignment, meant as backing store
//! for numeric containers whose elements are loaded into vector registers
//! (16/32/64-byte SIMD lanes).
//!
//! ## Overview
//!
//! ```text
//!   Container wants n elements of T
//!
//!   ┌──────────────────────────────┐
//!   │ AlignedAllocator<T, ALIGN>   │  stateless, zero-sized, Copy
//!   │  allocate(n)                 │
//!   └──────────────┬───────────────┘
//!                  │ n * size_of::<T>() bytes, ALIGN
//!                  ▼
//!   ┌──────────────────────────────┐
//!   │ raw::aligned_malloc          │
//!   │   Platform (build time)      │
//!   │   ├── SystemMalloc           │  malloc up to its own alignment
//!   │   ├── AlignedAlloc           │  C11 aligned_alloc
//!   │   ├── PosixMemalign          │  posix_memalign
//!   │   ├── WindowsAligned         │  _aligned_malloc
//!   │   └── Portable               │  malloc + hidden back-pointer
//!   └──────────────┬───────────────┘
//!                  ▼
//!   address % ALIGN == 0, or AllocError
//! ```
//!
//! There is no pooling, no free list and no caching: each call goes straight
//! to the platform allocator.
//!
//! ## Crate Structure
//!
//! ```text
//!   raligned
//!   ├── align      - Alignment macros (align_down!, align_up!, is_aligned!)
//!   ├── allocator  - AlignedAllocator and Rebind
//!   ├── error      - AllocError
//!   ├── header     - Back-pointer header of the portable path (internal)
//!   ├── offset     - get_alignment_offset and prologue/body/epilogue splits
//!   └── raw        - RawAlloc strategies and the Platform selection
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use raligned::AlignedAllocator;
//!
//! let allocator = AlignedAllocator::<f32, 32>::new();
//!
//! let p = allocator.allocate(8).unwrap();
//! assert_eq!(p.as_ptr() as usize % 32, 0);
//!
//! unsafe {
//!   for i in 0..8 {
//!     allocator.construct(p.as_ptr().add(i), i as f32);
//!   }
//!
//!   allocator.deallocate(p, 8);
//! }
//! ```
//!
//! The allocator also implements the `allocator-api2` `Allocator` trait, so
//! any container built on it can use aligned storage:
//!
//! ```rust
//! use allocator_api2::vec::Vec;
//! use raligned::AlignedAllocator;
//!
//! let mut lanes = Vec::new_in(AlignedAllocator::<f64, 64>::new());
//! lanes.extend_from_slice(&[1.0, 2.0, 3.0]);
//!
//! assert_eq!(lanes.as_ptr() as usize % 64, 0);
//! ```
//!
//! ## Vector Loops
//!
//! [`get_alignment_offset`] tells a vectorized loop how many leading scalars
//! to peel before the first full block:
//!
//! ```text
//!   ┌───────────┬──────────────────────────────┬──────────┐
//!   │ prologue  │ body: whole SIMD blocks      │ epilogue │
//!   │ (scalar)  │                              │ (scalar) │
//!   └───────────┴──────────────────────────────┴──────────┘
//!   ◄─ offset ─►
//! ```
//!
//! ## Build Configuration
//!
//! - default: picks the best native facility for the target.
//! - `assume-aligned` (unix): plain `malloc` for alignments it already
//!   guarantees, `posix_memalign` for anything larger. Ignored elsewhere.
//! - `portable`: always use the over-allocating fallback.
//!
//! ## Safety
//!
//! `deallocate` must receive a pointer from an allocator with the same
//! `ALIGN` that has not been freed yet. The word right below a block handed
//! out by the portable fallback belongs to the allocator and must not be
//! written.

mod align;
mod allocator;
mod error;
mod header;
mod offset;
pub mod raw;

pub use allocator::{AlignedAllocator, Rebind};
pub use error::AllocError;
pub use offset::{get_alignment_offset, split_at_alignment, split_at_alignment_mut};
pub use raw::{RawAlloc, Strategy, aligned_free, aligned_malloc};
