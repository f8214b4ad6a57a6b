//! raligned integration tests

use std::{ptr, thread};

use allocator_api2::{boxed::Box, vec::Vec};
use raligned::{
  AlignedAllocator, AllocError, RawAlloc, Rebind, aligned_free, aligned_malloc, get_alignment_offset, raw,
  split_at_alignment, split_at_alignment_mut,
};

type Avx<T> = AlignedAllocator<T, 32>;
type Avx512<T> = AlignedAllocator<T, 64>;

#[test]
fn test_vec_growth_stays_aligned() {
  let mut values = Vec::new_in(Avx512::<f32>::new());

  for i in 0..5000 {
    values.push(i as f32);

    if i % 97 == 0 {
      assert_eq!(values.as_ptr() as usize % 64, 0, "len = {}", values.len());
    }
  }

  values.shrink_to_fit();
  assert_eq!(values.as_ptr() as usize % 64, 0);
  assert_eq!(values.iter().sum::<f32>(), (0..5000).map(|i| i as f32).sum::<f32>());
}

#[test]
fn test_boxed_value() {
  let boxed = Box::new_in([7u64; 9], Avx::<[u64; 9]>::new());

  assert_eq!(&*boxed as *const [u64; 9] as usize % 32, 0);
  assert_eq!(boxed.iter().sum::<u64>(), 63);
}

#[test]
fn test_rebound_node_storage() {
  #[derive(Clone, Copy)]
  struct Node {
    value: f64,
    next: usize,
  }

  type Nodes = <Avx512<f64> as Rebind<Node>>::Other;

  let values = Avx512::<f64>::new();
  let nodes: Nodes = values.rebind();

  assert!(nodes == values);

  let mut list = Vec::new_in(nodes);
  for i in 0..64 {
    list.push(Node { value: i as f64, next: i + 1 });
  }

  assert_eq!(list.as_ptr() as usize % 64, 0);
  assert_eq!(list[10].next, 11);
  assert_eq!(list[63].value, 63.0);
}

#[test]
fn test_equality_across_alignments() {
  assert!(Avx::<u8>::new() == AlignedAllocator::<u64, 32>::new());
  assert!(Avx::<u8>::new() != Avx512::<u8>::new());
  assert!(AlignedAllocator::<u8, 16>::new() != AlignedAllocator::<u8, 32>::new());
}

#[test]
fn test_failure_is_reported() {
  let error: AllocError = Avx::<[u8; 16]>::new().allocate(usize::MAX / 16).unwrap_err();

  assert_eq!(error.align, 32);
  assert_eq!(error.size, usize::MAX / 16 * 16);
  assert_eq!(
    error.to_string(),
    format!("failed to allocate {} bytes aligned to 32", usize::MAX / 16 * 16)
  );

  let _: allocator_api2::alloc::AllocError = error.into();
}

#[test]
fn test_concurrent_allocation() {
  let allocator = Avx512::<u32>::new();

  let handles: std::vec::Vec<_> = (0..8)
    .map(|t| {
      thread::spawn(move || {
        for round in 0..200 {
          let n = (round * 7 + t) % 300 + 1;
          let p = allocator.allocate(n).unwrap();

          assert_eq!(p.as_ptr() as usize % 64, 0);

          unsafe {
            for i in 0..n {
              p.as_ptr().add(i).write((t * 1000 + i) as u32);
            }

            for i in 0..n {
              assert_eq!(*p.as_ptr().add(i), (t * 1000 + i) as u32);
            }

            allocator.deallocate(p, n);
          }
        }
      })
    })
    .collect();

  for handle in handles {
    handle.join().unwrap();
  }
}

#[test]
fn test_split_allocated_buffer() {
  let allocator = Avx512::<f32>::new();
  let p = allocator.allocate(100).unwrap();

  unsafe {
    for i in 0..100 {
      allocator.construct(p.as_ptr().add(i), i as f32);
    }

    let data = std::slice::from_raw_parts_mut(p.as_ptr(), 100);

    // 16 f32 per 64-byte block; the buffer itself starts on a block.
    assert_eq!(get_alignment_offset(data.as_ptr(), data.len(), 16), 0);

    for start in 0..16 {
      let view = &data[start..];
      let (prologue, body, epilogue) = split_at_alignment(view, 16);

      assert_eq!(prologue.len(), (16 - start) % 16);
      assert_eq!(body.as_ptr() as usize % 64, 0);
      assert_eq!(body.len() % 16, 0);
      assert_eq!(epilogue.len(), (100 - start - prologue.len()) % 16);
    }

    let (prologue, body, epilogue) = split_at_alignment_mut(&mut data[5..], 16);
    for chunk in body.chunks_exact_mut(16) {
      chunk.iter_mut().for_each(|x| *x *= 2.0);
    }
    let untouched = prologue.len() + epilogue.len();

    assert_eq!(prologue.first(), Some(&5.0));
    assert_eq!(untouched, 11 + (95 - 11) % 16);
    assert_eq!(data[16], 32.0);
    assert_eq!(data[15], 15.0);

    allocator.deallocate(p, 100);
  }
}

#[test]
fn test_raw_primitives() {
  unsafe {
    let blocks: std::vec::Vec<_> = [16usize, 32, 64, 128]
      .into_iter()
      .map(|align| (aligned_malloc(align * 3 + 1, align), align))
      .collect();

    for &(block, align) in &blocks {
      assert!(!block.is_null());
      assert_eq!(block as usize % align, 0);
      ptr::write_bytes(block, 0xEE, align * 3 + 1);
    }

    for (block, _) in blocks {
      aligned_free(block);
    }

    aligned_free(ptr::null_mut());
  }
}

#[test]
fn test_portable_recovers_malloc_pointer() {
  unsafe {
    let q = raw::Portable::aligned_alloc(0, 64);
    assert!(!q.is_null());
    assert_eq!(q as usize % 64, 0);

    let hidden = *(q as *const *mut u8).sub(1);
    assert!(hidden < q);
    assert!(q as usize - hidden as usize <= 64);

    libc::free(hidden as *mut libc::c_void);
  }
}

#[cfg(all(feature = "assume-aligned", unix))]
#[test]
fn test_assume_aligned_honours_wide_lanes() {
  #[repr(align(64))]
  struct Lane([f32; 16]);

  assert_eq!(raw::strategy(), raligned::Strategy::SystemMalloc);

  let lanes: std::vec::Vec<_> = (0..200)
    .map(|i| {
      let mut lane = Vec::new_in(Avx512::<Lane>::new());
      lane.push(Lane([i as f32; 16]));
      lane
    })
    .collect();

  let misaligned = lanes.iter().filter(|lane| lane.as_ptr() as usize % 64 != 0).count();

  assert_eq!(misaligned, 0);
  assert_eq!(lanes[199][0].0[15], 199.0);
}
