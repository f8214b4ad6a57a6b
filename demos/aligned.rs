use std::{io::Read, ptr};

use allocator_api2::vec::Vec;
use raligned::{AlignedAllocator, raw, split_at_alignment};

// Pauses between steps so the printed addresses can be compared against a
// debugger's view of the same blocks.
fn next_step() {
  println!("\n(ENTER for the next block)");
  let _ = std::io::stdin().bytes().next();
}

fn print_block<T>(
  label: &str,
  addr: *const T,
  align: usize,
) {
  println!(
    "[{}] address = {:?}, address % {} = {}",
    label,
    addr,
    align,
    addr as usize % align
  );
}

fn main() {
  println!("Aligned allocation strategy for this build: {}", raw::strategy());

  let floats = AlignedAllocator::<f32, 32>::new();

  unsafe {
    // --------------------------------------------------------------------
    // 1) A handful of f32 for an AVX register (8 lanes, 32 bytes).
    // --------------------------------------------------------------------
    let lanes = floats.allocate(8).unwrap();
    println!("\n[1] Allocate [f32; 8] aligned to 32");
    print_block("1", lanes.as_ptr(), 32);

    for i in 0..8 {
      floats.construct(lanes.as_ptr().add(i), i as f32 * 0.5);
    }
    println!("[1] Lane 7 = {}", *lanes.as_ptr().add(7));

    next_step();

    // --------------------------------------------------------------------
    // 2) Zero elements still yields a real, aligned block.
    // --------------------------------------------------------------------
    let empty = floats.allocate(0).unwrap();
    println!("\n[2] Allocate [f32; 0]");
    print_block("2", empty.as_ptr(), 32);
    floats.deallocate(empty, 0);

    next_step();

    // --------------------------------------------------------------------
    // 3) Rebind to bytes: same alignment, different element type.
    // --------------------------------------------------------------------
    let bytes = floats.rebind::<u8>();
    println!("\n[3] Rebound allocator equal to the original? {}", bytes == floats);

    let scratch = bytes.allocate(13).unwrap();
    ptr::write_bytes(scratch.as_ptr(), 0xAB, 13);
    print_block("3", scratch.as_ptr(), 32);

    // Any allocator with the same alignment can release it.
    floats.rebind::<u8>().deallocate(scratch, 13);

    next_step();

    // --------------------------------------------------------------------
    // 4) Split a misaligned view into prologue / body / epilogue.
    // --------------------------------------------------------------------
    let data = std::slice::from_raw_parts(lanes.as_ptr(), 8);
    let (prologue, body, epilogue) = split_at_alignment(&data[1..], 4);
    println!(
      "\n[4] 7 floats starting one lane in: prologue = {}, body = {}, epilogue = {}",
      prologue.len(),
      body.len(),
      epilogue.len()
    );

    floats.deallocate(lanes, 8);
  }

  next_step();

  // ----------------------------------------------------------------------
  // 5) The same allocator as backing store for a growable vector.
  // ----------------------------------------------------------------------
  let mut samples = Vec::new_in(AlignedAllocator::<f64, 64>::new());
  for i in 0..1000 {
    samples.push(i as f64);
  }
  println!("\n[5] Vec of {} f64 backed by AlignedAllocator<f64, 64>", samples.len());
  print_block("5", samples.as_ptr(), 64);

  println!("\n[6] End of example.");
}
