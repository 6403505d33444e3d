//! # Stack Manager
//!
//! Seeds a fresh process stack so that the very first context restore
//! lands at the program's entry point with a clean register file, and
//! computes the integrity checksum over the used part of a stack.
//!
//! The seeded frame is byte-for-byte what the context-save sequence
//! writes: [`arch::CONTEXT_FRAME_BYTES`](crate::arch::CONTEXT_FRAME_BYTES)
//! placeholder bytes with the entry address in the program-counter slot.
//! Seeding, save and restore must agree on this byte count; the three
//! live in lockstep with the port's frame geometry.

use crate::arch;
use crate::config::STACK_SIZE;
use crate::process::{Program, StackRegion};

/// Highest address of a stack region, rounded down to the 8-byte AAPCS
/// boundary. This is the initial stack top; the checksum fold ends here.
#[inline]
pub fn stack_top(stack: &StackRegion) -> usize {
    (stack.0.as_ptr() as usize + STACK_SIZE) & !0x07
}

/// Seed the initial context frame at the top of `stack`.
///
/// Writes one zeroed placeholder word per register the restore sequence
/// pops, the entry address in the program-counter position and a status
/// word with the Thumb bit set. The link-register position gets a trap
/// for the (impossible) case of the entry returning. Returns the initial
/// stack pointer, which addresses the lowest word of the frame.
pub fn seed_frame(stack: &mut StackRegion, entry: Program) -> *mut u32 {
    let top = stack_top(stack);
    let frame = (top - arch::CONTEXT_FRAME_BYTES) as *mut u32;

    // Safety: the frame lies inside `stack`, which we borrow mutably,
    // and `top` is 8-byte aligned, so every word write is aligned.
    unsafe {
        for word in 0..arch::CONTEXT_FRAME_WORDS {
            frame.add(word).write(0);
        }
        frame.add(arch::FRAME_LR_INDEX).write(return_trap as usize as u32);
        frame.add(arch::FRAME_PC_INDEX).write(entry as usize as u32);
        frame.add(arch::FRAME_XPSR_INDEX).write(arch::XPSR_THUMB);
    }

    frame
}

/// XOR fold over every byte between `sp` (inclusive) and the stack base,
/// the initial top. Detects any single-byte change of a suspended stack;
/// it is not meant to be cryptographically strong.
pub fn checksum(stack: &StackRegion, sp: *const u32) -> u8 {
    let region = stack.0.as_ptr() as usize;
    let top = stack_top(stack);
    let sp = sp as usize;
    debug_assert!(sp >= region && sp <= top);

    stack.0[sp - region..top - region]
        .iter()
        .fold(0, |acc, byte| acc ^ byte)
}

/// Landing pad in case a program's entry ever returns. Entries are
/// `fn() -> !`, so this only runs on a corrupted return path.
extern "C" fn return_trap() -> ! {
    loop {
        #[cfg(all(target_arch = "arm", target_os = "none"))]
        cortex_m::asm::wfi();
    }
}
