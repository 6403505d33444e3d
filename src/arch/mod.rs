//! # Architecture Ports
//!
//! Platform-specific context switching and interrupt control. The
//! `cortex_m4` port drives real hardware; every other build — notably
//! the host test harness — gets a simulated port with the same surface,
//! so the scheduler core runs unmodified.
//!
//! Both ports share the context-frame geometry below. The stack seeding
//! in [`crate::stack`], the save sequence and the restore sequence must
//! all agree on it.

/// Words in a full saved context frame: the software-saved R4–R11 below
/// the hardware-stacked R0–R3, R12, LR, PC, xPSR.
pub const CONTEXT_FRAME_WORDS: usize = 16;

/// Bytes a full context save writes. Equals the placeholder count seeded
/// into a fresh process stack.
pub const CONTEXT_FRAME_BYTES: usize = CONTEXT_FRAME_WORDS * 4;

/// Word index of the saved link register within the frame.
pub(crate) const FRAME_LR_INDEX: usize = 13;

/// Word index of the program counter within the frame.
pub(crate) const FRAME_PC_INDEX: usize = 14;

/// Word index of the status register within the frame.
pub(crate) const FRAME_XPSR_INDEX: usize = 15;

/// Thumb state bit, set in every seeded status word.
pub(crate) const XPSR_THUMB: u32 = 0x0100_0000;

#[cfg(all(target_arch = "arm", target_os = "none"))]
pub mod cortex_m4;
#[cfg(all(target_arch = "arm", target_os = "none"))]
pub use cortex_m4::*;

#[cfg(not(all(target_arch = "arm", target_os = "none")))]
pub mod host;
#[cfg(not(all(target_arch = "arm", target_os = "none")))]
pub use host::*;
