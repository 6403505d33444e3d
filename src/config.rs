//! # StratOS Configuration
//!
//! Compile-time constants governing the scheduler core. All limits are
//! fixed at compile time — no dynamic allocation.

use crate::hal::Buttons;
use crate::process::Pid;

/// Number of slots in the process table. The slot index doubles as the
/// process ID; slot 0 is permanently reserved for the idle process.
pub const MAX_PROCESSES: usize = 8;

/// The slot reserved for the idle process.
pub const IDLE_PID: Pid = 0;

/// Priority given to the idle process and to autostart programs.
/// Priorities range over the full `u8`; 0 is least favoured.
pub const DEFAULT_PRIORITY: u8 = 10;

/// Per-process stack size in bytes. Must hold the program's deepest call
/// chain plus one full saved context frame.
pub const STACK_SIZE: usize = 1024;

/// Scheduler tick frequency in Hz. Every tick preempts the running
/// process and re-runs the active strategy.
pub const TICK_HZ: u32 = 1000;

/// System clock frequency in Hz (STM32F4 at 16 MHz HSI).
pub const SYSTEM_CLOCK_HZ: u32 = 16_000_000;

/// Upper bound of the critical-section nesting counter. The counter is
/// 8-bit; nesting deeper than this is a caller bug and leaves preemption
/// disabled.
pub const MAX_CRITICAL_NESTING: u8 = 255;

/// Button chord that opens the task-manager overlay from the preemption
/// handler. Hardware-specific; adjust to the board wiring.
pub const TASK_MANAGER_CHORD: Buttons = Buttons::from_bits_truncate(0b0000_1001);

/// Boot seed for the Random strategy's generator. A fixed seed keeps the
/// strategy reproducible under the host test harness.
pub const RNG_SEED: u32 = 0x00C0_FFEE;
