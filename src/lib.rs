//! # StratOS — a strategy-driven preemptive kernel
//!
//! A small preemptive multitasking kernel for single-core ARM Cortex-M4
//! microcontrollers. The system keeps a fixed table of process slots; a
//! hardware timer preempts the running process on every tick and one of
//! five pluggable **scheduling strategies** decides who runs next:
//!
//! - **Even** — cyclic round visitation over the ready slots
//! - **Random** — uniform pick among the ready slots
//! - **Run-To-Completion** — the current process keeps the CPU while it can
//! - **Round Robin** — priority-sized time slices on the Even order
//! - **Inactive Aging** — priority-proportional aging, oldest slot wins
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                  Application Programs                    │
//! ├─────────────────────────────────────────────────────────┤
//! │               Kernel API (kernel.rs)                     │
//! │   exec() · current_pid() · set_strategy() · critical    │
//! ├───────────────┬───────────────────┬─────────────────────┤
//! │  Scheduler    │   Strategies      │  Critical Section   │
//! │  scheduler.rs │   strategy.rs     │  critical.rs        │
//! │  ─ exec()     │   ─ selector()    │  ─ enter()/leave()  │
//! │  ─ dispatch() │   ─ reset()       │  ─ nesting counter  │
//! ├───────────────┴───────────────────┴─────────────────────┤
//! │     Process Table (process.rs) · Stacks (stack.rs)       │
//! │   slots · states · seeded frames · XOR checksums         │
//! ├─────────────────────────────────────────────────────────┤
//! │              Arch Port (arch/cortex_m4.rs)               │
//! │     PendSV · SysTick · context frames · IRQ masks        │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Every tick runs the same sequence: save the full register frame onto
//! the running process's stack, store that stack's checksum, ask the
//! active strategy for the next process, verify the chosen stack's
//! checksum against what was stored when it was suspended, and restore.
//! A checksum mismatch means a neighbouring stack overflowed into the
//! suspended frame and halts the system.
//!
//! ## Memory model
//!
//! - **No heap**: all state is statically allocated
//! - **No `alloc`**: pure `core` on the target
//! - **Fixed-size table**: `[ProcessSlot; MAX_PROCESSES]`, slot 0 is idle
//! - **Per-process stack**: `[u8; STACK_SIZE]` inline in the slot
//! - **Critical sections**: an 8-bit nesting counter over the tick mask
//!
//! ## Host testing
//!
//! Everything above the arch port is platform-independent. Non-bare-metal
//! builds swap in a simulated port (`arch/host.rs`), so the table,
//! strategies, checksums and critical sections run under `cargo test` on
//! the development machine.

#![no_std]

#[cfg(not(target_os = "none"))]
extern crate std;

pub mod config;
pub mod process;
pub mod stack;
pub mod strategy;
pub mod rng;
pub mod scheduler;
pub mod critical;
pub mod kernel;
pub mod hal;
pub mod error;
pub mod arch;
