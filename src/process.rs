//! # Process Table Types
//!
//! The process model: state machine, per-slot record and the fixed-size
//! table. Each slot carries its own inline stack region, so every
//! process's stack has a fixed address known at link time.
//!
//! Slots are shared state: they are mutated by `exec` under a critical
//! section and by the preemption handler, which hardware keeps
//! non-reentrant.

use crate::config::{MAX_PROCESSES, STACK_SIZE};

/// Index of a slot in the process table. Doubles as the process ID.
pub type Pid = usize;

/// A program is a zero-argument entry function that never returns. It
/// owns no heap; all of its mutable state lives on its own stack.
pub type Program = extern "C" fn() -> !;

/// Execution state of a process slot.
///
/// ```text
///   Unused ──exec()──► Ready ◄───────────────┐
///                        │                    │
///                     selected           preempted
///                        ▼                    │
///                      Running ───────────────┘
/// ```
///
/// `Blocked` is reserved for a later revision; this core never produces
/// it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    /// Free slot. The other fields carry no meaningful data.
    Unused,
    /// Waiting for CPU time.
    Ready,
    /// Currently executing. Exactly one slot is in this state between
    /// preemptions.
    Running,
    /// Waiting on an event (reserved).
    Blocked,
}

/// Per-process stack memory. Aligned to 8 bytes as required by the AAPCS.
#[repr(align(8))]
pub struct StackRegion(pub [u8; STACK_SIZE]);

/// One entry of the process table.
pub struct ProcessSlot {
    /// Program entry point. `None` only while the slot is `Unused`.
    pub program: Option<Program>,

    /// Scheduling priority, 0 = least favoured. Immutable after
    /// creation.
    pub priority: u8,

    /// Current state in the scheduler's state machine.
    pub state: ProcessState,

    /// Saved top of this process's context within its stack region.
    /// Updated on every switch-out.
    pub stack_pointer: *mut u32,

    /// XOR fold over the used stack bytes, stored at switch-out and
    /// compared at switch-in.
    pub checksum: u8,

    /// Inline stack region.
    pub stack: StackRegion,
}

// Safety: the raw stack pointer always points into the slot's own stack
// region. Slots are only mutated inside the preemption handler or under
// a critical section.
unsafe impl Send for ProcessSlot {}
unsafe impl Sync for ProcessSlot {}

impl ProcessSlot {
    /// An unallocated slot, for initializing the table.
    pub const UNUSED: Self = Self {
        program: None,
        priority: 0,
        state: ProcessState::Unused,
        stack_pointer: core::ptr::null_mut(),
        checksum: 0,
        stack: StackRegion([0; STACK_SIZE]),
    };

    /// Whether the slot holds a process waiting for CPU time.
    #[inline]
    pub fn is_ready(&self) -> bool {
        self.state == ProcessState::Ready
    }
}

/// The fixed-size process table. The slot index is the [`Pid`].
pub type ProcessTable = [ProcessSlot; MAX_PROCESSES];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unused_slot_has_no_program() {
        let slot = ProcessSlot::UNUSED;
        assert!(slot.program.is_none());
        assert_eq!(slot.state, ProcessState::Unused);
        assert!(!slot.is_ready());
        assert!(slot.stack_pointer.is_null());
    }

    #[test]
    fn stack_region_is_aligned() {
        let slot = ProcessSlot::UNUSED;
        assert_eq!(slot.stack.0.as_ptr() as usize % 8, 0);
    }
}
