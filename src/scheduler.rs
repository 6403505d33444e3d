//! # Scheduler
//!
//! The central scheduler object: the process table, process creation and
//! the housekeeping half of the preemption path. The arch port's context
//! switch handler calls [`Scheduler::dispatch`] between saving and
//! restoring registers; everything in this module is platform-independent
//! and runs unmodified under the host test harness.
//!
//! ## Tick sequence
//!
//! On every timer tick the port saves the full register frame onto the
//! running process's stack and hands the resulting stack pointer to
//! `dispatch`, which:
//!
//! 1. records the stack pointer in the current slot,
//! 2. stores the current slot's checksum (switch-out),
//! 3. marks the current slot ready,
//! 4. runs the active strategy to pick the next slot,
//! 5. polls the input device for the task-manager chord,
//! 6. verifies the chosen slot's checksum (switch-in) — a mismatch
//!    means its stack changed while suspended and is fatal,
//! 7. marks the chosen slot running and returns its stack pointer.
//!
//! The handler runs on the dedicated ISR stack (the Cortex-M main
//! stack), so none of this touches a possibly-overflowing process stack.

use crate::config::{IDLE_PID, TASK_MANAGER_CHORD};
use crate::error::{ExecError, Fault};
use crate::hal::{InputDevice, TaskManager};
use crate::process::{Pid, ProcessSlot, ProcessState, ProcessTable, Program};
use crate::stack;
use crate::strategy::{selector, StrategyKind, StrategyState};

/// The scheduler state: process table, current process, active strategy
/// and the registered collaborators. Lives as a process-wide singleton
/// in [`kernel`](crate::kernel); tests construct their own instances.
pub struct Scheduler {
    /// The process table. The slot index is the PID.
    pub slots: ProcessTable,

    /// PID of the running process.
    pub current: Pid,

    /// The active strategy.
    strategy: StrategyKind,

    /// Private state of the strategies.
    pub(crate) strategy_state: StrategyState,

    /// Button driver, polled each tick for the task-manager chord.
    input: Option<&'static dyn InputDevice>,

    /// Task-manager overlay, opened on the chord.
    task_manager: Option<&'static dyn TaskManager>,
}

impl Scheduler {
    pub const fn new() -> Self {
        Self {
            slots: [ProcessSlot::UNUSED; crate::config::MAX_PROCESSES],
            current: IDLE_PID,
            strategy: StrategyKind::Even,
            strategy_state: StrategyState::new(),
            input: None,
            task_manager: None,
        }
    }

    /// Create a process in the first unused slot.
    ///
    /// Seeds the slot's stack so the first switch-in starts `program`
    /// with a clean register file, and stores the initial checksum.
    /// Callers outside the preemption handler must hold a critical
    /// section; the kernel API takes care of that.
    pub fn exec(&mut self, program: Program, priority: u8) -> Result<Pid, ExecError> {
        let pid = self
            .slots
            .iter()
            .position(|slot| slot.state == ProcessState::Unused)
            .ok_or(ExecError::NoFreeSlot)?;

        let slot = &mut self.slots[pid];
        slot.program = Some(program);
        slot.priority = priority;
        slot.state = ProcessState::Ready;
        slot.stack_pointer = stack::seed_frame(&mut slot.stack, program);
        slot.checksum = stack::checksum(&slot.stack, slot.stack_pointer);

        self.strategy_state.reset_slot(pid);

        log::debug!("created process {} (priority {})", pid, priority);
        Ok(pid)
    }

    /// Housekeeping half of a preemption tick. `saved_sp` is the current
    /// process's stack pointer after the full context frame was saved.
    /// Returns the stack pointer to restore, or the fault that must halt
    /// the system.
    pub fn dispatch(&mut self, saved_sp: *mut u32) -> Result<*mut u32, Fault> {
        let slot = &mut self.slots[self.current];
        slot.stack_pointer = saved_sp;
        slot.checksum = stack::checksum(&slot.stack, saved_sp);
        if slot.state == ProcessState::Running {
            slot.state = ProcessState::Ready;
        }

        let next = selector(self.strategy)(&self.slots, self.current, &mut self.strategy_state);

        self.poll_task_manager_chord();

        let slot = &mut self.slots[next];
        if stack::checksum(&slot.stack, slot.stack_pointer) != slot.checksum {
            return Err(Fault::StackOverflow);
        }
        slot.state = ProcessState::Running;
        self.current = next;

        Ok(slot.stack_pointer)
    }

    /// Install `kind` as the active strategy and reset its private
    /// state.
    pub fn set_strategy(&mut self, kind: StrategyKind) {
        self.strategy = kind;
        self.strategy_state.reset(kind, &self.slots, self.current);
        log::info!("strategy switched to {:?}", kind);
    }

    /// The active strategy.
    pub fn get_strategy(&self) -> StrategyKind {
        self.strategy
    }

    /// Register the button driver polled by the preemption handler.
    pub fn set_input_device(&mut self, device: &'static dyn InputDevice) {
        self.input = Some(device);
    }

    /// Register the task-manager overlay.
    pub fn set_task_manager(&mut self, overlay: &'static dyn TaskManager) {
        self.task_manager = Some(overlay);
    }

    /// Chord sidecar of the tick: when the distinguished chord is held,
    /// wait for release, then hand control to the overlay.
    fn poll_task_manager_chord(&self) {
        if let Some(input) = self.input {
            if input.read().contains(TASK_MANAGER_CHORD) {
                input.wait_for_release();
                if let Some(overlay) = self.task_manager {
                    overlay.open();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MAX_PROCESSES;
    use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use crate::hal::Buttons;

    extern "C" fn spin() -> ! {
        loop {}
    }

    /// Simulate one preemption tick: the suspended stack pointer of the
    /// running process is exactly what the last dispatch stored.
    fn tick(scheduler: &mut Scheduler) -> Result<Pid, Fault> {
        let saved_sp = scheduler.slots[scheduler.current].stack_pointer;
        scheduler.dispatch(saved_sp)?;
        Ok(scheduler.current)
    }

    /// A scheduler with idle plus `priorities.len()` ready processes.
    fn scheduler_with(priorities: &[u8]) -> Scheduler {
        let _ = env_logger::builder().is_test(true).try_init();

        let mut scheduler = Scheduler::new();
        scheduler.exec(spin, 1).unwrap();
        for &priority in priorities {
            scheduler.exec(spin, priority).unwrap();
        }
        scheduler
    }

    #[test]
    fn exec_fills_slots_in_ascending_order() {
        let mut scheduler = Scheduler::new();
        assert_eq!(scheduler.exec(spin, 1), Ok(0));
        assert_eq!(scheduler.exec(spin, 5), Ok(1));
        assert_eq!(scheduler.exec(spin, 7), Ok(2));

        let slot = &scheduler.slots[1];
        assert_eq!(slot.state, ProcessState::Ready);
        assert_eq!(slot.priority, 5);
        assert!(slot.program.is_some());
        assert_eq!(
            slot.checksum,
            stack::checksum(&slot.stack, slot.stack_pointer)
        );
    }

    #[test]
    fn exec_with_a_full_table_leaves_it_unmodified() {
        let mut scheduler = scheduler_with(&[2, 3, 4, 5, 6, 7, 8]);

        let before: [_; MAX_PROCESSES] =
            core::array::from_fn(|pid| (scheduler.slots[pid].state, scheduler.slots[pid].priority));

        assert_eq!(scheduler.exec(spin, 9), Err(ExecError::NoFreeSlot));

        let after: [_; MAX_PROCESSES] =
            core::array::from_fn(|pid| (scheduler.slots[pid].state, scheduler.slots[pid].priority));
        assert_eq!(before, after);
    }

    #[test]
    fn dispatch_keeps_exactly_one_slot_running() {
        let mut scheduler = scheduler_with(&[5, 7]);

        for _ in 0..10 {
            tick(&mut scheduler).unwrap();

            let running: std::vec::Vec<Pid> = (0..MAX_PROCESSES)
                .filter(|&pid| scheduler.slots[pid].state == ProcessState::Running)
                .collect();
            assert_eq!(running, [scheduler.current]);
        }
    }

    #[test]
    fn dispatch_follows_the_even_round() {
        let mut scheduler = scheduler_with(&[5, 7]);

        let mut picks = [0; 4];
        scheduler.current = 1;
        scheduler.slots[1].state = ProcessState::Running;
        for pick in picks.iter_mut() {
            *pick = tick(&mut scheduler).unwrap();
        }
        assert_eq!(picks, [2, 1, 2, 1]);
    }

    #[test]
    fn switch_out_checksum_matches_a_recompute() {
        let mut scheduler = scheduler_with(&[5, 7]);
        tick(&mut scheduler).unwrap();

        // The previous process was switched out with no stack writes
        // since; its stored checksum must equal a fresh fold.
        let slot = &scheduler.slots[IDLE_PID];
        assert_eq!(
            slot.checksum,
            stack::checksum(&slot.stack, slot.stack_pointer)
        );
    }

    #[test]
    fn corrupted_suspended_stack_is_fatal_on_switch_in() {
        let mut scheduler = scheduler_with(&[2, 2]);

        assert_eq!(tick(&mut scheduler), Ok(1));

        // Corrupt one byte of the suspended process 2's saved frame.
        let slot = &mut scheduler.slots[2];
        let index = slot.stack_pointer as usize - slot.stack.0.as_ptr() as usize + 5;
        slot.stack.0[index] ^= 0x40;

        let saved_sp = scheduler.slots[1].stack_pointer;
        assert_eq!(scheduler.dispatch(saved_sp), Err(Fault::StackOverflow));
    }

    #[test]
    fn set_strategy_resets_private_state() {
        let mut scheduler = scheduler_with(&[5, 7]);
        scheduler.strategy_state.ages = [3; MAX_PROCESSES];

        scheduler.set_strategy(StrategyKind::InactiveAging);
        assert_eq!(scheduler.get_strategy(), StrategyKind::InactiveAging);
        assert_eq!(scheduler.strategy_state.ages, [0; MAX_PROCESSES]);

        scheduler.current = 2;
        scheduler.set_strategy(StrategyKind::RoundRobin);
        assert_eq!(scheduler.strategy_state.time_slice, 7);
    }

    #[test]
    fn exec_clears_the_slot_age() {
        let mut scheduler = scheduler_with(&[5]);
        scheduler.strategy_state.ages[2] = 17;

        assert_eq!(scheduler.exec(spin, 3), Ok(2));
        assert_eq!(scheduler.strategy_state.ages[2], 0);
    }

    #[test]
    fn round_robin_dispatch_matches_the_slice_schedule() {
        let mut scheduler = scheduler_with(&[5, 7]);
        scheduler.current = 1;
        scheduler.slots[1].state = ProcessState::Running;
        scheduler.set_strategy(StrategyKind::RoundRobin);

        let mut picks = [0; 14];
        for pick in picks.iter_mut() {
            *pick = tick(&mut scheduler).unwrap();
        }
        assert_eq!(picks, [1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 2, 1, 1]);
    }

    struct ChordInput {
        held: AtomicBool,
    }

    impl InputDevice for ChordInput {
        fn read(&self) -> Buttons {
            if self.held.load(Ordering::Relaxed) {
                TASK_MANAGER_CHORD
            } else {
                Buttons::empty()
            }
        }

        fn wait_for_release(&self) {
            self.held.store(false, Ordering::Relaxed);
        }
    }

    struct CountingOverlay {
        opened: AtomicUsize,
    }

    impl TaskManager for CountingOverlay {
        fn open(&self) {
            self.opened.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn chord_opens_the_task_manager_once_per_press() {
        static INPUT: ChordInput = ChordInput {
            held: AtomicBool::new(true),
        };
        static OVERLAY: CountingOverlay = CountingOverlay {
            opened: AtomicUsize::new(0),
        };

        let mut scheduler = scheduler_with(&[5, 7]);
        scheduler.set_input_device(&INPUT);
        scheduler.set_task_manager(&OVERLAY);

        tick(&mut scheduler).unwrap();
        assert_eq!(OVERLAY.opened.load(Ordering::Relaxed), 1);
        assert!(!INPUT.held.load(Ordering::Relaxed));

        // Released: further ticks do not reopen the overlay.
        tick(&mut scheduler).unwrap();
        assert_eq!(OVERLAY.opened.load(Ordering::Relaxed), 1);
    }
}
