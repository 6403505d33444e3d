//! # Kernel
//!
//! The process-wide scheduler instance and the application-facing API.
//! Programs call in here; every entry point wraps the scheduler access
//! in a critical section so the preemption handler never observes a
//! half-updated table.
//!
//! ## Startup sequence
//!
//! ```text
//! reset_handler (cortex-m-rt)
//!   └─► main()
//!         ├─► kernel::init_scheduler(autostart)  ← idle in slot 0, then
//!         │                                        the autostart chain
//!         └─► kernel::start_scheduler()          ← tick timer on, jump
//!                                                  into slot 0 (no return)
//! ```

use crate::arch;
use crate::config::{DEFAULT_PRIORITY, IDLE_PID};
use crate::critical;
use crate::error::ExecError;
use crate::hal::{InputDevice, TaskManager};
use crate::process::{Pid, ProcessState, Program};
use crate::scheduler::Scheduler;
use crate::strategy::StrategyKind;

// ---------------------------------------------------------------------------
// Global scheduler instance
// ---------------------------------------------------------------------------

/// The scheduler singleton.
///
/// # Safety
/// Accessed through [`SCHEDULER_PTR`], set once by [`init_scheduler`].
/// All access happens under a critical section or from the preemption
/// handler, which hardware keeps non-reentrant.
static mut SCHEDULER: Scheduler = Scheduler::new();

/// Raw pointer to the scheduler singleton, for the arch port's handlers
/// which cannot hold references across the asm boundary.
///
/// # Safety
/// Written once by [`init_scheduler`], read afterwards.
pub static mut SCHEDULER_PTR: *mut Scheduler = core::ptr::null_mut();

// ---------------------------------------------------------------------------
// Autostart list
// ---------------------------------------------------------------------------

/// One link of the autostart chain: a program plus the next link. The
/// application supplies the chain as `static` nodes; [`init_scheduler`]
/// walks it in declaration order, creating every entry with
/// [`DEFAULT_PRIORITY`].
pub struct AutostartNode {
    pub program: Program,
    pub next: Option<&'static AutostartNode>,
}

// ---------------------------------------------------------------------------
// Idle process
// ---------------------------------------------------------------------------

/// The idle process. Permanently occupies slot 0 and burns time until
/// the next preemption; it is only selected when nothing else is ready.
extern "C" fn idle() -> ! {
    loop {
        #[cfg(all(target_arch = "arm", target_os = "none"))]
        cortex_m::asm::wfi();
    }
}

// ---------------------------------------------------------------------------
// Boot
// ---------------------------------------------------------------------------

/// Initialize the kernel: idle into slot 0, then the autostart chain.
///
/// Must be called exactly once, before any other kernel function and
/// before [`start_scheduler`]. Slot 0 belonging to idle is a
/// construction-time invariant; violation is a build mistake and halts
/// here.
pub fn init_scheduler(autostart: Option<&'static AutostartNode>) {
    unsafe {
        SCHEDULER = Scheduler::new();
        SCHEDULER_PTR = core::ptr::addr_of_mut!(SCHEDULER);
    }

    let idle_pid = exec(idle, DEFAULT_PRIORITY);
    assert_eq!(idle_pid, Ok(IDLE_PID), "idle process must occupy slot 0");

    let mut node = autostart;
    while let Some(entry) = node {
        if let Err(err) = exec(entry.program, DEFAULT_PRIORITY) {
            log::error!("autostart entry skipped: {}", err);
        }
        node = entry.next;
    }

    log::info!("scheduler initialized");
}

/// Start multitasking. **Does not return.**
///
/// Arms the tick timer, marks idle as running and restores its seeded
/// context; from that moment the system is preemptive.
pub fn start_scheduler() -> ! {
    arch::start_tick_timer();

    let first_sp = unsafe {
        let scheduler = &mut *SCHEDULER_PTR;
        scheduler.current = IDLE_PID;
        scheduler.slots[IDLE_PID].state = ProcessState::Running;
        scheduler.slots[IDLE_PID].stack_pointer as *const u32
    };

    unsafe { arch::start_first_process(first_sp) }
}

// ---------------------------------------------------------------------------
// Application-facing API
// ---------------------------------------------------------------------------

/// Create a process. Returns its PID, or [`ExecError::NoFreeSlot`] when
/// the table is full.
pub fn exec(program: Program, priority: u8) -> Result<Pid, ExecError> {
    critical::with(|| unsafe { (*SCHEDULER_PTR).exec(program, priority) })
}

/// PID of the process that called.
pub fn current_pid() -> Pid {
    critical::with(|| unsafe { (*SCHEDULER_PTR).current })
}

/// Enter a critical section: preemption stays off until the matching
/// [`leave_critical`].
pub fn enter_critical() {
    critical::enter();
}

/// Leave a critical section. Only the outermost leave re-arms
/// preemption.
pub fn leave_critical() {
    critical::leave();
}

/// Install a scheduling strategy. The strategy's private state starts
/// fresh.
pub fn set_strategy(kind: StrategyKind) {
    critical::with(|| unsafe { (*SCHEDULER_PTR).set_strategy(kind) })
}

/// The active scheduling strategy.
pub fn get_strategy() -> StrategyKind {
    critical::with(|| unsafe { (*SCHEDULER_PTR).get_strategy() })
}

/// Register the button driver polled for the task-manager chord.
pub fn set_input_device(device: &'static dyn InputDevice) {
    critical::with(|| unsafe { (*SCHEDULER_PTR).set_input_device(device) })
}

/// Register the task-manager overlay.
pub fn set_task_manager(overlay: &'static dyn TaskManager) {
    critical::with(|| unsafe { (*SCHEDULER_PTR).set_task_manager(overlay) })
}

#[cfg(test)]
mod tests {
    use super::*;

    extern "C" fn first_program() -> ! {
        loop {}
    }

    extern "C" fn second_program() -> ! {
        loop {}
    }

    static SECOND: AutostartNode = AutostartNode {
        program: second_program,
        next: None,
    };
    static FIRST: AutostartNode = AutostartNode {
        program: first_program,
        next: Some(&SECOND),
    };

    // The singleton is only touched by this one test, so the parallel
    // test harness never races on it.
    #[test]
    fn boot_places_idle_in_slot_zero_then_autostart_in_order() {
        init_scheduler(Some(&FIRST));

        let scheduler = unsafe { &*SCHEDULER_PTR };
        assert_eq!(scheduler.slots[IDLE_PID].program, Some(idle as Program));
        assert_eq!(scheduler.slots[IDLE_PID].state, ProcessState::Ready);

        assert_eq!(scheduler.slots[1].program, Some(first_program as Program));
        assert_eq!(scheduler.slots[2].program, Some(second_program as Program));
        assert_eq!(scheduler.slots[1].priority, DEFAULT_PRIORITY);
        assert_eq!(scheduler.slots[3].state, ProcessState::Unused);

        assert_eq!(current_pid(), IDLE_PID);
        assert_eq!(get_strategy(), StrategyKind::Even);
    }
}
