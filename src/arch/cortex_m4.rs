//! # Cortex-M4 Port
//!
//! Hardware-specific code for the ARM Cortex-M4 (Thumb-2): context
//! switching via PendSV, the scheduler tick via SysTick, and control of
//! the interrupt-enable bits the critical section works with.
//!
//! ## Context switch
//!
//! The Cortex-M split-stack model does the heavy lifting: handlers run
//! on MSP — the dedicated ISR stack — while processes run on PSP. On
//! exception entry the hardware stacks R0–R3, R12, LR, PC and xPSR onto
//! the process stack; the PendSV handler saves and restores R4–R11,
//! completing the 16-word frame described by
//! [`CONTEXT_FRAME_WORDS`](super::CONTEXT_FRAME_WORDS).
//!
//! ## Interrupt priorities
//!
//! SysTick and PendSV both run at the lowest priority (0xFF), so a
//! context switch never preempts another handler and the switch handler
//! itself is never re-entered.

use core::arch::{asm, naked_asm};
use cortex_m::register::primask;

use crate::config::{SYSTEM_CLOCK_HZ, TICK_HZ};
use crate::error;
use crate::kernel;

// System control block registers, accessed raw: the port owns them
// outright and the handlers below cannot go through owned peripherals.
const SYST_CSR: *mut u32 = 0xE000_E010 as *mut u32;
const SYST_RVR: *mut u32 = 0xE000_E014 as *mut u32;
const SYST_CVR: *mut u32 = 0xE000_E018 as *mut u32;
const ICSR: *mut u32 = 0xE000_ED04 as *mut u32;
const SHPR3: *mut u32 = 0xE000_ED20 as *mut u32;

const SYST_CSR_ENABLE: u32 = 1 << 0;
const SYST_CSR_TICKINT: u32 = 1 << 1;
const SYST_CSR_CLKSOURCE: u32 = 1 << 2;
const ICSR_PENDSVSET: u32 = 1 << 28;

// ---------------------------------------------------------------------------
// Interrupt control
// ---------------------------------------------------------------------------

/// Disable interrupts, returning the prior global interrupt-enable
/// state.
#[inline]
pub fn disable_interrupts() -> bool {
    let was_enabled = primask::read().is_active();
    cortex_m::interrupt::disable();
    was_enabled
}

/// Restore the global interrupt-enable bit to a snapshot taken by
/// [`disable_interrupts`].
#[inline]
pub fn restore_interrupts(enabled: bool) {
    if enabled {
        // Safety: re-enabling interrupts cannot break invariants here;
        // the snapshot says they were enabled at the matching disable.
        unsafe { cortex_m::interrupt::enable() };
    }
}

/// Whether interrupts are globally enabled.
#[inline]
pub fn interrupts_enabled() -> bool {
    primask::read().is_active()
}

/// Mask the scheduler tick source: clears SysTick's TICKINT. The
/// counter keeps running; only the interrupt is held off.
#[inline]
pub fn mask_tick_interrupt() {
    unsafe {
        let csr = core::ptr::read_volatile(SYST_CSR);
        core::ptr::write_volatile(SYST_CSR, csr & !SYST_CSR_TICKINT);
    }
}

/// Re-arm the scheduler tick source.
#[inline]
pub fn unmask_tick_interrupt() {
    unsafe {
        let csr = core::ptr::read_volatile(SYST_CSR);
        core::ptr::write_volatile(SYST_CSR, csr | SYST_CSR_TICKINT);
    }
}

/// Whether the tick source is armed.
#[inline]
pub fn tick_interrupt_enabled() -> bool {
    unsafe { core::ptr::read_volatile(SYST_CSR) & SYST_CSR_TICKINT != 0 }
}

// ---------------------------------------------------------------------------
// Tick timer
// ---------------------------------------------------------------------------

/// Configure SysTick for the scheduler tick and put SysTick and PendSV
/// at the lowest exception priority.
pub fn start_tick_timer() {
    unsafe {
        core::ptr::write_volatile(SYST_RVR, SYSTEM_CLOCK_HZ / TICK_HZ - 1);
        core::ptr::write_volatile(SYST_CVR, 0);

        // SHPR3 bits [23:16] = PendSV, [31:24] = SysTick.
        let shpr3 = core::ptr::read_volatile(SHPR3);
        core::ptr::write_volatile(SHPR3, shpr3 | (0xFF << 16) | (0xFF << 24));

        core::ptr::write_volatile(
            SYST_CSR,
            SYST_CSR_CLKSOURCE | SYST_CSR_TICKINT | SYST_CSR_ENABLE,
        );
    }
}

// ---------------------------------------------------------------------------
// Exception handlers
// ---------------------------------------------------------------------------

/// SysTick handler — requests a context switch on every scheduler tick.
/// The switch itself is deferred to PendSV so it tail-chains behind any
/// other active handler.
#[no_mangle]
pub extern "C" fn SysTick() {
    unsafe { core::ptr::write_volatile(ICSR, ICSR_PENDSVSET) };
}

/// PendSV handler — the preemption core.
///
/// Completes the context save (R4–R11 onto the process stack), runs the
/// scheduler housekeeping on the main stack, then restores the chosen
/// process's context. Entered with the hardware frame already stacked;
/// never re-entered.
///
/// # Safety
/// Called only by the NVIC. Must follow the Cortex-M exception
/// entry/exit convention exactly.
#[no_mangle]
#[unsafe(naked)]
pub unsafe extern "C" fn PendSV() {
    naked_asm!(
        // Finish saving the current context on the process stack.
        "mrs r0, psp",
        "stmdb r0!, {{r4-r11}}",
        // Housekeeping: record SP, checksum, select, verify. Returns
        // the next process's stack pointer in r0 (or halts on a fault).
        "bl {switch}",
        // Restore the chosen context.
        "ldmia r0!, {{r4-r11}}",
        "msr psp, r0",
        // Return to Thread mode on PSP; hardware unstacks the rest.
        "ldr r0, =0xFFFFFFFD",
        "bx r0",
        switch = sym switch_context,
    );
}

/// Housekeeping half of the context switch, called from [`PendSV`] with
/// the fully saved stack pointer. A detected fault never returns.
///
/// # Safety
/// Runs in handler mode with the scheduler pointer initialized.
unsafe extern "C" fn switch_context(saved_sp: *mut u32) -> *mut u32 {
    let scheduler = &mut *kernel::SCHEDULER_PTR;
    match scheduler.dispatch(saved_sp) {
        Ok(next_sp) => next_sp,
        Err(fault) => error::fatal(fault),
    }
}

// ---------------------------------------------------------------------------
// First process launch
// ---------------------------------------------------------------------------

/// Launch the first process from its seeded stack. Never returns.
///
/// Switches Thread mode onto PSP, unstacks the seeded frame manually —
/// there is no exception to return from yet — and branches to the entry
/// point with interrupts enabled.
///
/// # Safety
/// Must be called exactly once, with the seeded stack pointer of the
/// idle process, after [`start_tick_timer`].
pub unsafe fn start_first_process(sp: *const u32) -> ! {
    asm!(
        // Skip the software-saved R4-R11 placeholders.
        "adds r0, #32",
        "msr psp, r0",
        // Thread mode on PSP (CONTROL.SPSEL = 1).
        "movs r0, #2",
        "msr control, r0",
        "isb",
        // Unstack the seeded hardware frame by hand.
        "pop {{r0-r3, r12}}",
        "pop {{r4}}", // seeded LR (return trap, unused here)
        "pop {{r5}}", // entry point
        "pop {{r6}}", // seeded xPSR (hardware rebuilds it)
        "cpsie i",
        "bx r5",
        in("r0") sp,
        options(noreturn)
    );
}
