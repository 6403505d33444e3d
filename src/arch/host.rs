//! # Host Port
//!
//! A simulated port for running the scheduler core under the host test
//! harness — the same role `r3_port_std` plays for the R3 kernel. The
//! global interrupt-enable bit and the tick-source mask are plain
//! thread-local bits, so parallel tests stay independent. Context
//! switching is not available: [`start_first_process`] traps.

use std::cell::Cell;

#[derive(Clone, Copy)]
struct IrqSim {
    /// Simulated global interrupt-enable bit.
    enabled: bool,
    /// Simulated tick-source (timer compare) interrupt enable.
    tick_enabled: bool,
}

std::thread_local! {
    static IRQ: Cell<IrqSim> = Cell::new(IrqSim {
        enabled: true,
        tick_enabled: true,
    });
}

/// Disable interrupts, returning the prior global interrupt-enable
/// state.
pub fn disable_interrupts() -> bool {
    IRQ.with(|cell| {
        let mut sim = cell.get();
        let was_enabled = sim.enabled;
        sim.enabled = false;
        cell.set(sim);
        was_enabled
    })
}

/// Restore the global interrupt-enable bit to a snapshot taken by
/// [`disable_interrupts`].
pub fn restore_interrupts(enabled: bool) {
    IRQ.with(|cell| {
        let mut sim = cell.get();
        sim.enabled = enabled;
        cell.set(sim);
    })
}

/// Whether the simulated global interrupt-enable bit is set.
pub fn interrupts_enabled() -> bool {
    IRQ.with(|cell| cell.get().enabled)
}

/// Mask the simulated scheduler tick source.
pub fn mask_tick_interrupt() {
    IRQ.with(|cell| {
        let mut sim = cell.get();
        sim.tick_enabled = false;
        cell.set(sim);
    })
}

/// Re-arm the simulated scheduler tick source.
pub fn unmask_tick_interrupt() {
    IRQ.with(|cell| {
        let mut sim = cell.get();
        sim.tick_enabled = true;
        cell.set(sim);
    })
}

/// Whether the simulated tick source is armed.
pub fn tick_interrupt_enabled() -> bool {
    IRQ.with(|cell| cell.get().tick_enabled)
}

/// There is no timer to configure on the host.
pub fn start_tick_timer() {}

/// The host port cannot enter multitasking; launching a process is a
/// hardware-only operation.
pub unsafe fn start_first_process(_sp: *const u32) -> ! {
    panic!("context switching is not available on the host port");
}
