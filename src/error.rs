//! # Kernel Errors
//!
//! Recoverable conditions are reported by value; corruption is fatal and
//! halts the CPU. Nothing propagates through the preemption handler —
//! its glue converts a [`Fault`] into [`fatal`].

use core::fmt;

/// Recoverable failure of process creation, reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecError {
    /// Every slot of the process table is in use.
    NoFreeSlot,
}

impl fmt::Display for ExecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecError::NoFreeSlot => f.write_str("no free process slot"),
        }
    }
}

/// Unrecoverable corruption detected by the preemption handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// A suspended process's stack changed between switch-out and
    /// switch-in.
    StackOverflow,
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fault::StackOverflow => f.write_str("stack overflow detected"),
        }
    }
}

/// Halt the CPU after reporting `fault`.
///
/// On the bare-metal target this disables interrupts and parks the core;
/// under the host harness it panics so tests can observe the halt.
pub fn fatal(fault: Fault) -> ! {
    log::error!("fatal: {}", fault);

    #[cfg(all(target_arch = "arm", target_os = "none"))]
    {
        cortex_m::interrupt::disable();
        loop {
            cortex_m::asm::wfi();
        }
    }

    #[cfg(not(all(target_arch = "arm", target_os = "none")))]
    panic!("fatal: {}", fault);
}
