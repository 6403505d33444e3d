//! # Critical Sections
//!
//! A reentrant guard that keeps the preemption timer from firing while
//! shared scheduler state is mutated. Entering masks the scheduler's
//! tick interrupt source; only the outermost leave re-arms it, so
//! library routines may nest freely inside a caller's critical section.
//!
//! The global interrupt-enable bit is snapshotted and restored around
//! each counter update: other interrupt sources keep whatever
//! configuration the caller had.
//!
//! The nesting counter is 8-bit, allowing up to 255 nested enters. An
//! unbalanced `leave` is clamped at zero and has no effect; an
//! unbalanced `enter` leaves preemption disabled, which is a caller bug.

use crate::arch;
use crate::config::MAX_CRITICAL_NESTING;

#[cfg(target_os = "none")]
mod count {
    use core::sync::atomic::{AtomicU8, Ordering};

    static NESTING: AtomicU8 = AtomicU8::new(0);

    pub fn get() -> u8 {
        NESTING.load(Ordering::Relaxed)
    }

    pub fn set(value: u8) {
        NESTING.store(value, Ordering::Relaxed)
    }
}

// The host harness runs tests on parallel threads; per-thread state
// keeps their critical sections independent.
#[cfg(not(target_os = "none"))]
mod count {
    use std::cell::Cell;

    std::thread_local! {
        static NESTING: Cell<u8> = Cell::new(0);
    }

    pub fn get() -> u8 {
        NESTING.with(|c| c.get())
    }

    pub fn set(value: u8) {
        NESTING.with(|c| c.set(value))
    }
}

/// Enter a critical section: mask the scheduler tick source and bump the
/// nesting counter. Saturates at [`MAX_CRITICAL_NESTING`].
pub fn enter() {
    let enabled = arch::disable_interrupts();

    let nesting = count::get();
    if nesting < MAX_CRITICAL_NESTING {
        count::set(nesting + 1);
    }
    arch::mask_tick_interrupt();

    arch::restore_interrupts(enabled);
}

/// Leave a critical section. Only the outermost leave re-arms the
/// scheduler tick source. A `leave` with no matching `enter` is
/// tolerated: the counter stays at zero and nothing changes.
pub fn leave() {
    if count::get() == 0 {
        return;
    }

    let enabled = arch::disable_interrupts();

    let nesting = count::get() - 1;
    count::set(nesting);
    if nesting == 0 {
        arch::unmask_tick_interrupt();
    }

    arch::restore_interrupts(enabled);
}

/// Current nesting depth. Zero means preemption is armed.
pub fn nesting() -> u8 {
    count::get()
}

/// Run `f` inside a critical section.
#[inline]
pub fn with<R>(f: impl FnOnce() -> R) -> R {
    enter();
    let result = f();
    leave();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_enters_keep_preemption_masked() {
        assert!(arch::tick_interrupt_enabled());

        enter();
        enter();
        assert_eq!(nesting(), 2);
        assert!(!arch::tick_interrupt_enabled());

        leave();
        assert!(!arch::tick_interrupt_enabled());

        leave();
        assert_eq!(nesting(), 0);
        assert!(arch::tick_interrupt_enabled());

        // Unbalanced leave: clamped, nothing changes.
        leave();
        assert_eq!(nesting(), 0);
        assert!(arch::tick_interrupt_enabled());
    }

    #[test]
    fn balanced_nesting_restores_preemption() {
        for depth in [1usize, 3, 10, 255] {
            for _ in 0..depth {
                enter();
            }
            assert!(!arch::tick_interrupt_enabled());

            for _ in 0..depth {
                leave();
            }
            assert_eq!(nesting(), 0);
            assert!(arch::tick_interrupt_enabled());
        }
    }

    #[test]
    fn interrupt_enable_bit_is_preserved() {
        // Enabled before, enabled after.
        enter();
        assert!(arch::interrupts_enabled());

        // Disabled before, disabled after.
        let was = arch::disable_interrupts();
        assert!(was);
        enter();
        assert!(!arch::interrupts_enabled());
        leave();
        assert!(!arch::interrupts_enabled());
        arch::restore_interrupts(true);

        leave();
        assert_eq!(nesting(), 0);
    }

    #[test]
    fn nesting_saturates_at_the_counter_bound() {
        for _ in 0..300 {
            enter();
        }
        assert_eq!(nesting(), MAX_CRITICAL_NESTING);

        for _ in 0..300 {
            leave();
        }
        assert_eq!(nesting(), 0);
        assert!(arch::tick_interrupt_enabled());
    }

    #[test]
    fn with_balances_enter_and_leave() {
        let value = with(|| {
            assert_eq!(nesting(), 1);
            assert!(!arch::tick_interrupt_enabled());
            7
        });
        assert_eq!(value, 7);
        assert_eq!(nesting(), 0);
        assert!(arch::tick_interrupt_enabled());
    }
}
