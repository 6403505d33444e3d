//! # External Collaborator Interfaces
//!
//! The scheduler core treats the button driver and the task-manager
//! overlay as external collaborators: only their interfaces live here.
//! A board registers implementations with the kernel during init; the
//! preemption handler polls them once per tick.

use bitflags::bitflags;

bitflags! {
    /// State of the board's buttons, as reported by the input driver.
    /// Bit assignments follow the board wiring.
    pub struct Buttons: u8 {
        const BUTTON_1 = 0b0000_0001;
        const BUTTON_2 = 0b0000_0010;
        const BUTTON_3 = 0b0000_0100;
        const BUTTON_4 = 0b0000_1000;
    }
}

/// Button input driver.
///
/// `read` must not block; the preemption handler calls it on every tick.
/// `wait_for_release` busy-waits until no button is held and is only
/// invoked after the task-manager chord was observed.
pub trait InputDevice: Sync {
    /// Current button state.
    fn read(&self) -> Buttons;

    /// Block until all buttons are released.
    fn wait_for_release(&self);
}

/// Task-manager overlay.
///
/// `open` blocks until the overlay is dismissed. It runs inside the
/// preemption handler with the tick source masked, so the scheduler
/// sees the whole interaction as atomic.
pub trait TaskManager: Sync {
    /// Show the overlay and handle its interaction.
    fn open(&self);
}
