//! # Scheduling Strategies
//!
//! The five selection algorithms the preemption core can run: Even,
//! Random, Run-To-Completion, Round Robin and Inactive Aging. A strategy
//! is a pure function over the process table plus whatever private state
//! it owns in [`StrategyState`]; the active one is looked up through the
//! [`selector`] factory. Selectors never allocate, block or call back
//! into the scheduler.
//!
//! ## Selectability
//!
//! A slot is *selectable* when it is `Ready` and is not the idle slot —
//! unless no other slot is ready, in which case idle is the only
//! candidate. Every strategy falls back to idle when nothing else can
//! run.

use rand_core::RngCore;

use crate::config::{IDLE_PID, MAX_PROCESSES, RNG_SEED};
use crate::process::{Pid, ProcessState, ProcessTable};
use crate::rng::XorShift32;

// ---------------------------------------------------------------------------
// Strategy kinds and dispatch
// ---------------------------------------------------------------------------

/// The available scheduling strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    /// Cyclic ascending scan from the current slot; uniform round
    /// visitation.
    Even,
    /// Uniform pick among the selectable slots.
    Random,
    /// Keeps the current process for as long as it stays selectable.
    RunToCompletion,
    /// Priority-sized time slices on top of the Even order.
    RoundRobin,
    /// Priority-proportional aging; the oldest slot wins.
    InactiveAging,
}

impl StrategyKind {
    /// Map an untyped strategy tag (e.g. a configuration byte) to a
    /// kind. Out-of-range tags fall back to `Even`.
    pub fn from_tag(tag: u8) -> Self {
        match tag {
            0 => Self::Even,
            1 => Self::Random,
            2 => Self::RunToCompletion,
            3 => Self::RoundRobin,
            4 => Self::InactiveAging,
            _ => Self::Even,
        }
    }
}

/// Signature shared by all selectors: the table, the preempted process
/// and the strategies' private state in, the next process out.
pub type SelectFn = fn(&ProcessTable, Pid, &mut StrategyState) -> Pid;

/// Look up the selector for `kind`.
pub fn selector(kind: StrategyKind) -> SelectFn {
    match kind {
        StrategyKind::Even => select_even,
        StrategyKind::Random => select_random,
        StrategyKind::RunToCompletion => select_run_to_completion,
        StrategyKind::RoundRobin => select_round_robin,
        StrategyKind::InactiveAging => select_inactive_aging,
    }
}

// ---------------------------------------------------------------------------
// Per-strategy private state
// ---------------------------------------------------------------------------

/// Mutable state owned by the strategies. Only the active strategy's
/// portion is meaningful; [`reset`](Self::reset) clears it when the
/// active strategy changes.
pub struct StrategyState {
    /// Round Robin: ticks the current process may still keep beyond the
    /// one on which it was selected.
    pub(crate) time_slice: u8,

    /// Inactive Aging: per-slot age accumulators.
    pub(crate) ages: [u32; MAX_PROCESSES],

    /// Random: generator state, seeded once at boot.
    pub(crate) rng: XorShift32,
}

impl StrategyState {
    pub const fn new() -> Self {
        Self {
            time_slice: 0,
            ages: [0; MAX_PROCESSES],
            rng: XorShift32::new(RNG_SEED),
        }
    }

    /// Clear the private state of a newly installed strategy.
    ///
    /// Round Robin grants the running process a full slice: the switch
    /// itself was not a Round Robin selection, so no tick of the slice
    /// has been consumed yet.
    pub fn reset(&mut self, kind: StrategyKind, table: &ProcessTable, current: Pid) {
        match kind {
            StrategyKind::RoundRobin => {
                self.time_slice = table[current].priority.max(1);
            }
            StrategyKind::InactiveAging => {
                self.ages = [0; MAX_PROCESSES];
            }
            _ => {}
        }
    }

    /// Clear the per-slot bookkeeping for a newly created process.
    pub fn reset_slot(&mut self, pid: Pid) {
        self.ages[pid] = 0;
    }
}

// ---------------------------------------------------------------------------
// Selectability helpers
// ---------------------------------------------------------------------------

/// True if any slot other than idle is ready.
fn any_ready_beyond_idle(table: &ProcessTable) -> bool {
    table
        .iter()
        .enumerate()
        .any(|(pid, slot)| pid != IDLE_PID && slot.state == ProcessState::Ready)
}

/// Selectability of `pid`: ready, and not the idle slot while any other
/// slot is ready.
fn is_selectable(table: &ProcessTable, pid: Pid) -> bool {
    table[pid].state == ProcessState::Ready
        && (pid != IDLE_PID || !any_ready_beyond_idle(table))
}

/// The Even rule: cyclic ascending scan from `current + 1`, returning
/// the first ready non-idle slot; idle when no other slot is ready.
fn next_even(table: &ProcessTable, current: Pid) -> Pid {
    for offset in 1..=MAX_PROCESSES {
        let pid = (current + offset) % MAX_PROCESSES;
        if pid != IDLE_PID && table[pid].state == ProcessState::Ready {
            return pid;
        }
    }
    IDLE_PID
}

// ---------------------------------------------------------------------------
// The five selectors
// ---------------------------------------------------------------------------

/// Even: the first selectable slot after the current one. Over K
/// selectable slots, any K consecutive calls visit each exactly once.
fn select_even(table: &ProcessTable, current: Pid, _state: &mut StrategyState) -> Pid {
    next_even(table, current)
}

/// Random: a uniform pick from the compacted list of selectable slots.
/// Rejection-free; one generator draw per call.
fn select_random(table: &ProcessTable, _current: Pid, state: &mut StrategyState) -> Pid {
    let mut candidates = [IDLE_PID; MAX_PROCESSES];
    let mut len = 0;
    for pid in 0..MAX_PROCESSES {
        if is_selectable(table, pid) {
            candidates[len] = pid;
            len += 1;
        }
    }

    if len == 0 {
        return IDLE_PID;
    }
    candidates[state.rng.next_u32() as usize % len]
}

/// Run-To-Completion: keep the current process while it stays
/// selectable. This revision has no termination primitive, so a
/// compute-bound process holds the CPU until something external changes
/// its state; only then does selection fall back to the Even rule.
fn select_run_to_completion(table: &ProcessTable, current: Pid, _state: &mut StrategyState) -> Pid {
    if is_selectable(table, current) {
        current
    } else {
        next_even(table, current)
    }
}

/// Round Robin: the current process keeps the CPU for the remainder of
/// its slice. A newly selected slot is granted `max(priority, 1)` ticks
/// inclusive of the selection tick, so a priority-0 process still runs
/// once per turn.
fn select_round_robin(table: &ProcessTable, current: Pid, state: &mut StrategyState) -> Pid {
    if state.time_slice > 0 && is_selectable(table, current) {
        state.time_slice -= 1;
        return current;
    }

    let next = next_even(table, current);
    state.time_slice = table[next].priority.max(1) - 1;
    next
}

/// Inactive Aging: every selectable slot ages by its own priority, then
/// the oldest slot wins. Ties go to the higher priority, further ties to
/// the lower PID. The winner's age is cleared; the others keep their
/// incremented ages.
fn select_inactive_aging(table: &ProcessTable, _current: Pid, state: &mut StrategyState) -> Pid {
    for pid in 0..MAX_PROCESSES {
        if is_selectable(table, pid) {
            state.ages[pid] += table[pid].priority as u32;
        }
    }

    let mut winner: Option<Pid> = None;
    for pid in 0..MAX_PROCESSES {
        if !is_selectable(table, pid) {
            continue;
        }
        match winner {
            None => winner = Some(pid),
            Some(best) => {
                let older = state.ages[pid] > state.ages[best];
                let tie_break = state.ages[pid] == state.ages[best]
                    && table[pid].priority > table[best].priority;
                if older || tie_break {
                    winner = Some(pid);
                }
            }
        }
    }

    match winner {
        Some(pid) => {
            state.ages[pid] = 0;
            pid
        }
        None => IDLE_PID,
    }
}
