//! # StratOS Demo Firmware
//!
//! Two autostart programs sharing the CPU under the Round Robin
//! strategy:
//!
//! | Program | Behavior |
//! |---------|----------|
//! | `counter_program` | Busy-increments a counter; relies on preemption |
//! | `worker_program`  | Simulated burst work, equally compute-bound |
//!
//! Neither program ever yields — there is no cooperative yield in this
//! kernel. Sharing comes entirely from the tick-driven preemption and
//! the active strategy.
//!
//! On a non-bare-metal host this binary prints a short schedule trace
//! per strategy instead, driving the same dispatch path the hardware
//! tick would.

#![cfg_attr(all(target_arch = "arm", target_os = "none"), no_std)]
#![cfg_attr(all(target_arch = "arm", target_os = "none"), no_main)]

#[cfg(all(target_arch = "arm", target_os = "none"))]
mod firmware {
    use cortex_m_rt::entry;
    use panic_halt as _;

    use stratos::kernel::{self, AutostartNode};
    use stratos::strategy::StrategyKind;

    /// Busy counter. Only preemption takes the CPU away from it.
    extern "C" fn counter_program() -> ! {
        let mut count: u32 = 0;
        loop {
            count = count.wrapping_add(1);
        }
    }

    /// Simulated burst worker.
    extern "C" fn worker_program() -> ! {
        loop {
            let mut acc: u32 = 0;
            for step in 0..5000u32 {
                acc = acc.wrapping_add(step);
            }
            core::hint::black_box(acc);
        }
    }

    static WORKER: AutostartNode = AutostartNode {
        program: worker_program,
        next: None,
    };
    static COUNTER: AutostartNode = AutostartNode {
        program: counter_program,
        next: Some(&WORKER),
    };

    #[entry]
    fn main() -> ! {
        kernel::init_scheduler(Some(&COUNTER));
        kernel::set_strategy(StrategyKind::RoundRobin);
        kernel::start_scheduler()
    }
}

#[cfg(not(all(target_arch = "arm", target_os = "none")))]
fn main() {
    use stratos::scheduler::Scheduler;
    use stratos::strategy::StrategyKind;

    extern "C" fn spin() -> ! {
        loop {}
    }

    let strategies = [
        StrategyKind::Even,
        StrategyKind::Random,
        StrategyKind::RunToCompletion,
        StrategyKind::RoundRobin,
        StrategyKind::InactiveAging,
    ];

    println!("schedule trace: idle=0, A=1 (pri 2), B=2 (pri 3)");
    for kind in strategies {
        let mut scheduler = Scheduler::new();
        scheduler.exec(spin, 1).expect("idle");
        scheduler.exec(spin, 2).expect("A");
        scheduler.exec(spin, 3).expect("B");
        scheduler.set_strategy(kind);

        print!("{:16?}", kind);
        for _ in 0..12 {
            let saved_sp = scheduler.slots[scheduler.current].stack_pointer;
            scheduler.dispatch(saved_sp).expect("dispatch");
            print!(" {}", scheduler.current);
        }
        println!();
    }
}
