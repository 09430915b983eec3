//! # Simulation Core
//!
//! A discrete-time, multi-queue, multi-core CPU scheduling simulator.
//!
//! ## Philosophy
//!
//! - **Deterministic**: same workload + same fork seed => same schedule.
//!   All progress is explicit ticks; there are no hidden threads and no
//!   ambient randomness.
//! - **Single-threaded, tick-synchronous**: "multi-core" means multiple
//!   logical CPU records processed in index order within strictly ordered
//!   phases. Every phase completes before the next begins.
//! - **Testable**: all logic runs under `cargo test`; tests drive the
//!   engine tick by tick and assert on the structured audit log.
//!
//! ## Model
//!
//! A heterogeneous pool of virtual CPUs (FCFS, SJF, RR, EDF) executes a
//! synthetic workload of processes with arrival times, CPU bursts, periodic
//! I/O against a single shared device, optional deadlines, probabilistic
//! forking on FCFS, asynchronous SIGKILL events with cascading orphan
//! kills, dispatch-time migration between disciplines, and periodic work
//! stealing. The engine reproduces the full lifecycle of every process and
//! hands a structured accounting record to the caller at the end.
//!
//! ## Example
//!
//! ```
//! use sim_core::{Scheduler, ScriptedForkRng, SimConfig, Workload};
//! use sim_core::config::ProcessSpec;
//! use core_types::Pid;
//!
//! let workload = Workload {
//!     config: SimConfig { nf: 1, ..SimConfig::default() },
//!     processes: vec![ProcessSpec {
//!         pid: Pid::new(1),
//!         at: 0,
//!         ct: 3,
//!         deadline: None,
//!         io: Vec::new(),
//!     }],
//!     kill_events: Vec::new(),
//! };
//!
//! let mut sim = Scheduler::new(workload, Box::new(ScriptedForkRng::new(Vec::new())));
//! sim.run_to_completion();
//! assert_eq!(sim.report().rows[0].tt, 3);
//! ```

pub mod config;
pub mod cpu;
pub mod events;
pub mod io_dev;
pub mod process;
pub mod queue;
pub mod report;
pub mod rng;
pub mod scheduler;
pub mod snapshot;
pub mod test_utils;

pub use config::{ProcessSpec, SimConfig, Workload, DEFAULT_MAX_TICKS};
pub use cpu::Cpu;
pub use events::{MigrationRule, PreemptReason, SimEvent};
pub use io_dev::IoSubsystem;
pub use process::{IoRequest, Process};
pub use queue::ReadyQueue;
pub use report::{CpuStats, DeadlineStat, ProcessRow, Report, Summary};
pub use rng::{ChaChaForkRng, ForkRng, ScriptedForkRng};
pub use scheduler::{Counters, Scheduler};
pub use snapshot::{
    BlkEntry, CpuView, IoDeviceView, NewEntry, NullObserver, Observer, RunningView, TickSnapshot,
    TrmEntry,
};
