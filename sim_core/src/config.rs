//! Simulation configuration and the structured workload record
//!
//! All knobs are immutable after load. The external parser produces a
//! [`Workload`]; the engine consumes it as-is.

use crate::process::IoRequest;
use core_types::{KillEvent, Pid};
use serde::{Deserialize, Serialize};

/// Safety cap on the tick loop
pub const DEFAULT_MAX_TICKS: u64 = 200_000;

/// Immutable simulation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// FCFS CPU count
    pub nf: usize,
    /// SJF CPU count
    pub ns: usize,
    /// RR CPU count
    pub nr: usize,
    /// EDF CPU count
    pub ne: usize,
    /// RR quantum in ticks
    pub time_slice: u32,
    /// RR → SJF migration threshold on remaining need
    pub rtf: u32,
    /// FCFS → RR migration threshold on accumulated wait
    pub max_w: u32,
    /// Work-stealing period in ticks; zero disables stealing
    pub stl: u64,
    /// Per-tick fork probability for FCFS running processes, in percent
    pub fork_prob: u32,
    /// Hard cap on simulated ticks
    pub max_ticks: u64,
}

impl SimConfig {
    pub fn total_cpus(&self) -> usize {
        self.nf + self.ns + self.nr + self.ne
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            nf: 0,
            ns: 0,
            nr: 0,
            ne: 0,
            time_slice: 0,
            rtf: 0,
            max_w: 0,
            stl: 0,
            fork_prob: 0,
            max_ticks: DEFAULT_MAX_TICKS,
        }
    }
}

/// One process record from the input workload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessSpec {
    pub pid: Pid,
    /// Arrival time
    pub at: u64,
    /// Total CPU need in ticks
    pub ct: u32,
    /// Absolute deadline, if any
    pub deadline: Option<u64>,
    /// I/O requests, triggers strictly increasing within `1..ct`
    pub io: Vec<IoRequest>,
}

/// The structured input record the external parser produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workload {
    pub config: SimConfig,
    pub processes: Vec<ProcessSpec>,
    pub kill_events: Vec<KillEvent>,
}
