//! Unique identifiers for simulated entities

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a simulated process
///
/// Input workloads assign PIDs explicitly; forked children are allocated
/// monotonically past the largest input PID, so a PID never repeats within
/// a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pid(u32);

impl Pid {
    /// Creates a process ID from its numeric value
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the numeric value
    pub fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier for a virtual CPU
///
/// CPUs are indexed densely from zero in build order (FCFS, then SJF, then
/// RR, then EDF), and all per-phase iteration is in index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CpuId(pub usize);

impl fmt::Display for CpuId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}
