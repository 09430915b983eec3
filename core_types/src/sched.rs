//! Scheduling disciplines, lifecycle states, and kill events

use crate::Pid;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The scheduling discipline a virtual CPU runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CpuKind {
    /// First-come, first-served
    Fcfs,
    /// Shortest job first (by remaining CPU need)
    Sjf,
    /// Round-robin with a fixed time slice
    Rr,
    /// Earliest deadline first
    Edf,
}

impl CpuKind {
    /// Returns the display name of the discipline
    pub fn as_str(&self) -> &'static str {
        match self {
            CpuKind::Fcfs => "FCFS",
            CpuKind::Sjf => "SJF",
            CpuKind::Rr => "RR",
            CpuKind::Edf => "EDF",
        }
    }
}

impl fmt::Display for CpuKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Process lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcState {
    /// Created from input, not yet admitted
    New,
    /// Waiting in some CPU's ready queue
    Rdy,
    /// Installed in a CPU's running slot
    Run,
    /// Waiting for the I/O device
    Blk,
    /// Terminated (terminal state)
    Trm,
}

impl ProcState {
    /// Returns the display name of the state
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcState::New => "NEW",
            ProcState::Rdy => "RDY",
            ProcState::Run => "RUN",
            ProcState::Blk => "BLK",
            ProcState::Trm => "TRM",
        }
    }
}

impl fmt::Display for ProcState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a process terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TermReason {
    /// Ran its CPU need to completion
    Normal,
    /// Killed by an input-scheduled SIGKILL event
    SigKill,
    /// Killed because its parent terminated
    Orphan,
}

impl TermReason {
    /// Returns true for the kill reasons counted in the killed total
    pub fn is_kill(&self) -> bool {
        matches!(self, TermReason::SigKill | TermReason::Orphan)
    }
}

/// An asynchronous SIGKILL scheduled by the input workload
///
/// Events are applied in `(time, pid)` order by a monotonically advancing
/// cursor; the derived ordering matches that sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct KillEvent {
    /// Simulated time at which the kill fires
    pub time: u64,
    /// Target process
    pub pid: Pid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpu_kind_names() {
        assert_eq!(CpuKind::Fcfs.as_str(), "FCFS");
        assert_eq!(CpuKind::Sjf.as_str(), "SJF");
        assert_eq!(CpuKind::Rr.as_str(), "RR");
        assert_eq!(CpuKind::Edf.as_str(), "EDF");
    }

    #[test]
    fn test_proc_state_names() {
        assert_eq!(ProcState::New.as_str(), "NEW");
        assert_eq!(ProcState::Trm.as_str(), "TRM");
    }

    #[test]
    fn test_term_reason_is_kill() {
        assert!(!TermReason::Normal.is_kill());
        assert!(TermReason::SigKill.is_kill());
        assert!(TermReason::Orphan.is_kill());
    }

    #[test]
    fn test_kill_event_ordering() {
        let a = KillEvent {
            time: 1,
            pid: Pid::new(9),
        };
        let b = KillEvent {
            time: 2,
            pid: Pid::new(1),
        };
        let c = KillEvent {
            time: 2,
            pid: Pid::new(3),
        };
        let mut events = vec![c, b, a];
        events.sort();
        assert_eq!(events, vec![a, b, c]);
    }
}
