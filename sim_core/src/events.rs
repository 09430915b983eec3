//! Structured scheduling events
//!
//! The scheduler keeps an append-only audit log of everything it decides,
//! tagged with the simulated time and the CPU involved. Tests assert
//! scheduling behavior through this log rather than by poking at internals.

use core_types::{CpuId, Pid, TermReason};
use serde::{Deserialize, Serialize};

/// Why a running process was preempted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PreemptReason {
    /// RR time slice used up
    QuantumExpired,
    /// An EDF enqueue brought a strictly earlier deadline
    EarlierDeadline,
}

/// Which dispatch-time migration rule fired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MigrationRule {
    /// RR → SJF: remaining need dropped below the RTF threshold
    RemainingBelowRtf,
    /// FCFS → RR: accumulated wait exceeded the MaxW threshold
    WaitAboveMaxW,
}

/// One entry in the scheduler's audit log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimEvent {
    /// A NEW process entered a ready queue
    Admitted { time: u64, pid: Pid, cpu: CpuId },
    /// A ready process was installed in a running slot
    Dispatched { time: u64, pid: Pid, cpu: CpuId },
    /// A running process was moved back to ready
    Preempted {
        time: u64,
        pid: Pid,
        cpu: CpuId,
        reason: PreemptReason,
    },
    /// A dispatch candidate was rerouted to another discipline
    Migrated {
        time: u64,
        pid: Pid,
        from: CpuId,
        to: CpuId,
        rule: MigrationRule,
    },
    /// The periodic balancer moved a ready process between CPUs
    Stolen {
        time: u64,
        pid: Pid,
        from: CpuId,
        to: CpuId,
    },
    /// A running FCFS process spawned a child
    Forked {
        time: u64,
        parent: Pid,
        child: Pid,
        cpu: CpuId,
    },
    /// A running process hit an I/O trigger and joined the BLK queue
    Blocked { time: u64, pid: Pid, cpu: CpuId },
    /// The device picked up a blocked process
    IoStarted { time: u64, pid: Pid, duration: u32 },
    /// The device released a process onto a ready queue
    IoFinished { time: u64, pid: Pid, cpu: CpuId },
    /// A process reached the TRM list
    Terminated {
        time: u64,
        pid: Pid,
        reason: TermReason,
    },
    /// A SIGKILL target was not in FCFS context and was skipped
    KillSkipped { time: u64, pid: Pid },
}
