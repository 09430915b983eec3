//! Per-tick snapshots and the observer seam
//!
//! After the work of each tick the scheduler emits a read-only
//! [`TickSnapshot`] to the configured [`Observer`]. Observers render or
//! record; they receive a shared reference and cannot mutate the
//! simulation.

use core_types::{CpuId, CpuKind, Pid};
use serde::{Deserialize, Serialize};

/// A process still waiting for admission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEntry {
    pub pid: Pid,
    pub at: u64,
}

/// Occupant of the I/O device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IoDeviceView {
    pub pid: Pid,
    pub remaining: u32,
}

/// A process waiting in the BLK queue with its pending duration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlkEntry {
    pub pid: Pid,
    pub pending: u32,
}

/// A terminated process with its termination time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrmEntry {
    pub pid: Pid,
    pub tt: Option<u64>,
}

/// The running slot of one CPU
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunningView {
    pub pid: Pid,
    pub remaining: u32,
    pub executed: u32,
    /// RR quantum progress; zero on other disciplines
    pub quantum: u32,
    pub time_slice: u32,
}

/// One CPU's row in the snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuView {
    pub id: CpuId,
    pub kind: CpuKind,
    /// Ready PIDs in display order
    pub ready: Vec<Pid>,
    pub running: Option<RunningView>,
    pub busy: u64,
    pub idle: u64,
}

/// Read-only view of the whole simulation at the end of one tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickSnapshot {
    pub time: u64,
    pub new_list: Vec<NewEntry>,
    pub io_device: Option<IoDeviceView>,
    pub blk: Vec<BlkEntry>,
    pub trm: Vec<TrmEntry>,
    pub cpus: Vec<CpuView>,
}

/// Receives one snapshot per tick
pub trait Observer {
    fn on_tick(&mut self, snapshot: &TickSnapshot);
}

/// Observer that discards every snapshot (silent runs)
#[derive(Debug, Default)]
pub struct NullObserver;

impl Observer for NullObserver {
    fn on_tick(&mut self, _snapshot: &TickSnapshot) {}
}
