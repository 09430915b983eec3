//! Virtual CPU records
//!
//! Each [`Cpu`] owns one ready queue of the variant its discipline calls
//! for, an optional running process, busy/idle counters, and (for RR) a
//! time slice with its quantum counter. The expected finish time — ready
//! work plus the running process's remaining — is the sole figure of merit
//! for admission, migration, and work-stealing placement.

use crate::process::Process;
use crate::queue::ReadyQueue;
use core_types::{CpuId, CpuKind, Pid};
use std::collections::HashMap;

/// One virtual CPU
#[derive(Debug, Clone)]
pub struct Cpu {
    id: CpuId,
    kind: CpuKind,
    ready: ReadyQueue,
    running: Option<Pid>,
    busy: u64,
    idle: u64,
    // RR only; zero elsewhere
    time_slice: u32,
    quantum: u32,
}

impl Cpu {
    /// Creates a CPU of the given discipline
    ///
    /// `time_slice` is only meaningful for RR; other kinds pass zero.
    pub fn new(id: CpuId, kind: CpuKind, time_slice: u32) -> Self {
        let ready = match kind {
            CpuKind::Fcfs | CpuKind::Rr => ReadyQueue::fifo(),
            CpuKind::Sjf | CpuKind::Edf => ReadyQueue::heap(),
        };
        Self {
            id,
            kind,
            ready,
            running: None,
            busy: 0,
            idle: 0,
            time_slice,
            quantum: 0,
        }
    }

    pub fn id(&self) -> CpuId {
        self.id
    }

    pub fn kind(&self) -> CpuKind {
        self.kind
    }

    /// Adds a ready process, deriving the ordering key from the discipline
    pub fn enqueue(&mut self, p: &Process) {
        let key = match self.kind {
            CpuKind::Sjf => u64::from(p.remaining()),
            CpuKind::Edf => p.deadline().unwrap_or(u64::MAX),
            CpuKind::Fcfs | CpuKind::Rr => 0,
        };
        self.ready.push(p.pid(), key, p.remaining());
    }

    pub fn pop_ready(&mut self) -> Option<Pid> {
        self.ready.pop()
    }

    pub fn peek_ready(&self) -> Option<Pid> {
        self.ready.peek()
    }

    /// Stable removal from the ready queue; FCFS/RR only
    pub fn remove_ready_by_pid(&mut self, pid: Pid) -> bool {
        self.ready.remove_by_pid(pid)
    }

    pub fn ready_count(&self) -> usize {
        self.ready.len()
    }

    pub fn ready_pids(&self) -> Vec<Pid> {
        self.ready.pids()
    }

    pub fn ready_work(&self) -> u64 {
        self.ready.ready_work()
    }

    /// Ready work plus the running process's remaining need
    pub fn expected_finish_time(&self, procs: &HashMap<Pid, Process>) -> u64 {
        let run_rem = self
            .running
            .and_then(|pid| procs.get(&pid))
            .map(|p| u64::from(p.remaining()))
            .unwrap_or(0);
        self.ready.ready_work() + run_rem
    }

    pub fn is_idle(&self) -> bool {
        self.running.is_none()
    }

    pub fn running(&self) -> Option<Pid> {
        self.running
    }

    pub fn set_running(&mut self, pid: Pid) {
        self.running = Some(pid);
    }

    pub fn clear_running(&mut self) {
        self.running = None;
    }

    pub fn add_busy(&mut self) {
        self.busy += 1;
    }

    pub fn add_idle(&mut self) {
        self.idle += 1;
    }

    pub fn busy(&self) -> u64 {
        self.busy
    }

    pub fn idle(&self) -> u64 {
        self.idle
    }

    pub fn time_slice(&self) -> u32 {
        self.time_slice
    }

    pub fn quantum_counter(&self) -> u32 {
        self.quantum
    }

    pub fn reset_quantum(&mut self) {
        self.quantum = 0;
    }

    pub fn inc_quantum(&mut self) {
        self.quantum += 1;
    }

    /// True when an RR time slice has been used up
    pub fn quantum_expired(&self) -> bool {
        self.time_slice > 0 && self.quantum >= self.time_slice
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProcessSpec;

    fn table(specs: &[(u32, u32)]) -> HashMap<Pid, Process> {
        specs
            .iter()
            .map(|&(pid, ct)| {
                let pid = Pid::new(pid);
                (
                    pid,
                    Process::from_spec(&ProcessSpec {
                        pid,
                        at: 0,
                        ct,
                        deadline: None,
                        io: Vec::new(),
                    }),
                )
            })
            .collect()
    }

    #[test]
    fn test_queue_variant_matches_kind() {
        let procs = table(&[(1, 9), (2, 4)]);
        let mut sjf = Cpu::new(CpuId(0), CpuKind::Sjf, 0);
        sjf.enqueue(&procs[&Pid::new(1)]);
        sjf.enqueue(&procs[&Pid::new(2)]);
        // Shortest remaining first
        assert_eq!(sjf.pop_ready(), Some(Pid::new(2)));

        let mut fcfs = Cpu::new(CpuId(1), CpuKind::Fcfs, 0);
        fcfs.enqueue(&procs[&Pid::new(1)]);
        fcfs.enqueue(&procs[&Pid::new(2)]);
        // Arrival order
        assert_eq!(fcfs.pop_ready(), Some(Pid::new(1)));
    }

    #[test]
    fn test_edf_orders_missing_deadline_last() {
        let mut procs = table(&[(1, 5)]);
        let with_dl = Pid::new(2);
        procs.insert(
            with_dl,
            Process::from_spec(&ProcessSpec {
                pid: with_dl,
                at: 0,
                ct: 5,
                deadline: Some(30),
                io: Vec::new(),
            }),
        );

        let mut edf = Cpu::new(CpuId(0), CpuKind::Edf, 0);
        edf.enqueue(&procs[&Pid::new(1)]);
        edf.enqueue(&procs[&with_dl]);
        assert_eq!(edf.pop_ready(), Some(with_dl));
        assert_eq!(edf.pop_ready(), Some(Pid::new(1)));
    }

    #[test]
    fn test_expected_finish_time() {
        let procs = table(&[(1, 9), (2, 4), (3, 2)]);
        let mut cpu = Cpu::new(CpuId(0), CpuKind::Fcfs, 0);

        assert_eq!(cpu.expected_finish_time(&procs), 0);

        cpu.enqueue(&procs[&Pid::new(2)]);
        cpu.enqueue(&procs[&Pid::new(3)]);
        assert_eq!(cpu.expected_finish_time(&procs), 6);

        cpu.set_running(Pid::new(1));
        assert_eq!(cpu.expected_finish_time(&procs), 15);
    }

    #[test]
    fn test_quantum_expiry() {
        let mut cpu = Cpu::new(CpuId(0), CpuKind::Rr, 2);
        assert!(!cpu.quantum_expired());
        cpu.inc_quantum();
        assert!(!cpu.quantum_expired());
        cpu.inc_quantum();
        assert!(cpu.quantum_expired());
        cpu.reset_quantum();
        assert!(!cpu.quantum_expired());
    }

    #[test]
    fn test_zero_time_slice_never_expires() {
        let mut cpu = Cpu::new(CpuId(0), CpuKind::Rr, 0);
        cpu.inc_quantum();
        cpu.inc_quantum();
        assert!(!cpu.quantum_expired());
    }
}
