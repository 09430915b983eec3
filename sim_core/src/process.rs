//! Process model
//!
//! A [`Process`] is the mutable record of one schedulable entity: its CPU
//! demand, its ordered I/O requests, its deadline, its fork relationships,
//! and the timing stamps the final accounting needs.
//!
//! The scheduler owns every process in a single table for the whole run;
//! queues and slots refer to processes by [`Pid`] only.

use crate::config::ProcessSpec;
use core_types::{Pid, ProcState};
use serde::{Deserialize, Serialize};

/// A single periodic I/O request
///
/// The request becomes due immediately after the CPU tick in which the
/// process's executed count reaches `trigger`; the process then waits for
/// the shared device for `duration` ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IoRequest {
    /// Executed-tick count at which the request fires (strictly inside `1..CT`)
    pub trigger: u32,
    /// Device occupancy in ticks
    pub duration: u32,
}

/// Mutable record of a single schedulable entity
#[derive(Debug, Clone)]
pub struct Process {
    pid: Pid,
    at: u64,
    ct: u32,

    remaining: u32,
    executed: u32,

    io: Vec<IoRequest>,
    next_io: usize,
    pending_io: u32,
    total_io: u32,

    deadline: Option<u64>,
    state: ProcState,

    first_run: Option<u64>,
    tt: Option<u64>,

    parent: Option<Pid>,
    children: Vec<Pid>,
    forked_child: bool,
    forked_once: bool,
}

impl Process {
    /// Creates a process from an input workload record, in the NEW state
    pub fn from_spec(spec: &ProcessSpec) -> Self {
        let total_io = spec.io.iter().map(|req| req.duration).sum();
        Self {
            pid: spec.pid,
            at: spec.at,
            ct: spec.ct,
            remaining: spec.ct,
            executed: 0,
            io: spec.io.clone(),
            next_io: 0,
            pending_io: 0,
            total_io,
            deadline: spec.deadline,
            state: ProcState::New,
            first_run: None,
            tt: None,
            parent: None,
            children: Vec::new(),
            forked_child: false,
            forked_once: false,
        }
    }

    /// Creates a forked child: born ready, no I/O, no deadline, pinned to FCFS
    pub fn forked(pid: Pid, at: u64, ct: u32, parent: Pid) -> Self {
        Self {
            pid,
            at,
            ct,
            remaining: ct,
            executed: 0,
            io: Vec::new(),
            next_io: 0,
            pending_io: 0,
            total_io: 0,
            deadline: None,
            state: ProcState::Rdy,
            first_run: None,
            tt: None,
            parent: Some(parent),
            children: Vec::new(),
            forked_child: true,
            forked_once: false,
        }
    }

    /// Consumes one tick of CPU
    pub fn cpu_tick(&mut self) {
        if self.remaining > 0 {
            self.remaining -= 1;
            self.executed += 1;
        }
    }

    /// True iff the next I/O request fires at the current executed count
    pub fn io_due_now(&self) -> bool {
        match self.io.get(self.next_io) {
            Some(req) => self.executed == req.trigger,
            None => false,
        }
    }

    /// Moves the due request's duration into the pending slot and advances
    /// the cursor
    pub fn move_due_io_to_pending(&mut self) {
        if !self.io_due_now() {
            return;
        }
        self.pending_io = self.io[self.next_io].duration;
        self.next_io += 1;
    }

    /// Returns and clears the pending I/O duration
    pub fn take_pending_io(&mut self) -> u32 {
        std::mem::take(&mut self.pending_io)
    }

    /// Stamps the first-run time if it is not set yet
    ///
    /// Called on first dispatch, and on termination so that response time is
    /// defined even for processes killed before they ever ran.
    pub fn mark_first_run_if_needed(&mut self, t: u64) {
        if self.first_run.is_none() {
            self.first_run = Some(t);
        }
    }

    /// True once the CPU demand is exhausted
    pub fn is_finished(&self) -> bool {
        self.remaining == 0
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    pub fn at(&self) -> u64 {
        self.at
    }

    pub fn ct(&self) -> u32 {
        self.ct
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn executed(&self) -> u32 {
        self.executed
    }

    pub fn pending_io(&self) -> u32 {
        self.pending_io
    }

    pub fn total_io(&self) -> u32 {
        self.total_io
    }

    pub fn deadline(&self) -> Option<u64> {
        self.deadline
    }

    pub fn state(&self) -> ProcState {
        self.state
    }

    pub fn set_state(&mut self, state: ProcState) {
        self.state = state;
    }

    pub fn first_run(&self) -> Option<u64> {
        self.first_run
    }

    pub fn tt(&self) -> Option<u64> {
        self.tt
    }

    pub fn set_tt(&mut self, tt: u64) {
        self.tt = Some(tt);
    }

    pub fn parent(&self) -> Option<Pid> {
        self.parent
    }

    pub fn children(&self) -> &[Pid] {
        &self.children
    }

    pub fn add_child(&mut self, child: Pid) {
        self.children.push(child);
    }

    pub fn is_forked_child(&self) -> bool {
        self.forked_child
    }

    pub fn has_forked_once(&self) -> bool {
        self.forked_once
    }

    pub fn mark_forked_once(&mut self) {
        self.forked_once = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proc_with_io(ct: u32, io: Vec<IoRequest>) -> Process {
        Process::from_spec(&ProcessSpec {
            pid: Pid::new(1),
            at: 0,
            ct,
            deadline: None,
            io,
        })
    }

    #[test]
    fn test_cpu_tick_conserves_total() {
        let mut p = proc_with_io(3, Vec::new());
        assert_eq!(p.remaining(), 3);
        assert_eq!(p.executed(), 0);

        p.cpu_tick();
        assert_eq!(p.remaining(), 2);
        assert_eq!(p.executed(), 1);
        assert_eq!(p.executed() + p.remaining(), p.ct());

        p.cpu_tick();
        p.cpu_tick();
        assert!(p.is_finished());

        // Ticking a finished process is a no-op
        p.cpu_tick();
        assert_eq!(p.executed(), 3);
        assert_eq!(p.remaining(), 0);
    }

    #[test]
    fn test_io_due_after_trigger_tick() {
        let mut p = proc_with_io(
            4,
            vec![IoRequest {
                trigger: 2,
                duration: 3,
            }],
        );

        p.cpu_tick();
        assert!(!p.io_due_now());
        p.cpu_tick();
        assert!(p.io_due_now());
    }

    #[test]
    fn test_pending_io_round_trip() {
        let mut p = proc_with_io(
            4,
            vec![
                IoRequest {
                    trigger: 1,
                    duration: 5,
                },
                IoRequest {
                    trigger: 3,
                    duration: 7,
                },
            ],
        );
        assert_eq!(p.total_io(), 12);

        p.cpu_tick();
        assert!(p.io_due_now());
        p.move_due_io_to_pending();
        assert_eq!(p.pending_io(), 5);
        assert!(!p.io_due_now());
        assert_eq!(p.take_pending_io(), 5);
        assert_eq!(p.pending_io(), 0);

        p.cpu_tick();
        p.cpu_tick();
        assert!(p.io_due_now());
        p.move_due_io_to_pending();
        assert_eq!(p.take_pending_io(), 7);
    }

    #[test]
    fn test_move_without_due_io_is_noop() {
        let mut p = proc_with_io(
            3,
            vec![IoRequest {
                trigger: 2,
                duration: 4,
            }],
        );
        p.cpu_tick();
        p.move_due_io_to_pending();
        assert_eq!(p.pending_io(), 0);
    }

    #[test]
    fn test_first_run_set_once() {
        let mut p = proc_with_io(2, Vec::new());
        assert_eq!(p.first_run(), None);
        p.mark_first_run_if_needed(5);
        assert_eq!(p.first_run(), Some(5));
        p.mark_first_run_if_needed(9);
        assert_eq!(p.first_run(), Some(5));
    }

    #[test]
    fn test_forked_child_shape() {
        let p = Process::forked(Pid::new(10), 7, 13, Pid::new(2));
        assert_eq!(p.state(), ProcState::Rdy);
        assert!(p.is_forked_child());
        assert!(!p.has_forked_once());
        assert_eq!(p.parent(), Some(Pid::new(2)));
        assert_eq!(p.ct(), 13);
        assert_eq!(p.remaining(), 13);
        assert_eq!(p.total_io(), 0);
        assert!(p.deadline().is_none());
    }

    #[test]
    fn test_fork_bookkeeping() {
        let mut p = proc_with_io(5, Vec::new());
        p.add_child(Pid::new(8));
        p.mark_forked_once();
        assert_eq!(p.children(), &[Pid::new(8)]);
        assert!(p.has_forked_once());
    }
}
