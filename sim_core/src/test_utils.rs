//! Test utilities
//!
//! Workload builders and an invariant checker shared by unit and
//! integration tests.

use crate::config::{ProcessSpec, SimConfig, Workload};
use crate::process::IoRequest;
use crate::rng::ScriptedForkRng;
use crate::scheduler::Scheduler;
use core_types::{CpuKind, KillEvent, Pid, ProcState};
use std::collections::HashMap;

/// Builds a workload with the given CPU pool and default policy knobs
pub fn workload(
    nf: usize,
    ns: usize,
    nr: usize,
    ne: usize,
    processes: Vec<ProcessSpec>,
    kill_events: Vec<KillEvent>,
) -> Workload {
    Workload {
        config: SimConfig {
            nf,
            ns,
            nr,
            ne,
            ..SimConfig::default()
        },
        processes,
        kill_events,
    }
}

/// A process record with no I/O and no deadline
pub fn spec(pid: u32, at: u64, ct: u32) -> ProcessSpec {
    ProcessSpec {
        pid: Pid::new(pid),
        at,
        ct,
        deadline: None,
        io: Vec::new(),
    }
}

/// A process record with `(trigger, duration)` I/O requests
pub fn spec_io(pid: u32, at: u64, ct: u32, io: Vec<(u32, u32)>) -> ProcessSpec {
    ProcessSpec {
        pid: Pid::new(pid),
        at,
        ct,
        deadline: None,
        io: io
            .into_iter()
            .map(|(trigger, duration)| IoRequest { trigger, duration })
            .collect(),
    }
}

/// A process record with an absolute deadline
pub fn spec_dl(pid: u32, at: u64, ct: u32, deadline: u64) -> ProcessSpec {
    ProcessSpec {
        pid: Pid::new(pid),
        at,
        ct,
        deadline: Some(deadline),
        io: Vec::new(),
    }
}

/// Builds a scheduler over a scripted fork source
///
/// `draws` are consumed in order; an exhausted script yields 100 forever.
pub fn sched(workload: Workload, draws: Vec<u32>) -> Scheduler {
    Scheduler::new(workload, Box::new(ScriptedForkRng::new(draws)))
}

/// Asserts every structural invariant of the engine
///
/// `input_count` is the number of processes the workload declared (`M`),
/// before forks.
pub fn assert_invariants(s: &Scheduler, input_count: usize) {
    let snap = s.snapshot();

    // a live process is referenced from exactly one place
    for (pid, count) in live_references(s) {
        assert_eq!(count, 1, "PID {} referenced from {} places", pid, count);
        let state = s
            .process(pid)
            .unwrap_or_else(|| panic!("PID {} missing from table", pid))
            .state();
        assert_ne!(state, ProcState::Trm, "terminated PID {} still live", pid);
    }
    for entry in &snap.trm {
        let p = s.process(entry.pid).expect("TRM PID missing from table");
        assert_eq!(p.state(), ProcState::Trm);
        assert!(p.tt().is_some());
    }

    for cpu in s.cpus() {
        // ready_work bookkeeping matches the queue contents
        let expected: u64 = cpu
            .ready_pids()
            .iter()
            .map(|pid| u64::from(s.process(*pid).map(|p| p.remaining()).unwrap_or(0)))
            .sum();
        assert_eq!(
            cpu.ready_work(),
            expected,
            "ready_work desync on {}",
            cpu.id()
        );

        // forked children stay in FCFS context
        if cpu.kind() != CpuKind::Fcfs {
            for pid in cpu.ready_pids() {
                assert!(
                    !s.process(pid).map(|p| p.is_forked_child()).unwrap_or(false),
                    "forked child {} on {} queue",
                    pid,
                    cpu.kind()
                );
            }
            if let Some(pid) = cpu.running() {
                assert!(!s.process(pid).map(|p| p.is_forked_child()).unwrap_or(false));
            }
        }

        // discipline-specific head ordering
        match cpu.kind() {
            CpuKind::Sjf => {
                if let Some(head) = cpu.peek_ready() {
                    let head_key = sjf_key(s, head);
                    for pid in cpu.ready_pids() {
                        assert!(head_key <= sjf_key(s, pid), "SJF head not minimal");
                    }
                }
            }
            CpuKind::Edf => {
                if let Some(run) = cpu.running() {
                    let run_dl = deadline_or_max(s, run);
                    for pid in cpu.ready_pids() {
                        assert!(
                            deadline_or_max(s, pid) >= run_dl,
                            "EDF running process outlives a ready deadline"
                        );
                    }
                }
            }
            _ => {}
        }
    }

    // forked children never touch the I/O subsystem
    if let Some(pid) = s.io().device() {
        assert!(!s.process(pid).map(|p| p.is_forked_child()).unwrap_or(false));
    }
    for pid in s.io().blk() {
        assert!(!s.process(*pid).map(|p| p.is_forked_child()).unwrap_or(false));
    }

    // executed + remaining == CT for every process ever created
    for p in s.procs().values() {
        assert_eq!(
            p.executed() + p.remaining(),
            p.ct(),
            "conservation violated for PID {}",
            p.pid()
        );
    }

    // counter identities
    assert_eq!(s.trm_count(), snap.trm.len());
    assert_eq!(
        s.total_created(),
        input_count + s.counters().forked_created,
        "created-count identity broken"
    );
}

fn live_references(s: &Scheduler) -> HashMap<Pid, usize> {
    let snap = s.snapshot();
    let mut seen: HashMap<Pid, usize> = HashMap::new();
    for entry in &snap.new_list {
        *seen.entry(entry.pid).or_default() += 1;
    }
    for cpu in &snap.cpus {
        for pid in &cpu.ready {
            *seen.entry(*pid).or_default() += 1;
        }
        if let Some(run) = &cpu.running {
            *seen.entry(run.pid).or_default() += 1;
        }
    }
    for entry in &snap.blk {
        *seen.entry(entry.pid).or_default() += 1;
    }
    if let Some(dev) = &snap.io_device {
        *seen.entry(dev.pid).or_default() += 1;
    }
    seen
}

fn sjf_key(s: &Scheduler, pid: Pid) -> (u32, Pid) {
    (s.process(pid).map(|p| p.remaining()).unwrap_or(0), pid)
}

fn deadline_or_max(s: &Scheduler, pid: Pid) -> u64 {
    s.process(pid)
        .and_then(|p| p.deadline())
        .unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invariants_hold_through_busy_run() {
        let mut w = workload(
            1,
            1,
            1,
            1,
            vec![
                spec(1, 0, 12),
                spec_io(2, 0, 8, vec![(3, 4)]),
                spec_dl(3, 1, 6, 30),
                spec(4, 2, 9),
                spec_dl(5, 3, 4, 15),
            ],
            vec![KillEvent {
                time: 4,
                pid: Pid::new(1),
            }],
        );
        w.config.time_slice = 2;
        w.config.rtf = 2;
        w.config.max_w = 3;
        w.config.stl = 4;
        w.config.fork_prob = 60;

        let mut s = sched(w, vec![10, 80, 30, 95, 50, 20]);
        let mut guard = 0;
        while !s.is_complete() && guard < 500 {
            s.step();
            assert_invariants(&s, 5);
            guard += 1;
        }
        assert!(s.is_complete());
    }
}
