//! Final accounting
//!
//! Builds the structured output record an external writer formats: one row
//! per terminated process in TRM-append order, a summary of counters and
//! averages, and per-CPU utilization. Waiting time is defined as turnaround
//! minus CPU need and deliberately ignores time spent on the I/O device.

use crate::scheduler::Scheduler;
use core_types::{CpuId, CpuKind, Pid};
use serde::{Deserialize, Serialize};

/// One terminated process's accounting row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessRow {
    pub tt: u64,
    pub pid: Pid,
    pub at: u64,
    pub ct: u32,
    pub deadline: Option<u64>,
    /// Sum of all I/O durations the process declared
    pub io_dur: u32,
    /// `turnaround - ct`; negative for processes killed before finishing
    pub waiting: i64,
    /// `first_run - at`; zero when the process never ran
    pub response: i64,
    /// `tt - at`
    pub turnaround: i64,
}

/// Deadline outcome over completed deadline-bearing processes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadlineStat {
    pub met: usize,
    pub with_deadline: usize,
}

impl DeadlineStat {
    pub fn percent(&self) -> f64 {
        100.0 * self.met as f64 / self.with_deadline as f64
    }
}

/// Per-CPU busy/idle accounting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuStats {
    pub id: CpuId,
    pub kind: CpuKind,
    pub busy: u64,
    pub idle: u64,
}

impl CpuStats {
    pub fn utilization(&self) -> f64 {
        let total = self.busy + self.idle;
        if total == 0 {
            0.0
        } else {
            100.0 * self.busy as f64 / total as f64
        }
    }
}

/// Aggregate figures over the whole run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_terminated: usize,
    pub forked_created: usize,
    /// SIGKILL and ORPHAN terminations
    pub killed: usize,
    pub mig_rtf: usize,
    pub mig_maxw: usize,
    pub steal_moves: usize,
    pub avg_waiting: f64,
    pub avg_response: f64,
    pub avg_turnaround: f64,
    /// Absent when no deadline-bearing process completed
    pub deadline: Option<DeadlineStat>,
}

/// The full output record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub rows: Vec<ProcessRow>,
    pub summary: Summary,
    pub cpus: Vec<CpuStats>,
}

impl Scheduler {
    /// Builds the final accounting record
    pub fn report(&self) -> Report {
        let mut rows = Vec::with_capacity(self.trm().len());
        let mut sum_waiting = 0i64;
        let mut sum_response = 0i64;
        let mut sum_turnaround = 0i64;
        let mut met = 0usize;
        let mut with_deadline = 0usize;

        for &pid in self.trm() {
            let Some(p) = self.process(pid) else {
                continue;
            };
            let tt = p.tt().unwrap_or(0);
            let turnaround = tt as i64 - p.at() as i64;
            let waiting = turnaround - i64::from(p.ct());
            let response = p
                .first_run()
                .map(|fr| fr as i64 - p.at() as i64)
                .unwrap_or(0);

            // Deadline metric counts only processes that ran to completion
            if p.is_finished() {
                if let Some(dl) = p.deadline() {
                    with_deadline += 1;
                    if tt <= dl {
                        met += 1;
                    }
                }
            }

            sum_waiting += waiting;
            sum_response += response;
            sum_turnaround += turnaround;
            rows.push(ProcessRow {
                tt,
                pid,
                at: p.at(),
                ct: p.ct(),
                deadline: p.deadline(),
                io_dur: p.total_io(),
                waiting,
                response,
                turnaround,
            });
        }

        let count = rows.len();
        let avg = |sum: i64| {
            if count == 0 {
                0.0
            } else {
                sum as f64 / count as f64
            }
        };

        Report {
            summary: Summary {
                total_terminated: count,
                forked_created: self.counters().forked_created,
                killed: self.counters().killed,
                mig_rtf: self.counters().mig_rtf,
                mig_maxw: self.counters().mig_maxw,
                steal_moves: self.counters().steal_moves,
                avg_waiting: avg(sum_waiting),
                avg_response: avg(sum_response),
                avg_turnaround: avg(sum_turnaround),
                deadline: (with_deadline > 0).then_some(DeadlineStat {
                    met,
                    with_deadline,
                }),
            },
            cpus: self
                .cpus()
                .iter()
                .map(|cpu| CpuStats {
                    id: cpu.id(),
                    kind: cpu.kind(),
                    busy: cpu.busy(),
                    idle: cpu.idle(),
                })
                .collect(),
            rows,
        }
    }
}
