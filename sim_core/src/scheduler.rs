//! The tick-driven scheduler core
//!
//! ## Philosophy
//!
//! - **Determinism first**: same workload + same fork seed => same schedule,
//!   tick for tick. All iteration is in CPU index order, all queues have
//!   total orderings, and the only randomness comes through the injected
//!   [`ForkRng`].
//! - **Strict phase order**: one tick runs ten phases to completion, in
//!   order, with no reentrancy: admit arrivals, apply SIGKILL, work-steal,
//!   dispatch (with migration), fork, execute, post-CPU transitions, finish
//!   I/O, start I/O, snapshot. Arrivals at time `t` are visible to SIGKILL
//!   at `t`; a steal at `t` can feed the same tick's dispatch; a process
//!   admitted at `t` can finish no earlier than `t + 1`.
//! - **Single ownership**: the scheduler's process table owns every process
//!   from creation to the end of the run. Ready queues, running slots, the
//!   BLK queue, the device slot, and the TRM list hold PIDs only, and a live
//!   process is referenced from exactly one of them at a time.

use crate::config::{SimConfig, Workload};
use crate::cpu::Cpu;
use crate::events::{MigrationRule, PreemptReason, SimEvent};
use crate::io_dev::IoSubsystem;
use crate::process::Process;
use crate::rng::ForkRng;
use crate::snapshot::{
    BlkEntry, CpuView, IoDeviceView, NewEntry, Observer, RunningView, TickSnapshot, TrmEntry,
};
use core_types::{CpuId, CpuKind, KillEvent, Pid, ProcState, TermReason};
use std::collections::{HashMap, VecDeque};

/// Policy counters reported in the final summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Counters {
    /// RR → SJF migrations (remaining below RTF)
    pub mig_rtf: usize,
    /// FCFS → RR migrations (wait above MaxW)
    pub mig_maxw: usize,
    /// Work-steal moves
    pub steal_moves: usize,
    /// Children created by fork
    pub forked_created: usize,
    /// Terminations with reason SIGKILL or ORPHAN
    pub killed: usize,
}

/// The simulation engine
pub struct Scheduler {
    config: SimConfig,

    procs: HashMap<Pid, Process>,
    new_list: VecDeque<Pid>,

    kill_events: Vec<KillEvent>,
    kill_cursor: usize,

    cpus: Vec<Cpu>,
    io: IoSubsystem,

    trm: Vec<Pid>,
    trm_count: usize,
    total_created: usize,
    next_pid: u32,

    counters: Counters,
    rng: Box<dyn ForkRng>,
    audit: Vec<SimEvent>,

    time: u64,
}

impl Scheduler {
    /// Builds the engine from a structured workload
    ///
    /// Processes are sorted by `(AT, PID)` and kill events by `(time, pid)`
    /// before admission. Forked children receive PIDs past the largest
    /// input PID.
    pub fn new(workload: Workload, rng: Box<dyn ForkRng>) -> Self {
        let Workload {
            config,
            mut processes,
            mut kill_events,
        } = workload;

        assert!(
            config.total_cpus() > 0 || processes.is_empty(),
            "a workload with processes requires at least one CPU"
        );

        processes.sort_by_key(|spec| (spec.at, spec.pid));
        kill_events.sort();

        let mut cpus = Vec::with_capacity(config.total_cpus());
        for _ in 0..config.nf {
            cpus.push(Cpu::new(CpuId(cpus.len()), CpuKind::Fcfs, 0));
        }
        for _ in 0..config.ns {
            cpus.push(Cpu::new(CpuId(cpus.len()), CpuKind::Sjf, 0));
        }
        for _ in 0..config.nr {
            cpus.push(Cpu::new(CpuId(cpus.len()), CpuKind::Rr, config.time_slice));
        }
        for _ in 0..config.ne {
            cpus.push(Cpu::new(CpuId(cpus.len()), CpuKind::Edf, 0));
        }

        let mut procs = HashMap::new();
        let mut new_list = VecDeque::new();
        let mut max_pid = 0u32;
        for spec in &processes {
            max_pid = max_pid.max(spec.pid.get());
            new_list.push_back(spec.pid);
            procs.insert(spec.pid, Process::from_spec(spec));
        }

        let total_created = processes.len();
        Self {
            config,
            procs,
            new_list,
            kill_events,
            kill_cursor: 0,
            cpus,
            io: IoSubsystem::new(),
            trm: Vec::new(),
            trm_count: 0,
            total_created,
            next_pid: max_pid + 1,
            counters: Counters::default(),
            rng,
            audit: Vec::new(),
            time: 0,
        }
    }

    /// True once every created process terminated, or the tick cap was hit
    pub fn is_complete(&self) -> bool {
        self.trm_count >= self.total_created || self.time >= self.config.max_ticks
    }

    /// Runs one full tick without emitting a snapshot
    pub fn step(&mut self) {
        let t = self.time;
        self.run_phases(t);
        self.time = t + 1;
    }

    /// Runs to completion, emitting one snapshot per tick to the observer
    pub fn run(&mut self, observer: &mut dyn Observer) {
        while !self.is_complete() {
            let t = self.time;
            self.run_phases(t);
            let snapshot = self.snapshot();
            observer.on_tick(&snapshot);
            self.time = t + 1;
        }
    }

    /// Runs to completion silently
    pub fn run_to_completion(&mut self) {
        while !self.is_complete() {
            self.step();
        }
    }

    fn run_phases(&mut self, t: u64) {
        self.admit_arrivals(t);
        self.apply_sigkill(t);
        self.work_steal_if_needed(t);
        self.dispatch_idle_cpus(t);
        self.attempt_forking(t);
        self.execute_one_tick();
        self.post_cpu_transitions(t);
        self.finish_io_if_done(t);
        self.start_io_if_possible(t);
    }

    // ---------------- phase 1: arrivals ----------------

    fn admit_arrivals(&mut self, t: u64) {
        loop {
            let Some(&pid) = self.new_list.front() else {
                break;
            };
            let arrives = self.procs.get(&pid).map(|p| p.at()).unwrap_or(u64::MAX);
            if arrives != t {
                break;
            }
            self.new_list.pop_front();
            if let Some(p) = self.procs.get_mut(&pid) {
                p.set_state(ProcState::Rdy);
            }
            let idx = self.pick_best_cpu();
            self.enqueue_on(idx, pid);
            self.audit.push(SimEvent::Admitted {
                time: t,
                pid,
                cpu: CpuId(idx),
            });
            if self.cpus[idx].kind() == CpuKind::Edf {
                self.edf_preempt_if_needed(idx, t);
            }
        }
    }

    // ---------------- phase 2: SIGKILL ----------------

    fn apply_sigkill(&mut self, t: u64) {
        while self.kill_cursor < self.kill_events.len()
            && self.kill_events[self.kill_cursor].time == t
        {
            let pid = self.kill_events[self.kill_cursor].pid;
            self.kill_cursor += 1;
            // Kill targets are constrained to FCFS context; anything else
            // is a recorded no-op.
            if !self.kill_by_pid_in_fcfs(pid, t, TermReason::SigKill) {
                self.audit.push(SimEvent::KillSkipped { time: t, pid });
            }
        }
    }

    // ---------------- phase 3: work stealing ----------------

    fn work_steal_if_needed(&mut self, t: u64) {
        if self.config.stl == 0 || t == 0 || t % self.config.stl != 0 {
            return;
        }
        // Bound total moves by the ready population so the rebalance cannot
        // ping-pong a process between two CPUs forever.
        let mut budget: usize = self.cpus.iter().map(|cpu| cpu.ready_count()).sum();
        loop {
            if budget == 0 {
                return;
            }
            budget -= 1;
            let Some(long_idx) = self.find_longest_by_eft() else {
                return;
            };
            let Some(short_idx) = self.find_shortest_by_eft() else {
                return;
            };
            if long_idx == short_idx {
                return;
            }
            let lqf = self.cpus[long_idx].expected_finish_time(&self.procs);
            let sqf = self.cpus[short_idx].expected_finish_time(&self.procs);
            if lqf == 0 {
                return;
            }
            let steal_limit = (lqf - sqf) as f64 * 100.0 / lqf as f64;
            if steal_limit <= 40.0 {
                return;
            }
            let Some(top) = self.cpus[long_idx].peek_ready() else {
                return;
            };
            let top_is_forked = self
                .procs
                .get(&top)
                .map(|p| p.is_forked_child())
                .unwrap_or(true);
            if top_is_forked {
                return;
            }
            let Some(stolen) = self.cpus[long_idx].pop_ready() else {
                return;
            };
            if let Some(p) = self.procs.get_mut(&stolen) {
                p.set_state(ProcState::Rdy);
            }
            // The stolen process adopts the destination's queue ordering.
            self.enqueue_on(short_idx, stolen);
            self.counters.steal_moves += 1;
            self.audit.push(SimEvent::Stolen {
                time: t,
                pid: stolen,
                from: CpuId(long_idx),
                to: CpuId(short_idx),
            });
        }
    }

    // ---------------- phase 4: dispatch ----------------

    fn dispatch_idle_cpus(&mut self, t: u64) {
        for i in 0..self.cpus.len() {
            // Keep trying until something runs or the ready queue empties
            while self.cpus[i].is_idle() {
                let Some(pid) = self.cpus[i].pop_ready() else {
                    break;
                };
                if self.try_migrate_on_dispatch(i, pid, t) {
                    continue;
                }
                if let Some(p) = self.procs.get_mut(&pid) {
                    p.set_state(ProcState::Run);
                    p.mark_first_run_if_needed(t);
                }
                self.cpus[i].set_running(pid);
                self.cpus[i].reset_quantum();
                self.audit.push(SimEvent::Dispatched {
                    time: t,
                    pid,
                    cpu: CpuId(i),
                });
            }
        }
    }

    fn try_migrate_on_dispatch(&mut self, from: usize, pid: Pid, t: u64) -> bool {
        let (forked, remaining, at, executed) = match self.procs.get(&pid) {
            Some(p) => (p.is_forked_child(), p.remaining(), p.at(), p.executed()),
            None => return false,
        };
        if forked {
            return false;
        }

        match self.cpus[from].kind() {
            CpuKind::Rr if remaining < self.config.rtf => {
                if let Some(idx) = self.pick_shortest_of_kind(CpuKind::Sjf) {
                    if let Some(p) = self.procs.get_mut(&pid) {
                        p.set_state(ProcState::Rdy);
                    }
                    self.enqueue_on(idx, pid);
                    self.counters.mig_rtf += 1;
                    self.audit.push(SimEvent::Migrated {
                        time: t,
                        pid,
                        from: CpuId(from),
                        to: CpuId(idx),
                        rule: MigrationRule::RemainingBelowRtf,
                    });
                    return true;
                }
            }
            CpuKind::Fcfs => {
                let waiting = (t - at) as i64 - i64::from(executed);
                if waiting > i64::from(self.config.max_w) {
                    if let Some(idx) = self.pick_shortest_of_kind(CpuKind::Rr) {
                        if let Some(p) = self.procs.get_mut(&pid) {
                            p.set_state(ProcState::Rdy);
                        }
                        self.enqueue_on(idx, pid);
                        self.counters.mig_maxw += 1;
                        self.audit.push(SimEvent::Migrated {
                            time: t,
                            pid,
                            from: CpuId(from),
                            to: CpuId(idx),
                            rule: MigrationRule::WaitAboveMaxW,
                        });
                        return true;
                    }
                }
            }
            _ => {}
        }
        false
    }

    // ---------------- phase 5: forking ----------------

    fn attempt_forking(&mut self, t: u64) {
        if self.config.fork_prob == 0 {
            return;
        }
        for i in 0..self.cpus.len() {
            if self.cpus[i].kind() != CpuKind::Fcfs {
                continue;
            }
            let Some(parent_pid) = self.cpus[i].running() else {
                continue;
            };
            let (eligible, parent_remaining) = match self.procs.get(&parent_pid) {
                // Forked children do not fork, and each process forks at
                // most once.
                Some(p) => (!p.is_forked_child() && !p.has_forked_once(), p.remaining()),
                None => (false, 0),
            };
            if !eligible {
                continue;
            }
            let r = self.rng.next_percent();
            if r > self.config.fork_prob {
                continue;
            }

            let child_pid = Pid::new(self.next_pid);
            self.next_pid += 1;
            let child = Process::forked(child_pid, t, parent_remaining, parent_pid);
            if let Some(p) = self.procs.get_mut(&parent_pid) {
                p.add_child(child_pid);
                p.mark_forked_once();
            }
            self.procs.insert(child_pid, child);
            self.counters.forked_created += 1;
            self.total_created += 1;

            let idx = self.pick_shortest_of_kind(CpuKind::Fcfs).unwrap_or(i);
            self.enqueue_on(idx, child_pid);
            self.audit.push(SimEvent::Forked {
                time: t,
                parent: parent_pid,
                child: child_pid,
                cpu: CpuId(idx),
            });
        }
    }

    // ---------------- phase 6: execution ----------------

    fn execute_one_tick(&mut self) {
        for i in 0..self.cpus.len() {
            if let Some(pid) = self.cpus[i].running() {
                if let Some(p) = self.procs.get_mut(&pid) {
                    p.cpu_tick();
                }
                self.cpus[i].add_busy();
                if self.cpus[i].kind() == CpuKind::Rr {
                    self.cpus[i].inc_quantum();
                }
            } else {
                self.cpus[i].add_idle();
            }
        }
        self.io.tick();
    }

    // ---------------- phase 7: post-CPU transitions ----------------

    fn post_cpu_transitions(&mut self, t: u64) {
        for i in 0..self.cpus.len() {
            let Some(pid) = self.cpus[i].running() else {
                continue;
            };
            let (finished, io_due) = match self.procs.get(&pid) {
                Some(p) => (p.is_finished(), p.io_due_now()),
                None => continue,
            };

            if finished {
                self.cpus[i].clear_running();
                self.cpus[i].reset_quantum();
                self.terminate(pid, t + 1, TermReason::Normal);
                continue;
            }

            if io_due {
                if let Some(p) = self.procs.get_mut(&pid) {
                    p.move_due_io_to_pending();
                    p.set_state(ProcState::Blk);
                }
                self.io.push_blocked(pid);
                self.cpus[i].clear_running();
                self.cpus[i].reset_quantum();
                self.audit.push(SimEvent::Blocked {
                    time: t,
                    pid,
                    cpu: CpuId(i),
                });
                continue;
            }

            if self.cpus[i].kind() == CpuKind::Rr && self.cpus[i].quantum_expired() {
                if let Some(p) = self.procs.get_mut(&pid) {
                    p.set_state(ProcState::Rdy);
                }
                // Back to the tail of the same RR queue
                self.enqueue_on(i, pid);
                self.cpus[i].clear_running();
                self.cpus[i].reset_quantum();
                self.audit.push(SimEvent::Preempted {
                    time: t,
                    pid,
                    cpu: CpuId(i),
                    reason: PreemptReason::QuantumExpired,
                });
            }
        }
    }

    // ---------------- phases 8 and 9: I/O ----------------

    fn finish_io_if_done(&mut self, t: u64) {
        let Some(pid) = self.io.take_finished() else {
            return;
        };
        if let Some(p) = self.procs.get_mut(&pid) {
            p.set_state(ProcState::Rdy);
        }
        let idx = self.pick_best_cpu();
        self.enqueue_on(idx, pid);
        self.audit.push(SimEvent::IoFinished {
            time: t,
            pid,
            cpu: CpuId(idx),
        });
        if self.cpus[idx].kind() == CpuKind::Edf {
            self.edf_preempt_if_needed(idx, t);
        }
    }

    fn start_io_if_possible(&mut self, t: u64) {
        if !self.io.device_is_free() {
            return;
        }
        let Some(pid) = self.io.pop_blocked() else {
            return;
        };
        let duration = match self.procs.get_mut(&pid) {
            Some(p) => p.take_pending_io(),
            None => return,
        };
        if duration == 0 {
            // Safety fallback: nothing to serve, send it back to ready
            if let Some(p) = self.procs.get_mut(&pid) {
                p.set_state(ProcState::Rdy);
            }
            let idx = self.pick_best_cpu();
            self.enqueue_on(idx, pid);
            return;
        }
        self.io.install(pid, duration);
        self.audit.push(SimEvent::IoStarted {
            time: t,
            pid,
            duration,
        });
    }

    // ---------------- termination ----------------

    /// Terminates a process and cascades to its forked children
    fn terminate(&mut self, pid: Pid, tt: u64, why: TermReason) {
        let children = {
            let Some(p) = self.procs.get_mut(&pid) else {
                return;
            };
            if p.state() == ProcState::Trm {
                return;
            }
            p.set_state(ProcState::Trm);
            p.set_tt(tt);
            // Response time stays defined even for never-run kills
            p.mark_first_run_if_needed(tt);
            p.children().to_vec()
        };

        self.trm_count += 1;
        if why.is_kill() {
            self.counters.killed += 1;
        }
        self.trm.push(pid);
        self.audit.push(SimEvent::Terminated {
            time: tt,
            pid,
            reason: why,
        });

        // Forked children live in FCFS context only (no I/O, no migration,
        // no stealing), so the orphan cascade resolves them there.
        for child in children {
            self.kill_by_pid_in_fcfs(child, tt, TermReason::Orphan);
        }
    }

    /// Kills a process found in FCFS RUN or FCFS RDY; scans in id order
    fn kill_by_pid_in_fcfs(&mut self, pid: Pid, tt: u64, why: TermReason) -> bool {
        for i in 0..self.cpus.len() {
            if self.cpus[i].kind() != CpuKind::Fcfs {
                continue;
            }
            if self.cpus[i].running() == Some(pid) {
                self.cpus[i].clear_running();
                self.terminate(pid, tt, why);
                return true;
            }
            if self.cpus[i].remove_ready_by_pid(pid) {
                self.terminate(pid, tt, why);
                return true;
            }
        }
        false
    }

    // ---------------- EDF preemption ----------------

    /// Preempts an EDF CPU's running process when the ready head has a
    /// strictly earlier deadline (absent deadlines compare as infinite)
    fn edf_preempt_if_needed(&mut self, idx: usize, t: u64) {
        if self.cpus[idx].kind() != CpuKind::Edf {
            return;
        }
        let (Some(run_pid), Some(top_pid)) = (self.cpus[idx].running(), self.cpus[idx].peek_ready())
        else {
            return;
        };
        let run_dl = self.deadline_or_max(run_pid);
        let top_dl = self.deadline_or_max(top_pid);
        if top_dl >= run_dl {
            return;
        }

        if let Some(p) = self.procs.get_mut(&run_pid) {
            p.set_state(ProcState::Rdy);
        }
        self.enqueue_on(idx, run_pid);
        self.cpus[idx].clear_running();
        self.cpus[idx].reset_quantum();
        self.audit.push(SimEvent::Preempted {
            time: t,
            pid: run_pid,
            cpu: CpuId(idx),
            reason: PreemptReason::EarlierDeadline,
        });

        if let Some(next_pid) = self.cpus[idx].pop_ready() {
            if let Some(p) = self.procs.get_mut(&next_pid) {
                p.set_state(ProcState::Run);
                p.mark_first_run_if_needed(t);
            }
            self.cpus[idx].set_running(next_pid);
            self.audit.push(SimEvent::Dispatched {
                time: t,
                pid: next_pid,
                cpu: CpuId(idx),
            });
        }
    }

    fn deadline_or_max(&self, pid: Pid) -> u64 {
        self.procs
            .get(&pid)
            .and_then(|p| p.deadline())
            .unwrap_or(u64::MAX)
    }

    // ---------------- placement helpers ----------------

    /// Minimum-EFT CPU over the whole pool; ties go to the lowest index
    fn pick_best_cpu(&self) -> usize {
        let mut best = 0;
        let mut best_eft = self.cpus[0].expected_finish_time(&self.procs);
        for (i, cpu) in self.cpus.iter().enumerate().skip(1) {
            let eft = cpu.expected_finish_time(&self.procs);
            if eft < best_eft {
                best = i;
                best_eft = eft;
            }
        }
        best
    }

    /// Minimum-EFT CPU of one discipline, if any exists
    fn pick_shortest_of_kind(&self, kind: CpuKind) -> Option<usize> {
        let mut best: Option<(usize, u64)> = None;
        for (i, cpu) in self.cpus.iter().enumerate() {
            if cpu.kind() != kind {
                continue;
            }
            let eft = cpu.expected_finish_time(&self.procs);
            if best.map(|(_, b)| eft < b).unwrap_or(true) {
                best = Some((i, eft));
            }
        }
        best.map(|(i, _)| i)
    }

    /// Maximum-EFT CPU among those with a non-empty ready queue
    fn find_longest_by_eft(&self) -> Option<usize> {
        let mut best: Option<(usize, u64)> = None;
        for (i, cpu) in self.cpus.iter().enumerate() {
            if cpu.ready_count() == 0 {
                continue;
            }
            let eft = cpu.expected_finish_time(&self.procs);
            if best.map(|(_, b)| eft > b).unwrap_or(true) {
                best = Some((i, eft));
            }
        }
        best.map(|(i, _)| i)
    }

    /// Minimum-EFT CPU over the whole pool
    fn find_shortest_by_eft(&self) -> Option<usize> {
        let mut best: Option<(usize, u64)> = None;
        for (i, cpu) in self.cpus.iter().enumerate() {
            let eft = cpu.expected_finish_time(&self.procs);
            if best.map(|(_, b)| eft < b).unwrap_or(true) {
                best = Some((i, eft));
            }
        }
        best.map(|(i, _)| i)
    }

    fn enqueue_on(&mut self, idx: usize, pid: Pid) {
        if let Some(p) = self.procs.get(&pid) {
            self.cpus[idx].enqueue(p);
        }
    }

    // ---------------- snapshots and accessors ----------------

    /// Read-only view of the current tick
    pub fn snapshot(&self) -> TickSnapshot {
        TickSnapshot {
            time: self.time,
            new_list: self
                .new_list
                .iter()
                .filter_map(|pid| {
                    self.procs.get(pid).map(|p| NewEntry {
                        pid: *pid,
                        at: p.at(),
                    })
                })
                .collect(),
            io_device: self.io.device().map(|pid| IoDeviceView {
                pid,
                remaining: self.io.remaining(),
            }),
            blk: self
                .io
                .blk()
                .iter()
                .filter_map(|pid| {
                    self.procs.get(pid).map(|p| BlkEntry {
                        pid: *pid,
                        pending: p.pending_io(),
                    })
                })
                .collect(),
            trm: self
                .trm
                .iter()
                .filter_map(|pid| self.procs.get(pid).map(|p| TrmEntry { pid: *pid, tt: p.tt() }))
                .collect(),
            cpus: self
                .cpus
                .iter()
                .map(|cpu| CpuView {
                    id: cpu.id(),
                    kind: cpu.kind(),
                    ready: cpu.ready_pids(),
                    running: cpu.running().and_then(|pid| self.procs.get(&pid)).map(|p| {
                        RunningView {
                            pid: p.pid(),
                            remaining: p.remaining(),
                            executed: p.executed(),
                            quantum: cpu.quantum_counter(),
                            time_slice: cpu.time_slice(),
                        }
                    }),
                    busy: cpu.busy(),
                    idle: cpu.idle(),
                })
                .collect(),
        }
    }

    pub fn time(&self) -> u64 {
        self.time
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    pub fn process(&self, pid: Pid) -> Option<&Process> {
        self.procs.get(&pid)
    }

    pub fn cpus(&self) -> &[Cpu] {
        &self.cpus
    }

    pub fn io(&self) -> &IoSubsystem {
        &self.io
    }

    /// Terminated PIDs in termination order
    pub fn trm(&self) -> &[Pid] {
        &self.trm
    }

    /// The input kill events, sorted by `(time, pid)`
    pub fn kill_events(&self) -> &[KillEvent] {
        &self.kill_events
    }

    pub fn trm_count(&self) -> usize {
        self.trm_count
    }

    pub fn total_created(&self) -> usize {
        self.total_created
    }

    /// The audit log of scheduling decisions
    pub fn audit_log(&self) -> &[SimEvent] {
        &self.audit
    }

    pub fn clear_audit_log(&mut self) {
        self.audit.clear();
    }

    pub(crate) fn procs(&self) -> &HashMap<Pid, Process> {
        &self.procs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{sched, spec, spec_dl, spec_io, workload};

    #[test]
    fn test_single_fcfs_no_io() {
        let mut s = sched(
            workload(1, 0, 0, 0, vec![spec(1, 0, 3), spec(2, 1, 2)], vec![]),
            vec![],
        );
        s.run_to_completion();

        assert_eq!(s.trm(), &[Pid::new(1), Pid::new(2)]);
        assert_eq!(s.process(Pid::new(1)).unwrap().tt(), Some(3));
        assert_eq!(s.process(Pid::new(2)).unwrap().tt(), Some(5));
        assert_eq!(s.process(Pid::new(1)).unwrap().first_run(), Some(0));
        assert_eq!(s.process(Pid::new(2)).unwrap().first_run(), Some(3));
    }

    #[test]
    fn test_rr_quantum_cycles() {
        let mut w = workload(0, 0, 1, 0, vec![spec(1, 0, 5)], vec![]);
        w.config.time_slice = 2;
        let mut s = sched(w, vec![]);
        s.run_to_completion();

        assert_eq!(s.process(Pid::new(1)).unwrap().tt(), Some(5));
        let preemptions: Vec<u64> = s
            .audit_log()
            .iter()
            .filter_map(|e| match e {
                SimEvent::Preempted {
                    time,
                    reason: PreemptReason::QuantumExpired,
                    ..
                } => Some(*time),
                _ => None,
            })
            .collect();
        // Preempted after ticks 0-1 and 2-3; the final tick finishes instead
        assert_eq!(preemptions, vec![1, 3]);
    }

    #[test]
    fn test_sjf_tie_breaks_by_pid() {
        let mut s = sched(
            workload(0, 1, 0, 0, vec![spec(2, 0, 4), spec(1, 0, 4)], vec![]),
            vec![],
        );
        s.run_to_completion();

        assert_eq!(s.trm(), &[Pid::new(1), Pid::new(2)]);
        assert_eq!(s.process(Pid::new(1)).unwrap().tt(), Some(4));
        assert_eq!(s.process(Pid::new(2)).unwrap().tt(), Some(8));
    }

    #[test]
    fn test_io_round_trip() {
        let mut s = sched(
            workload(1, 0, 0, 0, vec![spec_io(1, 0, 4, vec![(2, 3)])], vec![]),
            vec![],
        );
        s.run_to_completion();

        assert_eq!(s.process(Pid::new(1)).unwrap().tt(), Some(7));
        let log = s.audit_log();
        assert!(log
            .iter()
            .any(|e| matches!(e, SimEvent::Blocked { time: 1, .. })));
        assert!(log
            .iter()
            .any(|e| matches!(e, SimEvent::IoStarted { duration: 3, .. })));
        assert!(log
            .iter()
            .any(|e| matches!(e, SimEvent::IoFinished { time: 4, .. })));
    }

    #[test]
    fn test_maxw_migration_fcfs_to_rr() {
        // PIDs 1 and 2 occupy both CPUs at t=0, so PID 3 queues on the
        // FCFS CPU. By the time FCFS gets to dispatch it (t=10), its wait
        // is far past MaxW and it reroutes to the RR CPU.
        let mut w = workload(
            1,
            0,
            1,
            0,
            vec![spec(1, 0, 10), spec(2, 0, 10), spec(3, 0, 5)],
            vec![],
        );
        w.config.max_w = 2;
        w.config.time_slice = 20;
        let mut s = sched(w, vec![]);
        s.run_to_completion();

        assert_eq!(s.counters().mig_maxw, 1);
        assert!(s.audit_log().iter().any(|e| matches!(
            e,
            SimEvent::Migrated {
                time: 10,
                pid,
                from: CpuId(0),
                to: CpuId(1),
                rule: MigrationRule::WaitAboveMaxW,
            } if *pid == Pid::new(3)
        )));
        assert_eq!(s.process(Pid::new(3)).unwrap().tt(), Some(15));
    }

    #[test]
    fn test_rtf_migration_rr_to_sjf() {
        // CPU 0 is SJF, CPU 1 is RR. PID 1 lands on the SJF CPU (index
        // tie-break), PID 2 on the then-empty RR CPU. At dispatch the RR
        // candidate's remaining (2) is under RTF (3), so it reroutes to
        // the SJF CPU and waits out PID 1 there.
        let mut w = workload(0, 1, 1, 0, vec![spec(1, 0, 6), spec(2, 0, 2)], vec![]);
        w.config.rtf = 3;
        w.config.time_slice = 10;
        let mut s = sched(w, vec![]);
        s.run_to_completion();

        assert_eq!(s.counters().mig_rtf, 1);
        assert!(s.audit_log().iter().any(|e| matches!(
            e,
            SimEvent::Migrated {
                time: 0,
                pid,
                from: CpuId(1),
                to: CpuId(0),
                rule: MigrationRule::RemainingBelowRtf,
            } if *pid == Pid::new(2)
        )));
        assert_eq!(s.process(Pid::new(1)).unwrap().tt(), Some(6));
        assert_eq!(s.process(Pid::new(2)).unwrap().tt(), Some(8));
    }

    #[test]
    fn test_sigkill_with_orphan_cascade() {
        let mut w = workload(
            1,
            0,
            0,
            0,
            vec![spec(1, 0, 10)],
            vec![KillEvent {
                time: 1,
                pid: Pid::new(1),
            }],
        );
        w.config.fork_prob = 100;
        let mut s = sched(w, vec![1]);
        s.run_to_completion();

        // PID 1 forked PID 2 at t=0; the SIGKILL at t=1 takes both down
        assert_eq!(s.counters().forked_created, 1);
        assert_eq!(s.counters().killed, 2);
        assert_eq!(s.total_created(), 2);
        assert_eq!(s.trm_count(), 2);

        let p1 = s.process(Pid::new(1)).unwrap();
        let p2 = s.process(Pid::new(2)).unwrap();
        assert_eq!(p1.tt(), Some(1));
        assert_eq!(p2.tt(), Some(1));
        assert!(p2.is_forked_child());
        assert!(s.audit_log().iter().any(|e| matches!(
            e,
            SimEvent::Terminated {
                pid,
                reason: TermReason::Orphan,
                ..
            } if *pid == Pid::new(2)
        )));
    }

    #[test]
    fn test_sigkill_outside_fcfs_is_skipped() {
        let w = workload(
            0,
            1,
            0,
            0,
            vec![spec(1, 0, 5)],
            vec![KillEvent {
                time: 1,
                pid: Pid::new(1),
            }],
        );
        let mut s = sched(w, vec![]);
        s.run_to_completion();

        // The SJF process runs to completion; the kill is a recorded no-op
        assert_eq!(s.counters().killed, 0);
        assert_eq!(s.process(Pid::new(1)).unwrap().tt(), Some(5));
        assert!(s
            .audit_log()
            .iter()
            .any(|e| matches!(e, SimEvent::KillSkipped { time: 1, .. })));
    }

    #[test]
    fn test_fork_declined_by_draw() {
        let mut w = workload(1, 0, 0, 0, vec![spec(1, 0, 3)], vec![]);
        w.config.fork_prob = 50;
        // Draws above the probability: never fork
        let mut s = sched(w, vec![51, 99, 77]);
        s.run_to_completion();

        assert_eq!(s.counters().forked_created, 0);
        assert_eq!(s.total_created(), 1);
    }

    #[test]
    fn test_fork_once_per_process() {
        let mut w = workload(1, 0, 0, 0, vec![spec(1, 0, 5)], vec![]);
        w.config.fork_prob = 100;
        let mut s = sched(w, vec![1, 1, 1, 1, 1]);
        s.run_to_completion();

        // Parent forks once; the child never forks
        assert_eq!(s.counters().forked_created, 1);
        assert_eq!(s.total_created(), 2);
    }

    #[test]
    fn test_edf_preemption_on_earlier_deadline() {
        let mut s = sched(
            workload(
                0,
                0,
                0,
                1,
                vec![spec_dl(1, 0, 10, 100), spec_dl(2, 2, 3, 8)],
                vec![],
            ),
            vec![],
        );
        s.run_to_completion();

        // PID 2 arrives at t=2 with the tighter deadline and preempts
        assert!(s.audit_log().iter().any(|e| matches!(
            e,
            SimEvent::Preempted {
                time: 2,
                pid,
                reason: PreemptReason::EarlierDeadline,
                ..
            } if *pid == Pid::new(1)
        )));
        assert_eq!(s.process(Pid::new(2)).unwrap().tt(), Some(5));
        assert_eq!(s.process(Pid::new(1)).unwrap().tt(), Some(13));
    }

    #[test]
    fn test_edf_no_preemption_on_equal_deadline() {
        let mut s = sched(
            workload(
                0,
                0,
                0,
                1,
                vec![spec_dl(1, 0, 5, 20), spec_dl(2, 1, 5, 20)],
                vec![],
            ),
            vec![],
        );
        s.run_to_completion();

        assert!(!s
            .audit_log()
            .iter()
            .any(|e| matches!(e, SimEvent::Preempted { .. })));
        assert_eq!(s.process(Pid::new(1)).unwrap().tt(), Some(5));
    }

    #[test]
    fn test_work_steal_rebalances() {
        // PIDs 1 and 2 keep both CPUs busy. PID 3 arrives at t=20 and is
        // admitted to the nearly-done CPU 0 (EFT 5 vs 20), pushing its EFT
        // to 35. The steal pass at t=20 sees a 43% imbalance and moves
        // PID 3 onto CPU 1.
        let mut w = workload(
            2,
            0,
            0,
            0,
            vec![spec(1, 0, 25), spec(2, 0, 40), spec(3, 20, 30)],
            vec![],
        );
        w.config.stl = 5;
        let mut s = sched(w, vec![]);

        for _ in 0..20 {
            s.step();
        }
        let before: Vec<u64> = s
            .cpus()
            .iter()
            .map(|cpu| cpu.expected_finish_time(s.procs()))
            .collect();
        assert_eq!(before, vec![5, 20]);

        s.step();
        assert_eq!(s.counters().steal_moves, 1);
        assert!(s.audit_log().iter().any(|e| matches!(
            e,
            SimEvent::Stolen {
                time: 20,
                pid,
                from: CpuId(0),
                to: CpuId(1),
            } if *pid == Pid::new(3)
        )));

        // The donor strictly shrank and the recipient strictly grew
        // (both also ticked one unit of running work).
        let after: Vec<u64> = s
            .cpus()
            .iter()
            .map(|cpu| cpu.expected_finish_time(s.procs()))
            .collect();
        assert_eq!(after, vec![4, 49]);

        s.run_to_completion();
        assert_eq!(s.trm_count(), 3);
    }

    #[test]
    fn test_termination_is_idempotent() {
        let mut s = sched(workload(1, 0, 0, 0, vec![spec(1, 0, 1)], vec![]), vec![]);
        s.run_to_completion();
        assert_eq!(s.trm_count(), 1);

        // A second terminate on the same PID must be a no-op
        s.terminate(Pid::new(1), 99, TermReason::SigKill);
        assert_eq!(s.trm_count(), 1);
        assert_eq!(s.counters().killed, 0);
        assert_eq!(s.process(Pid::new(1)).unwrap().tt(), Some(1));
    }

    #[test]
    fn test_tick_cap_stops_runaway_loop() {
        // The only process arrives after the cap, so nothing ever
        // terminates and the cap is what ends the loop
        let mut w = workload(1, 0, 0, 0, vec![spec(1, 50, 1)], vec![]);
        w.config.max_ticks = 10;
        let mut s = sched(w, vec![]);
        s.run_to_completion();

        assert_eq!(s.time(), 10);
        assert_eq!(s.trm_count(), 0);
    }

    #[test]
    fn test_zero_duration_io_falls_back_to_ready() {
        let mut s = sched(
            workload(1, 0, 0, 0, vec![spec_io(1, 0, 4, vec![(2, 0)])], vec![]),
            vec![],
        );
        s.run_to_completion();

        // The zero-length request never occupies the device; the process
        // loses exactly one tick re-queuing through BLK
        assert!(!s
            .audit_log()
            .iter()
            .any(|e| matches!(e, SimEvent::IoStarted { .. })));
        assert_eq!(s.process(Pid::new(1)).unwrap().tt(), Some(4));
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let mut s = sched(
            workload(1, 0, 0, 0, vec![spec(1, 0, 3), spec(2, 5, 1)], vec![]),
            vec![],
        );
        s.step();
        let snap = s.snapshot();

        assert_eq!(snap.cpus.len(), 1);
        let running = snap.cpus[0].running.as_ref().unwrap();
        assert_eq!(running.pid, Pid::new(1));
        assert_eq!(running.executed, 1);
        assert_eq!(snap.new_list, vec![NewEntry { pid: Pid::new(2), at: 5 }]);
        assert!(snap.io_device.is_none());
    }

    #[test]
    fn test_scripted_rng_controls_forks() {
        let mut w = workload(1, 0, 0, 0, vec![spec(1, 0, 4)], vec![]);
        w.config.fork_prob = 30;
        // First draw forks (30 <= 30), no further eligible draws occur
        let mut s = sched(w, vec![30]);
        s.run_to_completion();
        assert_eq!(s.counters().forked_created, 1);

        let mut w = workload(1, 0, 0, 0, vec![spec(1, 0, 4)], vec![]);
        w.config.fork_prob = 30;
        let mut s2 = sched(w, vec![31]);
        s2.run_to_completion();
        assert_eq!(s2.counters().forked_created, 0);
    }
}
