//! Console observer
//!
//! Renders each tick's snapshot in the timestep layout and paces the run:
//! interactive waits for Enter, step sleeps one second, silent renders
//! nothing (the engine runs without an observer).

use sim_core::{Observer, TickSnapshot};
use std::io::{self, BufRead, Write};
use std::thread;
use std::time::Duration;

/// Observer behavior selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimMode {
    /// Render each tick and wait for Enter
    Interactive,
    /// Render each tick and sleep one second
    Step,
    /// Render nothing
    Silent,
}

impl SimMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "interactive" => Some(SimMode::Interactive),
            "step" => Some(SimMode::Step),
            "silent" => Some(SimMode::Silent),
            _ => None,
        }
    }
}

/// Renders snapshots to stdout with mode-dependent pacing
pub struct ConsoleObserver {
    mode: SimMode,
}

impl ConsoleObserver {
    pub fn new(mode: SimMode) -> Self {
        Self { mode }
    }
}

impl Observer for ConsoleObserver {
    fn on_tick(&mut self, snapshot: &TickSnapshot) {
        if self.mode == SimMode::Silent {
            return;
        }
        print!("{}", render_snapshot(snapshot));
        match self.mode {
            SimMode::Interactive => {
                print!("Press Enter to continue...");
                let _ = io::stdout().flush();
                let mut line = String::new();
                let _ = io::stdin().lock().read_line(&mut line);
            }
            SimMode::Step => thread::sleep(Duration::from_secs(1)),
            SimMode::Silent => {}
        }
    }
}

/// Formats one snapshot as the timestep view
pub fn render_snapshot(snap: &TickSnapshot) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "\n================= Timestep {} =================\n",
        snap.time
    ));

    out.push_str("NEW: ");
    if snap.new_list.is_empty() {
        out.push_str("EMPTY");
    } else {
        let entries: Vec<String> = snap
            .new_list
            .iter()
            .map(|e| format!("{}(AT={})", e.pid, e.at))
            .collect();
        out.push_str(&entries.join(", "));
    }
    out.push('\n');

    out.push_str("I/O device: ");
    match &snap.io_device {
        Some(dev) => out.push_str(&format!("PID={} (remainingIO={})", dev.pid, dev.remaining)),
        None => out.push_str("IDLE"),
    }
    out.push('\n');

    out.push_str("BLK(wait): ");
    if snap.blk.is_empty() {
        out.push_str("EMPTY");
    } else {
        let entries: Vec<String> = snap
            .blk
            .iter()
            .map(|e| format!("{}(IO={})", e.pid, e.pending))
            .collect();
        out.push_str(&entries.join(", "));
    }
    out.push('\n');

    out.push_str("TRM: ");
    if snap.trm.is_empty() {
        out.push_str("EMPTY");
    } else {
        let entries: Vec<String> = snap
            .trm
            .iter()
            .map(|e| match e.tt {
                Some(tt) => format!("{}(TT={})", e.pid, tt),
                None => format!("{}", e.pid),
            })
            .collect();
        out.push_str(&entries.join(", "));
    }
    out.push('\n');

    out.push_str("------------------ Processors ------------------\n");
    for cpu in &snap.cpus {
        out.push_str(&format!("{} [{}]\n", cpu.id, cpu.kind));

        out.push_str("  RDY: ");
        if cpu.ready.is_empty() {
            out.push_str("EMPTY");
        } else {
            let pids: Vec<String> = cpu.ready.iter().map(|pid| pid.to_string()).collect();
            out.push_str(&pids.join(","));
        }
        out.push('\n');

        out.push_str("  RUN: ");
        match &cpu.running {
            None => out.push_str("IDLE"),
            Some(run) => {
                out.push_str(&format!(
                    "PID={} rem={} exec={}",
                    run.pid, run.remaining, run.executed
                ));
                if cpu.kind == core_types::CpuKind::Rr {
                    out.push_str(&format!(" q={}/{}", run.quantum, run.time_slice));
                }
            }
        }
        out.push('\n');

        out.push_str(&format!(
            "  CPU stats: busy={} idle={}\n",
            cpu.busy, cpu.idle
        ));
    }
    out.push_str("------------------------------------------------\n");
    out
}
