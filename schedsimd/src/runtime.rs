//! # Host Runtime
//!
//! Loads a workload file, drives the engine under the selected observer
//! mode, and writes the final report.

use crate::observer::{ConsoleObserver, SimMode};
use crate::report_writer::format_report;
use crate::workload::{parse_workload, WorkloadError};
use sim_core::{ChaChaForkRng, Scheduler, Workload};
use std::fs;
use thiserror::Error;

/// Host runtime error types
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Cannot read input file: {0}")]
    InputIo(#[source] std::io::Error),

    #[error("Workload error: {0}")]
    Workload(#[from] WorkloadError),

    #[error("Cannot write output file: {0}")]
    OutputIo(#[source] std::io::Error),
}

/// Host runtime configuration
#[derive(Debug, Clone)]
pub struct SimRuntimeConfig {
    /// Workload file path
    pub input_path: String,
    /// Observer behavior
    pub mode: SimMode,
    /// Fork RNG seed; replays with the same seed reproduce the schedule
    pub seed: u64,
    /// Report destination; stdout when absent
    pub output: Option<String>,
    /// Override for the engine's tick cap
    pub max_ticks: Option<u64>,
}

impl Default for SimRuntimeConfig {
    fn default() -> Self {
        Self {
            input_path: String::new(),
            mode: SimMode::Interactive,
            seed: 0,
            output: None,
            max_ticks: None,
        }
    }
}

/// Host runtime
pub struct SimRuntime {
    config: SimRuntimeConfig,
    sim: Scheduler,
}

impl SimRuntime {
    /// Creates a runtime by loading and parsing the configured input file
    pub fn new(config: SimRuntimeConfig) -> Result<Self, RuntimeError> {
        let text = fs::read_to_string(&config.input_path).map_err(RuntimeError::InputIo)?;
        let workload = parse_workload(&text)?;
        Ok(Self::from_workload(workload, config))
    }

    /// Creates a runtime from an already-parsed workload
    pub fn from_workload(mut workload: Workload, config: SimRuntimeConfig) -> Self {
        if let Some(cap) = config.max_ticks {
            workload.config.max_ticks = cap;
        }
        let sim = Scheduler::new(workload, Box::new(ChaChaForkRng::seeded(config.seed)));
        Self { config, sim }
    }

    /// Simulates to completion and writes the report
    pub fn run(&mut self) -> Result<(), RuntimeError> {
        if self.config.mode != SimMode::Silent {
            print!("{}", self.loaded_summary());
        }

        match self.config.mode {
            SimMode::Silent => self.sim.run_to_completion(),
            mode => {
                let mut observer = ConsoleObserver::new(mode);
                self.sim.run(&mut observer);
            }
        }

        let text = format_report(&self.sim.report());
        match &self.config.output {
            Some(path) => fs::write(path, text).map_err(RuntimeError::OutputIo)?,
            None => print!("{}", text),
        }
        Ok(())
    }

    /// Formats the post-load summary banner
    pub fn loaded_summary(&self) -> String {
        let c = self.sim.config();
        let mut out = String::new();
        out.push_str("=== Input Loaded Successfully ===\n");
        out.push_str(&format!(
            "Processors: NF={} NS={} NR={} NE={}  (Total={})\n",
            c.nf,
            c.ns,
            c.nr,
            c.ne,
            c.total_cpus()
        ));
        out.push_str(&format!("RR TimeSlice={}\n", c.time_slice));
        out.push_str(&format!(
            "RTF={} MaxW={} STL={} ForkProb={}%\n",
            c.rtf, c.max_w, c.stl, c.fork_prob
        ));
        out.push_str(&format!("Processes (M)={}\n", self.sim.total_created()));
        out.push_str(&format!(
            "SIGKILL events={}\n",
            self.sim.kill_events().len()
        ));
        out.push_str("===============================\n");
        out
    }

    /// The underlying engine (read-only, for tests)
    pub fn scheduler(&self) -> &Scheduler {
        &self.sim
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_core::test_utils::{spec, workload};

    #[test]
    fn test_runtime_from_workload_runs_silently() {
        let config = SimRuntimeConfig {
            mode: SimMode::Silent,
            ..SimRuntimeConfig::default()
        };
        let mut runtime = SimRuntime::from_workload(
            workload(1, 0, 0, 0, vec![spec(1, 0, 3)], vec![]),
            config,
        );

        runtime.sim.run_to_completion();
        assert_eq!(runtime.scheduler().trm_count(), 1);
    }

    #[test]
    fn test_max_ticks_override() {
        let config = SimRuntimeConfig {
            mode: SimMode::Silent,
            max_ticks: Some(5),
            ..SimRuntimeConfig::default()
        };
        let mut runtime = SimRuntime::from_workload(
            workload(1, 0, 0, 0, vec![spec(1, 100, 1)], vec![]),
            config,
        );

        runtime.sim.run_to_completion();
        assert_eq!(runtime.scheduler().time(), 5);
        assert_eq!(runtime.scheduler().trm_count(), 0);
    }

    #[test]
    fn test_missing_input_file_is_load_error() {
        let config = SimRuntimeConfig {
            input_path: "/nonexistent/workload.txt".to_string(),
            ..SimRuntimeConfig::default()
        };
        assert!(matches!(
            SimRuntime::new(config),
            Err(RuntimeError::InputIo(_))
        ));
    }

    #[test]
    fn test_loaded_summary_lists_counts() {
        let config = SimRuntimeConfig::default();
        let runtime = SimRuntime::from_workload(
            workload(2, 1, 0, 0, vec![spec(1, 0, 3), spec(2, 0, 3)], vec![]),
            config,
        );

        let banner = runtime.loaded_summary();
        assert!(banner.contains("NF=2 NS=1 NR=0 NE=0  (Total=3)"));
        assert!(banner.contains("Processes (M)=2"));
        assert!(banner.contains("SIGKILL events=0"));
    }
}
