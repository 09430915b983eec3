//! # Scheduling Simulator Host
//!
//! The host binary around the simulation engine: workload file parsing,
//! the interactive/step/silent console observer, report formatting, and
//! the runtime that ties them together.

pub mod observer;
pub mod report_writer;
pub mod runtime;
pub mod workload;

pub use observer::{render_snapshot, ConsoleObserver, SimMode};
pub use report_writer::format_report;
pub use runtime::{RuntimeError, SimRuntime, SimRuntimeConfig};
pub use workload::{parse_workload, WorkloadError};
