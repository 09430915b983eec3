//! # Core Types
//!
//! This crate defines the fundamental types shared across the scheduling
//! simulator.
//!
//! ## Philosophy
//!
//! Core types are designed with these principles:
//! - **Explicit over implicit**: process identity, CPU identity, and
//!   lifecycle states are distinct types and cannot be confused.
//! - **Determinism first**: every type is plain data with total ordering
//!   where ordering matters, so simulation runs are reproducible.
//!
//! ## Key Types
//!
//! - [`Pid`]: Unique identifier for a simulated process
//! - [`CpuId`]: Identifier for a virtual CPU
//! - [`CpuKind`]: The scheduling discipline a CPU runs
//! - [`ProcState`]: Process lifecycle state
//! - [`TermReason`]: Why a process terminated
//! - [`KillEvent`]: A scheduled asynchronous SIGKILL

pub mod ids;
pub mod sched;

pub use ids::{CpuId, Pid};
pub use sched::{CpuKind, KillEvent, ProcState, TermReason};
