//! Shared I/O subsystem
//!
//! Exactly one I/O device exists: a single occupancy slot with a countdown,
//! fed by a FIFO queue of blocked processes. Only the scheduler touches it,
//! and only in the execute, finish-I/O, and start-I/O phases of a tick.

use core_types::Pid;
use std::collections::VecDeque;

/// The single device slot plus the BLK wait queue
#[derive(Debug, Clone, Default)]
pub struct IoSubsystem {
    device: Option<Pid>,
    remaining: u32,
    blk: VecDeque<Pid>,
}

impl IoSubsystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Occupant of the device slot, if any
    pub fn device(&self) -> Option<Pid> {
        self.device
    }

    /// Ticks left on the current job
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn device_is_free(&self) -> bool {
        self.device.is_none()
    }

    /// Blocked processes waiting for the device, in FIFO order
    pub fn blk(&self) -> &VecDeque<Pid> {
        &self.blk
    }

    pub fn push_blocked(&mut self, pid: Pid) {
        self.blk.push_back(pid);
    }

    pub fn pop_blocked(&mut self) -> Option<Pid> {
        self.blk.pop_front()
    }

    /// Installs a job on the free device
    pub fn install(&mut self, pid: Pid, duration: u32) {
        self.device = Some(pid);
        self.remaining = duration;
    }

    /// Advances the device by one tick
    pub fn tick(&mut self) {
        if self.device.is_some() {
            self.remaining = self.remaining.saturating_sub(1);
        }
    }

    /// Detaches and returns the occupant once its countdown hits zero
    pub fn take_finished(&mut self) -> Option<Pid> {
        if self.remaining == 0 {
            self.device.take()
        } else {
            None
        }
    }
}
