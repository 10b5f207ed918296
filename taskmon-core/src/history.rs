//! Rolling system performance history for the Performance view.

use std::collections::VecDeque;

use sysinfo::System;

/// Samples kept in the rolling window (~1 minute at 1 s sampling).
pub const HISTORY_LEN: usize = 60;

/// One whole-system sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SystemSample {
    pub cpu_percent: f32,
    pub memory_used_bytes: u64,
    pub memory_total_bytes: u64,
}

/// OS-backed sampler for global CPU and memory usage. Owns a persistent
/// [`sysinfo::System`] so CPU usage is a delta between consecutive samples.
pub struct SystemSampler {
    system: System,
}

impl SystemSampler {
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_cpu_usage();
        system.refresh_memory();
        Self { system }
    }

    pub fn sample(&mut self) -> SystemSample {
        self.system.refresh_cpu_usage();
        self.system.refresh_memory();
        SystemSample {
            cpu_percent: self.system.global_cpu_usage(),
            memory_used_bytes: self.system.used_memory(),
            memory_total_bytes: self.system.total_memory(),
        }
    }
}

impl Default for SystemSampler {
    fn default() -> Self {
        Self::new()
    }
}

/// In-memory rolling window of system samples. Ephemeral; nothing here is
/// persisted across restarts.
#[derive(Debug, Default, Clone)]
pub struct SystemHistory {
    pub cpu_percent: VecDeque<f32>,
    pub memory_used_bytes: VecDeque<u64>,
    pub memory_total_bytes: u64,
}

impl SystemHistory {
    pub fn push_sample(&mut self, sample: SystemSample) {
        push_with_cap(&mut self.cpu_percent, sample.cpu_percent, HISTORY_LEN);
        push_with_cap(
            &mut self.memory_used_bytes,
            sample.memory_used_bytes,
            HISTORY_LEN,
        );
        self.memory_total_bytes = sample.memory_total_bytes;
    }

    pub fn is_empty(&self) -> bool {
        self.cpu_percent.is_empty()
    }
}

pub fn push_with_cap<T>(deque: &mut VecDeque<T>, value: T, cap: usize) {
    if cap == 0 {
        return;
    }
    while deque.len() >= cap {
        deque.pop_front();
    }
    deque.push_back(value);
}
