// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! CPU pinning for session threads.
//!
//! Keeps the client and server of a loopback run on distinct cores so the
//! scheduler does not migrate them mid-measurement.

use std::sync::atomic::{AtomicUsize, Ordering};

use nix::sched::{sched_setaffinity, CpuSet};
use nix::unistd::Pid;

/// Round-robin CPU allocator.
pub struct CpuAllocator {
    /// Total number of logical CPUs available
    num_cpus: usize,
    /// Next CPU to assign (atomic for thread-safety)
    next_cpu: AtomicUsize,
}

impl CpuAllocator {
    pub fn new() -> Self {
        let num_cpus = num_cpus::get().max(1);
        tracing::debug!(num_cpus = num_cpus, "CpuAllocator initialized");
        Self {
            num_cpus,
            next_cpu: AtomicUsize::new(0),
        }
    }

    /// Allocate the next CPU core using round-robin.
    pub fn allocate(&self) -> usize {
        self.next_cpu.fetch_add(1, Ordering::Relaxed) % self.num_cpus
    }

    /// Pin the calling thread to the next CPU and return its index.
    pub fn pin_current_thread(&self) -> Result<usize, nix::Error> {
        let cpu = self.allocate();
        pin_thread_to(cpu)?;
        Ok(cpu)
    }

    pub fn num_cpus(&self) -> usize {
        self.num_cpus
    }
}

impl Default for CpuAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Pin the calling thread to `cpu`.
pub fn pin_thread_to(cpu: usize) -> Result<(), nix::Error> {
    let mut cpuset = CpuSet::new();
    cpuset.set(cpu)?;
    // Pid 0 addresses the calling thread.
    sched_setaffinity(Pid::from_raw(0), &cpuset)?;
    tracing::debug!(cpu = cpu, "Thread pinned to CPU");
    Ok(())
}

/// Pin the calling thread if requested. Failures are logged, not fatal.
pub fn maybe_pin(allocator: Option<&CpuAllocator>, role: &'static str) {
    if let Some(allocator) = allocator {
        if let Err(e) = allocator.pin_current_thread() {
            tracing::warn!(role = role, error = %e, "Could not pin thread, continuing unpinned");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_robin() {
        let allocator = CpuAllocator::new();
        let n = allocator.num_cpus();
        let first = allocator.allocate();
        for _ in 1..n {
            allocator.allocate();
        }
        assert_eq!(allocator.allocate(), first);
    }

    #[test]
    fn test_pin_current_thread() {
        let allocator = CpuAllocator::new();
        // Restricted cpusets in containers may refuse; only check the index.
        if let Ok(cpu) = std::thread::spawn(move || allocator.pin_current_thread())
            .join()
            .unwrap()
        {
            assert!(cpu < num_cpus::get().max(1));
        }
    }
}
