// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Benchmark harness for repeating loopback sessions.
//!
//! Every repetition is a fresh session over a fresh connection. Warmup
//! repetitions run the same way and are discarded.

use tcpbench_core::loopback::{self, LoopbackOptions};
use tcpbench_core::{BenchResult, LatencySeries, ThroughputReport};

/// A benchmark harness for repeated sessions.
pub struct BenchmarkHarness {
    /// Number of warmup sessions before measurement
    warmup_iterations: u64,
    /// Number of measured sessions
    measurement_iterations: u64,
    /// Whether to keep raw sample data
    keep_raw_samples: bool,
}

impl BenchmarkHarness {
    /// Create a new benchmark harness with default settings.
    pub fn new() -> Self {
        Self {
            warmup_iterations: 1,
            measurement_iterations: 10,
            keep_raw_samples: true,
        }
    }

    /// Set the number of warmup sessions.
    pub fn warmup(mut self, iterations: u64) -> Self {
        self.warmup_iterations = iterations;
        self
    }

    /// Set the number of measured sessions.
    pub fn iterations(mut self, iterations: u64) -> Self {
        self.measurement_iterations = iterations;
        self
    }

    /// Set whether to keep raw sample data.
    pub fn keep_samples(mut self, keep: bool) -> Self {
        self.keep_raw_samples = keep;
        self
    }

    /// Check if raw samples should be kept.
    pub fn should_keep_samples(&self) -> bool {
        self.keep_raw_samples
    }

    /// Run `session` for warmup and measurement, returning the measured
    /// results. The first failing session aborts the run.
    pub fn run<T, F>(&self, mut session: F) -> BenchResult<Vec<T>>
    where
        F: FnMut() -> BenchResult<T>,
    {
        for _ in 0..self.warmup_iterations {
            session()?;
        }

        let mut results = Vec::with_capacity(self.measurement_iterations as usize);
        for iteration in 0..self.measurement_iterations {
            results.push(session()?);
            tracing::trace!(iteration = iteration, "Session finished");
        }
        Ok(results)
    }

    /// Ping-pong sessions of `rounds` rounds each.
    pub fn run_latency(
        &self,
        options: &LoopbackOptions,
        rounds: u64,
    ) -> BenchResult<Vec<LatencySeries>> {
        self.run(|| loopback::run_latency(options, rounds).map(|(series, _)| series))
    }

    /// Bulk-transfer sessions of `amount` bytes each.
    pub fn run_throughput(
        &self,
        options: &LoopbackOptions,
        amount: u64,
    ) -> BenchResult<Vec<ThroughputReport>> {
        self.run(|| loopback::run_throughput(options, amount).map(|(report, _)| report))
    }
}

impl Default for BenchmarkHarness {
    fn default() -> Self {
        Self::new()
    }
}
