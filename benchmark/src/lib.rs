// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! tcpbench Benchmarking Framework
//!
//! Repeats loopback sessions across message sizes and framings and turns the
//! results into reports.
//!
//! # Benchmark Categories
//!
//! - **Ping-Pong**: round-trip latency per message, with request and
//!   response decomposition
//! - **Throughput**: time to bulk-transfer a fixed amount and receive the
//!   acknowledgement
//!
//! # Data Output
//!
//! JSON files with summary statistics, and CSV rows of raw samples keyed by
//! message size for the plotting scripts.

pub mod harness;
pub mod metrics;
pub mod reporter;

pub use harness::BenchmarkHarness;
pub use metrics::{
    BenchmarkCategory, BenchmarkReport, BenchmarkResult, LatencyMetrics, SystemInfo,
    ThroughputMetrics,
};
pub use reporter::{CsvReporter, CsvRow, JsonReporter, ReporterError};
