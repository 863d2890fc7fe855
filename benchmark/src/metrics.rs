// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Standardized metrics types for benchmark results.
//!
//! Latencies are kept in microseconds, the resolution of the session
//! timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use sysinfo::System;
use tcpbench_core::{LatencySeries, ThroughputReport};

/// Categories of benchmarks supported by the framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BenchmarkCategory {
    /// Ping-pong round-trip latency
    PingPong,
    /// Bulk transfer until acknowledgement
    Throughput,
}

impl std::fmt::Display for BenchmarkCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BenchmarkCategory::PingPong => write!(f, "pingpong"),
            BenchmarkCategory::Throughput => write!(f, "throughput"),
        }
    }
}

/// Latency metrics with statistical analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatencyMetrics {
    /// Minimum observed latency in microseconds
    pub min_us: i64,
    /// Maximum observed latency in microseconds
    pub max_us: i64,
    /// Arithmetic mean latency in microseconds
    pub mean_us: f64,
    /// Median (p50) latency in microseconds
    pub median_us: i64,
    /// 95th percentile latency in microseconds
    pub p95_us: i64,
    /// 99th percentile latency in microseconds
    pub p99_us: i64,
    /// Standard deviation in microseconds
    pub std_dev_us: f64,
    /// Raw sample data for visualization (optional, may be downsampled)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub samples: Option<Vec<i64>>,
}

impl LatencyMetrics {
    /// Calculate metrics from latency samples in microseconds.
    pub fn from_samples(mut samples: Vec<i64>, keep_raw: bool) -> Self {
        if samples.is_empty() {
            return Self {
                min_us: 0,
                max_us: 0,
                mean_us: 0.0,
                median_us: 0,
                p95_us: 0,
                p99_us: 0,
                std_dev_us: 0.0,
                samples: None,
            };
        }

        samples.sort_unstable();
        let len = samples.len();

        let min_us = samples[0];
        let max_us = samples[len - 1];
        let sum: i64 = samples.iter().sum();
        let mean_us = sum as f64 / len as f64;
        let median_us = samples[len / 2];
        let p95_us = samples[(len as f64 * 0.95) as usize];
        let p99_us = samples[(len as f64 * 0.99) as usize];

        let variance: f64 = samples
            .iter()
            .map(|&x| {
                let diff = x as f64 - mean_us;
                diff * diff
            })
            .sum::<f64>()
            / len as f64;
        let std_dev_us = variance.sqrt();

        let raw_samples = if keep_raw {
            if len > 10000 {
                // Downsample for storage efficiency
                Some(samples.iter().step_by(len / 1000).copied().collect())
            } else {
                Some(samples)
            }
        } else {
            None
        };

        Self {
            min_us,
            max_us,
            mean_us,
            median_us,
            p95_us,
            p99_us,
            std_dev_us,
            samples: raw_samples,
        }
    }

    /// Round-trip metrics over every round of every session.
    pub fn round_trips(runs: &[LatencySeries], keep_raw: bool) -> Self {
        Self::from_samples(runs.iter().flat_map(|s| s.round_trips()).collect(), keep_raw)
    }

    /// Format latency in human-readable form (auto-selects μs/ms/s).
    pub fn format_latency(us: i64) -> String {
        let magnitude = us.unsigned_abs();
        if magnitude < 1_000 {
            format!("{}μs", us)
        } else if magnitude < 1_000_000 {
            format!("{:.2}ms", us as f64 / 1_000.0)
        } else {
            format!("{:.2}s", us as f64 / 1_000_000.0)
        }
    }
}

/// Throughput metrics for bulk-transfer sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThroughputMetrics {
    /// Messages processed per second
    pub messages_per_sec: f64,
    /// Bytes processed per second
    pub bytes_per_sec: f64,
    /// Total messages processed
    pub total_messages: u64,
    /// Total bytes processed
    pub total_bytes: u64,
    /// Duration of the benchmark in nanoseconds
    pub duration_ns: u64,
}

impl ThroughputMetrics {
    /// Calculate throughput from message count, byte count, and duration.
    pub fn calculate(messages: u64, bytes: u64, duration_ns: u64) -> Self {
        let duration_secs = duration_ns as f64 / 1_000_000_000.0;
        let per_sec = |n: u64| {
            if duration_ns == 0 {
                0.0
            } else {
                n as f64 / duration_secs
            }
        };
        Self {
            messages_per_sec: per_sec(messages),
            bytes_per_sec: per_sec(bytes),
            total_messages: messages,
            total_bytes: bytes,
            duration_ns,
        }
    }

    /// Aggregate over several sessions.
    pub fn from_reports(reports: &[ThroughputReport]) -> Self {
        let messages = reports.iter().map(|r| r.chunks).sum();
        let bytes = reports.iter().map(|r| r.bytes_sent).sum();
        let duration_ns = reports
            .iter()
            .map(|r| u64::try_from(r.elapsed.as_nanos()).unwrap_or(u64::MAX))
            .fold(0u64, u64::saturating_add);
        Self::calculate(messages, bytes, duration_ns)
    }

    /// Format throughput in human-readable form.
    pub fn format_bytes_per_sec(bps: f64) -> String {
        if bps < 1_000.0 {
            format!("{:.2} B/s", bps)
        } else if bps < 1_000_000.0 {
            format!("{:.2} KB/s", bps / 1_000.0)
        } else if bps < 1_000_000_000.0 {
            format!("{:.2} MB/s", bps / 1_000_000.0)
        } else {
            format!("{:.2} GB/s", bps / 1_000_000_000.0)
        }
    }
}

/// System information captured at benchmark time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    /// Operating system name
    pub os: String,
    /// OS version
    pub os_version: String,
    /// Kernel version (Linux)
    pub kernel_version: Option<String>,
    /// CPU model name
    pub cpu_model: String,
    /// Number of CPU cores
    pub cpu_cores: usize,
    /// Total system memory in bytes
    pub memory_bytes: u64,
    /// Hostname
    pub hostname: String,
}

impl SystemInfo {
    /// Collect current system information.
    pub fn collect() -> Self {
        let mut sys = System::new_all();
        sys.refresh_all();

        Self {
            os: System::name().unwrap_or_else(|| "Unknown".to_string()),
            os_version: System::os_version().unwrap_or_else(|| "Unknown".to_string()),
            kernel_version: System::kernel_version(),
            cpu_model: sys
                .cpus()
                .first()
                .map(|cpu| cpu.brand().to_string())
                .unwrap_or_else(|| "Unknown".to_string()),
            cpu_cores: sys.cpus().len(),
            memory_bytes: sys.total_memory(),
            hostname: System::host_name().unwrap_or_else(|| "Unknown".to_string()),
        }
    }
}

/// A single benchmark result with all associated metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkResult {
    /// Name of the benchmark
    pub name: String,
    /// Category of the benchmark
    pub category: BenchmarkCategory,
    /// Payload bytes per message
    pub message_size: usize,
    /// Latency metrics (ping-pong)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency: Option<LatencyMetrics>,
    /// Throughput metrics (bulk transfer)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub throughput: Option<ThroughputMetrics>,
    /// Number of measured sessions
    pub iterations: u64,
    /// Additional metadata specific to this benchmark
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl BenchmarkResult {
    /// Result for a set of ping-pong sessions.
    pub fn latency(
        name: impl Into<String>,
        message_size: usize,
        runs: &[LatencySeries],
        keep_raw_samples: bool,
    ) -> Self {
        Self {
            name: name.into(),
            category: BenchmarkCategory::PingPong,
            message_size,
            latency: Some(LatencyMetrics::round_trips(runs, keep_raw_samples)),
            throughput: None,
            iterations: runs.len() as u64,
            metadata: HashMap::new(),
        }
    }

    /// Result for a set of bulk-transfer sessions.
    pub fn throughput(
        name: impl Into<String>,
        message_size: usize,
        reports: &[ThroughputReport],
    ) -> Self {
        Self {
            name: name.into(),
            category: BenchmarkCategory::Throughput,
            message_size,
            latency: None,
            throughput: Some(ThroughputMetrics::from_reports(reports)),
            iterations: reports.len() as u64,
            metadata: HashMap::new(),
        }
    }

    /// Add metadata to the result. Values that do not serialize are skipped.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        match serde_json::to_value(value) {
            Ok(value) => {
                self.metadata.insert(key.into(), value);
            }
            Err(e) => tracing::warn!(error = %e, "Dropping unserializable metadata"),
        }
        self
    }
}

/// Complete benchmark suite report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkReport {
    /// Suite identifier
    pub benchmark_suite: String,
    /// Framework version
    pub version: String,
    /// Timestamp when benchmarks were run
    pub timestamp: DateTime<Utc>,
    /// System information
    pub system_info: SystemInfo,
    /// Individual benchmark results
    pub results: Vec<BenchmarkResult>,
}

impl BenchmarkReport {
    /// Create a new benchmark report.
    pub fn new() -> Self {
        Self {
            benchmark_suite: "tcpbench-benchmarks".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
            system_info: SystemInfo::collect(),
            results: Vec::new(),
        }
    }

    /// Add a result to the report.
    pub fn add_result(&mut self, result: BenchmarkResult) {
        self.results.push(result);
    }
}

impl Default for BenchmarkReport {
    fn default() -> Self {
        Self::new()
    }
}
