// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Result lines on stdout.
//!
//! Values are comma separated and every value is followed by `, `,
//! including the last one, which the evaluation scripts rely on.

use tcpbench_core::{ClientReport, LatencySeries, ServerReport, Termination, ThroughputReport};

/// `message_size, amount, elapsed_us, `
pub fn throughput_line(report: &ThroughputReport) -> String {
    format!(
        "{}, {}, {}, ",
        report.message_size,
        report.amount,
        report.elapsed.as_micros()
    )
}

/// `message_size, rounds, elapsed_us, `
pub fn latency_summary_line(message_size: usize, series: &LatencySeries) -> String {
    format!(
        "{}, {}, {}, ",
        message_size,
        series.len(),
        series.elapsed().as_micros()
    )
}

/// Header row plus request and response latency rows, in microseconds.
pub fn latency_lines(series: &LatencySeries) -> String {
    let header: String = (0..series.len()).map(|i| format!("value{}, ", i)).collect();
    [
        row("what", header),
        row("request", cells(&series.request_latencies())),
        row("response", cells(&series.response_latencies())),
    ]
    .join("\n")
}

fn cells(values: &[i64]) -> String {
    values.iter().map(|v| format!("{}, ", v)).collect()
}

fn row(label: &str, cells: String) -> String {
    format!("{}, {}", label, cells)
}

/// `mode, termination, bytes_received, frames, `
pub fn server_line(report: &ServerReport) -> String {
    let termination = match report.termination {
        Termination::TargetReached => "target_reached",
        Termination::PeerDisconnected => "peer_disconnected",
    };
    format!(
        "{}, {}, {}, {}, ",
        report.mode, termination, report.bytes_received, report.frames
    )
}

pub fn print_client_report(report: &ClientReport, message_size: usize) {
    match report {
        ClientReport::Throughput(r) => println!("{}", throughput_line(r)),
        ClientReport::Latency(series) => {
            println!("{}", latency_summary_line(message_size, series));
            println!("{}", latency_lines(series));
        }
    }
}
