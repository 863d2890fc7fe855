// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! CLI tool to sweep message sizes and generate reports.

use clap::Parser;
use std::path::PathBuf;
use tcpbench_benchmark::{
    BenchmarkHarness, BenchmarkReport, BenchmarkResult, CsvReporter, CsvRow, JsonReporter,
    LatencyMetrics, ThroughputMetrics,
};
use tcpbench_core::loopback::LoopbackOptions;
use tcpbench_core::{Framing, MessageSize, RetryPolicy};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "run_benchmarks")]
#[command(about = "Sweep tcpbench loopback sessions over message sizes and write reports")]
struct Args {
    /// Output directory for benchmark data
    #[arg(short, long, default_value = "data")]
    output: PathBuf,

    /// Measured sessions per message size
    #[arg(short, long, default_value_t = 10)]
    iterations: u64,

    /// Ping-pong rounds per session
    #[arg(short, long, default_value_t = 1000)]
    rounds: u64,

    /// Bytes per throughput session
    #[arg(short, long, default_value_t = 16 * 1024 * 1024)]
    amount: u64,

    /// Message sizes to sweep (powers of two up to 64 KiB if not specified)
    #[arg(short, long, value_delimiter = ',')]
    message_sizes: Option<Vec<u64>>,

    /// Categories to run (all if not specified): pingpong, throughput
    #[arg(short, long)]
    category: Option<Vec<String>>,

    /// Framings to run (all if not specified): raw, size_header
    #[arg(short, long)]
    framing: Option<Vec<String>>,

    /// Pin client and server threads to distinct CPUs
    #[arg(long)]
    pin_threads: bool,

    /// Run in quick mode (fewer sessions and rounds)
    #[arg(long)]
    quick: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let (iterations, rounds, amount) = if args.quick {
        (2, 100, args.amount.min(1024 * 1024))
    } else {
        (args.iterations, args.rounds, args.amount)
    };
    let message_sizes = args
        .message_sizes
        .clone()
        .unwrap_or_else(|| (0..=16).map(|exp| 1u64 << exp).collect());

    println!("tcpbench Benchmark Suite");
    println!("========================");
    println!("Output directory: {:?}", args.output);
    println!("Sessions per size: {}", iterations);
    println!();

    let json = JsonReporter::new(&args.output)?;
    let csv = CsvReporter::new(&args.output)?;
    let mut report = BenchmarkReport::new();

    let run_all = args.category.is_none();
    let categories: Vec<String> = args.category.clone().unwrap_or_default();
    let should_run =
        |cat: &str| -> bool { run_all || categories.iter().any(|c| c.eq_ignore_ascii_case(cat)) };

    let framings: Vec<Framing> = [Framing::Raw, Framing::SizeHeader]
        .into_iter()
        .filter(|f| match &args.framing {
            Some(selected) => selected.iter().any(|s| s.eq_ignore_ascii_case(&f.to_string())),
            None => true,
        })
        .collect();

    let harness = BenchmarkHarness::new()
        .warmup((iterations / 10).max(1))
        .iterations(iterations);

    for framing in framings {
        if should_run("pingpong") {
            println!("Running ping-pong benchmarks ({})...", framing);
            let rows = run_pingpong(
                &harness,
                &mut report,
                framing,
                &message_sizes,
                rounds,
                args.pin_threads,
            )?;
            let path = csv.save(&format!("pingpong-tcp-{}-message-size", framing), &rows)?;
            println!("  → {:?}", path);
        }

        if should_run("throughput") {
            println!("Running throughput benchmarks ({})...", framing);
            let rows = run_throughput(
                &harness,
                &mut report,
                framing,
                &message_sizes,
                amount,
                args.pin_threads,
            )?;
            let path = csv.save(&format!("streaming-tcp-{}-message-size", framing), &rows)?;
            println!("  → {:?}", path);
        }
    }

    let path = json.save(&report)?;
    println!();
    println!("Benchmark report saved to: {:?}", path);
    println!();

    print_summary(&report);

    Ok(())
}

fn options(framing: Framing, size: u64, pin_threads: bool) -> anyhow::Result<LoopbackOptions> {
    Ok(LoopbackOptions {
        framing,
        message_size: MessageSize::new(size)?,
        nodelay: true,
        retry: RetryPolicy::BusyPoll,
        pin_threads,
    })
}

fn run_pingpong(
    harness: &BenchmarkHarness,
    report: &mut BenchmarkReport,
    framing: Framing,
    message_sizes: &[u64],
    rounds: u64,
    pin_threads: bool,
) -> anyhow::Result<Vec<CsvRow>> {
    let mut rows = Vec::with_capacity(message_sizes.len());
    for &size in message_sizes {
        let opts = options(framing, size, pin_threads)?;
        let runs = harness.run_latency(&opts, rounds)?;
        let name = format!("pingpong_{}_{}", framing, size);

        rows.push(CsvRow {
            message_size: opts.message_size.bytes(),
            values: runs.iter().flat_map(|s| s.round_trips()).collect(),
        });
        report.add_result(
            BenchmarkResult::latency(
                &name,
                opts.message_size.bytes(),
                &runs,
                harness.should_keep_samples(),
            )
            .with_metadata("framing", framing)
            .with_metadata("rounds", rounds),
        );
        println!("  ✓ {}", name);
    }
    Ok(rows)
}

fn run_throughput(
    harness: &BenchmarkHarness,
    report: &mut BenchmarkReport,
    framing: Framing,
    message_sizes: &[u64],
    amount: u64,
    pin_threads: bool,
) -> anyhow::Result<Vec<CsvRow>> {
    let mut rows = Vec::with_capacity(message_sizes.len());
    for &size in message_sizes {
        let opts = options(framing, size, pin_threads)?;
        let runs = harness.run_throughput(&opts, amount)?;
        let name = format!("throughput_{}_{}", framing, size);

        rows.push(CsvRow {
            message_size: opts.message_size.bytes(),
            values: runs
                .iter()
                .map(|r| i64::try_from(r.elapsed.as_micros()).unwrap_or(i64::MAX))
                .collect(),
        });
        report.add_result(
            BenchmarkResult::throughput(&name, opts.message_size.bytes(), &runs)
                .with_metadata("framing", framing)
                .with_metadata("amount_bytes", amount),
        );
        println!("  ✓ {}", name);
    }
    Ok(rows)
}

fn print_summary(report: &BenchmarkReport) {
    println!("Summary");
    println!("-------");
    println!();

    for result in &report.results {
        if let Some(latency) = &result.latency {
            println!(
                "{}: median={}, p99={}",
                result.name,
                LatencyMetrics::format_latency(latency.median_us),
                LatencyMetrics::format_latency(latency.p99_us)
            );
        }
        if let Some(throughput) = &result.throughput {
            println!(
                "{}: {}",
                result.name,
                ThroughputMetrics::format_bytes_per_sec(throughput.bytes_per_sec)
            );
        }
    }
}
