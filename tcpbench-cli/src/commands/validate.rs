// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `tcpbench validate` command - Validate configuration file.

use tcpbench_core::{BenchResult, ConfigLoader, RetryPolicy};

pub fn execute(file: &str) -> BenchResult<()> {
    tracing::info!(file = %file, "Validating configuration");

    let config = match ConfigLoader::load_file(file) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("✗ Configuration validation failed:");
            return Err(e);
        }
    };

    println!("✓ Configuration is valid");
    println!();
    println!("Connection:");
    println!("  Host:          {}", config.connection.host);
    println!("  Port:          {}", config.connection.port);
    println!("  TCP_NODELAY:   {}", config.connection.nodelay);
    println!();
    println!("Session:");
    println!("  Framing:       {}", config.session.framing);
    println!("  Amount:        {} bytes", config.session.amount);
    println!("  Message Size:  {} bytes", config.session.message_size.bytes());
    println!("  Rounds:        {}", config.session.rounds);
    println!();
    match config.retry {
        RetryPolicy::BusyPoll => println!("Retry:           busy poll"),
        RetryPolicy::ExponentialBackoff { initial, max } => println!(
            "Retry:           exponential backoff ({}us .. {}us)",
            initial.as_micros(),
            max.as_micros()
        ),
    }
    println!("Pin Threads:     {}", config.pin_threads);
    Ok(())
}
