// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `tcpbench loopback` command - Both roles in this process.

use tcpbench_core::loopback::{self, LoopbackOptions};
use tcpbench_core::{BenchResult, ClientMode, ClientReport};

use crate::{output, SessionArgs};

pub fn execute(
    config_path: Option<&str>,
    mode: ClientMode,
    pin_threads: bool,
    session: &SessionArgs,
) -> BenchResult<()> {
    let mut config = super::load_config(config_path)?;
    super::apply_session_args(&mut config, session)?;
    config.pin_threads |= pin_threads;

    let options = LoopbackOptions::from_config(&config);
    tracing::info!(
        mode = %mode,
        framing = %options.framing,
        message_size = options.message_size.bytes(),
        pin_threads = options.pin_threads,
        "Starting loopback benchmark"
    );

    let (report, server) = match mode {
        ClientMode::Throughput => {
            let (report, server) = loopback::run_throughput(&options, config.session.amount)?;
            (ClientReport::Throughput(report), server)
        }
        ClientMode::Latency => {
            let (series, server) = loopback::run_latency(&options, config.session.rounds)?;
            (ClientReport::Latency(series), server)
        }
    };
    tracing::debug!(
        bytes_received = server.bytes_received,
        frames = server.frames,
        "Server side finished"
    );

    output::print_client_report(&report, config.session.message_size.bytes());
    Ok(())
}
