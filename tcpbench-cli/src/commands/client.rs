// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `tcpbench client` command - Run a session against a remote server.

use tcpbench_core::net;
use tcpbench_core::{
    BenchResult, ClientMode, ClientSession, MonotonicClock, SocketGuard, Transport,
};

use crate::{output, SessionArgs};

pub fn execute(
    config_path: Option<&str>,
    host: Option<String>,
    port: Option<u16>,
    mode: ClientMode,
    session: &SessionArgs,
) -> BenchResult<()> {
    let mut config = super::load_config(config_path)?;
    super::apply_session_args(&mut config, session)?;
    if let Some(host) = host {
        config.connection.host = host;
    }
    if let Some(port) = port {
        config.connection.port = port;
    }

    // Fail before connecting if no port was given anywhere.
    let port = config.connection.remote_port()?;
    tracing::info!(
        host = %config.connection.host,
        port = %port,
        mode = %mode,
        framing = %config.session.framing,
        message_size = config.session.message_size.bytes(),
        "Starting client"
    );

    let stream = net::connect(&config.connection.host, port, config.connection.nodelay)?;
    tracing::info!("Starting benchmark now");

    let mut client = ClientSession::with_parts(
        Transport::with_retry(SocketGuard::new(stream), config.retry),
        config.session.framing,
        MonotonicClock,
    );
    let report = client.run(mode, &config.session)?;

    output::print_client_report(&report, config.session.message_size.bytes());
    Ok(())
}
