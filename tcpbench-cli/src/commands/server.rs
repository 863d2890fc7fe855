// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `tcpbench server` command - Serve a single session.

use tcpbench_core::net;
use tcpbench_core::{
    BenchResult, Framing, MonotonicClock, ServerMode, ServerSession, SocketGuard, Transport,
};

use crate::output;

pub fn execute(
    config_path: Option<&str>,
    port: Option<u16>,
    mode: ServerMode,
    framing: Option<Framing>,
) -> BenchResult<()> {
    let mut config = super::load_config(config_path)?;
    if let Some(port) = port {
        config.connection.port = port;
    }
    if let Some(framing) = framing {
        config.session.framing = framing;
    }

    tracing::info!(
        mode = %mode,
        framing = %config.session.framing,
        "Starting server"
    );

    let listener = net::listen(config.connection.port)?;
    let stream = net::accept_one(&listener, config.connection.nodelay)?;
    tracing::info!("Starting benchmark now");

    let mut session = ServerSession::with_parts(
        Transport::with_retry(SocketGuard::new(stream), config.retry),
        config.session.framing,
        mode,
        MonotonicClock,
    );
    let report = session.run()?;

    println!("{}", output::server_line(&report));
    Ok(())
}
