// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! tcpbench CLI
//!
//! Command-line interface for the raw TCP ping-pong and bulk-transfer
//! benchmarks. Results go to stdout, diagnostics to stderr.

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use tcpbench_core::{ClientMode, Framing, ServerMode};

mod commands;
mod output;

/// tcpbench - Raw TCP ping-pong and bulk-transfer benchmark harness
#[derive(Parser)]
#[command(name = "tcpbench")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Role to run. Without one, both roles run in this process.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Accept one connection and serve a single session
    Server {
        /// Port to listen on (0 picks an ephemeral port)
        #[arg(short, long)]
        port: Option<u16>,

        /// Serve echo (latency) or sink (throughput) sessions
        #[arg(short, long, value_enum, default_value_t = ServerModeArg::Echo)]
        mode: ServerModeArg,

        #[arg(long, value_enum)]
        framing: Option<FramingArg>,
    },

    /// Connect to a server and run a single session
    Client {
        /// Server host name or address
        #[arg(long)]
        host: Option<String>,

        /// Server port, has to be set explicitly
        #[arg(short, long)]
        port: Option<u16>,

        #[arg(short, long, value_enum, default_value_t = ClientModeArg::Latency)]
        mode: ClientModeArg,

        #[command(flatten)]
        session: SessionArgs,
    },

    /// Run client and server in this process over a local connection
    Loopback {
        #[arg(short, long, value_enum, default_value_t = ClientModeArg::Latency)]
        mode: ClientModeArg,

        /// Pin client and server threads to distinct CPUs
        #[arg(long)]
        pin_threads: bool,

        #[command(flatten)]
        session: SessionArgs,
    },

    /// Validate a configuration file
    Validate {
        /// Path to the configuration file
        file: String,
    },
}

/// Session parameters that override the configuration file.
#[derive(Args, Debug, Default, Clone)]
pub struct SessionArgs {
    /// Throughput mode: payload bytes to send
    #[arg(short, long)]
    pub amount: Option<u64>,

    /// Payload bytes per message
    #[arg(short = 's', long)]
    pub message_size: Option<u64>,

    /// Latency mode: number of ping-pong rounds
    #[arg(short, long)]
    pub rounds: Option<u64>,

    #[arg(long, value_enum)]
    pub framing: Option<FramingArg>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ServerModeArg {
    Echo,
    Sink,
}

impl From<ServerModeArg> for ServerMode {
    fn from(arg: ServerModeArg) -> Self {
        match arg {
            ServerModeArg::Echo => ServerMode::Echo,
            ServerModeArg::Sink => ServerMode::Sink,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ClientModeArg {
    Throughput,
    Latency,
}

impl From<ClientModeArg> for ClientMode {
    fn from(arg: ClientModeArg) -> Self {
        match arg {
            ClientModeArg::Throughput => ClientMode::Throughput,
            ClientModeArg::Latency => ClientMode::Latency,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FramingArg {
    /// Payload bytes only
    Raw,
    /// 8-byte length header before every payload
    SizeHeader,
}

impl From<FramingArg> for Framing {
    fn from(arg: FramingArg) -> Self {
        match arg {
            FramingArg::Raw => Framing::Raw,
            FramingArg::SizeHeader => Framing::SizeHeader,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging on stderr; stdout carries the results.
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| log_level.into()))
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.as_deref();
    let result = match cli.command {
        Some(Commands::Server {
            port,
            mode,
            framing,
        }) => commands::server::execute(config, port, mode.into(), framing.map(Into::into)),
        Some(Commands::Client {
            host,
            port,
            mode,
            session,
        }) => commands::client::execute(config, host, port, mode.into(), &session),
        Some(Commands::Loopback {
            mode,
            pin_threads,
            session,
        }) => commands::loopback::execute(config, mode.into(), pin_threads, &session),
        Some(Commands::Validate { file }) => commands::validate::execute(&file),
        None => commands::loopback::execute(
            config,
            ClientMode::Throughput,
            false,
            &SessionArgs::default(),
        ),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "Benchmark failed");
        eprintln!("ERROR: {}", e);
        std::process::exit(1);
    }
}
