// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! CLI command modules.

pub mod client;
pub mod loopback;
pub mod server;
pub mod validate;

use tcpbench_core::{BenchResult, Config, ConfigLoader, MessageSize};

use crate::SessionArgs;

/// Load the configuration file if one was given, defaults otherwise.
pub fn load_config(path: Option<&str>) -> BenchResult<Config> {
    match path {
        Some(path) => {
            tracing::debug!(config = %path, "Loading configuration");
            ConfigLoader::load_file(path)
        }
        None => Ok(Config::default()),
    }
}

/// Apply command-line session values on top of the configuration.
pub fn apply_session_args(config: &mut Config, args: &SessionArgs) -> BenchResult<()> {
    if let Some(amount) = args.amount {
        config.session.amount = amount;
    }
    if let Some(size) = args.message_size {
        config.session.message_size = MessageSize::new(size)?;
    }
    if let Some(rounds) = args.rounds {
        config.session.rounds = ConfigLoader::validate_rounds(rounds)?;
    }
    if let Some(framing) = args.framing {
        config.session.framing = framing.into();
    }
    Ok(())
}
