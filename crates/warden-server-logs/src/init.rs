// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::EnvFilter;
use warden_server_config::{LogFormat, LoggingConfig};

use crate::RedactingMakeWriter;

/// Install the process-wide `tracing` subscriber.
///
/// `RUST_LOG` wins over `config.level`. All output goes to stderr through
/// [`RedactingMakeWriter`]. Fails if a global subscriber is already set.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), TryInitError> {
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
	let writer = RedactingMakeWriter::new(std::io::stderr);
	let registry = tracing_subscriber::registry().with(filter);

	match config.format {
		LogFormat::Json => registry
			.with(tracing_subscriber::fmt::layer().json().with_writer(writer))
			.try_init(),
		LogFormat::Pretty => registry
			.with(tracing_subscriber::fmt::layer().with_writer(writer))
			.try_init(),
	}
}
