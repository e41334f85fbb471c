// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Log output that cannot leak secrets.
//!
//! This crate provides:
//! - [`RedactingLog`] - leveled `info`/`warn`/`error`/`debug` over mixed
//!   arguments ([`LogValue`], [`Json`], [`Failure`]), each argument scrubbed
//!   by the `warden-redact` rule table before the line is written
//! - [`RedactingMakeWriter`] - a `tracing-subscriber` writer that scrubs
//!   ordinary `tracing` output line by line
//! - [`init_tracing`] - installs the global subscriber on top of it
//!
//! # Usage
//!
//! ```ignore
//! use warden_server_logs::{init_tracing, log_info, Json, RedactingLog};
//!
//! let config = warden_server_config::load_config()?;
//! init_tracing(&config.logging)?;
//!
//! let log = RedactingLog::from_config(&config.logging);
//! log_info!(log, "stored provider key for", division_id, Json(&metadata));
//! ```

mod init;
mod log;
mod redacting_writer;
mod value;

pub use init::init_tracing;
pub use log::{LogLevel, RedactingLog};
pub use redacting_writer::{RedactingMakeWriter, RedactingWriter};
pub use value::{Failure, Json, LogValue};
pub use warden_server_config::RuntimeMode;
