// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Leveled logger that scrubs every argument before writing it.

use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;
use warden_redact::RuleSet;
use warden_server_config::{LoggingConfig, RuntimeMode};

use crate::value::LogValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
	Debug,
	Info,
	Warn,
	Error,
}

impl LogLevel {
	pub fn as_str(&self) -> &'static str {
		match self {
			LogLevel::Debug => "DEBUG",
			LogLevel::Info => "INFO",
			LogLevel::Warn => "WARN",
			LogLevel::Error => "ERROR",
		}
	}
}

impl fmt::Display for LogLevel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

type Sink = Arc<Mutex<Box<dyn Write + Send>>>;

/// Writes `[LEVEL] arg arg ...` lines with secrets replaced.
///
/// Each argument is converted to text on its own and passed through the rule
/// table before the line is joined, so a structured value cannot smuggle a
/// secret past the rules by being formatted late. Writing never fails from
/// the caller's point of view: sink errors are dropped.
///
/// Cloning is cheap and clones share the sink.
#[derive(Clone)]
pub struct RedactingLog {
	mode: RuntimeMode,
	rules: Arc<RuleSet>,
	sink: Sink,
}

impl RedactingLog {
	/// Log to stderr with the built-in rules.
	pub fn new(mode: RuntimeMode) -> Self {
		Self::with_writer(mode, io::stderr())
	}

	pub fn from_config(config: &LoggingConfig) -> Self {
		Self::new(config.mode)
	}

	/// Log to an arbitrary writer with the built-in rules.
	pub fn with_writer<W>(mode: RuntimeMode, writer: W) -> Self
	where
		W: Write + Send + 'static,
	{
		Self {
			mode,
			rules: Arc::new(RuleSet::builtin()),
			sink: Arc::new(Mutex::new(Box::new(writer))),
		}
	}

	/// Replace the rule table.
	pub fn with_rules(mut self, rules: RuleSet) -> Self {
		self.rules = Arc::new(rules);
		self
	}

	pub fn mode(&self) -> RuntimeMode {
		self.mode
	}

	pub fn enabled(&self, level: LogLevel) -> bool {
		level != LogLevel::Debug || !self.mode.is_production()
	}

	pub fn debug(&self, args: &[&dyn LogValue]) {
		self.log(LogLevel::Debug, args);
	}

	pub fn info(&self, args: &[&dyn LogValue]) {
		self.log(LogLevel::Info, args);
	}

	pub fn warn(&self, args: &[&dyn LogValue]) {
		self.log(LogLevel::Warn, args);
	}

	pub fn error(&self, args: &[&dyn LogValue]) {
		self.log(LogLevel::Error, args);
	}

	pub fn log(&self, level: LogLevel, args: &[&dyn LogValue]) {
		if !self.enabled(level) {
			return;
		}
		let line = self.format_line(level, args);

		let mut sink = self.sink.lock();
		let _ = sink.write_all(line.as_bytes());
		let _ = sink.flush();
	}

	/// The exact line [`log`](Self::log) would write, newline included.
	pub fn format_line(&self, level: LogLevel, args: &[&dyn LogValue]) -> String {
		let mut line = format!("[{level}]");
		for arg in args {
			let text = arg.to_log_text();
			line.push(' ');
			line.push_str(&self.rules.apply(&text));
		}
		line.push('\n');
		line
	}
}

impl fmt::Debug for RedactingLog {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RedactingLog")
			.field("mode", &self.mode)
			.field("rules", &self.rules.len())
			.finish_non_exhaustive()
	}
}

/// `log_info!(log, "uploaded", name, Json(&meta))`
#[macro_export]
macro_rules! log_info {
	($log:expr $(, $arg:expr)* $(,)?) => {
		$log.info(&[$(&$arg as &dyn $crate::LogValue),*])
	};
}

#[macro_export]
macro_rules! log_warn {
	($log:expr $(, $arg:expr)* $(,)?) => {
		$log.warn(&[$(&$arg as &dyn $crate::LogValue),*])
	};
}

#[macro_export]
macro_rules! log_error {
	($log:expr $(, $arg:expr)* $(,)?) => {
		$log.error(&[$(&$arg as &dyn $crate::LogValue),*])
	};
}

#[macro_export]
macro_rules! log_debug {
	($log:expr $(, $arg:expr)* $(,)?) => {
		$log.debug(&[$(&$arg as &dyn $crate::LogValue),*])
	};
}
