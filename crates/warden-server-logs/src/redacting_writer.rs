// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! `io::Write` adapter that scrubs whole lines before forwarding them.

use std::io::{self, Write};
use std::sync::Arc;

use tracing_subscriber::fmt::MakeWriter;
use warden_redact::RuleSet;

/// Buffers up to each newline, redacts the line, then writes it through.
/// A trailing partial line is redacted on flush or drop.
///
/// `write` accepts every byte once it is buffered. A line the inner writer
/// rejects stays pending and is retried on the next `write`; `flush`
/// reports the error.
pub struct RedactingWriter<W: Write> {
	inner: W,
	rules: Arc<RuleSet>,
	pending: Vec<u8>,
}

impl<W: Write> RedactingWriter<W> {
	pub fn new(inner: W, rules: Arc<RuleSet>) -> Self {
		Self {
			inner,
			rules,
			pending: Vec::new(),
		}
	}

	fn drain_lines(&mut self) -> io::Result<()> {
		while let Some(newline) = self.pending.iter().position(|&b| b == b'\n') {
			self.emit(newline + 1)?;
			self.pending.drain(..=newline);
		}
		Ok(())
	}

	fn emit(&mut self, upto: usize) -> io::Result<()> {
		let text = String::from_utf8_lossy(&self.pending[..upto]);
		let redacted = self.rules.apply(&text);
		self.inner.write_all(redacted.as_bytes())
	}
}

impl<W: Write> Write for RedactingWriter<W> {
	fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
		self.pending.extend_from_slice(buf);
		// A rejected line stays pending for the next write or flush.
		let _ = self.drain_lines();
		Ok(buf.len())
	}

	fn flush(&mut self) -> io::Result<()> {
		self.drain_lines()?;
		if !self.pending.is_empty() {
			self.emit(self.pending.len())?;
			self.pending.clear();
		}
		self.inner.flush()
	}
}

impl<W: Write> Drop for RedactingWriter<W> {
	fn drop(&mut self) {
		let _ = self.flush();
	}
}

/// Wraps another `MakeWriter` so every writer it hands out redacts.
pub struct RedactingMakeWriter<M> {
	inner: M,
	rules: Arc<RuleSet>,
}

impl<M> RedactingMakeWriter<M> {
	pub fn new(inner: M) -> Self {
		Self::with_rules(inner, Arc::new(RuleSet::builtin()))
	}

	pub fn with_rules(inner: M, rules: Arc<RuleSet>) -> Self {
		Self { inner, rules }
	}
}

impl<'a, M> MakeWriter<'a> for RedactingMakeWriter<M>
where
	M: MakeWriter<'a>,
{
	type Writer = RedactingWriter<M::Writer>;

	fn make_writer(&'a self) -> Self::Writer {
		RedactingWriter::new(self.inner.make_writer(), Arc::clone(&self.rules))
	}
}
