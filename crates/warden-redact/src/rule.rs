// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::borrow::Cow;

use regex::Regex;

use crate::RedactError;

/// A single pattern and the text that replaces each of its matches.
#[derive(Debug, Clone)]
pub struct RedactionRule {
	pub id: &'static str,
	pub pattern: Regex,
	pub replacement: Cow<'static, str>,
}

impl RedactionRule {
	pub fn new(
		id: &'static str,
		pattern: &str,
		replacement: impl Into<Cow<'static, str>>,
	) -> Result<Self, RedactError> {
		Ok(Self {
			id,
			pattern: Regex::new(pattern)?,
			replacement: replacement.into(),
		})
	}

	/// Replace every match wholly. The replacement is literal, `$` is not
	/// expanded.
	pub fn apply<'a>(&self, input: &'a str) -> Cow<'a, str> {
		self.pattern
			.replace_all(input, regex::NoExpand(self.replacement.as_ref()))
	}
}

/// Ordered rule table. Each rule runs on the output of the one before it.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
	rules: Vec<RedactionRule>,
}

impl RuleSet {
	pub fn empty() -> Self {
		Self::default()
	}

	pub fn push(&mut self, rule: RedactionRule) {
		self.rules.push(rule);
	}

	pub fn with_rule(mut self, rule: RedactionRule) -> Self {
		self.push(rule);
		self
	}

	pub fn rules(&self) -> &[RedactionRule] {
		&self.rules
	}

	pub fn len(&self) -> usize {
		self.rules.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rules.is_empty()
	}

	/// Run every rule in order. Borrows the input when nothing matched.
	pub fn apply<'a>(&self, input: &'a str) -> Cow<'a, str> {
		let mut current = Cow::Borrowed(input);
		for rule in &self.rules {
			let rewritten = match rule.apply(&current) {
				Cow::Borrowed(_) => continue,
				Cow::Owned(rewritten) => rewritten,
			};
			current = Cow::Owned(rewritten);
		}
		current
	}
}
