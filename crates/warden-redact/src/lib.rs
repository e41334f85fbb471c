// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Secret redaction for log output.
//!
//! Text is rewritten by an ordered table of [`RedactionRule`]s. Each match is
//! replaced wholly by [`REDACTION_MARKER`]; nothing of the secret survives,
//! not even a prefix. The built-in table covers credential assignments
//! (`token=...`, `password: ...`), provider API key shapes and signed
//! dot-delimited session tokens. New shapes are added by extending a
//! [`RuleSet`], not by touching the matching code.

mod rule;

use std::borrow::Cow;

use once_cell::sync::Lazy;

pub use rule::{RedactionRule, RuleSet};

/// Replacement written for every redacted match.
pub const REDACTION_MARKER: &str = "[REDACTED]";

/// Built-in rules as `(id, pattern)`, in application order.
const BUILTIN_PATTERNS: &[(&str, &str)] = &[
	// The value runs to whitespace or a quote, punctuation included.
	(
		"credential-assignment",
		r#"(?i)\b[a-z0-9_-]*(?:key|token|secret|password|authorization)[a-z0-9_-]*["']?\s*[=:]\s*["']?(?:bearer\s+|basic\s+)?[^\s"']{10,}["']?"#,
	),
	("anthropic-api-key", r"\bsk-ant-[A-Za-z0-9_-]{20,}"),
	("openai-api-key", r"\bsk-[A-Za-z0-9_-]{20,}"),
	("aws-access-key", r"\b(?:AKIA|ASIA)[0-9A-Z]{16}\b"),
	("google-api-key", r"\bAIza[0-9A-Za-z_-]{35}"),
	("github-token", r"\bgh[pousr]_[A-Za-z0-9]{36,}"),
	(
		"signed-token",
		r"\b[A-Za-z0-9_-]{16,}\.[A-Za-z0-9_-]{16,}\.[A-Za-z0-9_-]{16,}",
	),
];

static RULES: Lazy<RuleSet> = Lazy::new(builtin_rules);

#[derive(Debug, thiserror::Error)]
pub enum RedactError {
	#[error("regex compilation failed: {0}")]
	RegexError(#[from] regex::Error),
}

/// A secret found by [`detect`], as a byte range of the scanned input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
	pub rule_id: &'static str,
	pub start: usize,
	pub end: usize,
}

impl RuleSet {
	/// A fresh copy of the built-in table, ready to be extended.
	pub fn builtin() -> Self {
		builtin_rules()
	}
}

fn builtin_rules() -> RuleSet {
	BUILTIN_PATTERNS
		.iter()
		.filter_map(|(id, pattern)| RedactionRule::new(id, pattern, REDACTION_MARKER).ok())
		.fold(RuleSet::empty(), RuleSet::with_rule)
}

/// The shared built-in table.
pub fn default_rules() -> &'static RuleSet {
	&RULES
}

/// Redact with the built-in table. Borrows when nothing matched.
pub fn redact(input: &str) -> Cow<'_, str> {
	RULES.apply(input)
}

/// Redact `input` in place, returning whether anything changed.
pub fn redact_in_place(input: &mut String) -> bool {
	match redact(input) {
		Cow::Borrowed(_) => false,
		Cow::Owned(redacted) => {
			*input = redacted;
			true
		}
	}
}

pub fn contains_secrets(input: &str) -> bool {
	RULES.rules().iter().any(|r| r.pattern.is_match(input))
}

/// Locate secrets without rewriting. Overlapping hits keep the earliest.
pub fn detect(input: &str) -> Vec<Detection> {
	let mut hits: Vec<Detection> = RULES
		.rules()
		.iter()
		.flat_map(|rule| {
			rule.pattern.find_iter(input).map(|m| Detection {
				rule_id: rule.id,
				start: m.start(),
				end: m.end(),
			})
		})
		.collect();
	hits.sort_by_key(|d| (d.start, std::cmp::Reverse(d.end)));

	let mut deduped: Vec<Detection> = Vec::with_capacity(hits.len());
	for hit in hits {
		if deduped.last().is_some_and(|last| hit.start < last.end) {
			continue;
		}
		deduped.push(hit);
	}
	deduped
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn every_builtin_pattern_compiles() {
		assert_eq!(default_rules().len(), BUILTIN_PATTERNS.len());
	}

	#[test]
	fn rule_order_matches_table() {
		let ids: Vec<_> = default_rules().rules().iter().map(|r| r.id).collect();
		let expected: Vec<_> = BUILTIN_PATTERNS.iter().map(|(id, _)| *id).collect();
		assert_eq!(ids, expected);
	}

	#[test]
	fn replacement_is_literal() {
		let rule = RedactionRule::new("dollar", r"secret-\d+", "$0-kept").unwrap();
		assert_eq!(rule.apply("x secret-42 y"), "x $0-kept y");
	}

	#[test]
	fn custom_rules_run_after_builtin() {
		let rules = RuleSet::builtin()
			.with_rule(RedactionRule::new("internal-id", r"\bacct_[0-9]{8}\b", "[ACCOUNT]").unwrap());
		let out = rules.apply("user acct_12345678 logged in");
		assert_eq!(out, "user [ACCOUNT] logged in");
	}
}
