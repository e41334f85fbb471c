// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Conversion of heterogeneous log arguments to text.

use std::error::Error;
use std::fmt::Debug;

use serde::Serialize;

/// Anything that can be passed to [`RedactingLog`](crate::RedactingLog).
///
/// Conversion must not fail; implementations fall back to a lossy form
/// instead of returning an error.
pub trait LogValue {
	fn to_log_text(&self) -> String;
}

impl LogValue for str {
	fn to_log_text(&self) -> String {
		self.to_owned()
	}
}

impl LogValue for String {
	fn to_log_text(&self) -> String {
		self.clone()
	}
}

impl<T: LogValue + ?Sized> LogValue for &T {
	fn to_log_text(&self) -> String {
		(**self).to_log_text()
	}
}

macro_rules! display_log_value {
	($($ty:ty),* $(,)?) => {
		$(
			impl LogValue for $ty {
				fn to_log_text(&self) -> String {
					self.to_string()
				}
			}
		)*
	};
}

display_log_value!(bool, char, i32, i64, u16, u32, u64, usize, f32, f64);

/// A structured value, written as compact JSON.
///
/// If serialization fails the `Debug` form is used instead.
pub struct Json<'a, T: ?Sized>(pub &'a T);

impl<T> LogValue for Json<'_, T>
where
	T: Serialize + Debug + ?Sized,
{
	fn to_log_text(&self) -> String {
		serde_json::to_string(self.0).unwrap_or_else(|_| format!("{:?}", self.0))
	}
}

/// A failure, reduced to its message text followed by each cause as
/// `: cause`.
pub struct Failure<'a>(pub &'a (dyn Error + 'a));

impl LogValue for Failure<'_> {
	fn to_log_text(&self) -> String {
		let mut text = self.0.to_string();
		let mut source = self.0.source();
		while let Some(cause) = source {
			text.push_str(": ");
			text.push_str(&cause.to_string());
			source = cause.source();
		}
		text
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde::ser::Error as _;
	use std::collections::BTreeMap;

	#[derive(Debug)]
	struct Unserializable;

	impl Serialize for Unserializable {
		fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
			Err(S::Error::custom("cannot serialize"))
		}
	}

	#[derive(Debug, thiserror::Error)]
	#[error("upstream timed out after {0}s")]
	struct Timeout(u32);

	#[derive(Debug, thiserror::Error)]
	#[error("completion request failed")]
	struct RequestFailed(#[source] Timeout);

	#[test]
	fn text_passes_through() {
		assert_eq!("hello".to_log_text(), "hello");
		assert_eq!(String::from("héllo").to_log_text(), "héllo");
		assert_eq!((&&"nested").to_log_text(), "nested");
	}

	#[test]
	fn primitives_use_display() {
		assert_eq!(42u32.to_log_text(), "42");
		assert_eq!(true.to_log_text(), "true");
		assert_eq!(1.5f64.to_log_text(), "1.5");
	}

	#[test]
	fn structured_values_are_json() {
		let map = BTreeMap::from([("division", "north"), ("role", "admin")]);
		assert_eq!(
			Json(&map).to_log_text(),
			r#"{"division":"north","role":"admin"}"#
		);
	}

	#[test]
	fn failed_serialization_falls_back_to_debug() {
		assert_eq!(Json(&Unserializable).to_log_text(), "Unserializable");
	}

	#[test]
	fn failures_use_message_text() {
		let err = Timeout(30);
		assert_eq!(Failure(&err).to_log_text(), "upstream timed out after 30s");
	}

	#[test]
	fn failures_include_cause_chain() {
		let err = RequestFailed(Timeout(5));
		assert_eq!(
			Failure(&err).to_log_text(),
			"completion request failed: upstream timed out after 5s"
		);
	}
}
