// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Wrapper for values that must never reach logs or serialized output.
//!
//! The encryption master key, third-party API keys read back from storage and
//! every plaintext returned by decryption travel through the layer as
//! [`SecretString`]. The wrapper prints `[REDACTED]` for `Debug`, `Display` and
//! `Serialize`, wipes its memory on drop, and only hands out the inner value
//! through [`Secret::expose`].
//!
//! ```
//! use warden_common_secret::SecretString;
//!
//! let key = SecretString::new("sk-live-provider-key".to_string());
//! assert_eq!(key.to_string(), "[REDACTED]");
//! assert_eq!(key.expose(), "sk-live-provider-key");
//! ```

use std::fmt;

use zeroize::Zeroize;

/// Placeholder written wherever a secret would otherwise be formatted.
pub const REDACTED: &str = "[REDACTED]";

/// A value that is redacted on output and zeroized on drop.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct Secret<T>
where
	T: Zeroize,
{
	inner: T,
}

/// The common case: a secret UTF-8 string.
pub type SecretString = Secret<String>;

impl<T> Secret<T>
where
	T: Zeroize,
{
	pub fn new(inner: T) -> Self {
		Self { inner }
	}

	/// Access the wrapped value. Every call site is a point where the secret
	/// leaves the wrapper, so keep them few and obvious.
	pub fn expose(&self) -> &T {
		&self.inner
	}

	/// Clone the inner value out. The wrapper itself is still wiped on drop.
	pub fn into_inner(self) -> T
	where
		T: Clone,
	{
		self.inner.clone()
	}
}

impl SecretString {
	/// Length of the secret in bytes. Safe to log.
	pub fn len(&self) -> usize {
		self.inner.len()
	}

	pub fn is_empty(&self) -> bool {
		self.inner.is_empty()
	}
}

impl From<String> for SecretString {
	fn from(value: String) -> Self {
		Self::new(value)
	}
}

impl From<&str> for SecretString {
	fn from(value: &str) -> Self {
		Self::new(value.to_owned())
	}
}

impl<T> Clone for Secret<T>
where
	T: Zeroize + Clone,
{
	fn clone(&self) -> Self {
		Self::new(self.inner.clone())
	}
}

impl<T> fmt::Debug for Secret<T>
where
	T: Zeroize,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Secret").field(&REDACTED).finish()
	}
}

impl<T> fmt::Display for Secret<T>
where
	T: Zeroize,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(REDACTED)
	}
}

impl<T> PartialEq for Secret<T>
where
	T: Zeroize + PartialEq,
{
	fn eq(&self, other: &Self) -> bool {
		self.inner == other.inner
	}
}

impl<T> Eq for Secret<T> where T: Zeroize + Eq {}

#[cfg(feature = "serde")]
mod serde_impl {
	use serde::{Deserialize, Deserializer, Serialize, Serializer};
	use zeroize::Zeroize;

	use super::{Secret, REDACTED};

	impl<T> Serialize for Secret<T>
	where
		T: Zeroize,
	{
		fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
			serializer.serialize_str(REDACTED)
		}
	}

	impl<'de, T> Deserialize<'de> for Secret<T>
	where
		T: Deserialize<'de> + Zeroize,
	{
		fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
			T::deserialize(deserializer).map(Secret::new)
		}
	}
}
