// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Stored form of an encrypted value.
//!
//! ```text
//! +-----------+----------------------------+-----------+
//! | nonce(12) | ciphertext(len(plaintext)) | tag(16)   |
//! +-----------+----------------------------+-----------+
//! ```
//!
//! The concatenation is standard (padded) base64 when stored. There is no
//! length prefix: the ciphertext is whatever sits between the fixed-size
//! nonce and tag. Values already in the database use this exact layout.

use std::fmt;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{SecretsError, SecretsResult};

/// Size of the AES-GCM nonce in bytes.
pub const NONCE_SIZE: usize = 12;

/// Size of the AES-GCM authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// Shortest structurally valid blob: nonce and tag around an empty ciphertext.
pub const MIN_BLOB_SIZE: usize = NONCE_SIZE + TAG_SIZE;

/// `nonce ‖ ciphertext ‖ tag`. Immutable once built.
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptedBlob {
	bytes: Vec<u8>,
}

impl EncryptedBlob {
	/// Wrap raw bytes, checking only that a nonce and tag fit.
	pub fn from_bytes(bytes: Vec<u8>) -> SecretsResult<Self> {
		if bytes.len() < MIN_BLOB_SIZE {
			return Err(SecretsError::AuthenticationFailure(format!(
				"blob is {} bytes, shorter than nonce and tag ({MIN_BLOB_SIZE})",
				bytes.len()
			)));
		}
		Ok(Self { bytes })
	}

	pub fn from_base64(encoded: &str) -> SecretsResult<Self> {
		let bytes = BASE64
			.decode(encoded.trim())
			.map_err(|e| SecretsError::AuthenticationFailure(format!("invalid base64: {e}")))?;
		Self::from_bytes(bytes)
	}

	pub(crate) fn from_parts(nonce: &[u8; NONCE_SIZE], sealed: Vec<u8>) -> Self {
		let mut bytes = Vec::with_capacity(NONCE_SIZE + sealed.len());
		bytes.extend_from_slice(nonce);
		bytes.extend_from_slice(&sealed);
		Self { bytes }
	}

	pub fn nonce(&self) -> &[u8] {
		&self.bytes[..NONCE_SIZE]
	}

	pub fn ciphertext(&self) -> &[u8] {
		&self.bytes[NONCE_SIZE..self.bytes.len() - TAG_SIZE]
	}

	pub fn tag(&self) -> &[u8] {
		&self.bytes[self.bytes.len() - TAG_SIZE..]
	}

	/// Ciphertext followed by tag, the input AES-GCM decryption expects.
	pub(crate) fn sealed(&self) -> &[u8] {
		&self.bytes[NONCE_SIZE..]
	}

	pub fn as_bytes(&self) -> &[u8] {
		&self.bytes
	}

	pub fn into_bytes(self) -> Vec<u8> {
		self.bytes
	}

	pub fn to_base64(&self) -> String {
		BASE64.encode(&self.bytes)
	}
}

impl fmt::Display for EncryptedBlob {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.to_base64())
	}
}

impl fmt::Debug for EncryptedBlob {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("EncryptedBlob")
			.field("len", &self.bytes.len())
			.finish()
	}
}

impl std::str::FromStr for EncryptedBlob {
	type Err = SecretsError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::from_base64(s)
	}
}

impl Serialize for EncryptedBlob {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&self.to_base64())
	}
}

impl<'de> Deserialize<'de> for EncryptedBlob {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let encoded = String::deserialize(deserializer)?;
		Self::from_base64(&encoded).map_err(serde::de::Error::custom)
	}
}
