// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for at-rest encryption.

use thiserror::Error;
use warden_common_config::SecretEnvError;

/// Result type alias for encryption operations.
pub type SecretsResult<T> = Result<T, SecretsError>;

/// Errors from constructing or using the encryption service.
///
/// Messages never include key material, plaintext or ciphertext.
#[derive(Debug, Error)]
pub enum SecretsError {
	// =========================================================================
	// Configuration Errors
	// =========================================================================
	#[error("master key not configured: set ENCRYPTION_KEY or ENCRYPTION_KEY_FILE")]
	MasterKeyNotConfigured,

	#[error("master key too short: need at least {minimum} bytes, got {actual}")]
	MasterKeyTooShort { minimum: usize, actual: usize },

	#[error("failed to load master key: {0}")]
	MasterKeyLoad(#[from] SecretEnvError),

	// =========================================================================
	// Encryption Errors
	// =========================================================================
	#[error("encryption failed: {0}")]
	Encryption(String),

	/// Tampered, corrupted or truncated input. Retrying cannot help.
	#[error("authentication failed: {0}")]
	AuthenticationFailure(String),
}

impl SecretsError {
	/// Missing or unusable master key. Fatal at startup.
	pub fn is_configuration(&self) -> bool {
		matches!(
			self,
			SecretsError::MasterKeyNotConfigured
				| SecretsError::MasterKeyTooShort { .. }
				| SecretsError::MasterKeyLoad(_)
		)
	}

	pub fn is_authentication_failure(&self) -> bool {
		matches!(self, SecretsError::AuthenticationFailure(_))
	}
}
