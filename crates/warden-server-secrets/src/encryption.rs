// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! AES-256-GCM encryption of short secret strings for storage.

use std::fmt;
use std::sync::Arc;

use aes_gcm::{
	aead::{Aead, KeyInit, OsRng},
	Aes256Gcm, Key, Nonce,
};
use rand::RngCore;
use tracing::{instrument, warn};
use warden_common_config::load_secret_env;
use warden_common_secret::SecretString;
use zeroize::Zeroizing;

use crate::blob::{EncryptedBlob, NONCE_SIZE};
use crate::error::{SecretsError, SecretsResult};

/// Size of the AES-256 key in bytes.
pub const KEY_SIZE: usize = 32;

/// Shortest accepted master secret, in bytes of its UTF-8 encoding.
pub const MIN_MASTER_SECRET_LEN: usize = 32;

/// Environment variable holding the master secret (`_FILE` suffix supported).
pub const ENCRYPTION_KEY_ENV: &str = "ENCRYPTION_KEY";

/// Encrypts and decrypts secrets under one master key.
///
/// Holds no state besides the key, so it is safe to share across request
/// handlers without locking. Cloning shares the key.
#[derive(Clone)]
pub struct KeyEncryptionService {
	cipher: Arc<Aes256Gcm>,
}

impl KeyEncryptionService {
	/// Build from the master secret.
	///
	/// The AES key is the first 32 bytes of the secret's UTF-8 encoding, so a
	/// given `ENCRYPTION_KEY` keeps decrypting values stored under it.
	pub fn new(master_secret: &SecretString) -> SecretsResult<Self> {
		let raw = master_secret.expose().as_bytes();
		if raw.len() < MIN_MASTER_SECRET_LEN {
			return Err(SecretsError::MasterKeyTooShort {
				minimum: MIN_MASTER_SECRET_LEN,
				actual: raw.len(),
			});
		}

		let mut key = Zeroizing::new([0u8; KEY_SIZE]);
		key.copy_from_slice(&raw[..KEY_SIZE]);
		Ok(Self::from_key(&key))
	}

	/// Build from an exact 256-bit key.
	pub fn from_key(key: &[u8; KEY_SIZE]) -> Self {
		let key = Key::<Aes256Gcm>::from_slice(key);
		Self {
			cipher: Arc::new(Aes256Gcm::new(key)),
		}
	}

	/// Build from `ENCRYPTION_KEY` / `ENCRYPTION_KEY_FILE`.
	#[instrument(skip_all)]
	pub fn from_env() -> SecretsResult<Self> {
		let secret = load_secret_env(ENCRYPTION_KEY_ENV)?.ok_or(SecretsError::MasterKeyNotConfigured)?;
		Self::new(&secret)
	}

	/// Encrypt under a fresh random nonce.
	///
	/// Two calls with the same plaintext never produce the same blob.
	#[instrument(skip_all, fields(len = plaintext.len()))]
	pub fn encrypt(&self, plaintext: &str) -> SecretsResult<EncryptedBlob> {
		let nonce_bytes = generate_nonce();
		let nonce = Nonce::from_slice(&nonce_bytes);

		let sealed = self
			.cipher
			.encrypt(nonce, plaintext.as_bytes())
			.map_err(|e| SecretsError::Encryption(format!("AES-GCM seal failed: {e}")))?;

		Ok(EncryptedBlob::from_parts(&nonce_bytes, sealed))
	}

	/// Encrypt and return the stored (base64) form.
	pub fn encrypt_to_string(&self, plaintext: &str) -> SecretsResult<String> {
		self.encrypt(plaintext).map(|blob| blob.to_base64())
	}

	/// Decrypt a stored base64 value.
	pub fn decrypt(&self, encoded: &str) -> SecretsResult<SecretString> {
		let blob = EncryptedBlob::from_base64(encoded).inspect_err(|e| {
			warn!(error = %e, "Rejected malformed encrypted value");
		})?;
		self.decrypt_blob(&blob)
	}

	/// Decrypt and verify the tag. Any mismatch is an authentication failure.
	#[instrument(skip_all, fields(len = blob.as_bytes().len()))]
	pub fn decrypt_blob(&self, blob: &EncryptedBlob) -> SecretsResult<SecretString> {
		let nonce = Nonce::from_slice(blob.nonce());

		let plaintext = Zeroizing::new(self.cipher.decrypt(nonce, blob.sealed()).map_err(|_| {
			warn!("Encrypted value failed tag verification");
			SecretsError::AuthenticationFailure("tag verification failed".to_string())
		})?);

		let text = std::str::from_utf8(&plaintext).map_err(|_| {
			SecretsError::AuthenticationFailure("plaintext is not valid UTF-8".to_string())
		})?;
		Ok(SecretString::new(text.to_owned()))
	}
}

impl fmt::Debug for KeyEncryptionService {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("KeyEncryptionService")
			.finish_non_exhaustive()
	}
}

/// Generate a random 96-bit nonce.
///
/// Random nonces under one key stay safe well past any realistic number of
/// stored secrets (collision risk reaches 2^-32 after about 2^32 encryptions).
fn generate_nonce() -> [u8; NONCE_SIZE] {
	let mut nonce = [0u8; NONCE_SIZE];
	OsRng.fill_bytes(&mut nonce);
	nonce
}
