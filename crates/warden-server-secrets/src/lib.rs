// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! At-rest encryption for third-party API keys.
//!
//! Persistence code encrypts a key before writing the column and decrypts it
//! after reading:
//!
//! ```
//! use warden_common_secret::SecretString;
//! use warden_server_secrets::KeyEncryptionService;
//!
//! let master = SecretString::from("0123456789abcdef0123456789abcdef");
//! let service = KeyEncryptionService::new(&master)?;
//!
//! let stored = service.encrypt_to_string("sk-provider-key")?;
//! assert_eq!(service.decrypt(&stored)?.expose(), "sk-provider-key");
//! # Ok::<(), warden_server_secrets::SecretsError>(())
//! ```
//!
//! # Security Design
//!
//! - AES-256-GCM with a fresh random 96-bit nonce per value
//! - Stored layout `nonce ‖ ciphertext ‖ tag`, base64 encoded (see [`blob`])
//! - Decrypted values come back as [`SecretString`](warden_common_secret::SecretString)
//! - Tampered or truncated values fail with
//!   [`SecretsError::AuthenticationFailure`], never an empty plaintext

pub mod blob;
pub mod encryption;
pub mod error;

pub use blob::{EncryptedBlob, MIN_BLOB_SIZE, NONCE_SIZE, TAG_SIZE};
pub use encryption::{KeyEncryptionService, ENCRYPTION_KEY_ENV, KEY_SIZE, MIN_MASTER_SECRET_LEN};
pub use error::{SecretsError, SecretsResult};
