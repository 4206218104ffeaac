use lockbox_core::backing::{BackingStore, BackingStoreError};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::{
    cipher::{self, CipherError},
    codec::{self, FormatError},
    kdf::{self, DerivationError, DerivedKey},
};

/// Well-known key the encrypted session token is persisted under.
pub const TOKEN_KEY: &str = "token";

/// Key a plaintext token may linger under from deployments that predate
/// encryption. Read-only fallback; never written.
pub const LEGACY_TOKEN_KEY: &str = "auth_token";

/// Errors surfaced by the persist path. The load path never surfaces these:
/// every load failure collapses to "no value available".
#[derive(Debug, Error)]
pub enum StoreError {
    /// Key derivation rejected its inputs.
    #[error(transparent)]
    Derivation(#[from] DerivationError),
    /// AEAD failure while sealing or opening a record.
    #[error(transparent)]
    Cipher(#[from] CipherError),
    /// Stored text does not match the `iv:ciphertext` record shape.
    #[error(transparent)]
    Format(#[from] FormatError),
    /// Payload is not valid JSON, or could not be serialized.
    #[error("payload serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    /// Backing store read/write failure.
    #[error(transparent)]
    Backing(#[from] BackingStoreError),
    /// The blocking derivation task was cancelled or panicked.
    #[error("key derivation task failed: {reason}")]
    Runtime { reason: String },
}

/// Encrypted token store over a plain text [`BackingStore`].
///
/// Values are serialized to JSON, sealed with AES-256-GCM under a key
/// derived from the configured passphrase, and persisted as a single
/// `base64(iv):base64(ciphertext)` record. The store is stateless: the key
/// is re-derived on every operation and no plaintext is cached between
/// calls.
///
/// Failure policy: `persist` propagates every error (an unreadable write is
/// a misconfiguration the caller must see); `load` collapses every failure
/// to `None` so callers always get a token-or-absent answer and can fall
/// back to reauthentication.
pub struct SecureTokenStore<B: BackingStore> {
    backing: B,
    passphrase: String,
}

impl<B: BackingStore> SecureTokenStore<B> {
    /// Build a store sealing values under `passphrase`. The passphrase is an
    /// explicit parameter rather than ambient configuration so tests can
    /// inject distinct values. Rejects an empty passphrase up front.
    pub fn new(backing: B, passphrase: impl Into<String>) -> Result<Self, StoreError> {
        let passphrase = passphrase.into();
        if passphrase.is_empty() {
            return Err(DerivationError::EmptyPassphrase.into());
        }
        Ok(Self {
            backing,
            passphrase,
        })
    }

    /// Serialize `value`, encrypt it, and write the encoded record under
    /// `key`, overwriting any prior record.
    #[instrument(skip(self, value))]
    pub async fn persist<T>(&self, key: &str, value: &T) -> Result<(), StoreError>
    where
        T: Serialize + ?Sized,
    {
        let plaintext = serde_json::to_vec(value)?;
        let derived = self.derive_key().await?;
        let (iv, ciphertext) = cipher::encrypt(&derived, &plaintext)?;
        let record = codec::encode_record(&iv, &ciphertext);
        self.backing.set_item(key, &record)?;
        Ok(())
    }

    /// Read and decrypt the value under `key`.
    ///
    /// Returns `None` when the key is absent, and also for any decode,
    /// decrypt, or parse failure: a corrupted record, a rotated passphrase,
    /// and an expired session all look identical to callers.
    #[instrument(skip(self))]
    pub async fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let record = match self.backing.get_item(key) {
            Ok(Some(record)) => record,
            Ok(None) => return None,
            Err(err) => {
                debug!(%err, "backing store read failed");
                return None;
            }
        };

        match self.open_record(&record).await {
            Ok(value) => Some(value),
            Err(err) => {
                debug!(%err, "stored record unreadable, treating as absent");
                None
            }
        }
    }

    /// Load the session token, preferring the encrypted record under
    /// [`TOKEN_KEY`] and falling back to the plaintext value a pre-encryption
    /// deployment may have left under [`LEGACY_TOKEN_KEY`].
    pub async fn token(&self) -> Option<String> {
        if let Some(token) = self.load::<String>(TOKEN_KEY).await {
            return Some(token);
        }
        match self.backing.get_item(LEGACY_TOKEN_KEY) {
            Ok(value) => value,
            Err(err) => {
                debug!(%err, "legacy token read failed");
                None
            }
        }
    }

    /// Encrypt and store the session token under [`TOKEN_KEY`].
    pub async fn set_token(&self, token: &str) -> Result<(), StoreError> {
        self.persist(TOKEN_KEY, token).await
    }

    /// Remove the record under `key` (idempotent). Callers clear both
    /// [`TOKEN_KEY`] and [`LEGACY_TOKEN_KEY`] when the server rejects a
    /// session.
    pub fn clear(&self, key: &str) -> Result<(), StoreError> {
        Ok(self.backing.remove_item(key)?)
    }

    async fn open_record<T: DeserializeOwned>(&self, record: &str) -> Result<T, StoreError> {
        let (iv, ciphertext) = codec::decode_record(record)?;
        let derived = self.derive_key().await?;
        let plaintext = cipher::decrypt(&derived, &iv, &ciphertext)?;
        Ok(serde_json::from_slice(&plaintext)?)
    }

    /// Re-derive the key for this operation. The KDF is deliberately slow,
    /// so it runs on the blocking pool instead of stalling the executor.
    /// The salt is the passphrase's own byte encoding, which keeps records
    /// at two parts at the cost of a salt shared across deployments.
    async fn derive_key(&self) -> Result<DerivedKey, StoreError> {
        let passphrase = self.passphrase.clone();
        tokio::task::spawn_blocking(move || kdf::derive(&passphrase, passphrase.as_bytes()))
            .await
            .map_err(|e| StoreError::Runtime {
                reason: e.to_string(),
            })?
            .map_err(StoreError::from)
    }
}
