use std::num::NonZeroU32;

use ring::pbkdf2;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// PBKDF2-HMAC-SHA256 round count. Fixed: changing it invalidates every
/// record sealed under the previous count.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

const KEY_LEN: usize = 32;

/// Errors produced when turning a passphrase into key material.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DerivationError {
    /// The KDF needs at least one byte of secret input.
    #[error("cannot derive a key from an empty passphrase")]
    EmptyPassphrase,
}

/// 256-bit symmetric key derived from a passphrase. The raw bytes never
/// leave this crate; the key is only usable to build an AEAD cipher.
/// Zeroed on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey([u8; KEY_LEN]);

impl DerivedKey {
    pub(crate) fn material(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("DerivedKey").field(&"<redacted>").finish()
    }
}

/// Derive a 256-bit key from `passphrase` and `salt` via PBKDF2-HMAC-SHA256.
/// Deterministic: the same inputs always yield the same key.
pub fn derive(passphrase: &str, salt: &[u8]) -> Result<DerivedKey, DerivationError> {
    if passphrase.is_empty() {
        return Err(DerivationError::EmptyPassphrase);
    }

    const ITERATIONS: NonZeroU32 = NonZeroU32::new(PBKDF2_ITERATIONS).unwrap();
    let mut out = [0u8; KEY_LEN];
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA256,
        ITERATIONS,
        salt,
        passphrase.as_bytes(),
        &mut out,
    );
    Ok(DerivedKey(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_inputs_derive_same_key() {
        let first = derive("correct horse", b"salt").expect("derive");
        let second = derive("correct horse", b"salt").expect("derive");
        assert_eq!(first.material(), second.material());
    }

    #[test]
    fn different_passphrases_derive_different_keys() {
        let first = derive("passphrase one", b"salt").expect("derive");
        let second = derive("passphrase two", b"salt").expect("derive");
        assert_ne!(first.material(), second.material());
    }

    #[test]
    fn different_salts_derive_different_keys() {
        let first = derive("same passphrase", b"salt-a").expect("derive");
        let second = derive("same passphrase", b"salt-b").expect("derive");
        assert_ne!(first.material(), second.material());
    }

    #[test]
    fn empty_passphrase_is_rejected() {
        let err = derive("", b"salt").expect_err("should reject empty passphrase");
        assert_eq!(err, DerivationError::EmptyPassphrase);
    }
}
