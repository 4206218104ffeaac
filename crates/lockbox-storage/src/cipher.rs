use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use thiserror::Error;

use crate::kdf::DerivedKey;

/// 96-bit GCM nonce, freshly random per encryption.
pub const NONCE_LEN: usize = 12;

/// Errors produced by AEAD seal/open operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CipherError {
    /// Tag verification failed: wrong key, tampered or truncated input.
    #[error("authentication failed: ciphertext rejected")]
    Authentication,
    /// The AEAD primitive rejected its inputs.
    #[error("cipher failure: {reason}")]
    Cipher { reason: String },
}

/// Encrypt `plaintext` under `key` with AES-256-GCM.
///
/// Returns the random nonce and the ciphertext with the 16-byte
/// authentication tag appended. A fresh nonce is drawn from the OS CSPRNG on
/// every call; reuse with the same key would break GCM confidentiality.
pub fn encrypt(
    key: &DerivedKey,
    plaintext: &[u8],
) -> Result<([u8; NONCE_LEN], Vec<u8>), CipherError> {
    let cipher = build_cipher(key)?;
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|e| CipherError::Cipher {
            reason: format!("encrypt failed: {e}"),
        })?;
    Ok((nonce.into(), ciphertext))
}

/// Decrypt `ciphertext` (which must include the appended tag) under `key`.
/// Any tampering, truncation, or wrong key yields `Authentication`, never
/// garbage plaintext.
pub fn decrypt(key: &DerivedKey, iv: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, CipherError> {
    if iv.len() != NONCE_LEN {
        return Err(CipherError::Authentication);
    }
    let cipher = build_cipher(key)?;
    let nonce = Nonce::from_slice(iv);
    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| CipherError::Authentication)
}

fn build_cipher(key: &DerivedKey) -> Result<Aes256Gcm, CipherError> {
    Aes256Gcm::new_from_slice(key.material()).map_err(|e| CipherError::Cipher {
        reason: format!("cipher init failed: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kdf;

    fn test_key(passphrase: &str) -> DerivedKey {
        kdf::derive(passphrase, passphrase.as_bytes()).expect("derive")
    }

    #[test]
    fn encrypt_decrypt_round_trip() {
        let key = test_key("round-trip");
        let plaintext = b"session token value";

        let (iv, ciphertext) = encrypt(&key, plaintext).expect("encrypt");
        let decrypted = decrypt(&key, &iv, &ciphertext).expect("decrypt");

        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn nonce_is_fresh_per_call() {
        let key = test_key("fresh-nonce");
        let plaintext = b"same input twice";

        let (iv1, ct1) = encrypt(&key, plaintext).expect("encrypt");
        let (iv2, ct2) = encrypt(&key, plaintext).expect("encrypt again");

        assert_ne!(iv1, iv2);
        assert_ne!(ct1, ct2);
    }

    #[test]
    fn ciphertext_includes_tag() {
        let key = test_key("tagged");
        let plaintext = b"hello";

        let (_, ciphertext) = encrypt(&key, plaintext).expect("encrypt");
        assert_eq!(ciphertext.len(), plaintext.len() + 16);
    }

    #[test]
    fn tampered_ciphertext_is_rejected() {
        let key = test_key("tamper");
        let (iv, mut ciphertext) = encrypt(&key, b"do not touch").expect("encrypt");
        ciphertext[0] ^= 0x01;

        let err = decrypt(&key, &iv, &ciphertext).expect_err("should reject");
        assert_eq!(err, CipherError::Authentication);
    }

    #[test]
    fn wrong_key_is_rejected() {
        let (iv, ciphertext) = encrypt(&test_key("key one"), b"secret").expect("encrypt");
        let err = decrypt(&test_key("key two"), &iv, &ciphertext).expect_err("should reject");
        assert_eq!(err, CipherError::Authentication);
    }

    #[test]
    fn short_nonce_is_rejected() {
        let key = test_key("short-nonce");
        let (_, ciphertext) = encrypt(&key, b"payload").expect("encrypt");

        let err = decrypt(&key, b"short", &ciphertext).expect_err("should reject");
        assert_eq!(err, CipherError::Authentication);
    }
}
