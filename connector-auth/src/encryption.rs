//! AES-256-GCM encryption for integration credentials stored at rest.
//!
//! The key is 32 bytes supplied as a 64 character hex string. Ciphertext is
//! `base64(nonce || ciphertext)` so it fits a text column.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::Rng;

use crate::error::{crypto_error, CryptoErrorKind, Error, ErrorKind};

/// 12-byte nonce size for AES-GCM
const NONCE_SIZE: usize = 12;

/// Symmetric cipher built once from the configured key.
#[derive(Clone)]
pub struct Cipher {
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for Cipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Cipher([REDACTED])")
    }
}

impl Cipher {
    /// Builds a cipher from a hex-encoded 32-byte key.
    pub fn from_hex(key_hex: &str) -> Result<Self, Error> {
        let bytes = hex::decode(key_hex.trim()).map_err(|e| Error {
            source: Some(Box::new(e)),
            error_kind: ErrorKind::Crypto(CryptoErrorKind::InvalidKey),
        })?;
        if bytes.len() != 32 {
            return Err(crypto_error(CryptoErrorKind::InvalidKey));
        }
        let cipher = Aes256Gcm::new_from_slice(&bytes)
            .map_err(|_| crypto_error(CryptoErrorKind::InvalidKey))?;
        Ok(Self { cipher })
    }

    /// Encrypts plaintext with a fresh random nonce.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, Error> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::thread_rng().fill(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|_| crypto_error(CryptoErrorKind::EncryptionFailed))?;

        let mut combined = nonce_bytes.to_vec();
        combined.extend(ciphertext);

        Ok(BASE64.encode(combined))
    }

    /// Decrypts a value produced by [`Cipher::encrypt`].
    pub fn decrypt(&self, ciphertext_b64: &str) -> Result<String, Error> {
        let combined = BASE64.decode(ciphertext_b64).map_err(|e| Error {
            source: Some(Box::new(e)),
            error_kind: ErrorKind::Crypto(CryptoErrorKind::DecryptionFailed),
        })?;

        if combined.len() < NONCE_SIZE {
            return Err(crypto_error(CryptoErrorKind::DecryptionFailed));
        }

        let (nonce_bytes, ciphertext) = combined.split_at(NONCE_SIZE);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| crypto_error(CryptoErrorKind::DecryptionFailed))?;

        String::from_utf8(plaintext).map_err(|e| Error {
            source: Some(Box::new(e)),
            error_kind: ErrorKind::Crypto(CryptoErrorKind::DecryptionFailed),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_KEY: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    fn kind(result: Result<impl std::fmt::Debug, Error>) -> ErrorKind {
        result.unwrap_err().error_kind
    }

    #[test]
    fn decrypts_what_it_encrypted() {
        let cipher = Cipher::from_hex(TEST_KEY).unwrap();
        let encrypted = cipher.encrypt(r#"{"apiKey":"secret_abc"}"#).unwrap();
        assert!(!encrypted.contains("secret_abc"));
        assert_eq!(
            cipher.decrypt(&encrypted).unwrap(),
            r#"{"apiKey":"secret_abc"}"#
        );
    }

    #[test]
    fn nonce_differs_per_call() {
        let cipher = Cipher::from_hex(TEST_KEY).unwrap();
        assert_ne!(cipher.encrypt("x").unwrap(), cipher.encrypt("x").unwrap());
    }

    #[test]
    fn rejects_bad_keys() {
        assert_eq!(
            kind(Cipher::from_hex("not-hex")),
            ErrorKind::Crypto(CryptoErrorKind::InvalidKey)
        );
        assert_eq!(
            kind(Cipher::from_hex("abcd")),
            ErrorKind::Crypto(CryptoErrorKind::InvalidKey)
        );
    }

    #[test]
    fn wrong_key_fails_to_decrypt() {
        let encrypted = Cipher::from_hex(TEST_KEY).unwrap().encrypt("secret").unwrap();
        let other = Cipher::from_hex(&"f".repeat(64)).unwrap();
        assert_eq!(
            kind(other.decrypt(&encrypted)),
            ErrorKind::Crypto(CryptoErrorKind::DecryptionFailed)
        );
    }

    #[test]
    fn garbage_fails_to_decrypt() {
        let cipher = Cipher::from_hex(TEST_KEY).unwrap();
        assert_eq!(
            kind(cipher.decrypt("not_valid_base64!!!")),
            ErrorKind::Crypto(CryptoErrorKind::DecryptionFailed)
        );
        assert_eq!(
            kind(cipher.decrypt("AAAA")),
            ErrorKind::Crypto(CryptoErrorKind::DecryptionFailed)
        );
    }

    #[test]
    fn debug_hides_key() {
        let cipher = Cipher::from_hex(TEST_KEY).unwrap();
        assert_eq!(format!("{cipher:?}"), "Cipher([REDACTED])");
    }
}
