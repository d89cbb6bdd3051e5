//! Keyed deterministic cipher for identifier permanence.
//!
//! The value must be recovered later, so this is a reversible cipher,
//! not a digest. AES-256-GCM provides the keyed transform; determinism
//! comes from deriving the nonce from the plaintext itself (SIV-style,
//! HMAC-SHA256 under a separate derived key), so identical inputs under
//! an unchanged secret always yield the identical token. Both keys are
//! expanded from the process-wide secret with HKDF-SHA256 at
//! construction time and are read-only afterwards.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use dataright_core::errors::CoreError;
use hkdf::Hkdf;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;

const NONCE_LEN: usize = 12;
const ENC_KEY_INFO: &[u8] = b"dataright/id-permanence/enc";
const NONCE_KEY_INFO: &[u8] = b"dataright/id-permanence/nonce";

/// Opaque decode failure.
///
/// Deliberately carries no cause: neither the token, the key material,
/// nor the failing step may leak into error details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("identifier token could not be decoded")]
pub struct DecodeFailure;

/// Deterministic keyed transform between identifier plaintext and an
/// opaque URL-safe token.
pub struct IdCipher {
    cipher: Aes256Gcm,
    nonce_key: [u8; 32],
}

impl IdCipher {
    /// Derive the cipher from the process-wide secret.
    pub fn new(secret: &str) -> Result<Self, CoreError> {
        let hkdf = Hkdf::<Sha256>::new(None, secret.as_bytes());
        let mut enc_key = [0u8; 32];
        hkdf.expand(ENC_KEY_INFO, &mut enc_key)
            .map_err(|_| CoreError::crypto("failed to derive encryption key"))?;
        let mut nonce_key = [0u8; 32];
        hkdf.expand(NONCE_KEY_INFO, &mut nonce_key)
            .map_err(|_| CoreError::crypto("failed to derive nonce key"))?;

        let cipher = Aes256Gcm::new_from_slice(&enc_key)
            .map_err(|_| CoreError::crypto("failed to initialise cipher"))?;
        Ok(Self { cipher, nonce_key })
    }

    /// Nonce derived from the plaintext, so equal inputs give equal tokens.
    fn derive_nonce(&self, plaintext: &[u8]) -> Result<[u8; NONCE_LEN], CoreError> {
        let mut mac = <Hmac<Sha256> as Mac>::new_from_slice(&self.nonce_key)
            .map_err(|_| CoreError::crypto("failed to key the nonce derivation"))?;
        mac.update(plaintext);
        let digest = mac.finalize().into_bytes();
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&digest[..NONCE_LEN]);
        Ok(nonce)
    }

    /// Encrypt identifier plaintext into a URL-safe token.
    pub fn seal(&self, plaintext: &str) -> Result<String, CoreError> {
        let nonce_bytes = self.derive_nonce(plaintext.as_bytes())?;
        let nonce = Nonce::from(nonce_bytes);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| CoreError::crypto("identifier encryption failed"))?;

        let mut framed = nonce_bytes.to_vec();
        framed.extend_from_slice(&ciphertext);
        Ok(URL_SAFE_NO_PAD.encode(framed))
    }

    /// Decrypt a token back into identifier plaintext.
    ///
    /// Any base64, framing, authentication, or encoding failure collapses
    /// into the same opaque [`DecodeFailure`].
    pub fn open(&self, token: &str) -> Result<String, DecodeFailure> {
        let framed = URL_SAFE_NO_PAD.decode(token).map_err(|_| {
            debug!("token is not valid base64url");
            DecodeFailure
        })?;
        if framed.len() <= NONCE_LEN {
            debug!("token is too short to carry a ciphertext");
            return Err(DecodeFailure);
        }

        let nonce_bytes: [u8; NONCE_LEN] =
            framed[..NONCE_LEN].try_into().map_err(|_| DecodeFailure)?;
        let nonce = Nonce::from(nonce_bytes);
        let plaintext = self
            .cipher
            .decrypt(&nonce, &framed[NONCE_LEN..])
            .map_err(|_| {
                debug!("token failed authenticated decryption");
                DecodeFailure
            })?;

        String::from_utf8(plaintext).map_err(|_| DecodeFailure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seal_then_open_recovers_the_plaintext() {
        let cipher = IdCipher::new("test-secret").unwrap();
        let token = cipher.seal("user1:app7:acct-42").unwrap();
        assert_eq!(cipher.open(&token).unwrap(), "user1:app7:acct-42");
    }

    #[test]
    fn sealing_is_deterministic() {
        let cipher = IdCipher::new("test-secret").unwrap();
        let first = cipher.seal("user1:app7:acct-42").unwrap();
        let second = cipher.seal("user1:app7:acct-42").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn different_plaintexts_give_different_tokens() {
        let cipher = IdCipher::new("test-secret").unwrap();
        let a = cipher.seal("user1:app7:acct-42").unwrap();
        let b = cipher.seal("user1:app7:acct-43").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn tokens_are_url_safe() {
        let cipher = IdCipher::new("test-secret").unwrap();
        let token = cipher.seal("user1:app7:acct-42").unwrap();
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn wrong_secret_cannot_open_the_token() {
        let cipher = IdCipher::new("test-secret").unwrap();
        let other = IdCipher::new("other-secret").unwrap();
        let token = cipher.seal("user1:app7:acct-42").unwrap();
        assert_eq!(other.open(&token), Err(DecodeFailure));
    }

    #[test]
    fn garbage_tokens_fail_opaquely() {
        let cipher = IdCipher::new("test-secret").unwrap();
        assert_eq!(cipher.open("not base64!!"), Err(DecodeFailure));
        assert_eq!(cipher.open(""), Err(DecodeFailure));
        assert_eq!(cipher.open("AAAA"), Err(DecodeFailure));
    }
}
