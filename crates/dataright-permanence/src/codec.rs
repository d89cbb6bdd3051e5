//! Composite identifier codec.
//!
//! The token plaintext is `userId:appId:accountId`, binding every token
//! to the principal and client it was issued for. The codec performs
//! only the cryptographic step; callers must compare the decoded
//! principal against the authenticated one and treat a mismatch as a
//! decode failure (anti-substitution).

use crate::cipher::{DecodeFailure, IdCipher};
use dataright_core::errors::CoreError;

const DELIMITER: char = ':';

/// Decoded token components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdTriple {
    /// Principal the token was issued for
    pub user_id: String,
    /// Client application the token was issued for
    pub app_id: String,
    /// Recovered internal account identifier
    pub account_id: String,
}

impl IdTriple {
    /// Whether the token was issued for the given principal/client pair.
    pub fn matches_principal(&self, user_id: &str, app_id: &str) -> bool {
        self.user_id == user_id && self.app_id == app_id
    }
}

/// Encodes and decodes principal-bound account identifier tokens.
pub struct IdCodec {
    cipher: IdCipher,
}

impl IdCodec {
    /// Codec over the process-wide secret.
    pub fn new(secret: &str) -> Result<Self, CoreError> {
        Ok(Self {
            cipher: IdCipher::new(secret)?,
        })
    }

    /// Tokenise an internal account identifier for a principal/client pair.
    pub fn encode_id(
        &self,
        user_id: &str,
        app_id: &str,
        account_id: &str,
    ) -> Result<String, CoreError> {
        let plaintext = format!("{user_id}{DELIMITER}{app_id}{DELIMITER}{account_id}");
        self.cipher.seal(&plaintext)
    }

    /// Recover the components of a token.
    ///
    /// Requires exactly three non-empty delimiter-separated components;
    /// anything else is the same opaque failure as a cipher error.
    pub fn decode_id(&self, token: &str) -> Result<IdTriple, DecodeFailure> {
        let plaintext = self.cipher.open(token)?;
        let mut parts = plaintext.split(DELIMITER);
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(user_id), Some(app_id), Some(account_id), None)
                if !user_id.is_empty() && !app_id.is_empty() && !account_id.is_empty() =>
            {
                Ok(IdTriple {
                    user_id: user_id.to_owned(),
                    app_id: app_id.to_owned(),
                    account_id: account_id.to_owned(),
                })
            }
            _ => Err(DecodeFailure),
        }
    }
}
