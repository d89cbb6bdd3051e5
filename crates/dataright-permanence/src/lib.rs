#![forbid(unsafe_code)]
//! # Dataright Permanence - Account Identifier Codec
//!
//! Reversibly masks internal account identifiers behind opaque,
//! principal-bound tokens at the API boundary. Tokens are deterministic
//! under an unchanged process-wide secret, so the same account always
//! presents the same token to the same recipient, while a different
//! principal can never replay it.
//!
//! The structural layer walks only the identifier-field locations the
//! documented resource shapes declare; nothing is ever deep-walked.

/// Keyed deterministic cipher over identifier plaintext
pub mod cipher;

/// Composite `user:app:account` token codec
pub mod codec;

/// Static table of identifier locations per resource template
pub mod locations;

/// Structure-aware masking and unmasking of documents
pub mod mask;

pub use cipher::{DecodeFailure, IdCipher};
pub use codec::{IdCodec, IdTriple};
pub use locations::{resource_shape, ResourceShape};
pub use mask::{DocumentMasker, UnmaskError};
