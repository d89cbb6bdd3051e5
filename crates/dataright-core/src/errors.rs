//! Error catalogue and structured error responses.
//!
//! Two layers live here: `CoreError` for faults internal to the core
//! (receipt parsing, crypto, metadata access), and the `ApiErrorCode`
//! catalogue of stable AU CDS error codes that outward-facing failures
//! are rendered with. Every failure that leaves the boundary is a
//! well-formed `ErrorResponse` body, never a raw error message.

use serde::{Deserialize, Serialize};

/// Internal fault raised by the core.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// Sharing-agreement receipt could not be interpreted
    #[error("receipt error: {message}")]
    Receipt {
        /// What failed while reading the receipt
        message: String,
    },

    /// Cryptographic operation failed
    #[error("crypto error: {message}")]
    Crypto {
        /// What failed, without key or token material
        message: String,
    },

    /// Account metadata store could not be reached or answered badly
    #[error("metadata lookup failed: {message}")]
    MetadataLookup {
        /// What failed during the lookup
        message: String,
    },

    /// Any other internal fault
    #[error("internal error: {message}")]
    Internal {
        /// Description of the fault
        message: String,
    },
}

impl CoreError {
    /// Receipt interpretation fault.
    pub fn receipt(message: impl Into<String>) -> Self {
        Self::Receipt {
            message: message.into(),
        }
    }

    /// Cryptographic fault.
    pub fn crypto(message: impl Into<String>) -> Self {
        Self::Crypto {
            message: message.into(),
        }
    }

    /// Metadata-access fault.
    pub fn metadata_lookup(message: impl Into<String>) -> Self {
        Self::MetadataLookup {
            message: message.into(),
        }
    }

    /// Internal fault.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// Stable machine-readable error codes from the AU CDS catalogue.
///
/// Each entry fixes the urn code, title, default detail, and HTTP status
/// the boundary must use when rendering the failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApiErrorCode {
    /// Consent is in the revoked state
    RevokedConsent,
    /// Consent status or expiry does not allow the resource call
    InvalidConsent,
    /// Account id in the request path not found or not disclosable
    InvalidBankingAccountPath,
    /// Account id in the request body not found or not disclosable
    InvalidBankingAccountBody,
    /// ADR or its software product is not active in the register
    AdrStatusNotActive,
    /// A non-account path parameter failed to resolve
    InvalidResourcePath,
    /// A request field is present but invalid
    InvalidField,
    /// A required request field is missing
    MissingField,
    /// Unexpected internal failure
    UnexpectedError,
}

impl ApiErrorCode {
    /// Stable urn-form error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::RevokedConsent => "urn:au-cds:error:cds-all:Authorisation/RevokedConsent",
            Self::InvalidConsent => "urn:au-cds:error:cds-all:Authorisation/InvalidConsent",
            Self::InvalidBankingAccountPath | Self::InvalidBankingAccountBody => {
                "urn:au-cds:error:cds-banking:Authorisation/InvalidBankingAccount"
            }
            Self::AdrStatusNotActive => {
                "urn:au-cds:error:cds-banking:Authorisation/AdrStatusNotActive"
            }
            Self::InvalidResourcePath => "urn:au-cds:error:cds-all:Resource/Invalid",
            Self::InvalidField => "urn:au-cds:error:cds-all:Field/Invalid",
            Self::MissingField => "urn:au-cds:error:cds-all:Field/Missing",
            Self::UnexpectedError => "urn:au-cds:error:cds-all:GeneralError/Unexpected",
        }
    }

    /// Human-readable title.
    pub fn title(&self) -> &'static str {
        match self {
            Self::RevokedConsent => "Consent Is Revoked",
            Self::InvalidConsent => "Consent Is Invalid",
            Self::InvalidBankingAccountPath | Self::InvalidBankingAccountBody => {
                "Invalid Banking Account"
            }
            Self::AdrStatusNotActive => "ADR Status Is Not Active",
            Self::InvalidResourcePath => "Invalid Resource",
            Self::InvalidField => "Invalid Field",
            Self::MissingField => "Missing Required Field",
            Self::UnexpectedError => "Unexpected Error",
        }
    }

    /// Default detail text when the caller supplies nothing richer.
    pub fn default_detail(&self) -> &'static str {
        match self {
            Self::RevokedConsent => "The consumer's consent is revoked",
            Self::InvalidConsent => {
                "The associated consent for resource is not in a status \
                 that would allow the resource to be executed"
            }
            Self::InvalidBankingAccountPath | Self::InvalidBankingAccountBody => {
                "ID of the account not found or invalid"
            }
            Self::AdrStatusNotActive => "The ADR is not in an active state in the CDR Register",
            Self::InvalidResourcePath => {
                "Resource requested is invalid, does not exist or will not \
                 be disclosed at the moment"
            }
            Self::InvalidField => "Invalid Field found in the request",
            Self::MissingField => "accountIds field is missing in the request",
            Self::UnexpectedError => "Unexpected Error",
        }
    }

    /// HTTP status the boundary must answer with.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::RevokedConsent
            | Self::InvalidConsent
            | Self::AdrStatusNotActive => 403,
            Self::InvalidBankingAccountPath | Self::InvalidResourcePath => 404,
            Self::InvalidBankingAccountBody => 422,
            Self::InvalidField | Self::MissingField => 400,
            Self::UnexpectedError => 500,
        }
    }
}

/// One entry of the fixed JSON error schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Stable machine-readable code
    pub code: String,
    /// Human-readable title
    pub title: String,
    /// Human-readable detail
    pub detail: String,
    /// Error metadata
    pub meta: ApiErrorMeta,
}

/// Metadata attached to every error entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorMeta {
    /// The urn-form error code, repeated for clients that key on meta
    pub urn: String,
}

/// The fixed outward-facing error body: `{"errors":[...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error entries, usually exactly one
    pub errors: Vec<ApiError>,
}

impl ErrorResponse {
    /// Single-entry response from a catalogue code and detail.
    pub fn single(code: ApiErrorCode, detail: impl Into<String>) -> Self {
        Self {
            errors: vec![ApiError {
                code: code.code().to_owned(),
                title: code.title().to_owned(),
                detail: detail.into(),
                meta: ApiErrorMeta {
                    urn: code.code().to_owned(),
                },
            }],
        }
    }
}
