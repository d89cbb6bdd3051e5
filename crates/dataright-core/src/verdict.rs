//! Validation verdicts produced by the pipeline.
//!
//! A verdict is terminal: once a gate fails, no further stage runs and
//! the failure carries everything the boundary needs to render the
//! structured error body.

use crate::errors::{ApiErrorCode, ErrorResponse};
use crate::mapping::AccountMapping;
use serde::{Deserialize, Serialize};

/// Terminal failure of a gate or filter stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFailure {
    /// Catalogue code selecting urn, title, and HTTP status
    pub code: ApiErrorCode,
    /// Detail text for the error body
    pub detail: String,
    /// Offending account id, when the failure names one.
    ///
    /// Carried in internal form; the boundary must tokenise it before
    /// the error body leaves the process.
    pub account_id: Option<String>,
}

impl ValidationFailure {
    /// Failure with the catalogue's default detail.
    pub fn of(code: ApiErrorCode) -> Self {
        Self {
            code,
            detail: code.default_detail().to_owned(),
            account_id: None,
        }
    }

    /// Failure with an explicit detail.
    pub fn with_detail(code: ApiErrorCode, detail: impl Into<String>) -> Self {
        Self {
            code,
            detail: detail.into(),
            account_id: None,
        }
    }

    /// Attach the account id the failure refers to.
    pub fn for_account(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    /// HTTP status of the failure.
    pub fn http_status(&self) -> u16 {
        self.code.http_status()
    }

    /// Render the fixed outward-facing error body.
    pub fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse::single(self.code, self.detail.clone())
    }
}

/// Outcome of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationVerdict {
    /// Request may proceed; carries the narrowed mapping list
    Pass {
        /// Mappings that survived the filter chain, original order kept
        mappings: Vec<AccountMapping>,
    },
    /// Request must be refused
    Fail(ValidationFailure),
}

impl ValidationVerdict {
    /// Passing verdict over the narrowed mappings.
    pub fn pass(mappings: Vec<AccountMapping>) -> Self {
        Self::Pass { mappings }
    }

    /// Failing verdict.
    pub fn fail(failure: ValidationFailure) -> Self {
        Self::Fail(failure)
    }

    /// Whether the request may proceed.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Pass { .. })
    }

    /// The failure, when the verdict refuses the request.
    pub fn failure(&self) -> Option<&ValidationFailure> {
        match self {
            Self::Pass { .. } => None,
            Self::Fail(failure) => Some(failure),
        }
    }

    /// The narrowed mappings, when the verdict passes.
    pub fn mappings(&self) -> Option<&[AccountMapping]> {
        match self {
            Self::Pass { mappings } => Some(mappings),
            Self::Fail(_) => None,
        }
    }
}
