//! The consent validation pipeline.
//!
//! Fixed stage order, each stage short-circuiting on failure:
//! consent-status gate, expiry gate, the mapping filter chain, account-id
//! validation, then the register-status gate. The pipeline is pure with
//! respect to the consent aggregate it receives; its only side effects
//! are the sequential gateway lookups the filter stages issue.

use crate::filters::MappingFilterChain;
use crate::metadata::{MetadataError, MetadataGateway, RegisterStatus, RegisterStatusGateway};
use dataright_core::context::{HttpMethod, ValidationContext};
use dataright_core::errors::ApiErrorCode;
use dataright_core::mapping::AccountMapping;
use dataright_core::paths::PathTemplate;
use dataright_core::verdict::{ValidationFailure, ValidationVerdict};
use time::OffsetDateTime;
use tracing::{debug, warn};

/// Path parameter naming the account in single-resource templates.
const ACCOUNT_ID_PARAM: &str = "accountId";

/// Fault that escapes the pipeline's public call.
///
/// Everything else is converted locally into a terminal verdict; only a
/// metadata lookup failure surfaces, since no narrower recovery is safe.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConsentError {
    /// A gateway lookup failed; the call must be refused outright
    #[error(transparent)]
    MetadataLookup(#[from] MetadataError),
}

impl ConsentError {
    /// Catalogue code the boundary renders this fault with.
    pub fn api_error_code(&self) -> ApiErrorCode {
        match self {
            Self::MetadataLookup(_) => ApiErrorCode::UnexpectedError,
        }
    }
}

/// Orchestrates the gates and filters for one resource call.
pub struct ConsentValidationPipeline<'a> {
    metadata: &'a dyn MetadataGateway,
    register: &'a dyn RegisterStatusGateway,
}

impl<'a> ConsentValidationPipeline<'a> {
    /// Pipeline over the injected gateways.
    pub fn new(
        metadata: &'a dyn MetadataGateway,
        register: &'a dyn RegisterStatusGateway,
    ) -> Self {
        Self { metadata, register }
    }

    /// Validate the call against the current wall clock.
    pub fn validate(&self, ctx: &ValidationContext) -> Result<ValidationVerdict, ConsentError> {
        self.validate_at(ctx, OffsetDateTime::now_utc())
    }

    /// Validate the call against an explicit `now`.
    ///
    /// The expiry instant itself counts as expired.
    pub fn validate_at(
        &self,
        ctx: &ValidationContext,
        now: OffsetDateTime,
    ) -> Result<ValidationVerdict, ConsentError> {
        if !ctx.consent.is_authorised() {
            debug!(consent_id = %ctx.consent.consent_id, status = ?ctx.consent.status,
                "refused: consent is not authorised");
            return Ok(ValidationVerdict::fail(ValidationFailure::of(
                ApiErrorCode::RevokedConsent,
            )));
        }

        if ctx.consent.receipt.is_expired_at(now) {
            debug!(consent_id = %ctx.consent.consent_id, "refused: consent is expired");
            return Ok(ValidationVerdict::fail(ValidationFailure::of(
                ApiErrorCode::InvalidConsent,
            )));
        }

        let chain = MappingFilterChain::new(self.metadata);
        let mappings = chain
            .apply(ctx, ctx.consent.mappings.clone())
            .map_err(|e| {
                warn!(consent_id = %ctx.consent.consent_id, error = %e,
                    "aborting call: metadata lookup failed");
                e
            })?;

        if let Some(failure) = self.check_path_account_id(ctx, &mappings) {
            return Ok(ValidationVerdict::fail(failure));
        }

        if let Some(failure) = check_body_account_ids(ctx, &mappings) {
            return Ok(ValidationVerdict::fail(failure));
        }

        if ctx.flags.metadata_cache_enabled {
            match self.register.should_disclose(&ctx.client_id)? {
                RegisterStatus::Active => {}
                RegisterStatus::Inactive { detail } => {
                    debug!(client_id = %ctx.client_id,
                        "refused: recipient not active in the register");
                    return Ok(ValidationVerdict::fail(ValidationFailure::with_detail(
                        ApiErrorCode::AdrStatusNotActive,
                        detail,
                    )));
                }
            }
        }

        Ok(ValidationVerdict::pass(mappings))
    }

    /// Path-variant account-id gate.
    ///
    /// Runs only when the validation flag is on, the call is a GET, and
    /// the elected template names an `{accountId}` parameter. The path's
    /// account must appear in the narrowed mapping list.
    fn check_path_account_id(
        &self,
        ctx: &ValidationContext,
        mappings: &[AccountMapping],
    ) -> Option<ValidationFailure> {
        if !ctx.flags.account_id_validation_enabled || ctx.method != HttpMethod::Get {
            return None;
        }
        let template = PathTemplate::parse(&ctx.resource_template);
        if !template
            .param_names()
            .contains(&ACCOUNT_ID_PARAM)
        {
            return None;
        }

        let Some(account_id) = template.extract_param(&ctx.request_path, ACCOUNT_ID_PARAM) else {
            debug!(template = %ctx.resource_template, path = %ctx.request_path,
                "refused: request path does not resolve against the elected template");
            return Some(ValidationFailure::of(ApiErrorCode::InvalidBankingAccountPath));
        };

        if mappings.iter().any(|m| m.account_id == account_id) {
            return None;
        }
        debug!(account_id = %account_id,
            "refused: path account is not in the narrowed mapping list");
        Some(
            ValidationFailure::with_detail(
                ApiErrorCode::InvalidBankingAccountPath,
                format!(
                    "{}: {account_id}",
                    ApiErrorCode::InvalidBankingAccountPath.default_detail()
                ),
            )
            .for_account(account_id),
        )
    }
}

/// Body-variant account-id gate.
///
/// Every account id the POST body lists must appear in the narrowed
/// mapping list; the first offending id is reported.
fn check_body_account_ids(
    ctx: &ValidationContext,
    mappings: &[AccountMapping],
) -> Option<ValidationFailure> {
    if ctx.method != HttpMethod::Post {
        return None;
    }
    let requested = ctx.requested_account_ids.as_deref()?;

    let offending = requested
        .iter()
        .find(|id| !mappings.iter().any(|m| &m.account_id == *id))?;
    debug!(account_id = %offending,
        "refused: requested account is not in the narrowed mapping list");
    Some(
        ValidationFailure::with_detail(
            ApiErrorCode::InvalidBankingAccountBody,
            format!(
                "{}: {offending}",
                ApiErrorCode::InvalidBankingAccountBody.default_detail()
            ),
        )
        .for_account(offending.clone()),
    )
}
