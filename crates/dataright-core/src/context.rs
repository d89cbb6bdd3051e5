//! Per-call validation context.
//!
//! An immutable snapshot of everything the pipeline needs for one
//! request: the consent aggregate, the request shape, the requesting
//! principal and client, and the feature flags sampled from deployment
//! configuration at call time.

use crate::consent::Consent;
use serde::{Deserialize, Serialize};

/// HTTP method of the incoming resource call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    /// Single-resource or collection retrieval
    Get,
    /// Body-driven retrieval (e.g. balances for a list of accounts)
    Post,
}

/// Deployment feature flags sampled per call.
///
/// Defaults are all-off; each flag enables one conditional stage of the
/// pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFlags {
    /// Disclosure Option Management filtering of joint accounts
    pub doms_enabled: bool,
    /// Secondary user account eligibility filtering
    pub secondary_user_accounts_enabled: bool,
    /// Legal-entity sharing-block filtering
    pub legal_entity_block_enabled: bool,
    /// Nominated-representative permission re-check on retrieval
    pub bnr_validate_on_retrieval_enabled: bool,
    /// Register status (ADR / software product) gate
    pub metadata_cache_enabled: bool,
    /// Account id validation against the narrowed mapping list
    pub account_id_validation_enabled: bool,
}

impl FeatureFlags {
    /// Every conditional stage enabled.
    pub fn all_enabled() -> Self {
        Self {
            doms_enabled: true,
            secondary_user_accounts_enabled: true,
            legal_entity_block_enabled: true,
            bnr_validate_on_retrieval_enabled: true,
            metadata_cache_enabled: true,
            account_id_validation_enabled: true,
        }
    }
}

/// Immutable snapshot handed to the pipeline for one call.
#[derive(Debug, Clone)]
pub struct ValidationContext {
    /// Consent aggregate from the upstream store
    pub consent: Consent,
    /// Method of the resource call
    pub method: HttpMethod,
    /// Elected resource template, e.g. `/banking/accounts/{accountId}`
    pub resource_template: String,
    /// Concrete request path with identifiers already unmasked
    pub request_path: String,
    /// Requesting data-recipient client id
    pub client_id: String,
    /// Authenticated user id
    pub user_id: String,
    /// Account ids carried in a POST body, already unmasked
    pub requested_account_ids: Option<Vec<String>>,
    /// Feature flags sampled at call time
    pub flags: FeatureFlags,
}

impl ValidationContext {
    /// Context for a GET resource call.
    pub fn for_get(
        consent: Consent,
        resource_template: impl Into<String>,
        request_path: impl Into<String>,
        client_id: impl Into<String>,
        user_id: impl Into<String>,
        flags: FeatureFlags,
    ) -> Self {
        Self {
            consent,
            method: HttpMethod::Get,
            resource_template: resource_template.into(),
            request_path: request_path.into(),
            client_id: client_id.into(),
            user_id: user_id.into(),
            requested_account_ids: None,
            flags,
        }
    }

    /// Context for a POST resource call carrying a body account-id list.
    pub fn for_post(
        consent: Consent,
        resource_template: impl Into<String>,
        request_path: impl Into<String>,
        client_id: impl Into<String>,
        user_id: impl Into<String>,
        requested_account_ids: Vec<String>,
        flags: FeatureFlags,
    ) -> Self {
        Self {
            consent,
            method: HttpMethod::Post,
            resource_template: resource_template.into(),
            request_path: request_path.into(),
            client_id: client_id.into(),
            user_id: user_id.into(),
            requested_account_ids: Some(requested_account_ids),
            flags,
        }
    }
}
