//! External metadata and register-status gateways.
//!
//! The account-metadata store and the register status cache are external
//! collaborators. Both are injected into the pipeline as trait objects
//! so the chain is testable without a shared service instance. Calls
//! are blocking and issued sequentially; no stage retries.

use dataright_core::errors::CoreError;

/// Metadata key holding a user's nominated-representative permission.
pub const BNR_PERMISSION_KEY: &str = "BNR_PERMISSION";

/// Sentinel value marking a revoked nominated-representative permission.
pub const BNR_REVOKE_PERMISSION: &str = "REVOKE";

/// Data-access failure from a gateway.
///
/// Every occurrence aborts the current call; the pipeline never
/// substitutes a default answer for a failed lookup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("account metadata access failed: {message}")]
pub struct MetadataError {
    /// What failed during the lookup
    pub message: String,
}

impl MetadataError {
    /// Build a lookup failure.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<MetadataError> for CoreError {
    fn from(err: MetadataError) -> Self {
        CoreError::metadata_lookup(err.message)
    }
}

/// A joint-account co-holder's disclosure option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisclosureOption {
    /// Co-holder elected not to share; the account must be withheld
    NoSharing,
    /// Co-holder pre-approved disclosure
    PreApproval,
    /// No election recorded for the account
    NotFound,
}

impl DisclosureOption {
    /// Whether the election permits disclosure.
    ///
    /// Accounts with no recorded election remain disclosable.
    pub fn permits_sharing(&self) -> bool {
        !matches!(self, Self::NoSharing)
    }
}

/// Account-metadata lookups consumed by the filter chain.
pub trait MetadataGateway {
    /// Disclosure option elected for a joint account.
    fn disclosure_option(&self, account_id: &str) -> Result<DisclosureOption, MetadataError>;

    /// Raw metadata value stored under `key` for an account/user pair.
    fn account_metadata_by_key(
        &self,
        account_id: &str,
        user_id: &str,
        key: &str,
    ) -> Result<Option<String>, MetadataError>;

    /// Whether the client's legal entity is blocked for the account/user pair.
    fn is_legal_entity_blocked(
        &self,
        account_id: &str,
        user_id: &str,
        client_id: &str,
    ) -> Result<bool, MetadataError>;

    /// Whether the user's secondary-account instruction is active.
    fn is_secondary_user_eligible(
        &self,
        account_id: &str,
        user_id: &str,
    ) -> Result<bool, MetadataError>;
}

/// ADR / software-product status in the register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterStatus {
    /// Recipient and product are active; disclosure may proceed
    Active,
    /// Recipient or product is not active
    Inactive {
        /// Detail text for the refusal
        detail: String,
    },
}

impl RegisterStatus {
    /// Whether disclosure may proceed.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

/// Register status lookups consumed by the metadata-status gate.
pub trait RegisterStatusGateway {
    /// Whether CDR data should be disclosed to the client right now.
    fn should_disclose(&self, client_id: &str) -> Result<RegisterStatus, MetadataError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_election_permits_sharing() {
        assert!(DisclosureOption::NotFound.permits_sharing());
        assert!(DisclosureOption::PreApproval.permits_sharing());
        assert!(!DisclosureOption::NoSharing.permits_sharing());
    }

    #[test]
    fn metadata_error_converts_to_core_error() {
        let err: CoreError = MetadataError::new("store down").into();
        assert_eq!(err, CoreError::metadata_lookup("store down"));
    }
}
