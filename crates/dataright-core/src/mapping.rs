//! Account mappings bound to a consent.
//!
//! A mapping associates one account with an authorised consent, carrying
//! the permission role it was granted under and its lifecycle status.
//! Mappings are created by the upstream consent store; this core only
//! reads and narrows them.

use serde::{Deserialize, Serialize};

/// Lifecycle status of an account mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MappingStatus {
    /// Mapping participates in disclosure decisions
    Active,
    /// Mapping is retained for audit but never disclosed
    Inactive,
}

/// Permission role an account was consented under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MappingPermission {
    /// Account holder's own account
    Primary,
    /// Secondary user instruction on another holder's account
    SecondaryUser,
    /// Business nominated representative acting for a legal entity
    NominatedRepresentative,
    /// Any other role the upstream store records
    Other,
}

/// One account bound to a consent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountMapping {
    /// Internal account identifier (never leaves the boundary unmasked)
    pub account_id: String,
    /// Owning user of the mapping
    pub user_id: String,
    /// Role the account was consented under
    pub permission: MappingPermission,
    /// Lifecycle status
    pub status: MappingStatus,
}

impl AccountMapping {
    /// Create an active mapping.
    pub fn new(
        account_id: impl Into<String>,
        user_id: impl Into<String>,
        permission: MappingPermission,
    ) -> Self {
        Self {
            account_id: account_id.into(),
            user_id: user_id.into(),
            permission,
            status: MappingStatus::Active,
        }
    }

    /// Same mapping with the given status.
    pub fn with_status(mut self, status: MappingStatus) -> Self {
        self.status = status;
        self
    }

    /// Whether the mapping is active.
    pub fn is_active(&self) -> bool {
        self.status == MappingStatus::Active
    }
}
