//! The mapping filter chain.
//!
//! Each stage takes the mapping sequence by value and returns a new,
//! narrowed sequence in the original order; nothing is mutated in place
//! and nothing is written back to the consent store. Stage order is
//! fixed: inactive mappings first, the flag-gated eligibility filters,
//! then duplicate removal last.

use crate::metadata::{MetadataError, MetadataGateway, BNR_PERMISSION_KEY, BNR_REVOKE_PERMISSION};
use dataright_core::context::ValidationContext;
use dataright_core::mapping::{AccountMapping, MappingPermission};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Applies the fixed filter sequence over a consent's mappings.
pub struct MappingFilterChain<'a> {
    gateway: &'a dyn MetadataGateway,
}

impl<'a> MappingFilterChain<'a> {
    /// Chain over the given metadata gateway.
    pub fn new(gateway: &'a dyn MetadataGateway) -> Self {
        Self { gateway }
    }

    /// Run every applicable stage in order.
    ///
    /// Flag-gated stages only run when the context enables them; the
    /// inactive-mapping and duplicate filters always run. A gateway
    /// failure aborts the whole call.
    pub fn apply(
        &self,
        ctx: &ValidationContext,
        mappings: Vec<AccountMapping>,
    ) -> Result<Vec<AccountMapping>, MetadataError> {
        let mut mappings = drop_inactive(mappings);

        if ctx.flags.doms_enabled {
            mappings = self.filter_doms_ineligible(mappings)?;
        }
        if ctx.flags.secondary_user_accounts_enabled {
            mappings = self.filter_secondary_user_ineligible(&ctx.user_id, mappings)?;
        }
        if ctx.flags.legal_entity_block_enabled {
            mappings =
                self.filter_legal_entity_blocked(&ctx.user_id, &ctx.client_id, mappings)?;
        }
        if ctx.flags.bnr_validate_on_retrieval_enabled {
            mappings = self.filter_revoked_bnr_permission(&ctx.user_id, mappings)?;
        }

        Ok(drop_duplicates(mappings))
    }

    /// Drop joint accounts whose co-holder elected no-sharing.
    ///
    /// Accounts without a recorded election stay disclosable.
    pub fn filter_doms_ineligible(
        &self,
        mappings: Vec<AccountMapping>,
    ) -> Result<Vec<AccountMapping>, MetadataError> {
        let mut kept = Vec::with_capacity(mappings.len());
        for mapping in mappings {
            let option = self
                .gateway
                .disclosure_option(&mapping.account_id)
                .map_err(|e| {
                    warn!(account_id = %mapping.account_id, error = %e,
                        "disclosure option lookup failed");
                    e
                })?;
            if option.permits_sharing() {
                kept.push(mapping);
            } else {
                debug!(account_id = %mapping.account_id,
                    "dropped mapping: disclosure option is no-sharing");
            }
        }
        Ok(kept)
    }

    /// Drop secondary-user mappings whose instruction is not active.
    ///
    /// Only mappings consented under the secondary-user role consult the
    /// gateway; every other role passes through untouched.
    pub fn filter_secondary_user_ineligible(
        &self,
        user_id: &str,
        mappings: Vec<AccountMapping>,
    ) -> Result<Vec<AccountMapping>, MetadataError> {
        let mut kept = Vec::with_capacity(mappings.len());
        for mapping in mappings {
            if mapping.permission != MappingPermission::SecondaryUser {
                kept.push(mapping);
                continue;
            }
            let eligible = self
                .gateway
                .is_secondary_user_eligible(&mapping.account_id, user_id)
                .map_err(|e| {
                    warn!(account_id = %mapping.account_id, error = %e,
                        "secondary user eligibility lookup failed");
                    e
                })?;
            if eligible {
                kept.push(mapping);
            } else {
                debug!(account_id = %mapping.account_id,
                    "dropped mapping: secondary user instruction inactive");
            }
        }
        Ok(kept)
    }

    /// Drop mappings whose legal entity is blocked for the account/user pair.
    ///
    /// The lookup needs all three of client, account, and user id; when
    /// any is blank the mapping is left untouched by this stage.
    pub fn filter_legal_entity_blocked(
        &self,
        user_id: &str,
        client_id: &str,
        mappings: Vec<AccountMapping>,
    ) -> Result<Vec<AccountMapping>, MetadataError> {
        let mut kept = Vec::with_capacity(mappings.len());
        for mapping in mappings {
            if client_id.trim().is_empty()
                || user_id.trim().is_empty()
                || mapping.account_id.trim().is_empty()
            {
                kept.push(mapping);
                continue;
            }
            let blocked = self
                .gateway
                .is_legal_entity_blocked(&mapping.account_id, user_id, client_id)
                .map_err(|e| {
                    warn!(account_id = %mapping.account_id, error = %e,
                        "legal entity block lookup failed");
                    e
                })?;
            if blocked {
                debug!(account_id = %mapping.account_id,
                    "dropped mapping: legal entity sharing blocked");
            } else {
                kept.push(mapping);
            }
        }
        Ok(kept)
    }

    /// Drop accounts where the user's nominated-representative
    /// permission was revoked.
    pub fn filter_revoked_bnr_permission(
        &self,
        user_id: &str,
        mappings: Vec<AccountMapping>,
    ) -> Result<Vec<AccountMapping>, MetadataError> {
        let mut kept = Vec::with_capacity(mappings.len());
        for mapping in mappings {
            let permission = self
                .gateway
                .account_metadata_by_key(&mapping.account_id, user_id, BNR_PERMISSION_KEY)
                .map_err(|e| {
                    warn!(account_id = %mapping.account_id, error = %e,
                        "nominated representative permission lookup failed");
                    e
                })?;
            match permission.as_deref() {
                Some(BNR_REVOKE_PERMISSION) => {
                    debug!(account_id = %mapping.account_id,
                        "dropped mapping: nominated representative permission revoked");
                }
                _ => kept.push(mapping),
            }
        }
        Ok(kept)
    }
}

/// Drop mappings whose status is inactive. Always runs first.
pub fn drop_inactive(mappings: Vec<AccountMapping>) -> Vec<AccountMapping> {
    mappings.into_iter().filter(|m| m.is_active()).collect()
}

/// Keep the first occurrence per account id, preserving original order.
/// Always runs last.
pub fn drop_duplicates(mappings: Vec<AccountMapping>) -> Vec<AccountMapping> {
    let mut seen = HashSet::new();
    mappings
        .into_iter()
        .filter(|m| seen.insert(m.account_id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dataright_core::mapping::MappingStatus;

    fn mapping(account_id: &str) -> AccountMapping {
        AccountMapping::new(account_id, "user-1", MappingPermission::Primary)
    }

    #[test]
    fn inactive_mappings_are_dropped() {
        let mappings = vec![
            mapping("a"),
            mapping("b").with_status(MappingStatus::Inactive),
            mapping("c"),
        ];
        let kept = drop_inactive(mappings);
        let ids: Vec<&str> = kept.iter().map(|m| m.account_id.as_str()).collect();
        assert_eq!(ids, ["a", "c"]);
    }

    #[test]
    fn duplicates_keep_first_occurrence_in_order() {
        let mappings = vec![
            mapping("a"),
            mapping("b"),
            mapping("a"),
            mapping("c"),
            mapping("b"),
        ];
        let kept = drop_duplicates(mappings);
        let ids: Vec<&str> = kept.iter().map(|m| m.account_id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn dedup_is_idempotent() {
        let mappings = vec![mapping("a"), mapping("b"), mapping("a")];
        let once = drop_duplicates(mappings);
        let twice = drop_duplicates(once.clone());
        assert_eq!(once, twice);
    }
}
