//! Consent aggregate and sharing-agreement receipt.
//!
//! The aggregate is owned by the upstream consent store; the pipeline
//! receives it per call and narrows its mapping list for the duration of
//! that call only. Nothing here writes back to storage.

use crate::errors::CoreError;
use crate::mapping::AccountMapping;
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Lifecycle status of a consent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsentStatus {
    /// Created but not yet authorised by the customer
    Unauthorised,
    /// Authorised and eligible for disclosure
    Authorised,
    /// Withdrawn by the customer or the data holder
    Revoked,
    /// Past its sharing expiry
    Expired,
}

/// Structured sharing-agreement receipt.
///
/// The upstream store persists the receipt as a JSON document; the
/// fields this core consults are the sharing expiry and the granted
/// permission identifiers. An absent expiry means the agreement never
/// expires (once-off consents carry `"0"` upstream).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentReceipt {
    /// Sharing expiry instant; `None` never expires
    #[serde(with = "time::serde::rfc3339::option", default)]
    pub expiration_date_time: Option<OffsetDateTime>,
    /// Granted data-cluster permission identifiers
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl ConsentReceipt {
    /// Receipt with no expiry and no permissions.
    pub fn never_expiring() -> Self {
        Self {
            expiration_date_time: None,
            permissions: Vec::new(),
        }
    }

    /// Receipt expiring at the given instant.
    pub fn expiring_at(expiry: OffsetDateTime) -> Self {
        Self {
            expiration_date_time: Some(expiry),
            permissions: Vec::new(),
        }
    }

    /// Parse the raw receipt payload the consent store persists.
    ///
    /// Expected shape: `{"accountData": {"expirationDateTime": "<rfc3339>",
    /// "permissions": [..]}}` where a blank or `"0"` expiry means the
    /// agreement never expires. A malformed payload is an internal fault,
    /// never a disclosure decision.
    pub fn from_receipt_json(raw: &str) -> Result<Self, CoreError> {
        let value: serde_json::Value = serde_json::from_str(raw)
            .map_err(|e| CoreError::receipt(format!("receipt is not valid JSON: {e}")))?;
        let account_data = value
            .get("accountData")
            .and_then(|v| v.as_object())
            .ok_or_else(|| CoreError::receipt("receipt has no accountData object"))?;

        let expiration_date_time = match account_data
            .get("expirationDateTime")
            .and_then(|v| v.as_str())
        {
            None => None,
            Some(raw_expiry) if raw_expiry.trim().is_empty() || raw_expiry == "0" => None,
            Some(raw_expiry) => Some(
                OffsetDateTime::parse(raw_expiry, &Rfc3339).map_err(|e| {
                    CoreError::receipt(format!("unparseable expirationDateTime: {e}"))
                })?,
            ),
        };

        let permissions = account_data
            .get("permissions")
            .and_then(|v| v.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_owned))
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            expiration_date_time,
            permissions,
        })
    }

    /// Whether the agreement is expired at `now`.
    ///
    /// The expiry instant itself counts as expired.
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        match self.expiration_date_time {
            Some(expiry) => now >= expiry,
            None => false,
        }
    }
}

/// A stored, time-bounded sharing authorisation bound to accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consent {
    /// Upstream consent identifier
    pub consent_id: String,
    /// Lifecycle status
    pub status: ConsentStatus,
    /// Sharing-agreement receipt
    pub receipt: ConsentReceipt,
    /// Ordered account mappings, as persisted upstream
    pub mappings: Vec<AccountMapping>,
}

impl Consent {
    /// Build a consent aggregate.
    pub fn new(
        consent_id: impl Into<String>,
        status: ConsentStatus,
        receipt: ConsentReceipt,
        mappings: Vec<AccountMapping>,
    ) -> Self {
        Self {
            consent_id: consent_id.into(),
            status,
            receipt,
            mappings,
        }
    }

    /// Whether the consent is in the authorised state.
    pub fn is_authorised(&self) -> bool {
        self.status == ConsentStatus::Authorised
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn receipt_parses_expiry_and_permissions() {
        let raw = r#"{"accountData":{"expirationDateTime":"2026-01-01T00:00:00Z",
            "permissions":["bank:accounts.basic:read"]}}"#;
        let receipt = ConsentReceipt::from_receipt_json(raw).unwrap();
        assert_eq!(
            receipt.expiration_date_time,
            Some(datetime!(2026-01-01 00:00:00 UTC))
        );
        assert_eq!(receipt.permissions, vec!["bank:accounts.basic:read"]);
    }

    #[test]
    fn zero_expiry_means_never_expires() {
        let raw = r#"{"accountData":{"expirationDateTime":"0"}}"#;
        let receipt = ConsentReceipt::from_receipt_json(raw).unwrap();
        assert_eq!(receipt.expiration_date_time, None);
        assert!(!receipt.is_expired_at(datetime!(2099-01-01 00:00:00 UTC)));
    }

    #[test]
    fn blank_expiry_means_never_expires() {
        let raw = r#"{"accountData":{"expirationDateTime":""}}"#;
        let receipt = ConsentReceipt::from_receipt_json(raw).unwrap();
        assert_eq!(receipt.expiration_date_time, None);
    }

    #[test]
    fn malformed_receipt_is_an_internal_fault() {
        assert!(ConsentReceipt::from_receipt_json("not json").is_err());
        assert!(ConsentReceipt::from_receipt_json("{}").is_err());
    }

    #[test]
    fn unparseable_expiry_is_an_internal_fault() {
        let raw = r#"{"accountData":{"expirationDateTime":"next tuesday"}}"#;
        assert!(ConsentReceipt::from_receipt_json(raw).is_err());
    }

    #[test]
    fn expiry_instant_counts_as_expired() {
        let expiry = datetime!(2025-06-01 00:00:00 UTC);
        let receipt = ConsentReceipt::expiring_at(expiry);
        assert!(receipt.is_expired_at(expiry));
        assert!(!receipt.is_expired_at(expiry - time::Duration::seconds(1)));
    }
}
