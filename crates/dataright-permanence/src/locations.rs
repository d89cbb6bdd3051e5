//! Static table of identifier locations per resource template.
//!
//! The documented response shape of every masked endpoint falls into one
//! of three families; the family decides which declared locations the
//! masker walks. The table is part of the published API contract and is
//! consulted verbatim, never inferred from the payload.

/// Identifier field names subject to permanence, wherever they appear
/// at a declared location.
pub const RESOURCE_ID_KEYS: [&str; 4] = [
    "accountId",
    "transactionId",
    "scheduledPaymentId",
    "payeeId",
];

/// Key of the resource array in a scheduled-payment list response.
pub const SCHEDULED_PAYMENTS_KEY: &str = "scheduledPayments";

/// Nested loan object key in a single-account response.
pub const LOAN_KEY: &str = "loan";

/// Offset account array inside the loan object.
pub const OFFSET_ACCOUNT_IDS_KEY: &str = "offsetAccountIds";

/// Templates whose `data` carries a resource array with per-object ids.
pub const RESOURCE_LIST_TEMPLATES: [&str; 6] = [
    "/banking/accounts",
    "/banking/accounts/balances",
    "/banking/accounts/{accountId}/transactions",
    "/banking/accounts/{accountId}/direct-debits",
    "/banking/accounts/direct-debits",
    "/banking/payees",
];

/// Templates whose `data` is a single resource with top-level ids
/// (plus the nested `loan.offsetAccountIds` list for accounts).
pub const SINGLE_RESOURCE_TEMPLATES: [&str; 4] = [
    "/banking/accounts/{accountId}/balance",
    "/banking/accounts/{accountId}",
    "/banking/accounts/{accountId}/transactions/{transactionId}",
    "/banking/payees/{payeeId}",
];

/// Templates whose `data` carries the scheduled-payment list shape.
pub const SCHEDULED_PAYMENT_LIST_TEMPLATES: [&str; 2] = [
    "/banking/accounts/{accountId}/payments/scheduled",
    "/banking/payments/scheduled",
];

/// Templates carrying path parameters subject to permanence; these also
/// drive `links` URL rewriting in responses.
pub const TEMPLATES_WITH_PATH_PARAMS: [&str; 7] = [
    "/banking/accounts/{accountId}/balance",
    "/banking/accounts/{accountId}",
    "/banking/accounts/{accountId}/transactions",
    "/banking/accounts/{accountId}/transactions/{transactionId}",
    "/banking/accounts/{accountId}/direct-debits",
    "/banking/accounts/{accountId}/payments/scheduled",
    "/banking/payees/{payeeId}",
];

/// Response shape family of a masked endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceShape {
    /// Array of resources under `data`, ids per object
    ResourceList,
    /// Single resource under `data`, ids at the top level
    SingleResource,
    /// Scheduled-payment list with nested `from`/`paymentSet` ids
    ScheduledPaymentList,
}

/// Shape family for an elected resource template, or `None` when the
/// endpoint declares no masked response locations.
pub fn resource_shape(template: &str) -> Option<ResourceShape> {
    if RESOURCE_LIST_TEMPLATES.contains(&template) {
        Some(ResourceShape::ResourceList)
    } else if SINGLE_RESOURCE_TEMPLATES.contains(&template) {
        Some(ResourceShape::SingleResource)
    } else if SCHEDULED_PAYMENT_LIST_TEMPLATES.contains(&template) {
        Some(ResourceShape::ScheduledPaymentList)
    } else {
        None
    }
}

/// Whether the template's path parameters are subject to permanence.
pub fn has_masked_path_params(template: &str) -> bool {
    TEMPLATES_WITH_PATH_PARAMS.contains(&template)
}
