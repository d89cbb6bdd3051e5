//! End-to-end masking and unmasking scenarios over realistic response
//! and request documents.

use dataright_core::errors::ApiErrorCode;
use dataright_core::verdict::ValidationFailure;
use dataright_permanence::mask::{DocumentMasker, UnmaskError};
use dataright_permanence::IdCodec;
use serde_json::{json, Value};

const USER: &str = "user-1";
const APP: &str = "app-7";

fn codec() -> IdCodec {
    IdCodec::new("integration-secret").expect("codec construction")
}

fn token(codec: &IdCodec, account_id: &str) -> String {
    codec.encode_id(USER, APP, account_id).expect("encode")
}

#[test]
fn account_list_masks_every_account_id() {
    let codec = codec();
    let masker = DocumentMasker::new(&codec);
    let doc = json!({
        "data": {"accounts": [
            {"accountId": "acc-1", "displayName": "Everyday"},
            {"accountId": "acc-2", "displayName": "Savings"}
        ]},
        "links": {"self": "https://bank.example/cds-au/v1/banking/accounts"},
        "meta": {"totalRecords": 2}
    });

    let masked = masker
        .mask_response(&doc, "/banking/accounts", USER, APP)
        .unwrap();

    assert_eq!(masked["data"]["accounts"][0]["accountId"], token(&codec, "acc-1"));
    assert_eq!(masked["data"]["accounts"][1]["accountId"], token(&codec, "acc-2"));
    assert_eq!(masked["data"]["accounts"][0]["displayName"], "Everyday");
    assert_eq!(masked["meta"], doc["meta"]);
    // Template with no path params leaves links alone.
    assert_eq!(masked["links"], doc["links"]);
}

#[test]
fn transaction_list_masks_ids_and_rewrites_links() {
    let codec = codec();
    let masker = DocumentMasker::new(&codec);
    let doc = json!({
        "data": {"transactions": [
            {"accountId": "acc-1", "transactionId": "txn-9", "amount": "-12.50"}
        ]},
        "links": {
            "self": "https://bank.example/cds-au/v1/banking/accounts/acc-1/transactions?page=1",
            "next": "https://bank.example/cds-au/v1/banking/accounts/acc-1/transactions?page=2"
        }
    });

    let masked = masker
        .mask_response(
            &doc,
            "/banking/accounts/{accountId}/transactions",
            USER,
            APP,
        )
        .unwrap();

    let acc_token = token(&codec, "acc-1");
    assert_eq!(masked["data"]["transactions"][0]["accountId"], acc_token);
    assert_eq!(
        masked["data"]["transactions"][0]["transactionId"],
        token(&codec, "txn-9")
    );
    assert_eq!(
        masked["links"]["self"],
        format!("https://bank.example/cds-au/v1/banking/accounts/{acc_token}/transactions?page=1")
    );
    assert_eq!(
        masked["links"]["next"],
        format!("https://bank.example/cds-au/v1/banking/accounts/{acc_token}/transactions?page=2")
    );
}

#[test]
fn malformed_link_is_replaced_with_a_marker() {
    let codec = codec();
    let masker = DocumentMasker::new(&codec);
    let doc = json!({
        "data": {},
        "links": {"self": "https://bank.example/banking/payees"}
    });

    let masked = masker
        .mask_response(&doc, "/banking/accounts/{accountId}", USER, APP)
        .unwrap();

    assert_eq!(masked["links"]["self"], "incorrect link format");
}

#[test]
fn single_account_masks_loan_offset_accounts() {
    let codec = codec();
    let masker = DocumentMasker::new(&codec);
    let doc = json!({
        "data": {
            "accountId": "acc-1",
            "displayName": "Mortgage",
            "loan": {
                "loanEndDate": "2040-01-01",
                "offsetAccountIds": ["acc-2", "acc-3"]
            }
        },
        "links": {"self": "https://bank.example/cds-au/v1/banking/accounts/acc-1"}
    });

    let masked = masker
        .mask_response(&doc, "/banking/accounts/{accountId}", USER, APP)
        .unwrap();

    assert_eq!(masked["data"]["accountId"], token(&codec, "acc-1"));
    assert_eq!(
        masked["data"]["loan"]["offsetAccountIds"],
        json!([token(&codec, "acc-2"), token(&codec, "acc-3")])
    );
    assert_eq!(masked["data"]["loan"]["loanEndDate"], "2040-01-01");
    assert_eq!(
        masked["links"]["self"],
        format!(
            "https://bank.example/cds-au/v1/banking/accounts/{}",
            token(&codec, "acc-1")
        )
    );
}

#[test]
fn scheduled_payment_list_masks_nested_locations() {
    let codec = codec();
    let masker = DocumentMasker::new(&codec);
    let doc = json!({
        "data": {"scheduledPayments": [{
            "scheduledPaymentId": "sp-1",
            "from": {"accountId": "acc-1"},
            "paymentSet": [
                {"to": {"accountId": "acc-2"}, "amount": "100.00"},
                {"to": {"payeeId": "payee-5"}, "amount": "40.00"}
            ]
        }]}
    });

    let masked = masker
        .mask_response(&doc, "/banking/payments/scheduled", USER, APP)
        .unwrap();

    let payment = &masked["data"]["scheduledPayments"][0];
    assert_eq!(payment["scheduledPaymentId"], token(&codec, "sp-1"));
    assert_eq!(payment["from"]["accountId"], token(&codec, "acc-1"));
    assert_eq!(payment["paymentSet"][0]["to"]["accountId"], token(&codec, "acc-2"));
    assert_eq!(payment["paymentSet"][1]["to"]["payeeId"], token(&codec, "payee-5"));
    assert_eq!(payment["paymentSet"][0]["amount"], "100.00");
}

#[test]
fn path_params_unmask_back_to_internal_ids() {
    let codec = codec();
    let masker = DocumentMasker::new(&codec);
    let acc_token = token(&codec, "acc-1");
    let txn_token = token(&codec, "txn-9");

    let unmasked = masker
        .unmask_path_params(
            "/banking/accounts/{accountId}/transactions/{transactionId}",
            &format!("/banking/accounts/{acc_token}/transactions/{txn_token}"),
        )
        .unwrap();

    assert_eq!(
        unmasked.path,
        "/banking/accounts/acc-1/transactions/txn-9"
    );
    assert_eq!(unmasked.params.len(), 2);
    assert!(unmasked.params[0].triple.matches_principal(USER, APP));
    assert_eq!(unmasked.params[0].triple.account_id, "acc-1");
    assert_eq!(unmasked.params[1].triple.account_id, "txn-9");
}

#[test]
fn garbage_account_token_in_path_reports_invalid_account() {
    let codec = codec();
    let masker = DocumentMasker::new(&codec);

    let err = masker
        .unmask_path_params(
            "/banking/accounts/{accountId}",
            "/banking/accounts/not-a-token",
        )
        .unwrap_err();

    assert_eq!(err, UnmaskError::InvalidAccountPath);
    assert_eq!(err.api_error_code(), ApiErrorCode::InvalidBankingAccountPath);
    assert_eq!(err.api_error_code().http_status(), 404);
}

#[test]
fn garbage_transaction_token_reports_invalid_resource() {
    let codec = codec();
    let masker = DocumentMasker::new(&codec);
    let acc_token = token(&codec, "acc-1");

    let err = masker
        .unmask_path_params(
            "/banking/accounts/{accountId}/transactions/{transactionId}",
            &format!("/banking/accounts/{acc_token}/transactions/bad"),
        )
        .unwrap_err();

    assert_eq!(err, UnmaskError::InvalidResourcePath);
    assert_eq!(err.api_error_code().http_status(), 404);
}

#[test]
fn request_body_unmasks_all_account_ids() {
    let codec = codec();
    let masker = DocumentMasker::new(&codec);
    let doc = json!({"data": {"accountIds": [
        token(&codec, "acc-1"),
        token(&codec, "acc-2")
    ]}});

    let unmasked = masker.unmask_request_body(&doc).unwrap();

    assert_eq!(unmasked.account_ids, vec!["acc-1", "acc-2"]);
    assert!(unmasked.triples.iter().all(|t| t.matches_principal(USER, APP)));
    assert_eq!(
        unmasked.document["data"]["accountIds"],
        json!(["acc-1", "acc-2"])
    );
}

#[test]
fn one_bad_token_fails_the_whole_body() {
    let codec = codec();
    let masker = DocumentMasker::new(&codec);
    let doc = json!({"data": {"accountIds": [
        token(&codec, "acc-1"),
        "forged-token"
    ]}});

    let err = masker.unmask_request_body(&doc).unwrap_err();

    assert_eq!(err, UnmaskError::InvalidAccountBody);
    assert_eq!(err.api_error_code(), ApiErrorCode::InvalidBankingAccountBody);
    assert_eq!(err.api_error_code().http_status(), 422);
}

#[test]
fn token_minted_for_another_principal_is_detectable() {
    let codec = codec();
    let masker = DocumentMasker::new(&codec);
    let foreign = codec.encode_id("user-2", APP, "acc-1").unwrap();
    let doc = json!({"data": {"accountIds": [foreign]}});

    let unmasked = masker.unmask_request_body(&doc).unwrap();

    // Decoding succeeds; the principal check is the caller's gate.
    assert!(!unmasked.triples[0].matches_principal(USER, APP));
}

#[test]
fn failure_details_are_tokenised_before_leaving() {
    let codec = codec();
    let masker = DocumentMasker::new(&codec);
    let failure = ValidationFailure::with_detail(
        ApiErrorCode::InvalidBankingAccountBody,
        "ID of the account not found or invalid: acc-9",
    )
    .for_account("acc-9");

    let masked = masker.mask_failure(&failure, USER, APP).unwrap();

    let acc_token = token(&codec, "acc-9");
    assert_eq!(
        masked.detail,
        format!("ID of the account not found or invalid: {acc_token}")
    );
    assert_eq!(masked.account_id.as_deref(), Some(acc_token.as_str()));
    assert!(!masked.detail.contains("acc-9"));

    let body: Value = serde_json::to_value(masked.to_error_response()).unwrap();
    assert_eq!(
        body["errors"][0]["code"],
        "urn:au-cds:error:cds-banking:Authorisation/InvalidBankingAccount"
    );
}

#[test]
fn failures_without_account_ids_pass_through() {
    let codec = codec();
    let masker = DocumentMasker::new(&codec);
    let failure = ValidationFailure::of(ApiErrorCode::RevokedConsent);

    let masked = masker.mask_failure(&failure, USER, APP).unwrap();

    assert_eq!(masked, failure);
}
