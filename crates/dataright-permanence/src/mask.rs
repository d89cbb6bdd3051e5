//! Structure-aware masking and unmasking of documents.
//!
//! Walks only the identifier locations the static table declares for the
//! elected resource template; undeclared locations are never touched and
//! no generic deep-walk exists. Unmasking is all-or-nothing: a decode
//! failure at any declared location reports invalid and no partial
//! substitution is applied.

use crate::codec::{IdCodec, IdTriple};
use crate::locations::{
    has_masked_path_params, resource_shape, ResourceShape, LOAN_KEY, OFFSET_ACCOUNT_IDS_KEY,
    RESOURCE_ID_KEYS, SCHEDULED_PAYMENTS_KEY,
};
use dataright_core::errors::{ApiErrorCode, CoreError};
use dataright_core::paths::{PathParam, PathTemplate};
use dataright_core::verdict::ValidationFailure;
use serde_json::{Map, Value};
use tracing::{debug, warn};

const ACCOUNT_ID_PARAM: &str = "accountId";
const DATA_KEY: &str = "data";
const LINKS_KEY: &str = "links";
const ACCOUNT_IDS_KEY: &str = "accountIds";
const FROM_KEY: &str = "from";
const TO_KEY: &str = "to";
const PAYMENT_SET_KEY: &str = "paymentSet";

/// Failure while unmasking an inbound request.
///
/// Each variant maps onto one catalogue entry; none of them carries the
/// offending token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnmaskError {
    /// The account id in the request path did not decode
    #[error("account id in the request path is invalid")]
    InvalidAccountPath,
    /// A non-account path parameter did not decode
    #[error("a resource id in the request path is invalid")]
    InvalidResourcePath,
    /// The request body has no accountIds field
    #[error("accountIds field is missing in the request")]
    MissingAccountIds,
    /// A request field is present but has the wrong shape
    #[error("invalid field in the request: {field}")]
    InvalidField {
        /// Name of the malformed field
        field: String,
    },
    /// An account id in the request body did not decode
    #[error("an account id in the request body is invalid")]
    InvalidAccountBody,
}

impl UnmaskError {
    /// Catalogue entry the boundary renders this failure with.
    pub fn api_error_code(&self) -> ApiErrorCode {
        match self {
            Self::InvalidAccountPath => ApiErrorCode::InvalidBankingAccountPath,
            Self::InvalidResourcePath => ApiErrorCode::InvalidResourcePath,
            Self::MissingAccountIds => ApiErrorCode::MissingField,
            Self::InvalidField { .. } => ApiErrorCode::InvalidField,
            Self::InvalidAccountBody => ApiErrorCode::InvalidBankingAccountBody,
        }
    }

    /// Terminal failure for the boundary's error body.
    pub fn to_failure(&self) -> ValidationFailure {
        match self {
            Self::InvalidField { field } => ValidationFailure::with_detail(
                ApiErrorCode::InvalidField,
                format!("Invalid Field {field} found in the request"),
            ),
            _ => ValidationFailure::of(self.api_error_code()),
        }
    }
}

/// One decoded path parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedParam {
    /// Template parameter name
    pub name: String,
    /// Decoded token components, for the caller's principal check
    pub triple: IdTriple,
}

/// Result of unmasking a request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmaskedPath {
    /// Path with every templated parameter replaced by its internal id
    pub path: String,
    /// Decoded parameters in template order
    pub params: Vec<DecodedParam>,
}

/// Result of unmasking a request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmaskedBody {
    /// Body with `data.accountIds` replaced by internal ids
    pub document: Value,
    /// Internal account ids in request order
    pub account_ids: Vec<String>,
    /// Decoded token components, for the caller's principal check
    pub triples: Vec<IdTriple>,
}

/// Applies the declared-location transforms for one resource call.
pub struct DocumentMasker<'a> {
    codec: &'a IdCodec,
}

impl<'a> DocumentMasker<'a> {
    /// Masker over the given codec.
    pub fn new(codec: &'a IdCodec) -> Self {
        Self { codec }
    }

    /// Tokenise every declared identifier location in a response body.
    ///
    /// Returns a new document; the input is never modified. Endpoints
    /// with no declared locations pass through unchanged.
    pub fn mask_response(
        &self,
        document: &Value,
        template: &str,
        user_id: &str,
        app_id: &str,
    ) -> Result<Value, CoreError> {
        let mut masked = document.clone();

        if let Some(shape) = resource_shape(template) {
            if let Some(data) = masked.get_mut(DATA_KEY) {
                self.mask_data(data, shape, user_id, app_id)?;
            }
        }

        if has_masked_path_params(template) {
            if let Some(links) = masked.get_mut(LINKS_KEY) {
                self.mask_links(links, template, user_id, app_id)?;
            }
        }

        Ok(masked)
    }

    fn mask_data(
        &self,
        data: &mut Value,
        shape: ResourceShape,
        user_id: &str,
        app_id: &str,
    ) -> Result<(), CoreError> {
        match shape {
            ResourceShape::ResourceList => {
                // The declared location is the single resource array the
                // data object carries.
                let Some(data) = data.as_object_mut() else {
                    return Ok(());
                };
                let Some(resources) = data.values_mut().find_map(Value::as_array_mut) else {
                    return Ok(());
                };
                for resource in resources {
                    if let Some(obj) = resource.as_object_mut() {
                        self.mask_id_keys(obj, user_id, app_id)?;
                    }
                }
            }
            ResourceShape::SingleResource => {
                let Some(obj) = data.as_object_mut() else {
                    return Ok(());
                };
                self.mask_id_keys(obj, user_id, app_id)?;

                // Offset accounts nested in the loan object.
                if let Some(offsets) = obj
                    .get_mut(LOAN_KEY)
                    .and_then(Value::as_object_mut)
                    .and_then(|loan| loan.get_mut(OFFSET_ACCOUNT_IDS_KEY))
                    .and_then(Value::as_array_mut)
                {
                    for entry in offsets {
                        if let Some(id) = entry.as_str() {
                            *entry = Value::String(self.codec.encode_id(user_id, app_id, id)?);
                        }
                    }
                }
            }
            ResourceShape::ScheduledPaymentList => {
                let Some(payments) = data
                    .as_object_mut()
                    .and_then(|d| d.get_mut(SCHEDULED_PAYMENTS_KEY))
                    .and_then(Value::as_array_mut)
                else {
                    return Ok(());
                };
                for payment in payments {
                    let Some(payment) = payment.as_object_mut() else {
                        continue;
                    };
                    self.mask_id_keys(payment, user_id, app_id)?;

                    if let Some(from) = payment.get_mut(FROM_KEY).and_then(Value::as_object_mut) {
                        self.mask_id_keys(from, user_id, app_id)?;
                    }

                    if let Some(payment_set) =
                        payment.get_mut(PAYMENT_SET_KEY).and_then(Value::as_array_mut)
                    {
                        for entry in payment_set {
                            if let Some(to) =
                                entry.get_mut(TO_KEY).and_then(Value::as_object_mut)
                            {
                                self.mask_id_keys(to, user_id, app_id)?;
                            }
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Tokenise every declared id key present in the object.
    fn mask_id_keys(
        &self,
        obj: &mut Map<String, Value>,
        user_id: &str,
        app_id: &str,
    ) -> Result<(), CoreError> {
        for key in RESOURCE_ID_KEYS {
            if let Some(Value::String(id)) = obj.get(key) {
                let token = self.codec.encode_id(user_id, app_id, id)?;
                obj.insert(key.to_owned(), Value::String(token));
            }
        }
        Ok(())
    }

    /// Rewrite the path parameters inside every link URL.
    fn mask_links(
        &self,
        links: &mut Value,
        template: &str,
        user_id: &str,
        app_id: &str,
    ) -> Result<(), CoreError> {
        let template = PathTemplate::parse(template);
        let Some(links) = links.as_object_mut() else {
            return Ok(());
        };
        for (name, value) in links.iter_mut() {
            let Some(url) = value.as_str() else {
                continue;
            };
            let Some(params) = template.extract_params(url) else {
                warn!(link = %name, "link is not in the elected resource's url format");
                *value = Value::String("incorrect link format".to_owned());
                continue;
            };
            let mut tokenised = Vec::with_capacity(params.len());
            for param in params {
                tokenised.push(PathParam {
                    name: param.name,
                    value: self.codec.encode_id(user_id, app_id, &param.value)?,
                });
            }
            if let Some(rewritten) = template.substitute(url, &tokenised) {
                *value = Value::String(rewritten);
            }
        }
        Ok(())
    }

    /// Decode every templated parameter of an inbound request path.
    ///
    /// Failure at the `accountId` parameter reports the banking-account
    /// catalogue entry; any other parameter reports the generic invalid
    /// resource. No partial substitution is applied on failure.
    pub fn unmask_path_params(
        &self,
        template: &str,
        path: &str,
    ) -> Result<UnmaskedPath, UnmaskError> {
        let template = PathTemplate::parse(template);
        if !template.has_params() {
            return Ok(UnmaskedPath {
                path: path.to_owned(),
                params: Vec::new(),
            });
        }

        let params = template
            .extract_params(path)
            .ok_or(UnmaskError::InvalidResourcePath)?;

        let mut decoded = Vec::with_capacity(params.len());
        let mut internal = Vec::with_capacity(params.len());
        for param in params {
            let triple = self.codec.decode_id(&param.value).map_err(|_| {
                debug!(param = %param.name, "path parameter failed to decode");
                if param.name == ACCOUNT_ID_PARAM {
                    UnmaskError::InvalidAccountPath
                } else {
                    UnmaskError::InvalidResourcePath
                }
            })?;
            internal.push(PathParam {
                name: param.name.clone(),
                value: triple.account_id.clone(),
            });
            decoded.push(DecodedParam {
                name: param.name,
                triple,
            });
        }

        let path = template
            .substitute(path, &internal)
            .ok_or(UnmaskError::InvalidResourcePath)?;
        Ok(UnmaskedPath {
            path,
            params: decoded,
        })
    }

    /// Decode the `data.accountIds` list of an inbound request body.
    ///
    /// All-or-nothing: the returned document is only built once every
    /// listed token has decoded.
    pub fn unmask_request_body(&self, document: &Value) -> Result<UnmaskedBody, UnmaskError> {
        let data = document
            .get(DATA_KEY)
            .and_then(Value::as_object)
            .ok_or_else(|| UnmaskError::InvalidField {
                field: DATA_KEY.to_owned(),
            })?;
        let tokens = data
            .get(ACCOUNT_IDS_KEY)
            .ok_or(UnmaskError::MissingAccountIds)?
            .as_array()
            .ok_or_else(|| UnmaskError::InvalidField {
                field: ACCOUNT_IDS_KEY.to_owned(),
            })?;

        let mut account_ids = Vec::with_capacity(tokens.len());
        let mut triples = Vec::with_capacity(tokens.len());
        for token in tokens {
            let token = token.as_str().ok_or(UnmaskError::InvalidAccountBody)?;
            let triple = self
                .codec
                .decode_id(token)
                .map_err(|_| UnmaskError::InvalidAccountBody)?;
            account_ids.push(triple.account_id.clone());
            triples.push(triple);
        }

        let mut unmasked = document.clone();
        if let Some(data) = unmasked.get_mut(DATA_KEY).and_then(Value::as_object_mut) {
            data.insert(
                ACCOUNT_IDS_KEY.to_owned(),
                Value::Array(
                    account_ids
                        .iter()
                        .map(|id| Value::String(id.clone()))
                        .collect(),
                ),
            );
        }

        Ok(UnmaskedBody {
            document: unmasked,
            account_ids,
            triples,
        })
    }

    /// Tokenise the account id a pipeline failure refers to before the
    /// error body leaves the boundary.
    ///
    /// The token replaces the raw id both in the detail text and in the
    /// structured account reference.
    pub fn mask_failure(
        &self,
        failure: &ValidationFailure,
        user_id: &str,
        app_id: &str,
    ) -> Result<ValidationFailure, CoreError> {
        let Some(account_id) = &failure.account_id else {
            return Ok(failure.clone());
        };
        let token = self.codec.encode_id(user_id, app_id, account_id)?;
        Ok(ValidationFailure {
            code: failure.code,
            detail: failure.detail.replace(account_id.as_str(), &token),
            account_id: Some(token),
        })
    }
}
