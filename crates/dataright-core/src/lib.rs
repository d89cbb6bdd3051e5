#![forbid(unsafe_code)]
//! # Dataright Core - Shared Data Model
//!
//! Foundational types for the consent-enforcement core: the consent
//! aggregate and its account mappings, the per-call validation context,
//! the validation verdict, the AU CDS error catalogue, and the resource
//! path-template table shared by the validation pipeline and the
//! identifier-permanence layer.

/// Consent aggregate and sharing-agreement receipt
pub mod consent;

/// Per-call validation context and feature flags
pub mod context;

/// Error catalogue and structured error responses
pub mod errors;

/// Account mappings bound to a consent
pub mod mapping;

/// Resource path templates and parameter extraction
pub mod paths;

/// Validation verdicts produced by the pipeline
pub mod verdict;

pub use consent::{Consent, ConsentReceipt, ConsentStatus};
pub use context::{FeatureFlags, HttpMethod, ValidationContext};
pub use errors::{ApiError, ApiErrorCode, CoreError, ErrorResponse};
pub use mapping::{AccountMapping, MappingPermission, MappingStatus};
pub use paths::PathTemplate;
pub use verdict::{ValidationFailure, ValidationVerdict};
