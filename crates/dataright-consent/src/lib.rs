#![forbid(unsafe_code)]
//! # Dataright Consent - Mapping Validation Pipeline
//!
//! An ordered chain of gates and filters that narrows a consent's
//! account-mapping list and renders a pass/fail verdict for one resource
//! call. Conditional stages consult the account-metadata store through
//! dependency-injected gateways; any lookup failure is fatal for the
//! call (fail-closed), never a silent default.

/// Narrowing filters applied to the mapping list
pub mod filters;

/// External metadata and register-status gateways
pub mod metadata;

/// The validation pipeline
pub mod pipeline;

pub use filters::MappingFilterChain;
pub use metadata::{
    DisclosureOption, MetadataError, MetadataGateway, RegisterStatus, RegisterStatusGateway,
};
pub use pipeline::{ConsentError, ConsentValidationPipeline};
