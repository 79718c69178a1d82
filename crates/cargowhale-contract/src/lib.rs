// crates/cargowhale-contract/src/lib.rs
// ============================================================================
// Module: CargoWhale Contract Library
// Description: API contract model, flattened example index, and verification.
// Purpose: Turn a hierarchical API contract into a fast, read-only lookup.
// Dependencies: serde, serde_json, serde_yaml, thiserror
// ============================================================================

//! ## Overview
//! `cargowhale-contract` holds the contract-verification core. A contract is a
//! tree of resources, each carrying methods, declared responses, and example
//! bodies per media type. [`ContractIndex::build`] flattens that tree into a
//! composite-key index so verification code can fetch the expected example for
//! any `(resource path, verb, status, media type)` quadruple.
//!
//! Invariants:
//! - Index construction is all-or-nothing; a malformed tree never yields a
//!   partial index.
//! - The built index is immutable and safe to share across threads.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod document;
pub mod index;
pub mod model;
pub mod verify;

// ============================================================================
// SECTION: Errors
// ============================================================================

use thiserror::Error;

/// Errors raised while loading or flattening a contract.
///
/// # Invariants
/// - Variants carry human-readable context for diagnostics.
#[derive(Debug, Error)]
pub enum ContractError {
    /// The contract tree violates a structural invariant (cycle, shared node,
    /// duplicate key).
    #[error("malformed contract: {0}")]
    Malformed(String),
    /// The contract document could not be decoded.
    #[error("contract document error: {0}")]
    Document(String),
    /// I/O failure while reading a contract document.
    #[error("contract io error: {0}")]
    Io(String),
}

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use document::ContractDocument;
pub use document::DocumentFormat;
pub use index::ContractIndex;
pub use index::IndexKey;
pub use index::LookupError;
pub use index::NestedIndex;
pub use model::ContractModel;
pub use model::HttpVerb;
pub use model::KeyError;
pub use model::MediaType;
pub use model::MediaTypeExample;
pub use model::Method;
pub use model::Resource;
pub use model::ResourceId;
pub use model::ResourceNode;
pub use model::Response;
pub use model::StatusCode;
pub use verify::ContractVerifier;
pub use verify::Verification;
