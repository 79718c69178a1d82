// crates/cargowhale-client/src/lib.rs
// ============================================================================
// Module: CargoWhale Client Library
// Description: Typed gateway in front of the container runtime HTTP API.
// Purpose: Build request URLs, issue GETs, and decode typed container models.
// Dependencies: reqwest, serde, serde_json, thiserror, url
// ============================================================================

//! ## Overview
//! `cargowhale-client` is the request side of CargoWhale. An
//! [`EndpointResolver`] turns a logical [`Operation`] and its path parameters
//! into an absolute URL, [`encode_query`] appends a deterministic query string
//! built from a filter, and [`ContainerGatewayClient`] sends the GET through an
//! injected [`HttpTransport`] and decodes the JSON body.
//!
//! Invariants:
//! - Query parameters are emitted in the order each filter declares them.
//! - Transport and decode failures surface as [`GatewayError::Upstream`] with
//!   the original cause preserved as the error source.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod client;
pub mod endpoint;
pub mod error;
pub mod filters;
pub mod models;
pub mod query;
pub mod telemetry;
pub mod transport;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use client::ContainerGatewayClient;
pub use endpoint::Endpoint;
pub use endpoint::EndpointResolver;
pub use endpoint::EndpointRoutes;
pub use endpoint::Operation;
pub use endpoint::PathParams;
pub use error::GatewayError;
pub use error::UpstreamCause;
pub use filters::ContainerFilters;
pub use filters::LogFilters;
pub use filters::LogTail;
pub use models::ContainerDetails;
pub use models::ContainerLogs;
pub use models::ContainerPort;
pub use models::ContainerProcessIndex;
pub use models::ContainerState;
pub use models::ContainerSummary;
pub use query::ListAll;
pub use query::QueryParameters;
pub use query::encode_query;
pub use telemetry::GatewayCall;
pub use telemetry::GatewayMetricEvent;
pub use telemetry::GatewayMetrics;
pub use telemetry::GatewayOutcome;
pub use telemetry::JsonLinesMetrics;
pub use telemetry::NoopMetrics;
pub use transport::HttpTransport;
pub use transport::ReqwestTransport;
pub use transport::TransportError;
