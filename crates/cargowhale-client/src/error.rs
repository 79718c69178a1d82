// crates/cargowhale-client/src/error.rs
// ============================================================================
// Module: Gateway Errors
// Description: Error types surfaced by the container gateway client.
// Purpose: Separate caller mistakes from upstream failures.
// Dependencies: serde_json, thiserror
// ============================================================================

//! ## Overview
//! [`GatewayError::InvalidParameter`] is raised before any request is sent.
//! [`GatewayError::Upstream`] wraps whatever went wrong after that point and
//! keeps the original failure reachable through [`std::error::Error::source`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::transport::TransportError;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised by endpoint resolution and gateway calls.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// A required parameter is missing, empty, or not path-safe.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// Why the value was rejected.
        reason: String,
    },
    /// The upstream request or its response decoding failed.
    #[error("upstream request to {url} failed: {cause}")]
    Upstream {
        /// Request URL.
        url: String,
        /// Original failure.
        #[source]
        cause: UpstreamCause,
    },
}

impl GatewayError {
    /// Builds an invalid parameter error.
    pub(crate) fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Returns a stable label for telemetry.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidParameter {
                ..
            } => "invalid_parameter",
            Self::Upstream {
                cause: UpstreamCause::Transport(_),
                ..
            } => "transport",
            Self::Upstream {
                cause: UpstreamCause::Decode(_),
                ..
            } => "decode",
        }
    }
}

/// Underlying cause of an upstream failure.
#[derive(Debug, Error)]
pub enum UpstreamCause {
    /// The transport could not complete the request.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The response body did not decode into the expected model.
    #[error("response decode failed: {0}")]
    Decode(#[from] serde_json::Error),
}
