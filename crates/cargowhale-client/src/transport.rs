// crates/cargowhale-client/src/transport.rs
// ============================================================================
// Module: HTTP Transport
// Description: Injected HTTP GET capability and its blocking reqwest backend.
// Purpose: Keep the client free of connection, retry, and pooling concerns.
// Dependencies: reqwest, thiserror
// ============================================================================

//! ## Overview
//! [`HttpTransport`] is the only I/O seam of the gateway client. It takes an
//! absolute URL and returns the response body as text.
//! [`ReqwestTransport`] is the reference implementation.
//! Invariants:
//! - Redirects are rejected.
//! - Non-success status codes fail closed.
//! - Response bodies are capped at the configured byte limit.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors emitted by HTTP transports.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The HTTP client could not be built.
    #[error("http client setup failed: {0}")]
    Client(String),
    /// The request could not be sent or the body not read.
    #[error("http request failed: {0}")]
    Request(String),
    /// The upstream answered with a non-success status.
    #[error("http status {status}")]
    Status {
        /// Status code returned upstream.
        status: u16,
    },
    /// The response body exceeded the byte limit.
    #[error("response exceeds size limit: {actual_bytes} bytes (max {max_bytes})")]
    TooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Observed size in bytes.
        actual_bytes: usize,
    },
    /// The response body is not valid UTF-8.
    #[error("response body is not utf-8")]
    Encoding,
}

// ============================================================================
// SECTION: Transport Trait
// ============================================================================

/// Blocking HTTP GET capability.
pub trait HttpTransport: Send + Sync {
    /// Issues a GET for `url` and returns the body text.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the request fails, the status is not a
    /// success, or the body is rejected.
    fn get(&self, url: &str) -> Result<String, TransportError>;
}

impl<T: HttpTransport + ?Sized> HttpTransport for Arc<T> {
    fn get(&self, url: &str) -> Result<String, TransportError> {
        (**self).get(url)
    }
}

impl<T: HttpTransport + ?Sized> HttpTransport for Box<T> {
    fn get(&self, url: &str) -> Result<String, TransportError> {
        (**self).get(url)
    }
}

// ============================================================================
// SECTION: Reqwest Transport
// ============================================================================

/// Blocking `reqwest` transport.
///
/// # Invariants
/// - Redirects are never followed.
/// - Bodies larger than `max_response_bytes` are rejected.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    /// HTTP client used for requests.
    client: Client,
    /// Maximum accepted body size in bytes.
    max_response_bytes: usize,
}

impl ReqwestTransport {
    /// Builds a transport with the given request timeout and body limit.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Client`] when the HTTP client cannot be
    /// constructed.
    pub fn new(timeout: Duration, max_response_bytes: usize) -> Result<Self, TransportError> {
        let client = Client::builder()
            .redirect(Policy::none())
            .timeout(timeout)
            .build()
            .map_err(|err| TransportError::Client(err.to_string()))?;
        Ok(Self {
            client,
            max_response_bytes,
        })
    }

    /// Creates a transport around a preconfigured client.
    #[must_use]
    pub const fn with_client(client: Client, max_response_bytes: usize) -> Self {
        Self {
            client,
            max_response_bytes,
        }
    }

    /// Returns the body size limit in bytes.
    #[must_use]
    pub const fn max_response_bytes(&self) -> usize {
        self.max_response_bytes
    }
}

impl HttpTransport for ReqwestTransport {
    fn get(&self, url: &str) -> Result<String, TransportError> {
        let response =
            self.client.get(url).send().map_err(|err| TransportError::Request(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
            });
        }
        let max_bytes = u64::try_from(self.max_response_bytes).unwrap_or(u64::MAX);
        if let Some(length) = response.content_length()
            && length > max_bytes
        {
            return Err(TransportError::TooLarge {
                max_bytes: self.max_response_bytes,
                actual_bytes: usize::try_from(length).unwrap_or(usize::MAX),
            });
        }
        let mut limited = response.take(max_bytes.saturating_add(1));
        let mut bytes = Vec::new();
        limited.read_to_end(&mut bytes).map_err(|err| TransportError::Request(err.to_string()))?;
        if bytes.len() > self.max_response_bytes {
            return Err(TransportError::TooLarge {
                max_bytes: self.max_response_bytes,
                actual_bytes: bytes.len(),
            });
        }
        String::from_utf8(bytes).map_err(|_| TransportError::Encoding)
    }
}
