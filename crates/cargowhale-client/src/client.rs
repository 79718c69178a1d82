// crates/cargowhale-client/src/client.rs
// ============================================================================
// Module: Container Gateway Client
// Description: Typed container operations over an injected transport.
// Purpose: Resolve, query, fetch, and decode in one place per operation.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Each operation resolves its endpoint, appends its encoded query, issues a
//! GET through the [`HttpTransport`], and decodes the body. Logs are returned
//! verbatim; every other body is JSON.
//!
//! The client holds no mutable state and performs no retries, pooling, or
//! caching. Failures are wrapped once in [`GatewayError::Upstream`] and not
//! otherwise translated.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Instant;

use serde::de::DeserializeOwned;

use crate::endpoint::Endpoint;
use crate::endpoint::EndpointResolver;
use crate::endpoint::Operation;
use crate::endpoint::PathParams;
use crate::error::GatewayError;
use crate::error::UpstreamCause;
use crate::filters::ContainerFilters;
use crate::filters::LogFilters;
use crate::models::ContainerDetails;
use crate::models::ContainerLogs;
use crate::models::ContainerProcessIndex;
use crate::models::ContainerSummary;
use crate::query::ListAll;
use crate::query::encode_query;
use crate::telemetry::GatewayCall;
use crate::telemetry::GatewayMetricEvent;
use crate::telemetry::GatewayMetrics;
use crate::telemetry::GatewayOutcome;
use crate::telemetry::NoopMetrics;
use crate::transport::HttpTransport;

// ============================================================================
// SECTION: Client
// ============================================================================

/// Gateway client for the container runtime API.
///
/// # Invariants
/// - Calls are independent; the client is safe to share across threads when
///   the transport is.
pub struct ContainerGatewayClient<T: HttpTransport> {
    /// Endpoint resolver.
    resolver: EndpointResolver,
    /// Injected HTTP capability.
    transport: T,
    /// Metrics sink.
    metrics: Arc<dyn GatewayMetrics>,
}

impl<T: HttpTransport> ContainerGatewayClient<T> {
    /// Creates a client that discards metrics.
    pub fn new(resolver: EndpointResolver, transport: T) -> Self {
        Self {
            resolver,
            transport,
            metrics: Arc::new(NoopMetrics),
        }
    }

    /// Replaces the metrics sink.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<dyn GatewayMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Returns the endpoint resolver.
    pub const fn resolver(&self) -> &EndpointResolver {
        &self.resolver
    }

    /// Lists every container, running or not.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Upstream`] on transport or decode failure.
    pub fn list_all_containers(&self) -> Result<Vec<ContainerSummary>, GatewayError> {
        self.observe(GatewayCall::ListAll, || {
            let endpoint = self
                .resolver
                .resolve(Operation::ListContainers, &PathParams::new())?
                .with_query(&encode_query(&ListAll));
            self.fetch_json(endpoint)
        })
    }

    /// Lists containers matching `filters`, in upstream order.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Upstream`] on transport or decode failure.
    pub fn list_filtered_containers(
        &self,
        filters: &ContainerFilters,
    ) -> Result<Vec<ContainerSummary>, GatewayError> {
        self.observe(GatewayCall::ListFiltered, || {
            let endpoint = self
                .resolver
                .resolve(Operation::ListContainers, &PathParams::new())?
                .with_query(&encode_query(filters));
            self.fetch_json(endpoint)
        })
    }

    /// Fetches the details of container `id`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidParameter`] for an empty or unsafe id and
    /// [`GatewayError::Upstream`] on transport or decode failure.
    pub fn container_details(&self, id: &str) -> Result<ContainerDetails, GatewayError> {
        self.observe(GatewayCall::Details, || {
            let endpoint = self.resolver.resolve(Operation::ContainerById, &PathParams::id(id))?;
            self.fetch_json(endpoint)
        })
    }

    /// Fetches the logs of container `id`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidParameter`] for an empty or unsafe id and
    /// [`GatewayError::Upstream`] on transport failure.
    pub fn container_logs(
        &self,
        id: &str,
        filters: &LogFilters,
    ) -> Result<ContainerLogs, GatewayError> {
        self.observe(GatewayCall::Logs, || {
            let endpoint = self
                .resolver
                .resolve(Operation::ContainerLogsById, &PathParams::id(id))?
                .with_query(&encode_query(filters));
            let body = self.fetch(&endpoint)?;
            let bytes = body.len();
            Ok((
                ContainerLogs {
                    logs: body,
                },
                bytes,
            ))
        })
    }

    /// Fetches the process table of container `id`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidParameter`] for an empty or unsafe id and
    /// [`GatewayError::Upstream`] on transport or decode failure.
    pub fn container_processes(&self, id: &str) -> Result<ContainerProcessIndex, GatewayError> {
        self.observe(GatewayCall::Processes, || {
            let endpoint =
                self.resolver.resolve(Operation::ContainerProcessesById, &PathParams::id(id))?;
            self.fetch_json(endpoint)
        })
    }

    /// Issues the GET and wraps transport failures.
    fn fetch(&self, endpoint: &Endpoint) -> Result<String, GatewayError> {
        self.transport.get(endpoint.as_str()).map_err(|err| GatewayError::Upstream {
            url: endpoint.to_string(),
            cause: UpstreamCause::Transport(err),
        })
    }

    /// Issues the GET and decodes the JSON body, returning the body size.
    fn fetch_json<D: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
    ) -> Result<(D, usize), GatewayError> {
        let body = self.fetch(&endpoint)?;
        let decoded = serde_json::from_str(&body).map_err(|err| GatewayError::Upstream {
            url: endpoint.into_string(),
            cause: UpstreamCause::Decode(err),
        })?;
        Ok((decoded, body.len()))
    }

    /// Runs one call and reports its metric event.
    fn observe<R>(
        &self,
        call: GatewayCall,
        run: impl FnOnce() -> Result<(R, usize), GatewayError>,
    ) -> Result<R, GatewayError> {
        let started = Instant::now();
        let result = run();
        let (outcome, error_kind, response_bytes) = match &result {
            Ok((_, bytes)) => (GatewayOutcome::Ok, None, *bytes),
            Err(err) => (GatewayOutcome::Error, Some(err.kind()), 0),
        };
        self.metrics.record_request(&GatewayMetricEvent {
            call,
            outcome,
            error_kind,
            duration: started.elapsed(),
            response_bytes,
        });
        result.map(|(value, _)| value)
    }
}
