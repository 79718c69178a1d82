// crates/cargowhale-client/src/endpoint.rs
// ============================================================================
// Module: Endpoint Resolution
// Description: Logical operations mapped to absolute request URLs.
// Purpose: Keep URL construction pure, validated, and testable.
// Dependencies: serde, url
// ============================================================================

//! ## Overview
//! Every [`Operation`] has a route template relative to the configured base
//! address. Templates reference path parameters as `{name}`; the resolver
//! checks that every required parameter is present, non-empty, and made only
//! of path-safe characters before substituting it.
//!
//! Resolution is string concatenation against the base address: with the
//! base `http://host:1234/` and the default by-id route `{id}`, the id `abc`
//! resolves to `http://host:1234/abc`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use url::Url;

use crate::error::GatewayError;

// ============================================================================
// SECTION: Operations
// ============================================================================

/// Path parameter holding the container identifier.
pub const ID_PARAM: &str = "id";

/// Logical gateway operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// List containers.
    ListContainers,
    /// Fetch one container's details.
    ContainerById,
    /// Fetch one container's logs.
    ContainerLogsById,
    /// Fetch one container's process table.
    ContainerProcessesById,
}

impl Operation {
    /// All operations in declaration order.
    pub const ALL: [Self; 4] = [
        Self::ListContainers,
        Self::ContainerById,
        Self::ContainerLogsById,
        Self::ContainerProcessesById,
    ];

    /// Returns a stable label for the operation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ListContainers => "list_containers",
            Self::ContainerById => "container_by_id",
            Self::ContainerLogsById => "container_logs",
            Self::ContainerProcessesById => "container_processes",
        }
    }

    /// Returns the path parameters the operation requires.
    #[must_use]
    pub const fn required_params(self) -> &'static [&'static str] {
        match self {
            Self::ListContainers => &[],
            Self::ContainerById | Self::ContainerLogsById | Self::ContainerProcessesById => {
                &[ID_PARAM]
            }
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Path Parameters
// ============================================================================

/// Named path parameters supplied to [`EndpointResolver::resolve`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    /// Parameter values by name.
    values: BTreeMap<String, String>,
}

impl PathParams {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a parameter set holding only the container id.
    #[must_use]
    pub fn id(value: impl Into<String>) -> Self {
        Self::new().with(ID_PARAM, value)
    }

    /// Adds or replaces a parameter.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Returns the value for `name`, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

// ============================================================================
// SECTION: Routes
// ============================================================================

/// Route templates relative to the base address.
///
/// # Invariants
/// - By-id templates contain `{id}`; the list template does not.
/// - `{id}` is the only placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EndpointRoutes {
    /// Template for listing containers.
    pub list_containers: String,
    /// Template for container details.
    pub container_by_id: String,
    /// Template for container logs.
    pub container_logs: String,
    /// Template for the container process table.
    pub container_processes: String,
}

impl Default for EndpointRoutes {
    fn default() -> Self {
        Self {
            list_containers: String::new(),
            container_by_id: "{id}".to_string(),
            container_logs: "{id}/logs".to_string(),
            container_processes: "{id}/top".to_string(),
        }
    }
}

impl EndpointRoutes {
    /// Returns the template for `operation`.
    #[must_use]
    pub fn template_for(&self, operation: Operation) -> &str {
        match operation {
            Operation::ListContainers => &self.list_containers,
            Operation::ContainerById => &self.container_by_id,
            Operation::ContainerLogsById => &self.container_logs,
            Operation::ContainerProcessesById => &self.container_processes,
        }
    }

    /// Validates every template against its operation.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidParameter`] naming the offending route.
    pub fn validate(&self) -> Result<(), GatewayError> {
        for operation in Operation::ALL {
            let template = self.template_for(operation);
            let name = format!("routes.{}", operation.as_str());
            if template.starts_with('/') {
                return Err(GatewayError::invalid(name, "route must be relative to the endpoint"));
            }
            if template.contains(['?', '#']) {
                return Err(GatewayError::invalid(name, "route must not carry a query or fragment"));
            }
            let found =
                placeholders(template).map_err(|reason| GatewayError::invalid(&name, reason))?;
            if let Some(unknown) = found.iter().find(|placeholder| **placeholder != ID_PARAM) {
                return Err(GatewayError::invalid(
                    name,
                    format!("unknown placeholder {{{unknown}}}"),
                ));
            }
            let requires_id = !operation.required_params().is_empty();
            if requires_id && found.is_empty() {
                return Err(GatewayError::invalid(name, "route must contain {id}"));
            }
            if !requires_id && !found.is_empty() {
                return Err(GatewayError::invalid(name, "route must not contain {id}"));
            }
        }
        Ok(())
    }
}

/// Extracts `{name}` placeholders from a template.
fn placeholders(template: &str) -> Result<Vec<&str>, &'static str> {
    let mut found = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1 ..];
        let end = after.find('}').ok_or("unterminated placeholder")?;
        let name = &after[.. end];
        if name.is_empty() || name.contains('{') {
            return Err("malformed placeholder");
        }
        found.push(name);
        rest = &after[end + 1 ..];
    }
    if rest.contains('}') {
        return Err("unbalanced placeholder");
    }
    Ok(found)
}

// ============================================================================
// SECTION: Endpoint
// ============================================================================

/// Resolved absolute request URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint(String);

impl Endpoint {
    /// Returns the URL text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Appends an encoded query string (`?k=v&...` or empty).
    #[must_use]
    pub fn with_query(mut self, query: &str) -> Self {
        self.0.push_str(query);
        self
    }

    /// Consumes the endpoint and returns the URL text.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// SECTION: Resolver
// ============================================================================

/// Resolves operations into absolute URLs against a base address.
///
/// # Invariants
/// - `base` is an absolute `http`/`https` URL ending with `/`.
/// - `routes` passed [`EndpointRoutes::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointResolver {
    /// Base address every route is appended to.
    base: String,
    /// Route templates.
    routes: EndpointRoutes,
}

impl EndpointResolver {
    /// Creates a resolver with the default routes.
    ///
    /// A missing trailing `/` on `base` is added.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidParameter`] when `base` is not an
    /// absolute `http`/`https` URL, or carries credentials, a query, or a
    /// fragment.
    pub fn new(base: &str) -> Result<Self, GatewayError> {
        let parsed =
            Url::parse(base).map_err(|err| GatewayError::invalid("endpoint", err.to_string()))?;
        match parsed.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(GatewayError::invalid(
                    "endpoint",
                    format!("unsupported scheme {scheme}"),
                ));
            }
        }
        if parsed.cannot_be_a_base() || parsed.host().is_none() {
            return Err(GatewayError::invalid("endpoint", "endpoint must be an absolute url"));
        }
        if !parsed.username().is_empty() || parsed.password().is_some() {
            return Err(GatewayError::invalid("endpoint", "endpoint must not embed credentials"));
        }
        if parsed.query().is_some() || parsed.fragment().is_some() {
            return Err(GatewayError::invalid(
                "endpoint",
                "endpoint must not carry a query or fragment",
            ));
        }
        let mut base = base.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        Ok(Self {
            base,
            routes: EndpointRoutes::default(),
        })
    }

    /// Replaces the route templates.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidParameter`] when a template is invalid.
    pub fn with_routes(mut self, routes: EndpointRoutes) -> Result<Self, GatewayError> {
        routes.validate()?;
        self.routes = routes;
        Ok(self)
    }

    /// Returns the base address.
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Returns the route templates.
    #[must_use]
    pub const fn routes(&self) -> &EndpointRoutes {
        &self.routes
    }

    /// Resolves `operation` with `params` into an absolute URL.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidParameter`] when a required parameter is
    /// missing, empty, or not path-safe.
    pub fn resolve(
        &self,
        operation: Operation,
        params: &PathParams,
    ) -> Result<Endpoint, GatewayError> {
        let mut path = self.routes.template_for(operation).to_string();
        for name in operation.required_params() {
            let value = params
                .get(name)
                .ok_or_else(|| GatewayError::invalid(*name, "required parameter is missing"))?;
            validate_path_value(name, value)?;
            path = path.replace(&format!("{{{name}}}"), value);
        }
        Ok(Endpoint(format!("{}{path}", self.base)))
    }
}

/// Accepts non-empty values made of `[A-Za-z0-9_.-]`, excluding `.` and `..`.
fn validate_path_value(name: &str, value: &str) -> Result<(), GatewayError> {
    if value.is_empty() {
        return Err(GatewayError::invalid(name, "required parameter is empty"));
    }
    if value == "." || value == ".." {
        return Err(GatewayError::invalid(name, "relative path segments are not allowed"));
    }
    let path_safe =
        value.bytes().all(|byte| byte.is_ascii_alphanumeric() || matches!(byte, b'_' | b'.' | b'-'));
    if !path_safe {
        return Err(GatewayError::invalid(name, "value must only contain [A-Za-z0-9_.-]"));
    }
    Ok(())
}
