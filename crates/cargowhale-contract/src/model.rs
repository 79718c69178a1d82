// crates/cargowhale-contract/src/model.rs
// ============================================================================
// Module: Contract Model
// Description: Resource tree, methods, responses, and media-type examples.
// Purpose: Represent one parsed API contract in memory.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Contracts are authored as an owned [`Resource`] tree and verified as an
//! arena-backed [`ContractModel`]. The arena form addresses children by
//! [`ResourceId`], which lets parsers that reference resources by identifier
//! describe arbitrary graphs; the index builder rejects anything that is not a
//! strict tree.
//!
//! Key types normalize on construction:
//! - [`HttpVerb`] parses case-insensitively and renders uppercase.
//! - [`StatusCode`] only admits `100..=599`.
//! - [`MediaType`] lowercases the type, subtype, and parameter names.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::ContractError;

// ============================================================================
// SECTION: Key Errors
// ============================================================================

/// Errors raised when a key component fails normalization.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// HTTP method is not a recognized verb.
    #[error("unsupported http method: {0}")]
    UnknownVerb(String),
    /// Status code is outside the valid HTTP range.
    #[error("invalid http status code: {0}")]
    InvalidStatus(u16),
    /// Media type is not a `type/subtype[;param=value]` string.
    #[error("invalid media type: {0}")]
    InvalidMediaType(String),
}

// ============================================================================
// SECTION: HTTP Verb
// ============================================================================

/// HTTP method declared by a contract resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum HttpVerb {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
    /// `PATCH`
    Patch,
    /// `HEAD`
    Head,
    /// `OPTIONS`
    Options,
    /// `TRACE`
    Trace,
    /// `CONNECT`
    Connect,
}

impl HttpVerb {
    /// Returns the canonical uppercase verb.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Trace => "TRACE",
            Self::Connect => "CONNECT",
        }
    }
}

impl FromStr for HttpVerb {
    type Err = KeyError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            "PATCH" => Ok(Self::Patch),
            "HEAD" => Ok(Self::Head),
            "OPTIONS" => Ok(Self::Options),
            "TRACE" => Ok(Self::Trace),
            "CONNECT" => Ok(Self::Connect),
            _ => Err(KeyError::UnknownVerb(raw.to_string())),
        }
    }
}

impl TryFrom<String> for HttpVerb {
    type Error = KeyError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl From<HttpVerb> for String {
    fn from(verb: HttpVerb) -> Self {
        verb.as_str().to_string()
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Status Code
// ============================================================================

/// HTTP status code declared by a contract response.
///
/// # Invariants
/// - Always within `100..=599`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct StatusCode(u16);

impl StatusCode {
    /// `200 OK`
    pub const OK: Self = Self(200);
    /// `201 Created`
    pub const CREATED: Self = Self(201);
    /// `204 No Content`
    pub const NO_CONTENT: Self = Self(204);
    /// `400 Bad Request`
    pub const BAD_REQUEST: Self = Self(400);
    /// `404 Not Found`
    pub const NOT_FOUND: Self = Self(404);
    /// `409 Conflict`
    pub const CONFLICT: Self = Self(409);
    /// `500 Internal Server Error`
    pub const INTERNAL_SERVER_ERROR: Self = Self(500);

    /// Creates a status code, rejecting values outside the HTTP range.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::InvalidStatus`] when `code` is not in `100..=599`.
    pub fn new(code: u16) -> Result<Self, KeyError> {
        if !(100..=599).contains(&code) {
            return Err(KeyError::InvalidStatus(code));
        }
        Ok(Self(code))
    }

    /// Returns the numeric status code.
    #[must_use]
    pub const fn get(self) -> u16 {
        self.0
    }
}

impl TryFrom<u16> for StatusCode {
    type Error = KeyError;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        Self::new(code)
    }
}

impl From<StatusCode> for u16 {
    fn from(status: StatusCode) -> Self {
        status.0
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// SECTION: Media Type
// ============================================================================

/// Normalized MIME media type.
///
/// # Invariants
/// - Type, subtype, and parameter names are lowercase.
/// - The `charset` value is lowercase; other parameter values keep their case.
/// - Parameters keep their declared order and are joined with `;` without
///   surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MediaType(String);

impl MediaType {
    /// Parses and normalizes a media type string.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::InvalidMediaType`] when the value is not a
    /// `type/subtype` pair with well-formed parameters.
    pub fn parse(raw: &str) -> Result<Self, KeyError> {
        let invalid = || KeyError::InvalidMediaType(raw.to_string());
        let mut parts = raw.split(';');
        let essence = parts.next().unwrap_or_default().trim().to_ascii_lowercase();
        let Some((kind, subtype)) = essence.split_once('/') else {
            return Err(invalid());
        };
        if !is_token(kind) || !is_token(subtype) {
            return Err(invalid());
        }
        let mut normalized = essence.clone();
        for param in parts {
            let param = param.trim();
            if param.is_empty() {
                continue;
            }
            let Some((name, value)) = param.split_once('=') else {
                return Err(invalid());
            };
            let name = name.trim().to_ascii_lowercase();
            let value = value.trim();
            if !is_token(&name) || value.is_empty() {
                return Err(invalid());
            }
            normalized.push(';');
            normalized.push_str(&name);
            normalized.push('=');
            if name == "charset" {
                normalized.push_str(&value.to_ascii_lowercase());
            } else {
                normalized.push_str(value);
            }
        }
        Ok(Self(normalized))
    }

    /// Returns `application/json`.
    #[must_use]
    pub fn json() -> Self {
        Self("application/json".to_string())
    }

    /// Returns `text/plain`.
    #[must_use]
    pub fn text() -> Self {
        Self("text/plain".to_string())
    }

    /// Returns the normalized media type string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the `type/subtype` portion without parameters.
    #[must_use]
    pub fn essence(&self) -> &str {
        self.0.split(';').next().unwrap_or(&self.0)
    }

    /// Returns true for `application/json` and `+json` structured syntaxes.
    #[must_use]
    pub fn is_json(&self) -> bool {
        let essence = self.essence();
        essence == "application/json" || essence.ends_with("+json")
    }
}

impl TryFrom<String> for MediaType {
    type Error = KeyError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<MediaType> for String {
    fn from(media_type: MediaType) -> Self {
        media_type.0
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Returns true when `value` is a non-empty MIME token.
fn is_token(value: &str) -> bool {
    !value.is_empty()
        && value.bytes().all(|byte| byte.is_ascii_alphanumeric() || b"!#$&-^_.+".contains(&byte))
}

// ============================================================================
// SECTION: Authoring Tree
// ============================================================================

/// Example body declared for one media type of a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MediaTypeExample {
    /// Normalized media type.
    pub media_type: MediaType,
    /// Literal example payload.
    pub example: String,
}

impl MediaTypeExample {
    /// Creates an example for the given media type.
    pub fn new(media_type: MediaType, example: impl Into<String>) -> Self {
        Self {
            media_type,
            example: example.into(),
        }
    }
}

/// Declared response of a method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Response {
    /// Response status code.
    pub status: StatusCode,
    /// Example bodies, one per media type.
    #[serde(default)]
    pub bodies: Vec<MediaTypeExample>,
}

impl Response {
    /// Creates a response with no bodies.
    #[must_use]
    pub const fn new(status: StatusCode) -> Self {
        Self {
            status,
            bodies: Vec::new(),
        }
    }

    /// Adds an example body.
    #[must_use]
    pub fn with_body(mut self, media_type: MediaType, example: impl Into<String>) -> Self {
        self.bodies.push(MediaTypeExample::new(media_type, example));
        self
    }
}

/// HTTP method declared on a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Method {
    /// Normalized HTTP verb.
    pub verb: HttpVerb,
    /// Declared responses, one per status code.
    #[serde(default)]
    pub responses: Vec<Response>,
}

impl Method {
    /// Creates a method with no responses.
    #[must_use]
    pub const fn new(verb: HttpVerb) -> Self {
        Self {
            verb,
            responses: Vec::new(),
        }
    }

    /// Adds a declared response.
    #[must_use]
    pub fn with_response(mut self, response: Response) -> Self {
        self.responses.push(response);
        self
    }
}

/// Owned contract resource used to author trees.
///
/// # Invariants
/// - Children are exclusively owned; an authored tree cannot contain cycles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Resource {
    /// Path segment relative to the parent resource.
    pub path: String,
    /// Methods declared on this resource.
    #[serde(default)]
    pub methods: Vec<Method>,
    /// Nested resources, in declaration order.
    #[serde(default, rename = "resources")]
    pub children: Vec<Resource>,
}

impl Resource {
    /// Creates a leaf resource with the given relative path.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            methods: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Adds a method.
    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    /// Adds a child resource.
    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }
}

// ============================================================================
// SECTION: Arena Model
// ============================================================================

/// Index of a resource node inside a [`ContractModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(usize);

impl ResourceId {
    /// Returns the arena slot of this node.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Resource node stored in the contract arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceNode {
    /// Path segment relative to the parent resource.
    pub path: String,
    /// Methods declared on this resource.
    pub methods: Vec<Method>,
    /// Child node identifiers, in declaration order.
    pub children: Vec<ResourceId>,
}

/// Arena-backed contract model consumed by the index builder.
///
/// # Invariants
/// - `root` always refers to an existing node.
/// - Nodes created by [`ContractModel::from_tree`] form a strict tree;
///   [`ContractModel::link`] may introduce extra edges, which the index builder
///   rejects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractModel {
    /// Resource nodes, addressed by [`ResourceId`].
    nodes: Vec<ResourceNode>,
    /// Root node identifier.
    root: ResourceId,
}

impl ContractModel {
    /// Creates a model containing only a root resource.
    pub fn new(root_path: impl Into<String>) -> Self {
        Self {
            nodes: vec![ResourceNode {
                path: root_path.into(),
                methods: Vec::new(),
                children: Vec::new(),
            }],
            root: ResourceId(0),
        }
    }

    /// Converts an owned resource tree into an arena model, preserving child
    /// order.
    #[must_use]
    pub fn from_tree(root: Resource) -> Self {
        let mut nodes: Vec<ResourceNode> = Vec::new();
        let mut pending: Vec<(Option<ResourceId>, Resource)> = vec![(None, root)];
        while let Some((parent, resource)) = pending.pop() {
            let Resource {
                path,
                methods,
                children,
            } = resource;
            let id = ResourceId(nodes.len());
            nodes.push(ResourceNode {
                path,
                methods,
                children: Vec::new(),
            });
            if let Some(parent_node) = parent.and_then(|parent| nodes.get_mut(parent.0)) {
                parent_node.children.push(id);
            }
            for child in children.into_iter().rev() {
                pending.push((Some(id), child));
            }
        }
        Self {
            nodes,
            root: ResourceId(0),
        }
    }

    /// Appends a new resource under `parent` and returns its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::Malformed`] when `parent` does not exist.
    pub fn add_resource(
        &mut self,
        parent: ResourceId,
        path: impl Into<String>,
        methods: Vec<Method>,
    ) -> Result<ResourceId, ContractError> {
        let id = ResourceId(self.nodes.len());
        let parent_node = self.nodes.get_mut(parent.0).ok_or_else(|| unknown_node(parent))?;
        parent_node.children.push(id);
        self.nodes.push(ResourceNode {
            path: path.into(),
            methods,
            children: Vec::new(),
        });
        Ok(id)
    }

    /// Adds a method to an existing resource.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::Malformed`] when `id` does not exist.
    pub fn add_method(&mut self, id: ResourceId, method: Method) -> Result<(), ContractError> {
        let node = self.nodes.get_mut(id.0).ok_or_else(|| unknown_node(id))?;
        node.methods.push(method);
        Ok(())
    }

    /// Adds an edge from `parent` to an existing `child` node.
    ///
    /// Parsers that resolve resource references by identifier use this to
    /// attach already-created nodes; the resulting graph is validated when the
    /// index is built.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::Malformed`] when either node does not exist.
    pub fn link(&mut self, parent: ResourceId, child: ResourceId) -> Result<(), ContractError> {
        if child.0 >= self.nodes.len() {
            return Err(unknown_node(child));
        }
        let parent_node = self.nodes.get_mut(parent.0).ok_or_else(|| unknown_node(parent))?;
        parent_node.children.push(child);
        Ok(())
    }

    /// Returns the root node identifier.
    #[must_use]
    pub const fn root(&self) -> ResourceId {
        self.root
    }

    /// Returns the node for `id`, if present.
    #[must_use]
    pub fn node(&self, id: ResourceId) -> Option<&ResourceNode> {
        self.nodes.get(id.0)
    }

    /// Returns the number of nodes in the arena.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true when the arena holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Builds the error for a dangling node reference.
fn unknown_node(id: ResourceId) -> ContractError {
    ContractError::Malformed(format!("unknown resource node {}", id.0))
}
