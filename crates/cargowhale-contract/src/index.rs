// crates/cargowhale-contract/src/index.rs
// ============================================================================
// Module: Contract Index
// Description: Flattened (path, verb, status, media type) -> example lookup.
// Purpose: Provide total, deterministic example lookups for verification.
// Dependencies: thiserror, std
// ============================================================================

//! ## Overview
//! [`ContractIndex::build`] walks a [`ContractModel`] with an explicit stack,
//! visiting every resource exactly once, and records one entry per
//! resource × method × response × media-type quadruple under a composite
//! [`IndexKey`].
//!
//! Resource keys are full paths: the relative segments from the root down to
//! the node, joined with `/`. An empty root path is keyed as `/`.
//!
//! Duplicate policy: any duplicate (full path, verb per resource, status per
//! method, media type per response) fails the build with
//! [`ContractError::Malformed`]. Nothing is overwritten silently.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use thiserror::Error;

use crate::ContractError;
use crate::model::ContractModel;
use crate::model::HttpVerb;
use crate::model::KeyError;
use crate::model::MediaType;
use crate::model::Resource;
use crate::model::StatusCode;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Nested four-level view of a contract index.
pub type NestedIndex =
    BTreeMap<String, BTreeMap<HttpVerb, BTreeMap<StatusCode, BTreeMap<MediaType, String>>>>;

/// Composite lookup key for a single contract example.
///
/// # Invariants
/// - `path` is normalized with a leading `/` and no duplicate separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IndexKey {
    /// Full resource path.
    pub path: String,
    /// HTTP verb.
    pub verb: HttpVerb,
    /// Response status code.
    pub status: StatusCode,
    /// Response media type.
    pub media_type: MediaType,
}

impl IndexKey {
    /// Creates a key, normalizing the resource path.
    pub fn new(
        path: impl AsRef<str>,
        verb: HttpVerb,
        status: StatusCode,
        media_type: MediaType,
    ) -> Self {
        Self {
            path: join_path("", path.as_ref()),
            verb,
            status,
            media_type,
        }
    }
}

/// Errors raised by index lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// One of the key components failed normalization.
    #[error("invalid lookup key: {0}")]
    InvalidKey(#[from] KeyError),
    /// The contract declares no example for the key.
    #[error("no contract example for {verb} {path} -> {status} ({media_type})")]
    NotFound {
        /// Full resource path.
        path: String,
        /// HTTP verb.
        verb: HttpVerb,
        /// Response status code.
        status: StatusCode,
        /// Response media type.
        media_type: MediaType,
    },
}

// ============================================================================
// SECTION: Contract Index
// ============================================================================

/// Read-only index of contract examples.
///
/// # Invariants
/// - Contains exactly one entry per leaf quadruple of the source contract.
/// - Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractIndex {
    /// Examples keyed by composite key.
    entries: BTreeMap<IndexKey, String>,
}

impl ContractIndex {
    /// Flattens a contract model into an index.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::Malformed`] when a node is reachable more than
    /// once (cycle or shared child), a child reference dangles, or any key is
    /// declared twice.
    pub fn build(model: &ContractModel) -> Result<Self, ContractError> {
        let mut visited = vec![false; model.len()];
        let mut paths: BTreeSet<String> = BTreeSet::new();
        let mut entries: BTreeMap<IndexKey, String> = BTreeMap::new();
        let mut stack = vec![(model.root(), String::new())];

        while let Some((id, parent_path)) = stack.pop() {
            let node = model.node(id).ok_or_else(|| {
                ContractError::Malformed(format!("dangling resource reference {}", id.index()))
            })?;
            let path = join_path(&parent_path, &node.path);
            match visited.get_mut(id.index()) {
                Some(seen) if *seen => {
                    return Err(ContractError::Malformed(format!(
                        "resource {path} is reachable more than once (cycle or shared child)"
                    )));
                }
                Some(seen) => *seen = true,
                None => {
                    return Err(ContractError::Malformed(format!(
                        "dangling resource reference {}",
                        id.index()
                    )));
                }
            }
            if !paths.insert(path.clone()) {
                return Err(ContractError::Malformed(format!("duplicate resource path {path}")));
            }

            let mut verbs = BTreeSet::new();
            for method in &node.methods {
                if !verbs.insert(method.verb) {
                    return Err(ContractError::Malformed(format!(
                        "duplicate method {} on {path}",
                        method.verb
                    )));
                }
                let mut statuses = BTreeSet::new();
                for response in &method.responses {
                    if !statuses.insert(response.status) {
                        return Err(ContractError::Malformed(format!(
                            "duplicate status {} for {} {path}",
                            response.status, method.verb
                        )));
                    }
                    for body in &response.bodies {
                        let key = IndexKey {
                            path: path.clone(),
                            verb: method.verb,
                            status: response.status,
                            media_type: body.media_type.clone(),
                        };
                        if entries.insert(key, body.example.clone()).is_some() {
                            return Err(ContractError::Malformed(format!(
                                "duplicate media type {} for {} {path} -> {}",
                                body.media_type, method.verb, response.status
                            )));
                        }
                    }
                }
            }

            for child in node.children.iter().rev() {
                stack.push((*child, path.clone()));
            }
        }

        Ok(Self {
            entries,
        })
    }

    /// Converts an owned resource tree and flattens it.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::Malformed`] when the tree declares a key twice.
    pub fn from_tree(root: Resource) -> Result<Self, ContractError> {
        Self::build(&ContractModel::from_tree(root))
    }

    /// Looks up an example using raw key components.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::InvalidKey`] when a component fails
    /// normalization and [`LookupError::NotFound`] when no example exists.
    pub fn lookup(
        &self,
        path: &str,
        verb: &str,
        status: u16,
        media_type: &str,
    ) -> Result<&str, LookupError> {
        let key =
            IndexKey::new(path, verb.parse()?, StatusCode::new(status)?, MediaType::parse(media_type)?);
        self.lookup_key(&key)
    }

    /// Looks up an example by typed key.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::NotFound`] when no example exists.
    pub fn lookup_key(&self, key: &IndexKey) -> Result<&str, LookupError> {
        self.get(key).ok_or_else(|| LookupError::NotFound {
            path: key.path.clone(),
            verb: key.verb,
            status: key.status,
            media_type: key.media_type.clone(),
        })
    }

    /// Returns the example for `key`, if present.
    #[must_use]
    pub fn get(&self, key: &IndexKey) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Returns the number of indexed examples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the contract declared no examples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over all entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&IndexKey, &str)> {
        self.entries.iter().map(|(key, example)| (key, example.as_str()))
    }

    /// Returns the distinct resource paths that carry at least one example.
    #[must_use]
    pub fn paths(&self) -> BTreeSet<&str> {
        self.entries.keys().map(|key| key.path.as_str()).collect()
    }

    /// Returns the verbs with examples for `path`.
    #[must_use]
    pub fn methods_for(&self, path: &str) -> BTreeSet<HttpVerb> {
        let path = join_path("", path);
        self.entries.keys().filter(|key| key.path == path).map(|key| key.verb).collect()
    }

    /// Returns the nested path → verb → status → media type view.
    #[must_use]
    pub fn nested(&self) -> NestedIndex {
        let mut nested = NestedIndex::new();
        for (key, example) in &self.entries {
            nested
                .entry(key.path.clone())
                .or_default()
                .entry(key.verb)
                .or_default()
                .entry(key.status)
                .or_default()
                .insert(key.media_type.clone(), example.clone());
        }
        nested
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Joins a parent full path and a relative segment into a full path.
///
/// Empty segments are dropped, so repeated separators collapse to one.
pub(crate) fn join_path(parent: &str, segment: &str) -> String {
    let mut joined = String::new();
    let parts = parent.split('/').chain(segment.trim().split('/'));
    for part in parts.filter(|part| !part.is_empty()) {
        joined.push('/');
        joined.push_str(part);
    }
    if joined.is_empty() {
        joined.push('/');
    }
    joined
}

#[cfg(test)]
mod tests;
