// crates/cargowhale-contract/src/document.rs
// ============================================================================
// Module: Contract Documents
// Description: JSON and YAML contract document loading.
// Purpose: Decode an authored contract into a resource tree with size limits.
// Dependencies: serde, serde_json, serde_yaml, std
// ============================================================================

//! ## Overview
//! A contract document names the API and lists its top-level resources. The
//! document root becomes an unnamed resource (keyed as `/`) whose children are
//! the declared resources, so top-level methods live on explicit resources.
//!
//! ```yaml
//! title: Docker Engine
//! version: v1.43
//! resources:
//!   - path: /containers
//!     resources:
//!       - path: /json
//!         methods:
//!           - verb: get
//!             responses:
//!               - status: 200
//!                 bodies:
//!                   - media_type: application/json
//!                     example: "[]"
//! ```

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

use crate::ContractError;
use crate::index::ContractIndex;
use crate::model::ContractModel;
use crate::model::Resource;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum accepted contract document size in bytes.
pub const MAX_DOCUMENT_BYTES: usize = 4 * 1024 * 1024;

// ============================================================================
// SECTION: Document Format
// ============================================================================

/// Serialization format of a contract document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// JSON document.
    Json,
    /// YAML document.
    Yaml,
}

impl DocumentFormat {
    /// Selects the format from a file extension.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::Document`] for unknown or missing extensions.
    pub fn from_path(path: &Path) -> Result<Self, ContractError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(ContractError::Document(format!(
                "unsupported contract document extension: {}",
                path.display()
            ))),
        }
    }
}

// ============================================================================
// SECTION: Contract Document
// ============================================================================

/// Decoded contract document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContractDocument {
    /// Human-readable API title.
    #[serde(default)]
    pub title: Option<String>,
    /// API version label.
    #[serde(default)]
    pub version: Option<String>,
    /// Top-level resources.
    #[serde(default)]
    pub resources: Vec<Resource>,
}

impl ContractDocument {
    /// Decodes a JSON contract document.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::Document`] when the document is too large or
    /// does not decode.
    pub fn from_json_str(content: &str) -> Result<Self, ContractError> {
        enforce_size(content.len())?;
        serde_json::from_str(content).map_err(|err| ContractError::Document(err.to_string()))
    }

    /// Decodes a YAML contract document.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::Document`] when the document is too large or
    /// does not decode.
    pub fn from_yaml_str(content: &str) -> Result<Self, ContractError> {
        enforce_size(content.len())?;
        serde_yaml::from_str(content).map_err(|err| ContractError::Document(err.to_string()))
    }

    /// Reads and decodes a contract document, choosing the format by
    /// extension.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::Io`] when the file cannot be read and
    /// [`ContractError::Document`] when it does not decode.
    pub fn load(path: &Path) -> Result<Self, ContractError> {
        let format = DocumentFormat::from_path(path)?;
        let bytes = fs::read(path).map_err(|err| ContractError::Io(err.to_string()))?;
        enforce_size(bytes.len())?;
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ContractError::Document("contract document must be utf-8".to_string()))?;
        match format {
            DocumentFormat::Json => Self::from_json_str(content),
            DocumentFormat::Yaml => Self::from_yaml_str(content),
        }
    }

    /// Returns the document as an owned tree rooted at an unnamed resource.
    #[must_use]
    pub fn into_tree(self) -> Resource {
        Resource {
            path: String::new(),
            methods: Vec::new(),
            children: self.resources,
        }
    }

    /// Returns the document as an arena model.
    #[must_use]
    pub fn into_model(self) -> ContractModel {
        ContractModel::from_tree(self.into_tree())
    }

    /// Flattens the document into an index.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::Malformed`] when the document declares a key
    /// twice.
    pub fn into_index(self) -> Result<ContractIndex, ContractError> {
        ContractIndex::build(&self.into_model())
    }
}

/// Rejects documents above [`MAX_DOCUMENT_BYTES`].
fn enforce_size(actual_bytes: usize) -> Result<(), ContractError> {
    if actual_bytes > MAX_DOCUMENT_BYTES {
        return Err(ContractError::Document(format!(
            "contract document exceeds size limit: {actual_bytes} bytes (max {MAX_DOCUMENT_BYTES})"
        )));
    }
    Ok(())
}
