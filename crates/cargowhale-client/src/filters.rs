// crates/cargowhale-client/src/filters.rs
// ============================================================================
// Module: Request Filters
// Description: Log and container-list filters with declared parameter order.
// Purpose: Immutable value objects mapping 1:1 to query parameters.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! [`LogFilters`] emits up to six scalar parameters in the fixed order
//! `follow, stdout, stderr, since, timestamps, tail`; booleans encode as `0`
//! or `1`. [`ContainerFilters`] is serialized to a Docker filter map such as
//! `{"status":["running"]}` and passed as the single `filters` parameter.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde_json::Map;
use serde_json::Value;

use crate::query::QueryParameters;

// ============================================================================
// SECTION: Log Filters
// ============================================================================

/// Number of trailing log lines to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTail {
    /// Every line.
    All,
    /// The last `n` lines.
    Lines(u64),
}

impl fmt::Display for LogTail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Lines(count) => write!(f, "{count}"),
        }
    }
}

/// Filters for the container logs request. Unset fields are omitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogFilters {
    /// Stream logs instead of returning a snapshot.
    pub follow: Option<bool>,
    /// Include standard output.
    pub stdout: Option<bool>,
    /// Include standard error.
    pub stderr: Option<bool>,
    /// Only lines after this UNIX timestamp.
    pub since: Option<i64>,
    /// Prefix lines with timestamps.
    pub timestamps: Option<bool>,
    /// Trailing line count.
    pub tail: Option<LogTail>,
}

impl LogFilters {
    /// Creates filters with every field unset.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            follow: None,
            stdout: None,
            stderr: None,
            since: None,
            timestamps: None,
            tail: None,
        }
    }

    /// Sets `follow`.
    #[must_use]
    pub const fn follow(mut self, follow: bool) -> Self {
        self.follow = Some(follow);
        self
    }

    /// Sets `stdout`.
    #[must_use]
    pub const fn stdout(mut self, stdout: bool) -> Self {
        self.stdout = Some(stdout);
        self
    }

    /// Sets `stderr`.
    #[must_use]
    pub const fn stderr(mut self, stderr: bool) -> Self {
        self.stderr = Some(stderr);
        self
    }

    /// Sets `since`.
    #[must_use]
    pub const fn since(mut self, since: i64) -> Self {
        self.since = Some(since);
        self
    }

    /// Sets `timestamps`.
    #[must_use]
    pub const fn timestamps(mut self, timestamps: bool) -> Self {
        self.timestamps = Some(timestamps);
        self
    }

    /// Sets `tail`.
    #[must_use]
    pub const fn tail(mut self, tail: LogTail) -> Self {
        self.tail = Some(tail);
        self
    }
}

impl QueryParameters for LogFilters {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(6);
        if let Some(follow) = self.follow {
            pairs.push(("follow", flag(follow)));
        }
        if let Some(stdout) = self.stdout {
            pairs.push(("stdout", flag(stdout)));
        }
        if let Some(stderr) = self.stderr {
            pairs.push(("stderr", flag(stderr)));
        }
        if let Some(since) = self.since {
            pairs.push(("since", since.to_string()));
        }
        if let Some(timestamps) = self.timestamps {
            pairs.push(("timestamps", flag(timestamps)));
        }
        if let Some(tail) = self.tail {
            pairs.push(("tail", tail.to_string()));
        }
        pairs
    }
}

/// Encodes a boolean as `1` or `0`.
fn flag(value: bool) -> String {
    if value { "1" } else { "0" }.to_string()
}

// ============================================================================
// SECTION: Container Filters
// ============================================================================

/// Docker container-list filters. Empty fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerFilters {
    /// Container states (`running`, `exited`, ...).
    pub status: Vec<String>,
    /// Container names.
    pub name: Vec<String>,
    /// Labels as `key` or `key=value`.
    pub label: Vec<String>,
    /// Container ids or id prefixes.
    pub id: Vec<String>,
    /// Image ancestors.
    pub ancestor: Vec<String>,
    /// Exit codes.
    pub exited: Vec<i32>,
}

impl ContainerFilters {
    /// Creates filters with every field empty.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a status filter.
    #[must_use]
    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status.push(status.into());
        self
    }

    /// Adds a name filter.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name.push(name.into());
        self
    }

    /// Adds a label filter.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label.push(label.into());
        self
    }

    /// Adds an id filter.
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id.push(id.into());
        self
    }

    /// Adds an ancestor image filter.
    #[must_use]
    pub fn ancestor(mut self, ancestor: impl Into<String>) -> Self {
        self.ancestor.push(ancestor.into());
        self
    }

    /// Adds an exit code filter.
    #[must_use]
    pub fn exited(mut self, code: i32) -> Self {
        self.exited.push(code);
        self
    }

    /// Returns true when no filter is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.status.is_empty()
            && self.name.is_empty()
            && self.label.is_empty()
            && self.id.is_empty()
            && self.ancestor.is_empty()
            && self.exited.is_empty()
    }

    /// Serializes the filters as a Docker filter map.
    #[must_use]
    pub fn to_json(&self) -> String {
        let mut map = Map::new();
        insert_strings(&mut map, "status", &self.status);
        insert_strings(&mut map, "name", &self.name);
        insert_strings(&mut map, "label", &self.label);
        insert_strings(&mut map, "id", &self.id);
        insert_strings(&mut map, "ancestor", &self.ancestor);
        if !self.exited.is_empty() {
            let codes = self.exited.iter().map(|code| Value::String(code.to_string())).collect();
            map.insert("exited".to_string(), Value::Array(codes));
        }
        Value::Object(map).to_string()
    }
}

impl QueryParameters for ContainerFilters {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        if self.is_empty() {
            return Vec::new();
        }
        vec![("filters", self.to_json())]
    }
}

/// Inserts a non-empty string list under `key`.
fn insert_strings(map: &mut Map<String, Value>, key: &str, values: &[String]) {
    if values.is_empty() {
        return;
    }
    let values = values.iter().cloned().map(Value::String).collect();
    map.insert(key.to_string(), Value::Array(values));
}
