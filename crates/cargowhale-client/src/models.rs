// crates/cargowhale-client/src/models.rs
// ============================================================================
// Module: Container Models
// Description: Typed views of container runtime responses.
// Purpose: Decode the subset of upstream JSON the gateway exposes.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Upstream objects use PascalCase keys. Decoding is lenient: unknown keys
//! are ignored and missing keys take their default, so a newer runtime that
//! adds or drops fields still decodes. Type mismatches still fail.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Container Summary
// ============================================================================

/// Entry of the container list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ContainerSummary {
    /// Container id.
    pub id: String,
    /// Container names, each with a leading `/`.
    pub names: Vec<String>,
    /// Image reference the container was created from.
    pub image: String,
    /// Image id.
    #[serde(rename = "ImageID")]
    pub image_id: String,
    /// Command line.
    pub command: String,
    /// Creation time as a UNIX timestamp.
    pub created: i64,
    /// Runtime state (`running`, `exited`, ...).
    pub state: String,
    /// Human-readable status.
    pub status: String,
    /// Exposed ports.
    pub ports: Vec<ContainerPort>,
    /// Container labels.
    pub labels: BTreeMap<String, String>,
}

/// Port mapping reported in the container list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ContainerPort {
    /// Host address the port is bound to.
    #[serde(rename = "IP", skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    /// Port inside the container.
    pub private_port: u16,
    /// Port on the host.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_port: Option<u16>,
    /// Protocol (`tcp`, `udp`, `sctp`).
    #[serde(rename = "Type")]
    pub protocol: String,
}

// ============================================================================
// SECTION: Container Details
// ============================================================================

/// Inspection result for one container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ContainerDetails {
    /// Container id.
    pub id: String,
    /// Creation time (RFC 3339).
    pub created: String,
    /// Entrypoint path.
    pub path: String,
    /// Entrypoint arguments.
    pub args: Vec<String>,
    /// Runtime state.
    pub state: ContainerState,
    /// Image id.
    pub image: String,
    /// Container name with a leading `/`.
    pub name: String,
    /// Restart count.
    pub restart_count: u32,
}

/// Runtime state block of [`ContainerDetails`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ContainerState {
    /// State label.
    pub status: String,
    /// Whether the container is running.
    pub running: bool,
    /// Whether the container is paused.
    pub paused: bool,
    /// Whether the container is restarting.
    pub restarting: bool,
    /// Main process id, 0 when stopped.
    pub pid: i64,
    /// Last exit code.
    pub exit_code: i64,
    /// Start time (RFC 3339).
    pub started_at: String,
    /// Finish time (RFC 3339).
    pub finished_at: String,
}

// ============================================================================
// SECTION: Logs And Processes
// ============================================================================

/// Raw log output of one container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerLogs {
    /// Log body exactly as returned upstream.
    pub logs: String,
}

/// Process table of one container.
///
/// # Invariants
/// - Each row of `processes` lines up with `titles` as returned upstream;
///   rows are not reshaped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ContainerProcessIndex {
    /// Column titles.
    pub titles: Vec<String>,
    /// Process rows.
    pub processes: Vec<Vec<String>>,
}
