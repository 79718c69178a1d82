// crates/cargowhale-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration payloads.
// Purpose: Deterministic examples for docs and tooling.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Canonical example for CargoWhale configuration. The output is
//! deterministic and always parses and validates.

/// Returns a canonical example `cargowhale.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"[docker]
endpoint = "http://localhost:2375/containers/"
timeout_ms = 5000
max_response_bytes = 4194304

[docker.routes]
list_containers = "json"
container_by_id = "{id}/json"
container_logs = "{id}/logs"
container_processes = "{id}/top"

[metrics.logs]
enabled = false
period_ms = 60000

[contract]
path = "contracts/docker-engine.yaml"
"#,
    )
}
