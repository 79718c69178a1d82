// crates/cargowhale-contract/tests/common/mod.rs
// ============================================================================
// Module: Common Test Utilities
// Description: Shared helpers for cargowhale-contract integration tests.
// Purpose: Locate fixtures and build small contract trees.
// Dependencies: cargowhale-contract
// ============================================================================

//! ## Overview
//! Fixture lookup and tree builders shared by the contract integration tests.

#![allow(
    dead_code,
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::missing_panics_doc,
    reason = "Shared helpers are not used by every test binary."
)]

use std::path::PathBuf;

use cargowhale_contract::ContractDocument;
use cargowhale_contract::ContractIndex;
use cargowhale_contract::HttpVerb;
use cargowhale_contract::MediaType;
use cargowhale_contract::Method;
use cargowhale_contract::Response;
use cargowhale_contract::StatusCode;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Returns the absolute path of a file under `tests/fixtures`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join(name)
}

/// Loads and flattens the Docker Engine fixture contract.
pub fn docker_engine_index() -> ContractIndex {
    ContractDocument::load(&fixture_path("docker-engine.yaml"))
        .expect("fixture loads")
        .into_index()
        .expect("fixture flattens")
}

// ============================================================================
// SECTION: Builders
// ============================================================================

/// Returns a GET method answering 200 with one JSON example.
pub fn get_json(example: &str) -> Method {
    Method::new(HttpVerb::Get)
        .with_response(Response::new(StatusCode::OK).with_body(MediaType::json(), example))
}
