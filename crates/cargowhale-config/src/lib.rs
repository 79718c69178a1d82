// crates/cargowhale-config/src/lib.rs
// ============================================================================
// Module: CargoWhale Config Library
// Description: Canonical config model, validation, and examples.
// Purpose: Single source of truth for cargowhale.toml semantics.
// Dependencies: cargowhale-client, serde, toml
// ============================================================================

//! ## Overview
//! `cargowhale-config` defines the `cargowhale.toml` model: the upstream
//! container endpoint and its routes, the metrics log sink, and the contract
//! document location. Loading is strict and fail-closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod examples;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use examples::config_toml_example;
