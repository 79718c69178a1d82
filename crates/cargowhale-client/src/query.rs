// crates/cargowhale-client/src/query.rs
// ============================================================================
// Module: Query Encoding
// Description: Deterministic query-string construction from filter values.
// Purpose: Emit parameters in the order each filter declares them.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Filters implement [`QueryParameters`] by listing their `(name, value)` pairs
//! explicitly. [`encode_query`] joins them as `?k=v&k=v` in exactly that order
//! and performs no percent-encoding; values are expected to be simple tokens
//! or a JSON document handed to the transport as-is.

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Value object that maps onto an ordered list of query parameters.
pub trait QueryParameters {
    /// Returns the parameters to emit, in emission order. Absent optional
    /// fields are left out.
    fn query_pairs(&self) -> Vec<(&'static str, String)>;
}

// ============================================================================
// SECTION: Encoder
// ============================================================================

/// Encodes `filter` as `?k=v&k=v`, or the empty string when it has no
/// parameters.
#[must_use]
pub fn encode_query<Q: QueryParameters + ?Sized>(filter: &Q) -> String {
    let pairs = filter.query_pairs();
    let mut query = String::new();
    for (position, (name, value)) in pairs.iter().enumerate() {
        query.push(if position == 0 { '?' } else { '&' });
        query.push_str(name);
        query.push('=');
        query.push_str(value);
    }
    query
}

// ============================================================================
// SECTION: Fixed Queries
// ============================================================================

/// Query selecting every container, running or not (`?all=1`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListAll;

impl QueryParameters for ListAll {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![("all", "1".to_string())]
    }
}
