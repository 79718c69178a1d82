// crates/cargowhale-contract/src/verify.rs
// ============================================================================
// Module: Contract Verification
// Description: Compare live response bodies against contract examples.
// Purpose: Give verification suites a single comparison rule per media type.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! [`ContractVerifier`] fetches the declared example for a key and compares it
//! with an observed body. JSON media types compare as parsed values, so key
//! order and whitespace do not matter; everything else compares byte-for-byte.
//! An observed JSON body that does not parse is a mismatch, not an error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;

use crate::index::ContractIndex;
use crate::index::IndexKey;
use crate::index::LookupError;

// ============================================================================
// SECTION: Verification Outcome
// ============================================================================

/// Result of comparing an observed body with the contract example.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// Observed body matches the example.
    Match,
    /// Observed body differs from the example.
    Mismatch {
        /// Example declared by the contract.
        expected: String,
        /// Body observed from the live endpoint.
        actual: String,
    },
}

impl Verification {
    /// Returns true for [`Verification::Match`].
    #[must_use]
    pub const fn is_match(&self) -> bool {
        matches!(self, Self::Match)
    }
}

// ============================================================================
// SECTION: Verifier
// ============================================================================

/// Compares observed bodies with indexed contract examples.
#[derive(Debug, Clone, Copy)]
pub struct ContractVerifier<'a> {
    /// Index providing expected examples.
    index: &'a ContractIndex,
}

impl<'a> ContractVerifier<'a> {
    /// Creates a verifier over `index`.
    #[must_use]
    pub const fn new(index: &'a ContractIndex) -> Self {
        Self {
            index,
        }
    }

    /// Verifies `actual` against the example declared for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::NotFound`] when the contract has no example for
    /// `key`.
    pub fn verify(&self, key: &IndexKey, actual: &str) -> Result<Verification, LookupError> {
        let expected = self.index.lookup_key(key)?;
        let matches = if key.media_type.is_json() {
            json_equivalent(expected, actual)
        } else {
            expected == actual
        };
        if matches {
            return Ok(Verification::Match);
        }
        Ok(Verification::Mismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        })
    }
}

/// Compares two JSON texts as values, falling back to text equality when the
/// example itself is not valid JSON.
fn json_equivalent(expected: &str, actual: &str) -> bool {
    let Ok(expected_value) = serde_json::from_str::<Value>(expected) else {
        return expected == actual;
    };
    serde_json::from_str::<Value>(actual).is_ok_and(|actual_value| actual_value == expected_value)
}
