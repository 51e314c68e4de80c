//! Deterministic scenario fingerprints.
//!
//! The fingerprint is both the public scenario id and the result-cache key.
//! Inputs are rendered into a canonical JSON document (sorted keys, floats
//! at fixed precision) and hashed with SHA-256; the hex digest is truncated
//! to the configured length.

use std::collections::BTreeMap;

use contracts::ScenarioParameters;
use serde_json::Value;
use sha2::{Digest, Sha256};

pub const DEFAULT_FINGERPRINT_LENGTH: usize = 12;
pub const MIN_FINGERPRINT_LENGTH: usize = 8;
pub const MAX_FINGERPRINT_LENGTH: usize = 64;

const FLOAT_DECIMALS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScenarioIdentity {
    length: usize,
}

impl Default for ScenarioIdentity {
    fn default() -> Self {
        Self {
            length: DEFAULT_FINGERPRINT_LENGTH,
        }
    }
}

impl ScenarioIdentity {
    /// Hex length is clamped to `[MIN_FINGERPRINT_LENGTH, MAX_FINGERPRINT_LENGTH]`.
    pub fn with_length(length: usize) -> Self {
        Self {
            length: length.clamp(MIN_FINGERPRINT_LENGTH, MAX_FINGERPRINT_LENGTH),
        }
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn fingerprint(
        &self,
        region: &str,
        baseline_year: i32,
        scenario: &ScenarioParameters,
    ) -> String {
        let document = canonical_document(region, baseline_year, scenario);
        let digest = format!("{:x}", Sha256::digest(document.as_bytes()));
        digest[..self.length].to_string()
    }
}

/// Sorted-key JSON rendering of the fingerprint inputs.
pub fn canonical_document(region: &str, baseline_year: i32, scenario: &ScenarioParameters) -> String {
    let scenario_fields = BTreeMap::from([
        ("rainfall_delta", fixed(scenario.rainfall_delta)),
        ("region", Value::from(scenario.region.as_str())),
        ("target_year", Value::from(scenario.target_year)),
        ("temperature_delta", fixed(scenario.temperature_delta)),
        ("urban_growth", fixed(scenario.urban_growth)),
    ]);

    let document = BTreeMap::from([
        ("baseline_year", Value::from(baseline_year)),
        ("region", Value::from(region)),
        ("scenario", sorted_object(scenario_fields)),
    ]);

    sorted_object(document).to_string()
}

fn sorted_object(fields: BTreeMap<&str, Value>) -> Value {
    Value::Object(
        fields
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect(),
    )
}

fn fixed(value: f64) -> Value {
    // `+ 0.0` folds -0.0 into 0.0
    Value::String(format!("{:.*}", FLOAT_DECIMALS, value + 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> ScenarioParameters {
        ScenarioParameters::new("Tamil Nadu", 2035, -15.0, 1.2, 30.0)
    }

    #[test]
    fn fingerprint_is_twelve_lowercase_hex_chars() {
        let id = ScenarioIdentity::default().fingerprint("Tamil Nadu", 2020, &scenario());
        assert_eq!(id.len(), 12);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn integral_and_fractional_spellings_agree() {
        let identity = ScenarioIdentity::default();
        let a = scenario();
        let mut b = scenario();
        b.rainfall_delta = -15_i32 as f64;
        b.urban_growth = 30.000_000_000_1;

        assert_eq!(
            identity.fingerprint("Tamil Nadu", 2020, &a),
            identity.fingerprint("Tamil Nadu", 2020, &b)
        );
    }

    #[test]
    fn negative_zero_matches_zero() {
        let identity = ScenarioIdentity::default();
        let mut a = scenario();
        a.temperature_delta = 0.0;
        let mut b = scenario();
        b.temperature_delta = -0.0;

        assert_eq!(
            identity.fingerprint("Tamil Nadu", 2020, &a),
            identity.fingerprint("Tamil Nadu", 2020, &b)
        );
    }

    #[test]
    fn every_field_changes_the_fingerprint() {
        let identity = ScenarioIdentity::default();
        let base = identity.fingerprint("Tamil Nadu", 2020, &scenario());

        let mut variants = Vec::new();
        let mut s = scenario();
        s.rainfall_delta = -10.0;
        variants.push(identity.fingerprint("Tamil Nadu", 2020, &s));
        let mut s = scenario();
        s.temperature_delta = 1.3;
        variants.push(identity.fingerprint("Tamil Nadu", 2020, &s));
        let mut s = scenario();
        s.urban_growth = 31.0;
        variants.push(identity.fingerprint("Tamil Nadu", 2020, &s));
        let mut s = scenario();
        s.target_year = 2036;
        variants.push(identity.fingerprint("Tamil Nadu", 2020, &s));
        variants.push(identity.fingerprint("Kerala", 2020, &scenario()));
        variants.push(identity.fingerprint("Tamil Nadu", 2021, &scenario()));

        for variant in variants {
            assert_ne!(variant, base);
        }
    }

    #[test]
    fn canonical_document_sorts_keys() {
        let document = canonical_document("Tamil Nadu", 2020, &scenario());
        assert_eq!(
            document,
            concat!(
                r#"{"baseline_year":2020,"region":"Tamil Nadu","scenario":{"#,
                r#""rainfall_delta":"-15.000000","region":"Tamil Nadu","target_year":2035,"#,
                r#""temperature_delta":"1.200000","urban_growth":"30.000000"}}"#
            )
        );
    }

    #[test]
    fn length_is_configurable_and_clamped() {
        let full = ScenarioIdentity::with_length(64).fingerprint("x", 2020, &scenario());
        assert_eq!(full.len(), 64);

        let short = ScenarioIdentity::with_length(12).fingerprint("x", 2020, &scenario());
        assert!(full.starts_with(&short));

        assert_eq!(ScenarioIdentity::with_length(2).length(), MIN_FINGERPRINT_LENGTH);
        assert_eq!(ScenarioIdentity::with_length(500).length(), MAX_FINGERPRINT_LENGTH);
    }
}
