//! v1 cross-boundary contracts for the scenario kernel, service, archive, and HTTP layer.

mod bounds;
mod land_cover;

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use bounds::{NumericRange, ScenarioBounds, YearRange};
pub use land_cover::{LandCoverClass, LandCoverDistribution};

pub const SCHEMA_VERSION_V1: &str = "1.0";

/// Hypothetical climate and urbanization deltas applied to a baseline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioParameters {
    pub region: String,
    pub target_year: i32,
    /// Percent change in annual rainfall.
    pub rainfall_delta: f64,
    /// Change in mean temperature, °C.
    pub temperature_delta: f64,
    /// Percent growth of built-up area.
    pub urban_growth: f64,
}

impl ScenarioParameters {
    pub fn new(
        region: impl Into<String>,
        target_year: i32,
        rainfall_delta: f64,
        temperature_delta: f64,
        urban_growth: f64,
    ) -> Self {
        Self {
            region: region.into(),
            target_year,
            rainfall_delta,
            temperature_delta,
            urban_growth,
        }
    }
}

/// Earth-observation snapshot the scenario is applied to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BaselineState {
    pub region: String,
    pub baseline_year: i32,
    /// `[min_lon, min_lat, max_lon, max_lat]`
    pub bounding_box: [f64; 4],
    /// Pixel counts keyed by Dynamic World class id (`"0"`..`"8"`).
    #[serde(default)]
    pub land_cover_counts: BTreeMap<String, f64>,
    pub rainfall_mm: f64,
    pub temperature_c: f64,
    pub ndvi: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StressLevel {
    Low,
    Mild,
    Moderate,
    High,
    Severe,
}

impl StressLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Mild => "mild",
            Self::Moderate => "moderate",
            Self::High => "high",
            Self::Severe => "severe",
        }
    }
}

impl fmt::Display for StressLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct StressInputs {
    pub rainfall_delta_pct: f64,
    pub temperature_delta_c: f64,
    pub baseline_ndvi: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClimateStressResult {
    pub rainfall_stress: f64,
    pub temperature_stress: f64,
    pub combined_stress: f64,
    pub vegetation_stress_index: f64,
    pub crop_stress_level: StressLevel,
    pub inputs: StressInputs,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransitionStage {
    Stress,
    Urbanization,
}

/// Percentage points moved between two classes during one transform stage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransitionRecord {
    pub stage: TransitionStage,
    pub from: LandCoverClass,
    pub to: LandCoverClass,
    pub amount_pct: f64,
}

impl TransitionRecord {
    /// e.g. `trees_to_grass`
    pub fn name(&self) -> String {
        format!("{}_to_{}", self.from, self.to)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LandCoverSource {
    Observed,
    Defaulted,
}

/// Where the baseline state behind a result came from.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BaselineSourceKind {
    /// Handed in directly by the caller.
    #[default]
    Supplied,
    /// Built-in stand-in baseline.
    Fixture,
    /// Read from a baseline file on disk.
    File,
}

impl BaselineSourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Supplied => "supplied",
            Self::Fixture => "fixture",
            Self::File => "file",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationMetadata {
    pub region: String,
    pub baseline_year: i32,
    pub target_year: i32,
    pub generated_at: DateTime<Utc>,
    pub land_cover_source: LandCoverSource,
    #[serde(default)]
    pub baseline_source: BaselineSourceKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LandCoverOutcome {
    pub baseline: LandCoverDistribution,
    pub future: LandCoverDistribution,
    pub transitions: Vec<TransitionRecord>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AreaMetrics {
    pub total_area_km2: f64,
    pub degraded_area_km2: f64,
    pub urbanized_area_km2: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SummaryStats {
    pub built_change_pct: f64,
    pub trees_change_pct: f64,
    pub crops_change_pct: f64,
    pub grass_change_pct: f64,
    pub bare_change_pct: f64,
    pub vegetation_loss_pct: f64,
    pub baseline_rainfall_mm: f64,
    pub future_rainfall_mm: f64,
    pub baseline_temp_celsius: f64,
    pub future_temp_celsius: f64,
    pub urban_area_baseline_pct: f64,
    pub urban_area_future_pct: f64,
    pub urban_gain_pct: f64,
    pub crop_stress_index: f64,
    pub overall_stress_level: StressLevel,
}

/// Immutable outcome of one scenario run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationResult {
    pub schema_version: String,
    pub scenario_id: String,
    pub metadata: SimulationMetadata,
    pub scenario: ScenarioParameters,
    pub climate_stress: ClimateStressResult,
    pub land_cover: LandCoverOutcome,
    pub area_metrics: AreaMetrics,
    pub summary_stats: SummaryStats,
}

impl SimulationResult {
    /// Compares everything except `generated_at`.
    pub fn same_outcome(&self, other: &Self) -> bool {
        let mut aligned = other.clone();
        aligned.metadata.generated_at = self.metadata.generated_at;
        *self == aligned
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheStats {
    pub schema_version: String,
    pub size: usize,
    pub max_size: usize,
    pub ttl_seconds: u64,
    pub fingerprints: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidScenario,
    ScenarioNotFound,
    RegionNotFound,
    MalformedBaseline,
    ComputationFailure,
    CacheUnavailable,
    InternalError,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiError {
    pub schema_version: String,
    pub error_code: ErrorCode,
    pub message: String,
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(error_code: ErrorCode, message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            error_code,
            message: message.into(),
            details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_serializes_screaming_snake() {
        let error = ApiError::new(ErrorCode::MalformedBaseline, "bad bbox", None);
        let encoded = serde_json::to_value(&error).expect("serialize error");
        assert_eq!(encoded["error_code"], "MALFORMED_BASELINE");
        assert_eq!(encoded["schema_version"], SCHEMA_VERSION_V1);
    }

    #[test]
    fn metadata_without_baseline_source_reads_as_supplied() {
        let raw = r#"{
            "region": "Kerala",
            "baseline_year": 2020,
            "target_year": 2035,
            "generated_at": "2024-01-01T00:00:00Z",
            "land_cover_source": "observed"
        }"#;
        let metadata: SimulationMetadata = serde_json::from_str(raw).expect("parse metadata");
        assert_eq!(metadata.baseline_source, BaselineSourceKind::Supplied);

        let encoded = serde_json::to_value(BaselineSourceKind::Fixture).expect("encode kind");
        assert_eq!(encoded, "fixture");
    }

    #[test]
    fn baseline_counts_default_to_empty() {
        let raw = r#"{
            "region": "test",
            "baseline_year": 2020,
            "bounding_box": [77.0, 10.0, 80.0, 13.0],
            "rainfall_mm": 1000.0,
            "temperature_c": 25.0,
            "ndvi": 0.55
        }"#;
        let baseline: BaselineState = serde_json::from_str(raw).expect("parse baseline");
        assert!(baseline.land_cover_counts.is_empty());
    }

    #[test]
    fn transition_record_name_joins_classes() {
        let record = TransitionRecord {
            stage: TransitionStage::Urbanization,
            from: LandCoverClass::Crops,
            to: LandCoverClass::Built,
            amount_pct: 3.0,
        };
        assert_eq!(record.name(), "crops_to_built");
    }
}
