//! Ordered scenario run: identity, baseline distribution, stress, transition,
//! area metrics, then the assembled result.

use chrono::{DateTime, Utc};
use contracts::{
    BaselineSourceKind, BaselineState, LandCoverOutcome, ScenarioParameters, SimulationMetadata,
    SimulationResult, SCHEMA_VERSION_V1,
};
use tracing::{debug, info};

use crate::area::{area_metrics, region_area_km2, validate_bounding_box};
use crate::distribution::DefaultDistributionPolicy;
use crate::error::{ensure_finite, PipelineStage, Result, SimulationError};
use crate::identity::ScenarioIdentity;
use crate::{stress, summary, transition};

#[derive(Debug, Clone, Default)]
pub struct SimulationPipeline {
    identity: ScenarioIdentity,
    policy: DefaultDistributionPolicy,
}

impl SimulationPipeline {
    pub fn new(identity: ScenarioIdentity, policy: DefaultDistributionPolicy) -> Self {
        Self { identity, policy }
    }

    pub fn identity(&self) -> ScenarioIdentity {
        self.identity
    }

    pub fn fingerprint(&self, baseline: &BaselineState, scenario: &ScenarioParameters) -> String {
        self.identity
            .fingerprint(&baseline.region, baseline.baseline_year, scenario)
    }

    pub fn run(
        &self,
        baseline: &BaselineState,
        scenario: &ScenarioParameters,
    ) -> Result<SimulationResult> {
        self.run_at(baseline, scenario, Utc::now())
    }

    /// Runs every stage in order; the first failing stage aborts the run.
    pub fn run_at(
        &self,
        baseline: &BaselineState,
        scenario: &ScenarioParameters,
        generated_at: DateTime<Utc>,
    ) -> Result<SimulationResult> {
        check_baseline(baseline)?;

        let scenario_id = self.fingerprint(baseline, scenario);
        debug!(%scenario_id, region = %baseline.region, "scenario run started");

        let (baseline_cover, land_cover_source) =
            self.policy.resolve(&baseline.land_cover_counts)?;

        let climate_stress = stress::evaluate(
            scenario.rainfall_delta,
            scenario.temperature_delta,
            baseline.ndvi,
        )?;

        let outcome = transition::apply(
            &baseline_cover,
            climate_stress.vegetation_stress_index,
            scenario.urban_growth,
        )?;

        let total_area_km2 = ensure_finite(
            PipelineStage::AreaMetrics,
            "total_area_km2",
            region_area_km2(&baseline.bounding_box),
        )?;
        let area_metrics = area_metrics(total_area_km2, &baseline_cover, &outcome.future);

        let summary_stats = summary::summarize(
            baseline,
            scenario,
            &climate_stress,
            &baseline_cover,
            &outcome.future,
        );
        ensure_finite(
            PipelineStage::Summary,
            "future_rainfall_mm",
            summary_stats.future_rainfall_mm,
        )?;

        info!(
            %scenario_id,
            stress_level = %climate_stress.crop_stress_level,
            vegetation_stress = climate_stress.vegetation_stress_index,
            "scenario run completed"
        );

        Ok(SimulationResult {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            scenario_id,
            metadata: SimulationMetadata {
                region: baseline.region.clone(),
                baseline_year: baseline.baseline_year,
                target_year: scenario.target_year,
                generated_at,
                land_cover_source,
                baseline_source: BaselineSourceKind::default(),
            },
            scenario: scenario.clone(),
            climate_stress,
            land_cover: LandCoverOutcome {
                baseline: baseline_cover,
                future: outcome.future,
                transitions: outcome.transitions,
            },
            area_metrics,
            summary_stats,
        })
    }
}

fn check_baseline(baseline: &BaselineState) -> Result<()> {
    validate_bounding_box(&baseline.bounding_box)?;

    if !baseline.ndvi.is_finite() || !(-1.0..=1.0).contains(&baseline.ndvi) {
        return Err(SimulationError::malformed(
            "ndvi",
            format!("expected a finite value in [-1, 1], got {}", baseline.ndvi),
        ));
    }
    if !baseline.rainfall_mm.is_finite() || baseline.rainfall_mm < 0.0 {
        return Err(SimulationError::malformed(
            "rainfall_mm",
            format!("expected a finite, non-negative value, got {}", baseline.rainfall_mm),
        ));
    }
    if !baseline.temperature_c.is_finite() {
        return Err(SimulationError::malformed(
            "temperature_c",
            format!("expected a finite value, got {}", baseline.temperature_c),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use contracts::{LandCoverClass, LandCoverSource, StressLevel};

    use super::*;

    fn baseline() -> BaselineState {
        BaselineState {
            region: "test".to_string(),
            baseline_year: 2020,
            bounding_box: [77.0, 10.0, 80.0, 13.0],
            land_cover_counts: BTreeMap::new(),
            rainfall_mm: 1000.0,
            temperature_c: 25.0,
            ndvi: 0.55,
        }
    }

    fn scenario() -> ScenarioParameters {
        ScenarioParameters::new("test", 2035, -15.0, 1.2, 30.0)
    }

    #[test]
    fn reference_scenario_end_to_end() {
        let result = SimulationPipeline::default()
            .run(&baseline(), &scenario())
            .expect("run should succeed");

        assert_eq!(result.scenario_id.len(), 12);
        assert_eq!(result.metadata.land_cover_source, LandCoverSource::Defaulted);
        assert_eq!(result.metadata.target_year, 2035);
        assert!((result.climate_stress.vegetation_stress_index - 0.3841).abs() < 1e-4);
        assert_eq!(result.climate_stress.crop_stress_level, StressLevel::Moderate);
        assert!(result.land_cover.future.get(LandCoverClass::Built) > 10.0);
        assert!((result.land_cover.future.total() - 100.0).abs() < 1e-6);
        assert!(result.area_metrics.total_area_km2 > 0.0);
        assert!(result.area_metrics.urbanized_area_km2 > 0.0);
        assert!(result.area_metrics.degraded_area_km2 > 0.0);
        assert_eq!(result.summary_stats.future_rainfall_mm, 850.0);
        assert_eq!(result.summary_stats.future_temp_celsius, 26.2);
    }

    #[test]
    fn scenario_id_matches_fingerprint() {
        let pipeline = SimulationPipeline::default();
        let result = pipeline.run(&baseline(), &scenario()).expect("run");
        assert_eq!(result.scenario_id, pipeline.fingerprint(&baseline(), &scenario()));
    }

    #[test]
    fn repeated_runs_agree_apart_from_timestamp() {
        let pipeline = SimulationPipeline::default();
        let first = pipeline.run(&baseline(), &scenario()).expect("first");
        let second = pipeline.run(&baseline(), &scenario()).expect("second");
        assert!(first.same_outcome(&second));
    }

    #[test]
    fn malformed_bbox_aborts_run() {
        let mut bad = baseline();
        bad.bounding_box = [77.0, f64::NAN, 80.0, 13.0];
        let err = SimulationPipeline::default()
            .run(&bad, &scenario())
            .expect_err("nan bbox");
        assert!(matches!(
            err,
            SimulationError::MalformedBaseline {
                field: "bounding_box",
                ..
            }
        ));
    }

    #[test]
    fn out_of_range_ndvi_is_malformed() {
        let mut bad = baseline();
        bad.ndvi = 3.0;
        assert!(matches!(
            SimulationPipeline::default().run(&bad, &scenario()),
            Err(SimulationError::MalformedBaseline { field: "ndvi", .. })
        ));
    }

    #[test]
    fn non_finite_scenario_is_computation_failure() {
        let mut bad = scenario();
        bad.urban_growth = f64::NAN;
        assert!(matches!(
            SimulationPipeline::default().run(&baseline(), &bad),
            Err(SimulationError::ComputationFailure { .. })
        ));
    }
}
