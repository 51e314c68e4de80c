//! Rule-based climate stress from rainfall and temperature deltas.
//!
//! Stress values are unitless in `[0, 1]`. Rainfall weighs more than
//! temperature and healthy baseline vegetation (high NDVI) dampens the final
//! vegetation index by up to 30%.

use contracts::{ClimateStressResult, StressInputs, StressLevel};

use crate::error::{ensure_finite, PipelineStage, Result};

pub const RAINFALL_WEIGHT: f64 = 0.6;
pub const TEMPERATURE_WEIGHT: f64 = 0.4;

const EXCESS_RAIN_SCALE_PCT: f64 = 50.0;
const EXCESS_RAIN_CAP: f64 = 0.5;
const DROUGHT_FULL_SEVERITY_PCT: f64 = 30.0;
const WARMING_FULL_SEVERITY_C: f64 = 3.0;
const NDVI_DAMPING: f64 = 0.3;

/// Excess rain tops out at half severity; drought reaches full severity at -30%.
pub fn rainfall_stress(delta_pct: f64) -> f64 {
    if delta_pct >= 0.0 {
        (delta_pct / EXCESS_RAIN_SCALE_PCT).min(EXCESS_RAIN_CAP)
    } else {
        (delta_pct.abs() / DROUGHT_FULL_SEVERITY_PCT).min(1.0)
    }
}

/// Cooling carries no stress; warming reaches full severity at +3°C.
pub fn temperature_stress(delta_c: f64) -> f64 {
    if delta_c <= 0.0 {
        0.0
    } else {
        (delta_c / WARMING_FULL_SEVERITY_C).min(1.0)
    }
}

pub fn classify_stress_level(vegetation_stress_index: f64) -> StressLevel {
    if vegetation_stress_index >= 0.7 {
        StressLevel::Severe
    } else if vegetation_stress_index >= 0.5 {
        StressLevel::High
    } else if vegetation_stress_index >= 0.3 {
        StressLevel::Moderate
    } else if vegetation_stress_index >= 0.1 {
        StressLevel::Mild
    } else {
        StressLevel::Low
    }
}

pub fn evaluate(
    rainfall_delta_pct: f64,
    temperature_delta_c: f64,
    baseline_ndvi: f64,
) -> Result<ClimateStressResult> {
    ensure_finite(PipelineStage::Stress, "rainfall_delta", rainfall_delta_pct)?;
    ensure_finite(PipelineStage::Stress, "temperature_delta", temperature_delta_c)?;
    ensure_finite(PipelineStage::Stress, "baseline_ndvi", baseline_ndvi)?;

    let rainfall = rainfall_stress(rainfall_delta_pct);
    let temperature = temperature_stress(temperature_delta_c);
    let combined = rainfall * RAINFALL_WEIGHT + temperature * TEMPERATURE_WEIGHT;

    let dampened = combined * (1.0 - baseline_ndvi * NDVI_DAMPING);
    let vegetation_stress_index = dampened.clamp(0.0, 1.0);

    Ok(ClimateStressResult {
        rainfall_stress: rainfall.clamp(0.0, 1.0),
        temperature_stress: temperature.clamp(0.0, 1.0),
        combined_stress: combined.clamp(0.0, 1.0),
        vegetation_stress_index,
        crop_stress_level: classify_stress_level(vegetation_stress_index),
        inputs: StressInputs {
            rainfall_delta_pct,
            temperature_delta_c,
            baseline_ndvi,
        },
    })
}

/// Plain-language lines describing what drives the stress level.
pub fn explain(stress: &ClimateStressResult) -> Vec<String> {
    let mut lines = vec![format!(
        "Climate stress level: {}",
        stress.crop_stress_level.as_str().to_uppercase()
    )];

    let rainfall = stress.inputs.rainfall_delta_pct;
    if rainfall < -20.0 {
        lines.push("Severe drought conditions".to_string());
    } else if rainfall < -10.0 {
        lines.push("Moderate drought conditions".to_string());
    }

    let temperature = stress.inputs.temperature_delta_c;
    if temperature > 2.0 {
        lines.push("Extreme temperature increase".to_string());
    } else if temperature > 1.0 {
        lines.push("Significant warming".to_string());
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SimulationError;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn rainfall_stress_caps_excess_and_drought() {
        assert!(close(rainfall_stress(0.0), 0.0));
        assert!(close(rainfall_stress(10.0), 0.2));
        assert!(close(rainfall_stress(40.0), 0.5));
        assert!(close(rainfall_stress(-15.0), 0.5));
        assert!(close(rainfall_stress(-30.0), 1.0));
        assert!(close(rainfall_stress(-90.0), 1.0));
    }

    #[test]
    fn temperature_stress_ignores_cooling() {
        assert!(close(temperature_stress(-2.0), 0.0));
        assert!(close(temperature_stress(0.0), 0.0));
        assert!(close(temperature_stress(1.5), 0.5));
        assert!(close(temperature_stress(4.0), 1.0));
    }

    #[test]
    fn level_steps_at_thresholds() {
        assert_eq!(classify_stress_level(0.0), StressLevel::Low);
        assert_eq!(classify_stress_level(0.099), StressLevel::Low);
        assert_eq!(classify_stress_level(0.1), StressLevel::Mild);
        assert_eq!(classify_stress_level(0.3), StressLevel::Moderate);
        assert_eq!(classify_stress_level(0.5), StressLevel::High);
        assert_eq!(classify_stress_level(0.7), StressLevel::Severe);
        assert_eq!(classify_stress_level(1.0), StressLevel::Severe);
    }

    #[test]
    fn drought_and_warming_combine_with_ndvi_damping() {
        let stress = evaluate(-15.0, 1.2, 0.55).expect("finite inputs");

        assert!(close(stress.rainfall_stress, 0.5));
        assert!(close(stress.temperature_stress, 0.4));
        assert!(close(stress.combined_stress, 0.46));
        assert!(close(stress.vegetation_stress_index, 0.46 * (1.0 - 0.55 * 0.3)));
        assert_eq!(stress.crop_stress_level, StressLevel::Moderate);
    }

    #[test]
    fn neutral_scenario_has_no_stress() {
        let stress = evaluate(0.0, 0.0, 0.5).expect("finite inputs");
        assert_eq!(stress.vegetation_stress_index, 0.0);
        assert_eq!(stress.crop_stress_level, StressLevel::Low);
    }

    #[test]
    fn non_finite_input_is_a_computation_failure() {
        let err = evaluate(f64::NAN, 0.0, 0.5).expect_err("nan rainfall");
        assert!(matches!(
            err,
            SimulationError::ComputationFailure {
                stage: PipelineStage::Stress,
                ..
            }
        ));
    }

    #[test]
    fn explanation_flags_drought_and_warming() {
        let stress = evaluate(-25.0, 2.5, 0.4).expect("finite inputs");
        let lines = explain(&stress);

        assert!(lines[0].starts_with("Climate stress level: "));
        assert!(lines.iter().any(|line| line == "Severe drought conditions"));
        assert!(lines.iter().any(|line| line == "Extreme temperature increase"));

        let mild = evaluate(-12.0, 1.1, 0.4).expect("finite inputs");
        let lines = explain(&mild);
        assert!(lines.iter().any(|line| line == "Moderate drought conditions"));
        assert!(lines.iter().any(|line| line == "Significant warming"));
    }
}
