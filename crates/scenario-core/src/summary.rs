//! Headline statistics for a finished run.

use contracts::{
    BaselineState, ClimateStressResult, LandCoverClass, LandCoverDistribution, ScenarioParameters,
    SummaryStats,
};

/// Vegetation classes for the headline vegetation-loss figure.
pub const VEGETATION: [LandCoverClass; 4] = [
    LandCoverClass::Trees,
    LandCoverClass::Crops,
    LandCoverClass::Grass,
    LandCoverClass::Shrub,
];

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

pub fn summarize(
    baseline_state: &BaselineState,
    scenario: &ScenarioParameters,
    stress: &ClimateStressResult,
    baseline: &LandCoverDistribution,
    future: &LandCoverDistribution,
) -> SummaryStats {
    let change = |class| round_to(relative_change_pct(baseline, future, class), 2);

    let baseline_vegetation = baseline.sum_of(&VEGETATION);
    let vegetation_loss_pct = if baseline_vegetation > 0.0 {
        (baseline_vegetation - future.sum_of(&VEGETATION)) / baseline_vegetation * 100.0
    } else {
        0.0
    };

    let baseline_built = baseline.get(LandCoverClass::Built);
    let future_built = future.get(LandCoverClass::Built);

    SummaryStats {
        built_change_pct: change(LandCoverClass::Built),
        trees_change_pct: change(LandCoverClass::Trees),
        crops_change_pct: change(LandCoverClass::Crops),
        grass_change_pct: change(LandCoverClass::Grass),
        bare_change_pct: change(LandCoverClass::Bare),
        vegetation_loss_pct: round_to(vegetation_loss_pct, 2),
        baseline_rainfall_mm: round_to(baseline_state.rainfall_mm, 1),
        future_rainfall_mm: round_to(
            baseline_state.rainfall_mm * (1.0 + scenario.rainfall_delta / 100.0),
            1,
        ),
        baseline_temp_celsius: round_to(baseline_state.temperature_c, 1),
        future_temp_celsius: round_to(
            baseline_state.temperature_c + scenario.temperature_delta,
            1,
        ),
        urban_area_baseline_pct: round_to(baseline_built, 2),
        urban_area_future_pct: round_to(future_built, 2),
        urban_gain_pct: round_to(future_built - baseline_built, 2),
        crop_stress_index: stress.vegetation_stress_index,
        overall_stress_level: stress.crop_stress_level,
    }
}

/// Percent change of one class relative to its baseline share; zero when
/// the class was absent from the baseline.
fn relative_change_pct(
    baseline: &LandCoverDistribution,
    future: &LandCoverDistribution,
    class: LandCoverClass,
) -> f64 {
    let before = baseline.get(class);
    if before > 0.0 {
        (future.get(class) - before) / before * 100.0
    } else {
        0.0
    }
}
