//! Plain-text rendering of a simulation result.

use std::fmt::Write;

use contracts::SimulationResult;

use crate::stress::explain;

pub fn render_report(result: &SimulationResult) -> String {
    let metadata = &result.metadata;
    let stats = &result.summary_stats;
    let stress = &result.climate_stress;

    let mut out = String::new();
    let _ = writeln!(out, "SCENARIO {}", result.scenario_id);
    let _ = writeln!(out, "Region: {}", metadata.region);
    let _ = writeln!(
        out,
        "Timeline: {} -> {}",
        metadata.baseline_year, metadata.target_year
    );
    let _ = writeln!(out, "Baseline source: {}", metadata.baseline_source.as_str());
    let _ = writeln!(out);

    let _ = writeln!(out, "CLIMATE CHANGES:");
    let _ = writeln!(
        out,
        "- Rainfall: {:.0} -> {:.0} mm/year",
        stats.baseline_rainfall_mm, stats.future_rainfall_mm
    );
    let _ = writeln!(
        out,
        "- Temperature: {:.1} -> {:.1} °C",
        stats.baseline_temp_celsius, stats.future_temp_celsius
    );
    let _ = writeln!(out);

    let _ = writeln!(out, "STRESS ASSESSMENT:");
    let _ = writeln!(
        out,
        "- Vegetation stress: {:.2} / 1.0",
        stress.vegetation_stress_index
    );
    for line in explain(stress) {
        let _ = writeln!(out, "- {line}");
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "LAND COVER IMPACTS:");
    let _ = writeln!(out, "- Vegetation loss: {:.1}%", stats.vegetation_loss_pct);
    let _ = writeln!(out, "- Urban expansion: {:.1} points", stats.urban_gain_pct);
    let _ = writeln!(out, "- Tree cover change: {:.1}%", stats.trees_change_pct);
    let _ = writeln!(out, "- Crop area change: {:.1}%", stats.crops_change_pct);
    let _ = writeln!(
        out,
        "- Degraded area: {:.2} km² of {:.2} km²",
        result.area_metrics.degraded_area_km2, result.area_metrics.total_area_km2
    );
    let _ = writeln!(
        out,
        "- Urbanized area: {:.2} km²",
        result.area_metrics.urbanized_area_km2
    );
    let _ = writeln!(out);

    out.push_str("This is a simulation under stated assumptions, not a prediction.\n");
    out
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use contracts::{BaselineState, ScenarioParameters};

    use super::*;
    use crate::SimulationPipeline;

    #[test]
    fn report_names_region_and_stress_level() {
        let baseline = BaselineState {
            region: "Kerala".to_string(),
            baseline_year: 2020,
            bounding_box: [74.8, 8.2, 77.4, 12.8],
            land_cover_counts: BTreeMap::new(),
            rainfall_mm: 2800.0,
            temperature_c: 27.0,
            ndvi: 0.7,
        };
        let scenario = ScenarioParameters::new("Kerala", 2050, -25.0, 2.5, 10.0);
        let result = SimulationPipeline::default()
            .run(&baseline, &scenario)
            .expect("run");

        let report = render_report(&result);
        assert!(report.contains("Region: Kerala"));
        assert!(report.contains("Timeline: 2020 -> 2050"));
        assert!(report.contains("Baseline source: supplied"));
        assert!(report.contains("Severe drought conditions"));
        assert!(report.ends_with("not a prediction.\n"));
    }
}
