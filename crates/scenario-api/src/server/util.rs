fn default_target_year() -> i32 {
    DEFAULT_TARGET_YEAR
}

fn scenario_from_request(request: SimulateRequest) -> ScenarioParameters {
    ScenarioParameters::new(
        request.region.trim(),
        request.year,
        request.rainfall_delta,
        request.temperature_delta,
        request.urban_growth,
    )
}

/// Milliseconds, two decimals.
fn elapsed_ms(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 1000.0 * 100.0).round() / 100.0
}
