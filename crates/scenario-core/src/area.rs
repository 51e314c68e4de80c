//! Approximate region area from a lon/lat bounding box, and the area
//! figures derived from a baseline/future land-cover pair.

use contracts::{AreaMetrics, LandCoverClass, LandCoverDistribution};

use crate::error::{Result, SimulationError};
use crate::summary::round_to;

const KM_PER_DEGREE: f64 = 111.0;

/// Classes whose loss counts as vegetation loss for the degraded area.
pub const PRODUCTIVE_VEGETATION: [LandCoverClass; 3] = [
    LandCoverClass::Trees,
    LandCoverClass::Crops,
    LandCoverClass::Grass,
];

pub fn validate_bounding_box(bbox: &[f64; 4]) -> Result<()> {
    let [min_lon, min_lat, max_lon, max_lat] = *bbox;

    if bbox.iter().any(|coord| !coord.is_finite()) {
        return Err(SimulationError::malformed(
            "bounding_box",
            format!("coordinates must be finite: {bbox:?}"),
        ));
    }
    if [min_lon, max_lon].iter().any(|lon| lon.abs() > 180.0) {
        return Err(SimulationError::malformed(
            "bounding_box",
            format!("longitude outside [-180, 180]: {bbox:?}"),
        ));
    }
    if [min_lat, max_lat].iter().any(|lat| lat.abs() > 90.0) {
        return Err(SimulationError::malformed(
            "bounding_box",
            format!("latitude outside [-90, 90]: {bbox:?}"),
        ));
    }
    Ok(())
}

/// Equirectangular approximation: a degree of latitude is 111 km and a
/// degree of longitude shrinks with the cosine of the mean latitude.
pub fn region_area_km2(bbox: &[f64; 4]) -> f64 {
    let [min_lon, min_lat, max_lon, max_lat] = *bbox;
    let mean_lat = ((min_lat + max_lat) / 2.0).to_radians();

    let width_km = (max_lon - min_lon).abs() * KM_PER_DEGREE * mean_lat.cos().abs();
    let height_km = (max_lat - min_lat).abs() * KM_PER_DEGREE;
    width_km * height_km
}

/// Urbanized area is the built-up gain; degraded area is vegetation loss not
/// explained by that gain, so land taken for building is not counted twice.
pub fn area_metrics(
    total_area_km2: f64,
    baseline: &LandCoverDistribution,
    future: &LandCoverDistribution,
) -> AreaMetrics {
    let urbanized_pct = (future.get(LandCoverClass::Built) - baseline.get(LandCoverClass::Built))
        .max(0.0);

    let vegetation_loss_pct = (baseline.sum_of(&PRODUCTIVE_VEGETATION)
        - future.sum_of(&PRODUCTIVE_VEGETATION))
    .max(0.0);
    let degraded_pct = (vegetation_loss_pct - urbanized_pct).max(0.0);

    AreaMetrics {
        total_area_km2: round_to(total_area_km2, 2),
        degraded_area_km2: round_to(degraded_pct / 100.0 * total_area_km2, 2),
        urbanized_area_km2: round_to(urbanized_pct / 100.0 * total_area_km2, 2),
    }
}
