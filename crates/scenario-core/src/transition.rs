//! Land-cover transitions under vegetation stress and urban growth.
//!
//! Two stages run in a fixed order over a working copy of the baseline:
//! stress degradation first, then urban expansion on the post-stress
//! percentages. The result is rescaled to sum to 100.

use contracts::{LandCoverClass, LandCoverDistribution, TransitionRecord, TransitionStage};
use tracing::debug;

use crate::error::{ensure_finite, PipelineStage, Result, SimulationError};

/// Stress at or below this index leaves the land cover untouched.
pub const STRESS_THRESHOLD: f64 = 0.01;
/// Share of an affected class lost per run at stress 1.0.
pub const DEGRADATION_SCALE: f64 = 0.1;
/// Built-up share assumed when a region has less, so new settlements can form.
pub const MIN_BUILT_SEED_PCT: f64 = 1.0;

const CROP_SENSITIVITY: f64 = 1.5;
const GRASS_SENSITIVITY: f64 = 0.5;

const TREES_TO_GRASS_SHARE: f64 = 0.6;
const TREES_TO_SHRUB_SHARE: f64 = 0.4;
const CROPS_TO_GRASS_SHARE: f64 = 0.4;
const CROPS_TO_BARE_SHARE: f64 = 0.6;

/// Classes urban expansion draws from, in priority order, with the largest
/// fraction of each class's current area it may take.
const URBAN_SOURCES: [(LandCoverClass, f64); 3] = [
    (LandCoverClass::Crops, 0.4),
    (LandCoverClass::Grass, 0.3),
    (LandCoverClass::Trees, 0.2),
];

#[derive(Debug, Clone, PartialEq)]
pub struct TransitionOutcome {
    pub future: LandCoverDistribution,
    pub transitions: Vec<TransitionRecord>,
}

pub fn apply(
    baseline: &LandCoverDistribution,
    vegetation_stress: f64,
    urban_growth_pct: f64,
) -> Result<TransitionOutcome> {
    ensure_finite(PipelineStage::Transition, "vegetation_stress", vegetation_stress)?;
    ensure_finite(PipelineStage::Transition, "urban_growth", urban_growth_pct)?;

    let mut working = baseline.clone();
    let mut transitions = Vec::new();

    if vegetation_stress > STRESS_THRESHOLD {
        degrade(&mut working, vegetation_stress, &mut transitions);
    }

    if urban_growth_pct > 0.0 {
        urbanize(&mut working, urban_growth_pct, &mut transitions);
    }

    working.normalize();

    if !working.all_finite() {
        return Err(SimulationError::computation(
            PipelineStage::Transition,
            "future distribution contains non-finite values",
        ));
    }

    debug!(
        stress = vegetation_stress,
        urban_growth = urban_growth_pct,
        transitions = transitions.len(),
        "land-cover transitions applied"
    );

    Ok(TransitionOutcome {
        future: working,
        transitions,
    })
}

fn degrade(
    working: &mut LandCoverDistribution,
    stress: f64,
    transitions: &mut Vec<TransitionRecord>,
) {
    let rate = stress * DEGRADATION_SCALE;

    let trees = working.get(LandCoverClass::Trees);
    if trees > 0.0 {
        let loss = working.take(LandCoverClass::Trees, trees * rate);
        move_into(
            working,
            transitions,
            TransitionStage::Stress,
            LandCoverClass::Trees,
            &[
                (LandCoverClass::Grass, loss * TREES_TO_GRASS_SHARE),
                (LandCoverClass::Shrub, loss * TREES_TO_SHRUB_SHARE),
            ],
        );
    }

    let crops = working.get(LandCoverClass::Crops);
    if crops > 0.0 {
        let loss = working.take(LandCoverClass::Crops, crops * rate * CROP_SENSITIVITY);
        move_into(
            working,
            transitions,
            TransitionStage::Stress,
            LandCoverClass::Crops,
            &[
                (LandCoverClass::Grass, loss * CROPS_TO_GRASS_SHARE),
                (LandCoverClass::Bare, loss * CROPS_TO_BARE_SHARE),
            ],
        );
    }

    let grass = working.get(LandCoverClass::Grass);
    if grass > 0.0 {
        let loss = working.take(LandCoverClass::Grass, grass * rate * GRASS_SENSITIVITY);
        move_into(
            working,
            transitions,
            TransitionStage::Stress,
            LandCoverClass::Grass,
            &[(LandCoverClass::Bare, loss)],
        );
    }
}

fn urbanize(
    working: &mut LandCoverDistribution,
    growth_pct: f64,
    transitions: &mut Vec<TransitionRecord>,
) {
    let current_built = working.get(LandCoverClass::Built);
    let demand = current_built.max(MIN_BUILT_SEED_PCT) * growth_pct / 100.0;
    let mut remaining = demand;

    for (source, max_share) in URBAN_SOURCES {
        if remaining <= 0.0 {
            break;
        }
        let available = working.get(source);
        if available <= 0.0 {
            continue;
        }
        let taken = working.take(source, remaining.min(available * max_share));
        remaining -= taken;
        record(
            transitions,
            TransitionStage::Urbanization,
            source,
            LandCoverClass::Built,
            taken,
        );
    }

    // Unmet demand is dropped: built area grows by what the sources could supply.
    working.set(LandCoverClass::Built, current_built + (demand - remaining));
}

fn move_into(
    working: &mut LandCoverDistribution,
    transitions: &mut Vec<TransitionRecord>,
    stage: TransitionStage,
    from: LandCoverClass,
    targets: &[(LandCoverClass, f64)],
) {
    for (to, amount) in targets {
        working.add(*to, *amount);
        record(transitions, stage, from, *to, *amount);
    }
}

fn record(
    transitions: &mut Vec<TransitionRecord>,
    stage: TransitionStage,
    from: LandCoverClass,
    to: LandCoverClass,
    amount_pct: f64,
) {
    if amount_pct > 0.0 {
        transitions.push(TransitionRecord {
            stage,
            from,
            to,
            amount_pct,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_baseline() -> LandCoverDistribution {
        [
            (LandCoverClass::Trees, 20.0),
            (LandCoverClass::Grass, 15.0),
            (LandCoverClass::Crops, 30.0),
            (LandCoverClass::Shrub, 10.0),
            (LandCoverClass::Built, 10.0),
            (LandCoverClass::Bare, 10.0),
            (LandCoverClass::Water, 5.0),
        ]
        .into_iter()
        .collect()
    }

    fn amount(outcome: &TransitionOutcome, name: &str) -> f64 {
        outcome
            .transitions
            .iter()
            .find(|record| record.name() == name)
            .map(|record| record.amount_pct)
            .unwrap_or(0.0)
    }

    #[test]
    fn no_stress_no_growth_is_identity() {
        let baseline = reference_baseline();
        let outcome = apply(&baseline, 0.0, 0.0).expect("transition");

        assert!(outcome.future.approx_eq(&baseline, 1e-9));
        assert!(outcome.transitions.is_empty());
    }

    #[test]
    fn stress_below_threshold_is_skipped() {
        let baseline = reference_baseline();
        let outcome = apply(&baseline, STRESS_THRESHOLD, 0.0).expect("transition");
        assert!(outcome.transitions.is_empty());
    }

    #[test]
    fn full_stress_degrades_vegetation_in_order() {
        let baseline = reference_baseline();
        let outcome = apply(&baseline, 1.0, 0.0).expect("transition");

        // rate 0.1: trees lose 2.0, crops lose 4.5, grass (15 + 1.2 + 1.8) loses 0.9
        assert!((amount(&outcome, "trees_to_grass") - 1.2).abs() < 1e-9);
        assert!((amount(&outcome, "trees_to_shrub") - 0.8).abs() < 1e-9);
        assert!((amount(&outcome, "crops_to_grass") - 1.8).abs() < 1e-9);
        assert!((amount(&outcome, "crops_to_bare") - 2.7).abs() < 1e-9);
        assert!((amount(&outcome, "grass_to_bare") - 0.9).abs() < 1e-9);

        assert!((outcome.future.get(LandCoverClass::Trees) - 18.0).abs() < 1e-9);
        assert!((outcome.future.get(LandCoverClass::Crops) - 25.5).abs() < 1e-9);
        assert!((outcome.future.get(LandCoverClass::Bare) - 13.6).abs() < 1e-9);
        assert!((outcome.future.total() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn urban_growth_takes_crops_first() {
        let baseline = reference_baseline();
        let outcome = apply(&baseline, 0.0, 30.0).expect("transition");

        assert!((amount(&outcome, "crops_to_built") - 3.0).abs() < 1e-9);
        assert_eq!(amount(&outcome, "grass_to_built"), 0.0);
        assert!((outcome.future.get(LandCoverClass::Built) - 13.0).abs() < 1e-9);
        assert!((outcome.future.get(LandCoverClass::Crops) - 27.0).abs() < 1e-9);
    }

    #[test]
    fn urban_growth_seeds_from_zero_built() {
        let baseline: LandCoverDistribution = [
            (LandCoverClass::Crops, 50.0),
            (LandCoverClass::Grass, 50.0),
        ]
        .into_iter()
        .collect();

        let outcome = apply(&baseline, 0.0, 100.0).expect("transition");

        assert!((outcome.future.get(LandCoverClass::Built) - 1.0).abs() < 1e-9);
        assert!((outcome.future.get(LandCoverClass::Crops) - 49.0).abs() < 1e-9);
    }

    #[test]
    fn unmet_urban_demand_is_dropped() {
        let baseline: LandCoverDistribution = [
            (LandCoverClass::Built, 90.0),
            (LandCoverClass::Crops, 5.0),
            (LandCoverClass::Grass, 5.0),
        ]
        .into_iter()
        .collect();

        let outcome = apply(&baseline, 0.0, 100.0).expect("transition");

        // demand 90, supply 5 * 0.4 + 5 * 0.3 = 3.5
        assert!((outcome.future.get(LandCoverClass::Built) - 93.5).abs() < 1e-9);
        assert!((outcome.future.total() - 100.0).abs() < 1e-9);
        assert!(outcome
            .future
            .iter()
            .all(|(_, percent)| percent >= 0.0));
    }

    #[test]
    fn urban_demand_spills_into_grass_then_trees() {
        let baseline: LandCoverDistribution = [
            (LandCoverClass::Built, 40.0),
            (LandCoverClass::Crops, 10.0),
            (LandCoverClass::Grass, 10.0),
            (LandCoverClass::Trees, 40.0),
        ]
        .into_iter()
        .collect();

        let outcome = apply(&baseline, 0.0, 25.0).expect("transition");

        // demand 10: crops give 4, grass 3, trees 3
        assert!((amount(&outcome, "crops_to_built") - 4.0).abs() < 1e-9);
        assert!((amount(&outcome, "grass_to_built") - 3.0).abs() < 1e-9);
        assert!((amount(&outcome, "trees_to_built") - 3.0).abs() < 1e-9);
        assert!((outcome.future.get(LandCoverClass::Built) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn urban_growth_draws_on_degraded_cover() {
        let baseline: LandCoverDistribution = [
            (LandCoverClass::Built, 40.0),
            (LandCoverClass::Crops, 10.0),
            (LandCoverClass::Grass, 10.0),
            (LandCoverClass::Trees, 40.0),
        ]
        .into_iter()
        .collect();

        let outcome = apply(&baseline, 1.0, 25.0).expect("transition");

        // after degradation: crops 8.5, grass 12.35, trees 36; demand 10
        assert!((amount(&outcome, "crops_to_built") - 3.4).abs() < 1e-9);
        assert!((amount(&outcome, "grass_to_built") - 3.705).abs() < 1e-9);
        assert!((amount(&outcome, "trees_to_built") - 2.895).abs() < 1e-9);
        assert!((outcome.future.get(LandCoverClass::Built) - 50.0).abs() < 1e-9);
        assert!((outcome.future.get(LandCoverClass::Crops) - 5.1).abs() < 1e-9);

        let first_urban = outcome
            .transitions
            .iter()
            .position(|record| record.stage == TransitionStage::Urbanization)
            .expect("urban transitions");
        assert!(outcome.transitions[..first_urban]
            .iter()
            .all(|record| record.stage == TransitionStage::Stress));
    }

    #[test]
    fn rejects_non_finite_growth() {
        let baseline = reference_baseline();
        assert!(apply(&baseline, 0.2, f64::INFINITY).is_err());
    }
}
