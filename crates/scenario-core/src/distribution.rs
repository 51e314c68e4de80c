//! Baseline pixel counts to a percentage distribution, with a named fallback
//! when the counts carry no usable land-cover information.

use std::collections::BTreeMap;

use contracts::{LandCoverClass, LandCoverDistribution, LandCoverSource};
use tracing::debug;

use crate::error::{Result, SimulationError};

/// Substitutes a fixed distribution when baseline counts are empty or
/// contain no recognised class with a positive count.
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultDistributionPolicy {
    fallback: LandCoverDistribution,
}

impl Default for DefaultDistributionPolicy {
    fn default() -> Self {
        Self {
            fallback: [
                (LandCoverClass::Trees, 20.0),
                (LandCoverClass::Grass, 15.0),
                (LandCoverClass::Crops, 30.0),
                (LandCoverClass::Shrub, 10.0),
                (LandCoverClass::Built, 10.0),
                (LandCoverClass::Bare, 10.0),
                (LandCoverClass::Water, 5.0),
            ]
            .into_iter()
            .collect(),
        }
    }
}

impl DefaultDistributionPolicy {
    /// The fallback is normalized to 100 on construction.
    pub fn new(mut fallback: LandCoverDistribution) -> Self {
        fallback.normalize();
        Self { fallback }
    }

    pub fn fallback(&self) -> &LandCoverDistribution {
        &self.fallback
    }

    pub fn resolve(
        &self,
        counts: &BTreeMap<String, f64>,
    ) -> Result<(LandCoverDistribution, LandCoverSource)> {
        match counts_to_distribution(counts)? {
            Some(distribution) => Ok((distribution, LandCoverSource::Observed)),
            None => {
                debug!(classes = counts.len(), "baseline land cover defaulted");
                Ok((self.fallback.clone(), LandCoverSource::Defaulted))
            }
        }
    }
}

/// Converts class-id keyed pixel counts into percentages of the recognised
/// total. Returns `None` when nothing usable remains.
pub fn counts_to_distribution(
    counts: &BTreeMap<String, f64>,
) -> Result<Option<LandCoverDistribution>> {
    let mut recognised = Vec::with_capacity(counts.len());

    for (key, count) in counts {
        if !count.is_finite() || *count < 0.0 {
            return Err(SimulationError::malformed(
                "land_cover_counts",
                format!("class {key} has invalid pixel count {count}"),
            ));
        }

        let class = key
            .trim()
            .parse::<u8>()
            .ok()
            .and_then(LandCoverClass::from_class_id);
        match class {
            Some(class) => recognised.push((class, *count)),
            None => debug!(class_id = %key, "ignoring unknown land-cover class"),
        }
    }

    let total: f64 = recognised.iter().map(|(_, count)| count).sum();
    if total <= 0.0 {
        return Ok(None);
    }

    let mut distribution = LandCoverDistribution::new();
    for (class, count) in recognised {
        distribution.add(class, count / total * 100.0);
    }
    Ok(Some(distribution))
}
