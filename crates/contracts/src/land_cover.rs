use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Fixed land-cover class set, numbered after the Dynamic World labels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LandCoverClass {
    Water,
    Trees,
    Grass,
    FloodedVegetation,
    Crops,
    Shrub,
    Built,
    Bare,
    Snow,
}

impl LandCoverClass {
    pub const ALL: [LandCoverClass; 9] = [
        Self::Water,
        Self::Trees,
        Self::Grass,
        Self::FloodedVegetation,
        Self::Crops,
        Self::Shrub,
        Self::Built,
        Self::Bare,
        Self::Snow,
    ];

    pub fn from_class_id(class_id: u8) -> Option<Self> {
        Self::ALL.get(usize::from(class_id)).copied()
    }

    pub fn class_id(self) -> u8 {
        match self {
            Self::Water => 0,
            Self::Trees => 1,
            Self::Grass => 2,
            Self::FloodedVegetation => 3,
            Self::Crops => 4,
            Self::Shrub => 5,
            Self::Built => 6,
            Self::Bare => 7,
            Self::Snow => 8,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Water => "water",
            Self::Trees => "trees",
            Self::Grass => "grass",
            Self::FloodedVegetation => "flooded_vegetation",
            Self::Crops => "crops",
            Self::Shrub => "shrub",
            Self::Built => "built",
            Self::Bare => "bare",
            Self::Snow => "snow",
        }
    }
}

impl fmt::Display for LandCoverClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Percentage breakdown of a region across [`LandCoverClass`]es.
///
/// Absent classes read as `0.0`. After every transform stage the values are
/// non-negative and sum to 100 within floating tolerance.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct LandCoverDistribution(BTreeMap<LandCoverClass, f64>);

impl LandCoverDistribution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, class: LandCoverClass) -> f64 {
        self.0.get(&class).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, class: LandCoverClass, percent: f64) {
        self.0.insert(class, percent);
    }

    pub fn add(&mut self, class: LandCoverClass, delta: f64) {
        *self.0.entry(class).or_insert(0.0) += delta;
    }

    /// Removes `amount` from `class`, never taking it below zero. Returns the
    /// amount actually removed.
    pub fn take(&mut self, class: LandCoverClass, amount: f64) -> f64 {
        let current = self.get(class);
        let taken = amount.clamp(0.0, current.max(0.0));
        if taken > 0.0 {
            self.0.insert(class, current - taken);
        }
        taken
    }

    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }

    pub fn sum_of(&self, classes: &[LandCoverClass]) -> f64 {
        classes.iter().map(|class| self.get(*class)).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (LandCoverClass, f64)> + '_ {
        self.0.iter().map(|(class, percent)| (*class, *percent))
    }

    pub fn all_finite(&self) -> bool {
        self.0.values().all(|percent| percent.is_finite())
    }

    /// Rescales every class so the distribution sums to exactly 100.
    /// A distribution with a non-positive total is left untouched.
    pub fn normalize(&mut self) {
        let total = self.total();
        if total <= 0.0 {
            return;
        }
        for percent in self.0.values_mut() {
            *percent = *percent / total * 100.0;
        }
    }

    pub fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        LandCoverClass::ALL
            .iter()
            .all(|class| (self.get(*class) - other.get(*class)).abs() <= tolerance)
    }
}

impl FromIterator<(LandCoverClass, f64)> for LandCoverDistribution {
    fn from_iter<I: IntoIterator<Item = (LandCoverClass, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
