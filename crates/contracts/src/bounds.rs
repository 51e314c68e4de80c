use serde::{Deserialize, Serialize};

use crate::{ApiError, ErrorCode, ScenarioParameters};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
}

impl NumericRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct YearRange {
    pub min: i32,
    pub max: i32,
}

/// Accepted ranges for scenario inputs. Enforced at the request boundary;
/// the simulation kernel assumes already-validated parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScenarioBounds {
    pub rainfall_delta_pct: NumericRange,
    pub temperature_delta_c: NumericRange,
    pub urban_growth_pct: NumericRange,
    pub target_year: YearRange,
}

impl Default for ScenarioBounds {
    fn default() -> Self {
        Self {
            rainfall_delta_pct: NumericRange::new(-50.0, 30.0),
            temperature_delta_c: NumericRange::new(-2.0, 5.0),
            urban_growth_pct: NumericRange::new(0.0, 100.0),
            target_year: YearRange {
                min: 2025,
                max: 2100,
            },
        }
    }
}

impl ScenarioBounds {
    pub fn validate(&self, scenario: &ScenarioParameters) -> Result<(), ApiError> {
        if scenario.region.trim().is_empty() {
            return Err(invalid("region cannot be empty", None));
        }

        if !self.rainfall_delta_pct.contains(scenario.rainfall_delta) {
            return Err(invalid(
                format!(
                    "rainfall delta must be between {}% and {}%",
                    self.rainfall_delta_pct.min, self.rainfall_delta_pct.max
                ),
                Some(format!("rainfall_delta={}", scenario.rainfall_delta)),
            ));
        }

        if !self.temperature_delta_c.contains(scenario.temperature_delta) {
            return Err(invalid(
                format!(
                    "temperature delta must be between {}°C and {}°C",
                    self.temperature_delta_c.min, self.temperature_delta_c.max
                ),
                Some(format!("temperature_delta={}", scenario.temperature_delta)),
            ));
        }

        if !self.urban_growth_pct.contains(scenario.urban_growth) {
            return Err(invalid(
                format!(
                    "urban growth must be between {}% and {}%",
                    self.urban_growth_pct.min, self.urban_growth_pct.max
                ),
                Some(format!("urban_growth={}", scenario.urban_growth)),
            ));
        }

        if scenario.target_year < self.target_year.min
            || scenario.target_year > self.target_year.max
        {
            return Err(invalid(
                format!(
                    "target year must be between {} and {}",
                    self.target_year.min, self.target_year.max
                ),
                Some(format!("target_year={}", scenario.target_year)),
            ));
        }

        Ok(())
    }
}

fn invalid(message: impl Into<String>, details: Option<String>) -> ApiError {
    ApiError::new(ErrorCode::InvalidScenario, message, details)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> ScenarioParameters {
        ScenarioParameters::new("Tamil Nadu", 2035, -15.0, 1.2, 30.0)
    }

    #[test]
    fn accepts_in_range_scenario() {
        assert!(ScenarioBounds::default().validate(&scenario()).is_ok());
    }

    #[test]
    fn rejects_out_of_range_fields() {
        let bounds = ScenarioBounds::default();

        let mut drought = scenario();
        drought.rainfall_delta = -60.0;
        let err = bounds.validate(&drought).expect_err("rainfall below range");
        assert_eq!(err.error_code, ErrorCode::InvalidScenario);

        let mut year = scenario();
        year.target_year = 2101;
        assert!(bounds.validate(&year).is_err());

        let mut nan = scenario();
        nan.temperature_delta = f64::NAN;
        assert!(bounds.validate(&nan).is_err());

        let mut blank = scenario();
        blank.region = "   ".to_string();
        assert!(bounds.validate(&blank).is_err());
    }
}
