//! Simulation errors

use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SimulationError>;

/// Ordered stages of a scenario run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    Identity,
    Distribution,
    Stress,
    Transition,
    AreaMetrics,
    Summary,
}

impl PipelineStage {
    pub fn name(&self) -> &'static str {
        match self {
            PipelineStage::Identity => "identity",
            PipelineStage::Distribution => "distribution",
            PipelineStage::Stress => "stress",
            PipelineStage::Transition => "transition",
            PipelineStage::AreaMetrics => "area_metrics",
            PipelineStage::Summary => "summary",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("malformed baseline field {field}: {reason}")]
    MalformedBaseline { field: &'static str, reason: String },

    #[error("computation failed in {stage} stage: {reason}")]
    ComputationFailure { stage: PipelineStage, reason: String },
}

impl SimulationError {
    pub(crate) fn malformed(field: &'static str, reason: impl Into<String>) -> Self {
        Self::MalformedBaseline {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn computation(stage: PipelineStage, reason: impl Into<String>) -> Self {
        Self::ComputationFailure {
            stage,
            reason: reason.into(),
        }
    }
}

/// Fails with [`SimulationError::ComputationFailure`] unless `value` is finite.
pub(crate) fn ensure_finite(stage: PipelineStage, label: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SimulationError::computation(
            stage,
            format!("{label} is not finite ({value})"),
        ))
    }
}
