//! Deterministic scenario kernel: climate stress, land-cover transitions, and result assembly.
//!
//! Everything in this crate is synchronous and performs no I/O. The same
//! baseline and scenario always produce the same result, apart from the
//! `generated_at` timestamp.

pub mod area;
pub mod distribution;
mod error;
pub mod identity;
pub mod pipeline;
pub mod report;
pub mod stress;
pub mod summary;
pub mod transition;

pub use distribution::DefaultDistributionPolicy;
pub use error::{PipelineStage, Result, SimulationError};
pub use identity::ScenarioIdentity;
pub use pipeline::SimulationPipeline;
pub use transition::TransitionOutcome;
