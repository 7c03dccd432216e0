//! Ingest orchestration and the parallel Extract/Transform/Enrich pipeline.
//!
//! - [`pipeline`] - [`Shared`], the state every stage and the dashboard share
//! - [`partition`] - global-index bookkeeping over a batch's vehicle lists
//! - [`extract`] - [`extract::ExtractStage`] and its two-phase barrier
//! - [`kinematics`] - speed/acceleration/risk derivation used by Transform
//! - [`transform`] - [`transform::TransformStage`]
//! - [`enrich`] - [`enrich::EnrichStage`]
//! - [`orchestrator`] - [`orchestrator::IngestOrchestrator`], the receive loop
//! - [`lifecycle`] - the `quit()` shutdown path and the optional server timeout

pub mod enrich;
pub mod extract;
pub mod kinematics;
pub mod lifecycle;
pub mod orchestrator;
pub mod partition;
pub mod pipeline;
pub mod transform;

pub use enrich::EnrichStage;
pub use extract::ExtractStage;
pub use orchestrator::IngestOrchestrator;
pub use pipeline::Shared;
pub use transform::TransformStage;
