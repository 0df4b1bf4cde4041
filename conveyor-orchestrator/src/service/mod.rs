//! Service Module
//!
//! Business logic layer for the orchestrator.
//! Services receive the already-authenticated actor, check access through
//! the gate, and coordinate repositories, the directory, and the queue.

pub mod build;
pub mod error;
pub mod pipeline;
pub mod schedule;
pub mod variables;

pub use build::BuildService;
pub use error::ServiceError;
pub use pipeline::PipelineService;
pub use schedule::ScheduleService;
