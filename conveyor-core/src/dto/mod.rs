//! Data Transfer Objects for the Conveyor API
//!
//! Request and response payloads exchanged between the orchestrator and its
//! clients, plus the queue payload handed to the executor.

pub mod build;
pub mod error;
pub mod identity;
pub mod page;
pub mod pipeline;
pub mod schedule;
