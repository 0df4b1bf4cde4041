//! Core domain types
//!
//! This module contains the business entities of the build-trigger service.
//! The orchestrator persists them, clients receive them over the API, and
//! the executor picks builds up from the queue.

pub mod build;
pub mod pipeline;
pub mod project;
pub mod schedule;
