//! Conveyor Core
//!
//! Core types shared by the Conveyor build-trigger service and its clients.
//!
//! This crate contains:
//! - Domain types: Pipelines, builds, workflow snapshots, project membership
//! - DTOs: Request/response payloads and the stable error codes of the API
//! - Digest: The content hash recorded with every workflow snapshot

pub mod digest;
pub mod domain;
pub mod dto;
