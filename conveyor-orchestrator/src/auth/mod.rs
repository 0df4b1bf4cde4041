//! Authorization
//!
//! Who is calling (identity) and what they may do on a project (gate).

pub mod gate;
pub mod identity;

pub use gate::{AccessGate, DirectoryAccessGate};
pub use identity::Actor;
