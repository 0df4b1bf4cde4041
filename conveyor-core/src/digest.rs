//! Workflow content digest
//!
//! Every build snapshot records the SHA-256 of the workflow text it captured,
//! so an audit can tell whether two builds ran the same definition.

use sha2::{Digest, Sha256};

/// Length of a hex-encoded SHA-256 digest.
pub const SHA256_HEX_LEN: usize = 64;

/// Compute the lowercase hex SHA-256 digest of a workflow definition.
///
/// Empty text is hashed like any other input.
pub fn workflow_sha256(workflow: &str) -> String {
    let hash = Sha256::digest(workflow.as_bytes());
    format!("{hash:x}")
}
