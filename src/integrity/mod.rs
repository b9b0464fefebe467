//! # Integrity Checking
//!
//! Snapshots of secret values, the comparison between a persisted snapshot
//! and a fresh one, and the value-length policy applied during `check`.

pub mod diff;
pub mod policy;
pub mod snapshot;

pub use diff::{compare, DiffResult};
pub use policy::{LengthPolicy, PolicyViolation, DEFAULT_MIN_LENGTH};
pub use snapshot::{SecretEntry, SecretMetadata, SecretSnapshot, SNAPSHOT_FORMAT_VERSION};
