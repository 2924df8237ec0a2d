//! Record store for opsrecall.
//!
//! Loads typed incident/issue-tracker records from pluggable sources into an
//! immutable [`Snapshot`], with skip-tolerant validation and structured load
//! failures. The store is read-only after assembly; the engine swaps whole
//! snapshots to reload.

pub mod loader;
pub mod snapshot;
pub mod source;

pub use loader::load_snapshot;
pub use snapshot::{LinkEdge, SearchDoc, Snapshot, SnapshotStats};
pub use source::{JsonlSource, MemorySource, RecordSource, SourceBatch, SourceRecord};
