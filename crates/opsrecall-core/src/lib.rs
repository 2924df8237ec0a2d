//! Core types for the opsrecall incident-knowledge retrieval engine.
//!
//! This crate carries the shared vocabulary of the workspace: record
//! entities, the unified error type, the engine configuration, the single
//! tokenizer every component must use, and the public request/result types.
//! It has no retrieval logic of its own.

pub mod config;
pub mod error;
pub mod records;
pub mod tokenize;
pub mod tracing_config;
pub mod types;

pub use config::EngineConfig;
pub use error::{RecallError, RecallResult};
pub use records::{
    ChangeEntry, Comment, Incident, IncidentStatus, Issue, Link, LinkType, Priority, RecordKind,
};
pub use tokenize::Tokenizer;
pub use types::{CorrelationResult, Evidence, LoadReport, QueryRequest, QueryResult};
