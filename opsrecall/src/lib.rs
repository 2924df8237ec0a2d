//! # opsrecall
//!
//! Incident-knowledge retrieval engine: load historical incident and
//! issue-tracker records into an immutable in-memory snapshot, answer
//! operational questions with ranked, confidence-tagged evidence, and
//! assemble cross-source "related records" neighborhoods for postmortems.
//!
//! The engine is deliberately a plain synchronous library. Orchestration
//! (conversational front-ends, language-model summarization, ticket-system
//! polling, document storage) lives outside, talking to the engine through
//! three calls: [`RecallEngine::load`], [`RecallEngine::query`], and
//! [`RecallEngine::correlate`].
//!
//! # Quick Start
//!
//! ```rust
//! use opsrecall::prelude::*;
//!
//! let engine = RecallEngine::new(EngineConfig::default()).expect("valid config");
//!
//! let records = vec![
//!     SourceRecord::Incident(
//!         Incident::new("INC-1")
//!             .with_category("database")
//!             .with_symptom("connection timeout under load")
//!             .with_resolution("raised pool size"),
//!     ),
//!     SourceRecord::Issue(Issue::new("OPS-1", "connection pool exhaustion")),
//! ];
//! let sources: Vec<Box<dyn RecordSource>> =
//!     vec![Box::new(MemorySource::new("inline", records))];
//! engine.load(&sources).expect("load");
//!
//! let result = engine
//!     .query(&QueryRequest::new("database connection timeout"))
//!     .expect("query");
//! assert!(!result.evidence.is_empty());
//! assert!(result.confidence > 0.0);
//! ```
//!
//! # Architecture
//!
//! ```text
//!  Query ──► Tokenizer ──► Inverted Index (per kind) ──► Record Store
//!                                                            │
//!                                        Relevance Scorer ◄──┘
//!                                                │
//!             Correlator (identifier given) ──► merge ──► Confidence
//!                                                            │
//!                                              ranked evidence + fallback flag
//! ```
//!
//! ## Crate Layout
//!
//! | Crate | Purpose |
//! |-------|---------|
//! | [`opsrecall-core`](opsrecall_core) | Records, errors, config, tokenizer, request/result types |
//! | [`opsrecall-store`](opsrecall_store) | Sources, load pipeline, immutable snapshots |
//! | [`opsrecall-index`](opsrecall_index) | Per-kind inverted token indexes |
//! | [`opsrecall-rank`](opsrecall_rank) | Relevance scoring, confidence, correlation |
//! | `opsrecall` | The [`RecallEngine`] façade and summary reporting |
//!
//! # Concurrency
//!
//! Queries run in parallel over an immutable snapshot with no locking
//! beyond one pointer read. Reload builds the replacement off to the side
//! and swaps it atomically; in-flight queries finish on the snapshot they
//! started with. A failed reload leaves the prior snapshot serving.

pub mod engine;
pub mod report;

pub use engine::RecallEngine;
pub use report::{CategoryCount, DateRange, KnowledgeBaseSummary, StatusBreakdown};

pub use opsrecall_core::config::EngineConfig;
pub use opsrecall_core::error::{RecallError, RecallResult};
pub use opsrecall_core::records::{
    ChangeEntry, Comment, Incident, IncidentStatus, Issue, Link, LinkType, Priority, RecordKind,
};
pub use opsrecall_core::tokenize::Tokenizer;
pub use opsrecall_core::types::{
    CorrelationResult, Evidence, LoadReport, QueryRequest, QueryResult,
};
pub use opsrecall_store::{
    JsonlSource, MemorySource, RecordSource, SnapshotStats, SourceRecord,
};

/// Commonly used types in one import.
pub mod prelude {
    pub use crate::engine::RecallEngine;
    pub use crate::report::KnowledgeBaseSummary;
    pub use opsrecall_core::config::EngineConfig;
    pub use opsrecall_core::error::{RecallError, RecallResult};
    pub use opsrecall_core::records::{
        ChangeEntry, Comment, Incident, IncidentStatus, Issue, Link, LinkType, Priority,
        RecordKind,
    };
    pub use opsrecall_core::types::{
        CorrelationResult, Evidence, LoadReport, QueryRequest, QueryResult,
    };
    pub use opsrecall_store::{JsonlSource, MemorySource, RecordSource, SourceRecord};
}
