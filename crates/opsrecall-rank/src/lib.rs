//! Ranking layer for opsrecall: relevance scoring, aggregate confidence,
//! and cross-source correlation over a loaded snapshot.

pub mod confidence;
pub mod correlate;
pub mod scorer;

pub use confidence::ConfidenceEstimator;
pub use correlate::Correlator;
pub use scorer::{Scored, Scorer};
