//! Bulk load pass: sources in, validated snapshot out.
//!
//! The loader is all-or-nothing: it either produces a complete snapshot or
//! fails with a structured error, never a partially filled one. Individual
//! bad rows are skipped and counted; the load as a whole fails only when a
//! source is unreadable, the skip ratio exceeds tolerance, or the accepted
//! record count lands below the sanity floor.

use std::collections::BTreeMap;

use opsrecall_core::config::EngineConfig;
use opsrecall_core::error::{RecallError, RecallResult};
use opsrecall_core::tokenize::Tokenizer;
use opsrecall_core::types::LoadReport;
use tracing::{debug, info, warn};

use crate::snapshot::Snapshot;
use crate::source::{RecordSource, SourceRecord};

/// Run the load pass over `sources` and assemble a snapshot.
///
/// Duplicate identifiers keep the last row seen and count the replaced row
/// as skipped. Dangling comment/change issue keys are tolerated.
///
/// # Errors
///
/// - Any source error ([`RecallError::SourceMissing`], [`RecallError::Io`])
///   aborts the load.
/// - [`RecallError::SkipRatioExceeded`] when skipped rows exceed
///   `config.load_skip_tolerance` of the total.
/// - [`RecallError::RecordFloor`] when fewer than `config.min_record_floor`
///   searchable records were accepted.
pub fn load_snapshot(
    sources: &[Box<dyn RecordSource>],
    config: &EngineConfig,
    tokenizer: &Tokenizer,
) -> RecallResult<(Snapshot, LoadReport)> {
    let mut incidents = BTreeMap::new();
    let mut issues = BTreeMap::new();
    let mut comments = BTreeMap::new();
    let mut changes = BTreeMap::new();
    let mut links = Vec::new();

    let mut skipped = 0usize;
    let mut total_rows = 0usize;

    for source in sources {
        let batch = source.read()?;
        total_rows += batch.records.len() + batch.malformed;
        skipped += batch.malformed;
        if batch.malformed > 0 {
            warn!(
                target: "opsrecall.load",
                source = source.name(),
                malformed = batch.malformed,
                "source contained unparseable rows"
            );
        }

        for record in batch.records {
            match record {
                SourceRecord::Incident(incident) => match incident.validate() {
                    Ok(()) => {
                        if incidents.insert(incident.id.clone(), incident).is_some() {
                            skipped += 1;
                        }
                    }
                    Err(reason) => {
                        skipped += 1;
                        debug!(target: "opsrecall.load", source = source.name(), %reason, "skipping incident");
                    }
                },
                SourceRecord::Issue(issue) => match issue.validate() {
                    Ok(()) => {
                        if issues.insert(issue.key.clone(), issue).is_some() {
                            skipped += 1;
                        }
                    }
                    Err(reason) => {
                        skipped += 1;
                        debug!(target: "opsrecall.load", source = source.name(), %reason, "skipping issue");
                    }
                },
                SourceRecord::Comment(comment) => match comment.validate() {
                    Ok(()) => {
                        if comments.insert(comment.id.clone(), comment).is_some() {
                            skipped += 1;
                        }
                    }
                    Err(reason) => {
                        skipped += 1;
                        debug!(target: "opsrecall.load", source = source.name(), %reason, "skipping comment");
                    }
                },
                SourceRecord::Change(change) => match change.validate() {
                    Ok(()) => {
                        if changes.insert(change.id.clone(), change).is_some() {
                            skipped += 1;
                        }
                    }
                    Err(reason) => {
                        skipped += 1;
                        debug!(target: "opsrecall.load", source = source.name(), %reason, "skipping change");
                    }
                },
                SourceRecord::Link(link) => match link.validate() {
                    Ok(()) => links.push(link),
                    Err(reason) => {
                        skipped += 1;
                        debug!(target: "opsrecall.load", source = source.name(), %reason, "skipping link");
                    }
                },
            }
        }
    }

    if total_rows > 0 {
        let ratio = skipped as f64 / total_rows as f64;
        if ratio > config.load_skip_tolerance {
            return Err(RecallError::SkipRatioExceeded {
                skipped,
                total: total_rows,
                tolerance: config.load_skip_tolerance,
            });
        }
    }

    let report = LoadReport {
        incidents: incidents.len(),
        issues: issues.len(),
        comments: comments.len(),
        changes: changes.len(),
        links: links.len(),
        skipped,
        total_rows,
    };

    if report.searchable() < config.min_record_floor {
        return Err(RecallError::RecordFloor {
            accepted: report.searchable(),
            floor: config.min_record_floor,
        });
    }

    let snapshot = Snapshot::assemble(incidents, issues, comments, changes, links, tokenizer);
    info!(
        target: "opsrecall.load",
        incidents = report.incidents,
        issues = report.issues,
        comments = report.comments,
        changes = report.changes,
        links = report.links,
        skipped = report.skipped,
        "load complete"
    );
    Ok((snapshot, report))
}
