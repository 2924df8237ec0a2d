//! Aggregate reporting over a loaded snapshot.
//!
//! Consumed by postmortem tooling for the "knowledge base at a glance"
//! section: how much history is loaded, what period it covers, and where
//! the incident volume concentrates.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use opsrecall_core::records::Priority;
use opsrecall_store::{Snapshot, SnapshotStats};
use serde::{Deserialize, Serialize};

/// Earliest and latest timestamps observed over one record table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub earliest: DateTime<Utc>,
    pub latest: DateTime<Utc>,
}

impl DateRange {
    fn from_timestamps(timestamps: impl Iterator<Item = DateTime<Utc>>) -> Option<Self> {
        timestamps.fold(None, |range, ts| {
            Some(match range {
                None => Self {
                    earliest: ts,
                    latest: ts,
                },
                Some(range) => Self {
                    earliest: range.earliest.min(ts),
                    latest: range.latest.max(ts),
                },
            })
        })
    }

    /// Days between the earliest and latest timestamp.
    #[must_use]
    pub fn span_days(&self) -> i64 {
        (self.latest - self.earliest).num_days()
    }
}

/// One category with its incident count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub name: String,
    pub count: usize,
}

/// Incident counts by lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusBreakdown {
    pub open: usize,
    pub in_progress: usize,
    pub closed: usize,
}

/// How many top categories the summary keeps.
const TOP_CATEGORY_LIMIT: usize = 10;

/// Aggregate view of one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeBaseSummary {
    /// Record counts per table.
    pub records: SnapshotStats,
    /// Coverage of incident `opened` timestamps, when any exist.
    pub incident_range: Option<DateRange>,
    /// Coverage of issue `created` timestamps, when any exist.
    pub issue_range: Option<DateRange>,
    /// Most frequent incident categories, count descending then name
    /// ascending, at most ten. Blank categories are ignored.
    pub top_categories: Vec<CategoryCount>,
    /// Incident counts per declared priority.
    pub priority_distribution: BTreeMap<Priority, usize>,
    /// Incident counts per lifecycle state.
    pub status_breakdown: StatusBreakdown,
}

impl KnowledgeBaseSummary {
    /// Compute the summary for one snapshot. Deterministic for a given
    /// snapshot.
    #[must_use]
    pub fn compute(snapshot: &Snapshot) -> Self {
        let mut categories: HashMap<&str, usize> = HashMap::new();
        let mut priority_distribution: BTreeMap<Priority, usize> = BTreeMap::new();
        let mut status_breakdown = StatusBreakdown::default();

        for incident in snapshot.incidents() {
            let category = incident.category.trim();
            if !category.is_empty() {
                *categories.entry(category).or_insert(0) += 1;
            }
            *priority_distribution.entry(incident.priority).or_insert(0) += 1;
            match incident.status {
                opsrecall_core::records::IncidentStatus::Open => status_breakdown.open += 1,
                opsrecall_core::records::IncidentStatus::InProgress => {
                    status_breakdown.in_progress += 1;
                }
                opsrecall_core::records::IncidentStatus::Closed => status_breakdown.closed += 1,
            }
        }

        let mut top_categories: Vec<CategoryCount> = categories
            .into_iter()
            .map(|(name, count)| CategoryCount {
                name: name.to_string(),
                count,
            })
            .collect();
        top_categories.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
        top_categories.truncate(TOP_CATEGORY_LIMIT);

        Self {
            records: snapshot.stats(),
            incident_range: DateRange::from_timestamps(
                snapshot.incidents().filter_map(|i| i.opened),
            ),
            issue_range: DateRange::from_timestamps(snapshot.issues().filter_map(|i| i.created)),
            top_categories,
            priority_distribution,
            status_breakdown,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap as Tables;

    use chrono::TimeZone;
    use opsrecall_core::records::{Incident, IncidentStatus, Issue};
    use opsrecall_core::tokenize::Tokenizer;

    use super::*;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn snapshot_with(incidents: Vec<Incident>, issues: Vec<Issue>) -> Snapshot {
        Snapshot::assemble(
            incidents
                .into_iter()
                .map(|i| (i.id.clone(), i))
                .collect::<Tables<_, _>>(),
            issues
                .into_iter()
                .map(|i| (i.key.clone(), i))
                .collect::<Tables<_, _>>(),
            Tables::new(),
            Tables::new(),
            Vec::new(),
            &Tokenizer::default(),
        )
    }

    #[test]
    fn summary_counts_and_ranges() {
        let snapshot = snapshot_with(
            vec![
                Incident::new("INC-1")
                    .with_category("network")
                    .with_opened(ts(1_000))
                    .with_status(IncidentStatus::Closed),
                Incident::new("INC-2")
                    .with_category("network")
                    .with_opened(ts(5_000))
                    .with_status(IncidentStatus::Open),
                Incident::new("INC-3")
                    .with_category("database")
                    .with_status(IncidentStatus::InProgress),
            ],
            vec![
                Issue::new("OPS-1", "a").with_created(ts(2_000)),
                Issue::new("OPS-2", "b").with_created(ts(9_000)),
            ],
        );

        let summary = KnowledgeBaseSummary::compute(&snapshot);
        assert_eq!(summary.records.incidents, 3);
        assert_eq!(summary.records.issues, 2);
        let incident_range = summary.incident_range.unwrap();
        assert_eq!(incident_range.earliest, ts(1_000));
        assert_eq!(incident_range.latest, ts(5_000));
        let issue_range = summary.issue_range.unwrap();
        assert_eq!(issue_range.earliest, ts(2_000));
        assert_eq!(issue_range.latest, ts(9_000));
        assert_eq!(summary.status_breakdown.open, 1);
        assert_eq!(summary.status_breakdown.in_progress, 1);
        assert_eq!(summary.status_breakdown.closed, 1);
    }

    #[test]
    fn top_categories_ordered_count_desc_then_name() {
        let mut incidents = vec![];
        for (category, count) in [("network", 3), ("database", 3), ("storage", 1)] {
            for n in 0..count {
                incidents.push(
                    Incident::new(format!("INC-{category}-{n}")).with_category(category),
                );
            }
        }
        // Blank categories are ignored.
        incidents.push(Incident::new("INC-blank"));

        let summary = KnowledgeBaseSummary::compute(&snapshot_with(incidents, vec![]));
        let names: Vec<&str> = summary
            .top_categories
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, ["database", "network", "storage"]);
        assert_eq!(summary.top_categories[0].count, 3);
    }

    #[test]
    fn top_categories_capped_at_ten() {
        let incidents: Vec<Incident> = (0..15)
            .map(|n| Incident::new(format!("INC-{n}")).with_category(format!("cat-{n:02}")))
            .collect();
        let summary = KnowledgeBaseSummary::compute(&snapshot_with(incidents, vec![]));
        assert_eq!(summary.top_categories.len(), 10);
    }

    #[test]
    fn empty_snapshot_has_no_ranges() {
        let summary = KnowledgeBaseSummary::compute(&snapshot_with(vec![], vec![]));
        assert!(summary.incident_range.is_none());
        assert!(summary.issue_range.is_none());
        assert!(summary.top_categories.is_empty());
        assert_eq!(summary.records.searchable(), 0);
    }

    #[test]
    fn date_range_span_days() {
        let range = DateRange {
            earliest: ts(0),
            latest: ts(86_400 * 30),
        };
        assert_eq!(range.span_days(), 30);
    }

    #[test]
    fn summary_serde_roundtrip() {
        let snapshot = snapshot_with(
            vec![Incident::new("INC-1").with_category("network").with_opened(ts(10))],
            vec![],
        );
        let summary = KnowledgeBaseSummary::compute(&snapshot);
        let json = serde_json::to_string(&summary).unwrap();
        let decoded: KnowledgeBaseSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, summary);
    }
}
