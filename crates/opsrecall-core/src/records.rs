//! Typed record entities for the incident knowledge base.
//!
//! Five record types are loaded in bulk and immutable afterwards: incidents,
//! issues, comments, change entries, and issue links. The first four are
//! searchable (text-bearing); links are structural and consumed only by the
//! correlator. Reloading replaces whole tables, never individual rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Declared severity of an incident or issue, ordered from least to most
/// urgent.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    /// Multiplicative scoring factor for this priority.
    ///
    /// Interpolates linearly from 1.0 (`Low`) to `cap` (`Critical`), so with
    /// the default cap of 1.3 the steps are 1.0 / 1.1 / 1.2 / 1.3. A cap
    /// below 1.0 is treated as 1.0 (priority never penalizes).
    #[must_use]
    pub fn weight(self, cap: f64) -> f64 {
        let cap = cap.max(1.0);
        let step = (cap - 1.0) / 3.0;
        1.0 + step * self.rank_index() as f64
    }

    fn rank_index(self) -> u8 {
        match self {
            Self::Low => 0,
            Self::Medium => 1,
            Self::High => 2,
            Self::Critical => 3,
        }
    }
}

/// Lifecycle state of an incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IncidentStatus {
    #[default]
    Open,
    InProgress,
    Closed,
}

/// A historical incident record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    /// Unique incident identifier (e.g. `INC0000123`).
    pub id: String,
    /// When the incident was opened, if known.
    pub opened: Option<DateTime<Utc>>,
    /// When the incident was closed. Must not precede `opened`.
    pub closed: Option<DateTime<Utc>>,
    /// Declared priority.
    pub priority: Priority,
    /// Operational category (e.g. `network`, `database`).
    pub category: String,
    /// Free-text symptom description.
    pub symptom: String,
    /// Free-text resolution description (empty when unresolved).
    pub resolution: String,
    /// Lifecycle state.
    pub status: IncidentStatus,
}

impl Incident {
    /// Creates an incident with the required identifier; all other fields
    /// start empty or at defaults.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            opened: None,
            closed: None,
            priority: Priority::default(),
            category: String::new(),
            symptom: String::new(),
            resolution: String::new(),
            status: IncidentStatus::default(),
        }
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    #[must_use]
    pub fn with_symptom(mut self, symptom: impl Into<String>) -> Self {
        self.symptom = symptom.into();
        self
    }

    #[must_use]
    pub fn with_resolution(mut self, resolution: impl Into<String>) -> Self {
        self.resolution = resolution.into();
        self
    }

    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub const fn with_status(mut self, status: IncidentStatus) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub const fn with_opened(mut self, opened: DateTime<Utc>) -> Self {
        self.opened = Some(opened);
        self
    }

    #[must_use]
    pub const fn with_closed(mut self, closed: DateTime<Utc>) -> Self {
        self.closed = Some(closed);
        self
    }

    /// Concatenated text-bearing fields, used for indexing, overlap
    /// correlation, and snippets.
    #[must_use]
    pub fn search_text(&self) -> String {
        join_fields(&[&self.category, &self.symptom, &self.resolution])
    }

    /// Timestamp used for recency scoring and tie-breaking.
    #[must_use]
    pub const fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.opened
    }

    /// Structural validation applied at load time.
    ///
    /// # Errors
    ///
    /// Returns the reason this row must be skipped. The loader counts skips
    /// toward the configured tolerance instead of failing the whole load.
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("incident id must not be empty".into());
        }
        if let (Some(opened), Some(closed)) = (self.opened, self.closed)
            && closed < opened
        {
            return Err(format!(
                "incident {}: closed timestamp precedes opened",
                self.id
            ));
        }
        Ok(())
    }
}

/// An issue-tracker issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Unique issue key: project key plus number (e.g. `OPS-1042`).
    pub key: String,
    /// One-line summary.
    pub summary: String,
    /// Long-form description.
    pub description: String,
    /// Tracker status name (free-form, e.g. `Resolved`).
    pub status: String,
    /// Declared priority.
    pub priority: Priority,
    /// Current assignee, if any.
    pub assignee: Option<String>,
    /// Component names.
    pub components: Vec<String>,
    /// Label names.
    pub labels: Vec<String>,
    /// Creation timestamp.
    pub created: Option<DateTime<Utc>>,
    /// Last-update timestamp.
    pub updated: Option<DateTime<Utc>>,
}

impl Issue {
    #[must_use]
    pub fn new(key: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            summary: summary.into(),
            description: String::new(),
            status: String::new(),
            priority: Priority::default(),
            assignee: None,
            components: Vec::new(),
            labels: Vec::new(),
            created: None,
            updated: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    #[must_use]
    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.components.push(component.into());
        self
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    #[must_use]
    pub const fn with_created(mut self, created: DateTime<Utc>) -> Self {
        self.created = Some(created);
        self
    }

    #[must_use]
    pub const fn with_updated(mut self, updated: DateTime<Utc>) -> Self {
        self.updated = Some(updated);
        self
    }

    /// Concatenated text-bearing fields.
    #[must_use]
    pub fn search_text(&self) -> String {
        let mut parts: Vec<&str> = vec![&self.summary, &self.description];
        parts.extend(self.components.iter().map(String::as_str));
        parts.extend(self.labels.iter().map(String::as_str));
        join_fields(&parts)
    }

    /// Timestamp used for recency scoring: last update, else creation.
    #[must_use]
    pub const fn timestamp(&self) -> Option<DateTime<Utc>> {
        match self.updated {
            Some(ts) => Some(ts),
            None => self.created,
        }
    }

    /// Whether the issue reached a terminal, resolved state.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(
            self.status.to_lowercase().as_str(),
            "resolved" | "closed" | "done"
        )
    }

    /// See [`Incident::validate`].
    pub fn validate(&self) -> Result<(), String> {
        if self.key.trim().is_empty() {
            return Err("issue key must not be empty".into());
        }
        Ok(())
    }
}

/// A comment on an issue.
///
/// `issue_key` may reference an issue that never loads; dangling references
/// are tolerated and simply have no owning issue to correlate through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    /// Unique comment identifier.
    pub id: String,
    /// Owning issue key.
    pub issue_key: String,
    /// Comment author.
    pub author: String,
    /// Comment body text.
    pub body: String,
    /// Creation timestamp.
    pub created: Option<DateTime<Utc>>,
}

impl Comment {
    #[must_use]
    pub fn new(id: impl Into<String>, issue_key: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            issue_key: issue_key.into(),
            author: String::new(),
            body: body.into(),
            created: None,
        }
    }

    #[must_use]
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    #[must_use]
    pub const fn with_created(mut self, created: DateTime<Utc>) -> Self {
        self.created = Some(created);
        self
    }

    #[must_use]
    pub fn search_text(&self) -> String {
        self.body.clone()
    }

    #[must_use]
    pub const fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.created
    }

    /// See [`Incident::validate`].
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("comment id must not be empty".into());
        }
        Ok(())
    }
}

/// One atomic field transition on an issue.
///
/// The sequence of change entries for the same issue and field, ordered by
/// timestamp, is the audit trail for that field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEntry {
    /// Unique change identifier.
    pub id: String,
    /// Owning issue key.
    pub issue_key: String,
    /// Name of the field that changed.
    pub field: String,
    /// Value before the transition.
    pub from_value: String,
    /// Value after the transition.
    pub to_value: String,
    /// When the transition happened.
    pub created: Option<DateTime<Utc>>,
}

impl ChangeEntry {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        issue_key: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            issue_key: issue_key.into(),
            field: field.into(),
            from_value: String::new(),
            to_value: String::new(),
            created: None,
        }
    }

    #[must_use]
    pub fn with_transition(
        mut self,
        from_value: impl Into<String>,
        to_value: impl Into<String>,
    ) -> Self {
        self.from_value = from_value.into();
        self.to_value = to_value.into();
        self
    }

    #[must_use]
    pub const fn with_created(mut self, created: DateTime<Utc>) -> Self {
        self.created = Some(created);
        self
    }

    #[must_use]
    pub fn search_text(&self) -> String {
        join_fields(&[&self.field, &self.from_value, &self.to_value])
    }

    #[must_use]
    pub const fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.created
    }

    /// See [`Incident::validate`].
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("change id must not be empty".into());
        }
        Ok(())
    }
}

/// Relationship taxonomy between issues, from the tracker's fixed vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkType {
    Blocks,
    RelatesTo,
    Duplicates,
    IsDuplicatedBy,
    DependsOn,
}

impl LinkType {
    /// The link type implied on the reverse direction, where one exists.
    ///
    /// `RelatesTo` is its own counterpart; `Duplicates`/`IsDuplicatedBy`
    /// mirror each other. `Blocks` and `DependsOn` are directional with no
    /// vocabulary entry for the reverse reading; the correlator still
    /// traverses them both ways.
    #[must_use]
    pub const fn symmetric_counterpart(self) -> Option<Self> {
        match self {
            Self::RelatesTo => Some(Self::RelatesTo),
            Self::Duplicates => Some(Self::IsDuplicatedBy),
            Self::IsDuplicatedBy => Some(Self::Duplicates),
            Self::Blocks | Self::DependsOn => None,
        }
    }
}

/// A directed link between two issues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Source issue key.
    pub from_key: String,
    /// Target issue key.
    pub to_key: String,
    /// Relationship tag.
    pub link_type: LinkType,
}

impl Link {
    #[must_use]
    pub fn new(
        from_key: impl Into<String>,
        to_key: impl Into<String>,
        link_type: LinkType,
    ) -> Self {
        Self {
            from_key: from_key.into(),
            to_key: to_key.into(),
            link_type,
        }
    }

    /// See [`Incident::validate`].
    pub fn validate(&self) -> Result<(), String> {
        if self.from_key.trim().is_empty() || self.to_key.trim().is_empty() {
            return Err("link endpoints must not be empty".into());
        }
        Ok(())
    }
}

/// The four searchable record kinds.
///
/// Links are structural only and never returned as evidence.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Incident,
    Issue,
    Comment,
    Change,
}

impl RecordKind {
    /// All searchable kinds, in canonical order.
    pub const ALL: [Self; 4] = [Self::Incident, Self::Issue, Self::Comment, Self::Change];
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Incident => write!(f, "incident"),
            Self::Issue => write!(f, "issue"),
            Self::Comment => write!(f, "comment"),
            Self::Change => write!(f, "change"),
        }
    }
}

fn join_fields(parts: &[&str]) -> String {
    let mut out = String::new();
    for part in parts {
        if part.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(part);
    }
    out
}
