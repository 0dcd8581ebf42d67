//! Work-breakdown elements
//!
//! One element is a node in the WBS forest: a summary grouping, a task or a
//! milestone. Elements are parsed fresh from YAML each run and never mutated.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::lenient;

/// Kind of WBS element
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// Organizational grouping, carries no independent completion
    Summary,
    Task,
    /// Zero-duration, date-targeted checkpoint
    Milestone,
    /// Unrecognized or missing kind, treated like a summary
    Other(String),
}

impl Default for ElementKind {
    fn default() -> Self {
        ElementKind::Other(String::new())
    }
}

impl ElementKind {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "summary" => ElementKind::Summary,
            "task" => ElementKind::Task,
            "milestone" => ElementKind::Milestone,
            other => ElementKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ElementKind::Summary => "summary",
            ElementKind::Task => "task",
            ElementKind::Milestone => "milestone",
            ElementKind::Other(s) => s,
        }
    }

    /// Returns true for kinds that contribute to progress and dependencies
    pub fn is_work(&self) -> bool {
        matches!(self, ElementKind::Task | ElementKind::Milestone)
    }

    /// Icon used in the WBS tree listing
    pub fn icon(&self) -> &'static str {
        match self {
            ElementKind::Summary => "📁",
            ElementKind::Task => "📄",
            ElementKind::Milestone => "🏁",
            ElementKind::Other(_) => "•",
        }
    }
}

impl Serialize for ElementKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ElementKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        lenient::string(deserializer).map(|s| ElementKind::parse(&s))
    }
}

/// Work status of an element or document
///
/// Status is authored externally; no transitions are enforced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum ElementStatus {
    #[default]
    Todo,
    Wip,
    /// The only terminal status
    Done,
    /// Unrecognized status, never counts as done
    Other(String),
}

impl ElementStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "" | "todo" => ElementStatus::Todo,
            "wip" => ElementStatus::Wip,
            "done" => ElementStatus::Done,
            other => ElementStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ElementStatus::Todo => "todo",
            ElementStatus::Wip => "wip",
            ElementStatus::Done => "done",
            ElementStatus::Other(s) => s,
        }
    }

    /// Returns true if this status represents completion
    pub fn is_done(&self) -> bool {
        matches!(self, ElementStatus::Done)
    }

    /// Returns the status icon, empty for unknown statuses
    pub fn icon(&self) -> &'static str {
        match self {
            ElementStatus::Todo => "⬜",
            ElementStatus::Wip => "🔄",
            ElementStatus::Done => "✅",
            ElementStatus::Other(_) => "",
        }
    }

    /// Display label such as `✅ Done`; unknown statuses are shown verbatim
    pub fn label(&self) -> String {
        match self {
            ElementStatus::Todo => "⬜ TODO".to_string(),
            ElementStatus::Wip => "🔄 WIP".to_string(),
            ElementStatus::Done => "✅ Done".to_string(),
            ElementStatus::Other(s) => s.clone(),
        }
    }
}

impl Serialize for ElementStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ElementStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        lenient::string(deserializer).map(|s| ElementStatus::parse(&s))
    }
}

/// Optional status: missing or blank stays `None`
pub(crate) fn opt_status<'de, D>(deserializer: D) -> Result<Option<ElementStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    lenient::opt_string(deserializer).map(|s| s.map(|s| ElementStatus::parse(&s)))
}

/// Formats an optional status for display, `-` when absent
pub fn status_label(status: Option<&ElementStatus>) -> String {
    status.map(ElementStatus::label).unwrap_or_else(|| "-".to_string())
}

/// One node in the WBS forest
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct WorkBreakdownElement {
    #[serde(deserialize_with = "lenient::string")]
    pub id: String,

    /// Dotted hierarchical position, e.g. `1.2.3`
    #[serde(rename = "wbs_code", alias = "code", deserialize_with = "lenient::string")]
    pub code: String,

    #[serde(rename = "type", alias = "kind")]
    pub kind: ElementKind,

    #[serde(deserialize_with = "lenient::string")]
    pub title: String,

    pub status: ElementStatus,

    #[serde(deserialize_with = "lenient::hours")]
    pub estimated_hours: Option<f64>,

    #[serde(deserialize_with = "lenient::string_list")]
    pub dependencies: Vec<String>,

    #[serde(deserialize_with = "lenient::opt_string")]
    pub target_date: Option<String>,

    #[serde(deserialize_with = "lenient::opt_string")]
    pub category: Option<String>,

    #[serde(deserialize_with = "lenient::opt_string")]
    pub priority: Option<String>,

    #[serde(deserialize_with = "lenient::opt_string")]
    pub description: Option<String>,
}

impl WorkBreakdownElement {
    /// Creates an element with the given id, code and kind
    pub fn new(id: impl Into<String>, code: impl Into<String>, kind: ElementKind) -> Self {
        Self {
            id: id.into(),
            code: code.into(),
            kind,
            ..Self::default()
        }
    }

    /// Sets the title (builder style)
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the status (builder style)
    pub fn with_status(mut self, status: ElementStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the estimate (builder style)
    pub fn with_hours(mut self, hours: f64) -> Self {
        self.estimated_hours = Some(hours);
        self
    }

    /// Adds a dependency (builder style)
    pub fn depends_on(mut self, id: impl Into<String>) -> Self {
        self.dependencies.push(id.into());
        self
    }

    /// Returns true for tasks and milestones
    pub fn is_work(&self) -> bool {
        self.kind.is_work()
    }

    pub fn is_done(&self) -> bool {
        self.status.is_done()
    }

    /// Estimated hours, `0` when absent or invalid
    pub fn hours(&self) -> f64 {
        self.estimated_hours.unwrap_or(0.0)
    }

    /// Identity used for diagram nodes: the id, or the code when the id is empty
    pub fn node_key(&self) -> &str {
        if self.id.is_empty() {
            &self.code
        } else {
            &self.id
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_element() {
        let yaml = r#"
id: T-1
wbs_code: "1.2"
type: task
title: Write parser
status: wip
estimated_hours: 4
dependencies: [T-0]
category: design
priority: high
"#;
        let element: WorkBreakdownElement = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(element.id, "T-1");
        assert_eq!(element.code, "1.2");
        assert_eq!(element.kind, ElementKind::Task);
        assert_eq!(element.status, ElementStatus::Wip);
        assert_eq!(element.hours(), 4.0);
        assert_eq!(element.dependencies, vec!["T-0"]);
        assert_eq!(element.category.as_deref(), Some("design"));
        assert!(element.is_work());
        assert!(!element.is_done());
    }

    #[test]
    fn spec_style_field_names() {
        let yaml = "id: M1\ncode: 2\nkind: milestone\nstatus: done\ntarget_date: 2026-01-31";
        let element: WorkBreakdownElement = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(element.code, "2");
        assert_eq!(element.kind, ElementKind::Milestone);
        assert!(element.is_done());
        assert_eq!(element.target_date.as_deref(), Some("2026-01-31"));
    }

    #[test]
    fn missing_fields_take_defaults() {
        let element: WorkBreakdownElement = serde_yaml::from_str("title: Bare").unwrap();

        assert_eq!(element.id, "");
        assert_eq!(element.code, "");
        assert_eq!(element.kind, ElementKind::Other(String::new()));
        assert_eq!(element.status, ElementStatus::Todo);
        assert_eq!(element.hours(), 0.0);
        assert!(!element.is_work());
    }

    #[test]
    fn invalid_hours_are_zero() {
        let element: WorkBreakdownElement =
            serde_yaml::from_str("type: task\nestimated_hours: N/A").unwrap();
        assert_eq!(element.estimated_hours, None);
        assert_eq!(element.hours(), 0.0);
    }

    #[test]
    fn unknown_kind_and_status_are_preserved() {
        let element: WorkBreakdownElement =
            serde_yaml::from_str("type: epic\nstatus: blocked").unwrap();

        assert_eq!(element.kind, ElementKind::Other("epic".to_string()));
        assert_eq!(element.kind.icon(), "•");
        assert_eq!(element.status, ElementStatus::Other("blocked".to_string()));
        assert_eq!(element.status.label(), "blocked");
        assert!(!element.is_done());
    }

    #[test]
    fn status_labels() {
        assert_eq!(ElementStatus::Todo.label(), "⬜ TODO");
        assert_eq!(ElementStatus::Wip.label(), "🔄 WIP");
        assert_eq!(ElementStatus::Done.label(), "✅ Done");
        assert_eq!(status_label(None), "-");
        assert_eq!(status_label(Some(&ElementStatus::Done)), "✅ Done");
    }

    #[test]
    fn node_key_falls_back_to_code() {
        let with_id = WorkBreakdownElement::new("A", "1", ElementKind::Task);
        let without_id = WorkBreakdownElement::new("", "1.1", ElementKind::Task);

        assert_eq!(with_id.node_key(), "A");
        assert_eq!(without_id.node_key(), "1.1");
    }

    #[test]
    fn status_serializes_as_string() {
        let json = serde_json::to_string(&ElementStatus::Wip).unwrap();
        assert_eq!(json, "\"wip\"");
    }
}
