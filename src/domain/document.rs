//! Typed views of project documents
//!
//! Every document shares a `meta` block; the WBS document adds elements,
//! constraints, risks and blockers. All fields default when missing.

use serde::{Deserialize, Deserializer};
use serde_yaml::Value;

use super::element::{opt_status, ElementKind, ElementStatus, WorkBreakdownElement};
use super::lenient;

/// Document metadata shared by every doc_type
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Meta {
    #[serde(deserialize_with = "lenient::opt_string")]
    pub title: Option<String>,

    #[serde(deserialize_with = "lenient::opt_string")]
    pub doc_type: Option<String>,

    #[serde(deserialize_with = "lenient::opt_string")]
    pub category: Option<String>,

    #[serde(deserialize_with = "opt_status")]
    pub status: Option<ElementStatus>,

    #[serde(deserialize_with = "lenient::opt_string")]
    pub version: Option<String>,

    #[serde(deserialize_with = "lenient::opt_string")]
    pub author: Option<String>,
}

/// A related document: either a bare string or a titled link
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RelatedDoc {
    Link {
        #[serde(default, deserialize_with = "lenient::string")]
        title: String,
        #[serde(default, deserialize_with = "lenient::string")]
        url: String,
    },
    Text(String),
}

/// Background and goal of a document
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Overview {
    #[serde(deserialize_with = "lenient::opt_string")]
    pub background: Option<String>,

    #[serde(deserialize_with = "lenient::opt_string")]
    pub goal: Option<String>,

    #[serde(deserialize_with = "lenient::records")]
    pub related_docs: Vec<RelatedDoc>,
}

/// Free-form thinking: one multi-line string or a list of items
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Thinking {
    Items(Vec<String>),
    Text(String),
}

impl Thinking {
    /// Returns the non-blank items, splitting text on lines
    pub fn items(&self) -> Vec<String> {
        match self {
            Thinking::Items(items) => items.clone(),
            Thinking::Text(text) => text
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct NextAction {
    #[serde(deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(deserialize_with = "lenient::string")]
    pub label: String,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub detail: Option<String>,
}

/// A node in the decision flow; `next` and `next_condition` name other nodes
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DecisionNode {
    #[serde(deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(deserialize_with = "lenient::string")]
    pub label: String,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub next: Option<String>,
    #[serde(deserialize_with = "lenient::string_list")]
    pub next_condition: Vec<String>,
}

/// Agent working notes rendered at the top of every document
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AiContext {
    #[serde(deserialize_with = "thinking")]
    pub current_thinking: Option<Thinking>,

    #[serde(deserialize_with = "lenient::records")]
    pub next_actions: Vec<NextAction>,

    #[serde(deserialize_with = "lenient::records")]
    pub decision_flow: Vec<DecisionNode>,
}

/// Scalars become text, list items are kept when they are scalars
fn thinking<'de, D>(deserializer: D) -> Result<Option<Thinking>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Sequence(items)) => Some(Thinking::Items(
            items.iter().filter_map(lenient::scalar_text).collect(),
        )),
        Some(other) => lenient::scalar_text(&other).map(Thinking::Text),
        None => None,
    })
}

impl AiContext {
    pub fn is_empty(&self) -> bool {
        self.current_thinking.is_none() && self.next_actions.is_empty() && self.decision_flow.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Constraint {
    #[serde(rename = "type", deserialize_with = "lenient::string")]
    pub kind: String,
    #[serde(deserialize_with = "lenient::string")]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Risk {
    #[serde(deserialize_with = "lenient::string")]
    pub risk: String,
    #[serde(deserialize_with = "lenient::string")]
    pub impact: String,
    #[serde(deserialize_with = "lenient::string")]
    pub mitigation: String,
}

/// Something blocking a WBS element
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Blocker {
    #[serde(deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(deserialize_with = "lenient::string")]
    pub description: String,
    #[serde(deserialize_with = "lenient::string")]
    pub related_element_id: String,
    #[serde(deserialize_with = "lenient::flag")]
    pub resolved: bool,
}

/// Evidence link; `url` is an http(s) URL or a project-relative path
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Reference {
    #[serde(deserialize_with = "lenient::string")]
    pub title: String,
    #[serde(deserialize_with = "lenient::string")]
    pub url: String,
}

/// A WBS document (`doc_type: wbs`)
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct WbsDocument {
    #[serde(deserialize_with = "lenient::record")]
    pub meta: Meta,

    #[serde(deserialize_with = "lenient::record")]
    pub overview: Overview,

    #[serde(deserialize_with = "lenient::record")]
    pub ai_context: Option<AiContext>,

    #[serde(deserialize_with = "lenient::records")]
    pub wbs_elements: Vec<WorkBreakdownElement>,

    #[serde(deserialize_with = "lenient::records")]
    pub constraints: Vec<Constraint>,

    #[serde(deserialize_with = "lenient::records")]
    pub risks: Vec<Risk>,

    #[serde(deserialize_with = "lenient::records")]
    pub blockers: Vec<Blocker>,

    #[serde(deserialize_with = "lenient::records")]
    pub references: Vec<Reference>,
}

/// A task line in any document's `tasks` list
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TaskEntry {
    #[serde(deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(deserialize_with = "lenient::string")]
    pub title: String,
    #[serde(deserialize_with = "opt_status")]
    pub status: Option<ElementStatus>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub wbs_code: Option<String>,
    #[serde(deserialize_with = "lenient::hours")]
    pub estimated_hours: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub priority: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient::string_list")]
    pub dependencies: Vec<String>,
}

impl TaskEntry {
    /// The task as a WBS work element; a missing status counts as todo
    pub fn to_element(&self) -> WorkBreakdownElement {
        WorkBreakdownElement {
            id: self.id.clone(),
            code: self.wbs_code.clone().unwrap_or_default(),
            kind: ElementKind::Task,
            title: self.title.clone(),
            status: self.status.clone().unwrap_or_default(),
            estimated_hours: self.estimated_hours,
            dependencies: self.dependencies.clone(),
            priority: self.priority.clone(),
            description: self.description.clone(),
            ..WorkBreakdownElement::default()
        }
    }
}

/// The task-bearing view of an arbitrary document
///
/// Used by the cross-document scan; fields other than these are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TaskDocument {
    #[serde(deserialize_with = "lenient::record")]
    pub meta: Meta,

    #[serde(deserialize_with = "lenient::record")]
    pub ai_context: Option<AiContext>,

    #[serde(deserialize_with = "lenient::records")]
    pub tasks: Vec<TaskEntry>,

    #[serde(deserialize_with = "lenient::records")]
    pub wbs_elements: Vec<WorkBreakdownElement>,

    #[serde(deserialize_with = "lenient::records")]
    pub references: Vec<Reference>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_wbs_document() {
        let yaml = r#"
meta:
  title: Release plan
  doc_type: wbs
  category: overview
  status: wip
  version: "1.0"
overview:
  goal: Ship it
  related_docs:
    - notes.md
    - title: Design
      url: categories/design/architecture/ai/document.yaml
ai_context:
  current_thinking: |
    first idea

    second idea
  next_actions:
    - id: a1
      label: Review
wbs_elements:
  - id: T1
    wbs_code: "1"
    type: task
  - just a string
constraints:
  - type: time
    description: Before June
blockers:
  - id: B1
    description: Waiting on API
    related_element_id: T1
    resolved: false
references:
  - title: Spec
    url: https://example.com
"#;
        let doc: WbsDocument = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(doc.meta.title.as_deref(), Some("Release plan"));
        assert_eq!(doc.meta.version.as_deref(), Some("1.0"));
        assert_eq!(doc.meta.status, Some(ElementStatus::Wip));
        assert_eq!(doc.overview.related_docs.len(), 2);
        assert_eq!(doc.overview.related_docs[0], RelatedDoc::Text("notes.md".to_string()));

        let ctx = doc.ai_context.unwrap();
        assert_eq!(
            ctx.current_thinking.unwrap().items(),
            vec!["first idea", "second idea"]
        );
        assert_eq!(ctx.next_actions[0].label, "Review");

        // The malformed element is dropped, the valid one kept
        assert_eq!(doc.wbs_elements.len(), 1);
        assert_eq!(doc.constraints[0].kind, "time");
        assert_eq!(doc.blockers[0].related_element_id, "T1");
        assert_eq!(doc.references[0].url, "https://example.com");
    }

    #[test]
    fn empty_document() {
        let doc: WbsDocument = serde_yaml::from_str("{}").unwrap();
        assert_eq!(doc, WbsDocument::default());
    }

    #[test]
    fn task_document_reads_tasks() {
        let yaml = r#"
meta: {title: Dev tasks}
tasks:
  - id: D-1
    title: Implement
    status: done
    wbs_code: "2.1"
    estimated_hours: "3"
"#;
        let doc: TaskDocument = serde_yaml::from_str(yaml).unwrap();
        let task = &doc.tasks[0];

        assert_eq!(task.status, Some(ElementStatus::Done));
        assert_eq!(task.wbs_code.as_deref(), Some("2.1"));
        assert_eq!(task.estimated_hours, Some(3.0));
    }

    #[test]
    fn task_entry_as_element() {
        let task: TaskEntry = serde_yaml::from_str(
            "{id: D-2, title: Test, wbs_code: '2.2', dependencies: D-1, priority: high}",
        )
        .unwrap();
        let element = task.to_element();

        assert_eq!(element.code, "2.2");
        assert_eq!(element.kind, ElementKind::Task);
        assert_eq!(element.status, ElementStatus::Todo);
        assert_eq!(element.dependencies, vec!["D-1"]);
        assert_eq!(element.priority.as_deref(), Some("high"));
    }

    #[test]
    fn malformed_sections_degrade_to_defaults() {
        let yaml = r#"
meta: ~
overview: just text
ai_context:
  current_thinking: 42
wbs_elements:
  - {id: T1, wbs_code: "1", type: task}
"#;
        let doc: WbsDocument = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(doc.meta, Meta::default());
        assert_eq!(doc.overview, Overview::default());
        let thinking = doc.ai_context.unwrap().current_thinking.unwrap();
        assert_eq!(thinking.items(), vec!["42"]);
        assert_eq!(doc.wbs_elements.len(), 1);
    }

    #[test]
    fn thinking_list_keeps_scalar_items() {
        let context: AiContext =
            serde_yaml::from_str("current_thinking: [first, 2, {x: 1}]").unwrap();
        assert_eq!(context.current_thinking.unwrap().items(), vec!["first", "2"]);
    }
}
