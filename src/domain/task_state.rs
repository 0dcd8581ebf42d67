//! Cross-document task state
//!
//! Sibling documents carry their own task lists. The scan reads each one
//! independently; this module turns the per-document read results into
//! display records, skipping documents that could not be read.

use serde::Serialize;

use super::code::sort_key;
use super::document::TaskDocument;
use super::element::ElementStatus;

/// A task reduced to what the aggregate view shows
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TaskSummary {
    pub id: String,
    pub title: String,
    pub status: Option<ElementStatus>,
}

/// Task state of one document
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TaskState {
    pub category: String,
    pub doc_type: String,
    pub title: String,
    pub status: Option<ElementStatus>,
    pub tasks: Vec<TaskSummary>,
}

/// Where a document was found, used for fallback names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentOrigin {
    pub category: String,
    /// Name of the doc_type directory
    pub dir_name: String,
    /// File stem of the document, e.g. `document`
    pub file_stem: String,
}

impl TaskState {
    /// Extracts the task state of a document
    ///
    /// `tasks` wins when non-empty; otherwise tasks and milestones from
    /// `wbs_elements` are used. A document with neither still yields a state
    /// with no tasks.
    pub fn from_document(origin: &DocumentOrigin, document: &TaskDocument) -> Self {
        let tasks = if !document.tasks.is_empty() {
            document
                .tasks
                .iter()
                .map(|t| TaskSummary {
                    id: t.id.clone(),
                    title: t.title.clone(),
                    status: t.status.clone(),
                })
                .collect()
        } else {
            document
                .wbs_elements
                .iter()
                .filter(|e| e.is_work())
                .map(|e| TaskSummary {
                    id: e.id.clone(),
                    title: e.title.clone(),
                    status: Some(e.status.clone()),
                })
                .collect()
        };

        Self {
            category: origin.category.clone(),
            doc_type: document
                .meta
                .doc_type
                .clone()
                .unwrap_or_else(|| origin.dir_name.clone()),
            title: document
                .meta
                .title
                .clone()
                .unwrap_or_else(|| origin.file_stem.clone()),
            status: document.meta.status.clone(),
            tasks,
        }
    }
}

/// Folds per-document read results into task states
///
/// Failed reads are skipped; `on_skip` is told about each one so the caller
/// can log it. Order of the input is preserved.
pub fn collect_task_states<E, I, F>(reads: I, mut on_skip: F) -> Vec<TaskState>
where
    I: IntoIterator<Item = (DocumentOrigin, Result<TaskDocument, E>)>,
    F: FnMut(&DocumentOrigin, &E),
{
    reads
        .into_iter()
        .filter_map(|(origin, read)| match read {
            Ok(document) => Some(TaskState::from_document(&origin, &document)),
            Err(err) => {
                on_skip(&origin, &err);
                None
            }
        })
        .collect()
}

/// A task from a category's dedicated `tasks` document
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryTask {
    pub id: String,
    pub title: String,
    pub wbs_code: Option<String>,
    pub status: Option<ElementStatus>,
    pub estimated_hours: Option<f64>,
}

/// Detailed task list of one category, linked to the WBS by `wbs_code`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryTasks {
    pub category: String,
    pub title: String,
    pub status: Option<ElementStatus>,
    pub tasks: Vec<CategoryTask>,
}

impl CategoryTasks {
    pub fn from_document(category: &str, document: &TaskDocument) -> Self {
        Self {
            category: category.to_string(),
            title: document.meta.title.clone().unwrap_or_default(),
            status: document.meta.status.clone(),
            tasks: document
                .tasks
                .iter()
                .map(|t| CategoryTask {
                    id: t.id.clone(),
                    title: t.title.clone(),
                    wbs_code: t.wbs_code.clone(),
                    status: t.status.clone(),
                    estimated_hours: t.estimated_hours,
                })
                .collect(),
        }
    }

    /// Tasks ordered by WBS code; tasks without a code come first
    pub fn tasks_by_code(&self) -> Vec<&CategoryTask> {
        let mut tasks: Vec<_> = self.tasks.iter().collect();
        tasks.sort_by_cached_key(|t| sort_key(t.wbs_code.as_deref().unwrap_or("")));
        tasks
    }
}

/// Folds per-category read results into category task lists, skipping failures
pub fn collect_category_tasks<E, I, F>(reads: I, mut on_skip: F) -> Vec<CategoryTasks>
where
    I: IntoIterator<Item = (String, Result<TaskDocument, E>)>,
    F: FnMut(&str, &E),
{
    reads
        .into_iter()
        .filter_map(|(category, read)| match read {
            Ok(document) => Some(CategoryTasks::from_document(&category, &document)),
            Err(err) => {
                on_skip(&category, &err);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin(category: &str, dir: &str) -> DocumentOrigin {
        DocumentOrigin {
            category: category.to_string(),
            dir_name: dir.to_string(),
            file_stem: "document".to_string(),
        }
    }

    fn doc(yaml: &str) -> TaskDocument {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn tasks_take_precedence_over_wbs_elements() {
        let document = doc(
            r#"
meta: {title: Plan, doc_type: implementation_plan, status: wip}
tasks:
  - {id: T1, title: Build, status: done}
wbs_elements:
  - {id: W1, type: task, title: Ignored}
"#,
        );
        let state = TaskState::from_document(&origin("development", "plan"), &document);

        assert_eq!(state.category, "development");
        assert_eq!(state.doc_type, "implementation_plan");
        assert_eq!(state.title, "Plan");
        assert_eq!(state.status, Some(ElementStatus::Wip));
        assert_eq!(state.tasks.len(), 1);
        assert_eq!(state.tasks[0].id, "T1");
        assert_eq!(state.tasks[0].status, Some(ElementStatus::Done));
    }

    #[test]
    fn wbs_elements_filtered_to_work() {
        let document = doc(
            r#"
wbs_elements:
  - {id: S, type: summary, title: Group}
  - {id: T, type: task, title: Task}
  - {id: M, type: milestone, title: Gate, status: done}
"#,
        );
        let state = TaskState::from_document(&origin("overview", "wbs"), &document);

        let ids: Vec<_> = state.tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["T", "M"]);
        assert_eq!(state.tasks[0].status, Some(ElementStatus::Todo));
    }

    #[test]
    fn fallback_names() {
        let state = TaskState::from_document(&origin("design", "requirements"), &doc("{}"));

        assert_eq!(state.doc_type, "requirements");
        assert_eq!(state.title, "document");
        assert_eq!(state.status, None);
        assert!(state.tasks.is_empty());
    }

    #[test]
    fn failed_reads_are_skipped() {
        let reads = vec![
            (origin("overview", "wbs"), Ok(doc("meta: {title: A}"))),
            (origin("design", "broken"), Err("bad yaml")),
            (origin("development", "tasks"), Ok(doc("meta: {title: C}"))),
        ];

        let mut skipped = Vec::new();
        let states = collect_task_states(reads, |origin, err| {
            skipped.push((origin.dir_name.clone(), err.to_string()));
        });

        let titles: Vec<_> = states.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "C"]);
        assert_eq!(skipped, vec![("broken".to_string(), "bad yaml".to_string())]);
    }

    #[test]
    fn no_cross_document_dedup() {
        let reads: Vec<(DocumentOrigin, Result<TaskDocument, String>)> = vec![
            (origin("design", "a"), Ok(doc("tasks: [{id: T1}]"))),
            (origin("development", "b"), Ok(doc("tasks: [{id: T1}]"))),
        ];
        let states = collect_task_states(reads, |_, _| {});

        assert_eq!(states.len(), 2);
        assert_eq!(states[0].tasks[0].id, states[1].tasks[0].id);
    }

    #[test]
    fn category_tasks_sorted_by_code() {
        let document = doc(
            r#"
meta: {title: Dev tasks, status: todo}
tasks:
  - {id: B, wbs_code: "1.10", estimated_hours: 2}
  - {id: A, wbs_code: "1.2"}
  - {id: C}
"#,
        );
        let reads: Vec<(String, Result<TaskDocument, String>)> = vec![
            ("development".to_string(), Ok(document)),
            ("verification".to_string(), Err("missing".to_string())),
        ];
        let entries = collect_category_tasks(reads, |_, _| {});

        assert_eq!(entries.len(), 1);
        let ids: Vec<_> = entries[0].tasks_by_code().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["C", "A", "B"]);
        assert_eq!(entries[0].tasks[0].estimated_hours, Some(2.0));
    }
}
