//! Cross-document scans
//!
//! Reads sibling documents of every configured category. A document that
//! cannot be read is skipped and logged; the scan itself never fails.

use std::path::Path;

use tracing::debug;

use super::document::{load_yaml, LoadError};
use super::Project;
use crate::domain::{
    collect_category_tasks, collect_task_states, CategoryTasks, DocumentOrigin, TaskDocument,
    TaskState,
};

/// Category whose `tasks` document is not part of the detailed task scan
const SUMMARY_CATEGORY: &str = "overview";

/// Document type holding a category's detailed task list
const TASKS_DOC_TYPE: &str = "tasks";

/// Task states of every document, in category then directory order
pub fn task_states(project: &Project) -> Vec<TaskState> {
    let reads = project
        .config()
        .project
        .categories
        .iter()
        .flat_map(|category| {
            project
                .doc_type_dirs(category)
                .into_iter()
                .map(move |dir_name| (category.clone(), dir_name))
        })
        .filter_map(|(category, dir_name)| {
            let path = project.ai_document_path(&category, &dir_name);
            if !path.is_file() {
                return None;
            }
            let origin = DocumentOrigin {
                category,
                dir_name,
                file_stem: file_stem(&path),
            };
            Some((origin, load_yaml::<TaskDocument>(&path)))
        });

    let states = collect_task_states(reads, |origin, err: &LoadError| {
        debug!(
            category = %origin.category,
            doc_type = %origin.dir_name,
            error = %err,
            "Skipping unreadable document"
        );
    });

    debug!(count = states.len(), "Collected task states");
    states
}

/// Detailed task lists from each category's `tasks` document
pub fn category_tasks(project: &Project) -> Vec<CategoryTasks> {
    let reads = project
        .config()
        .project
        .categories
        .iter()
        .filter(|category| category.as_str() != SUMMARY_CATEGORY)
        .filter_map(|category| {
            let path = project.ai_document_path(category, TASKS_DOC_TYPE);
            path.is_file()
                .then(|| (category.clone(), load_yaml::<TaskDocument>(&path)))
        });

    collect_category_tasks(reads, |category, err: &LoadError| {
        debug!(category = %category, error = %err, "Skipping unreadable task list");
    })
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
