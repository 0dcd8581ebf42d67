//! Render command
//!
//! Scans sibling documents once, then renders any number of documents with
//! the same context.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use serde_yaml::Value;
use tracing::debug;

use super::app::today_or;
use super::output::Output;
use crate::domain::{CategoryTasks, TaskState};
use crate::render::{renderer_for, supported_doc_types, DocumentRenderer, RenderContext};
use crate::storage::{load_value, meta_of, scan, LinkResolver, Project};

/// Render a document to stdout or a file
pub fn render(
    output: &Output,
    project: &Project,
    input: &Path,
    out: Option<&Path>,
    today: Option<NaiveDate>,
) -> Result<()> {
    let document = load_value(input)?;
    let doc_type = meta_of(&document).doc_type.unwrap_or_default();
    let renderer = renderer_for(&doc_type).ok_or_else(|| {
        anyhow!(
            "No renderer for doc_type '{}' (supported: {})",
            doc_type,
            supported_doc_types().join(", ")
        )
    })?;

    let session = RenderSession::new(project, today_or(today));
    let markdown = session.render(renderer, document, out)?;

    match out {
        Some(path) => {
            write_markdown(path, &markdown)?;
            output.success(&format!("✅ {}", path.display()));
        }
        None if output.is_json() => output.data(&serde_json::json!({ "markdown": markdown })),
        None => println!("{}", markdown),
    }

    Ok(())
}

/// Scan results and settings shared by every render of one run
pub(super) struct RenderSession<'p> {
    project: &'p Project,
    today: NaiveDate,
    task_states: Vec<TaskState>,
    category_tasks: Vec<CategoryTasks>,
}

impl<'p> RenderSession<'p> {
    pub(super) fn new(project: &'p Project, today: NaiveDate) -> Self {
        let task_states = scan::task_states(project);
        let category_tasks = scan::category_tasks(project);
        debug!(
            documents = task_states.len(),
            task_lists = category_tasks.len(),
            %today,
            "Prepared render session"
        );

        Self {
            project,
            today,
            task_states,
            category_tasks,
        }
    }

    /// Renders one document; links are rewritten when an output path is known
    pub(super) fn render(
        &self,
        renderer: &dyn DocumentRenderer,
        document: Value,
        out: Option<&Path>,
    ) -> Result<String> {
        let config = &self.project.config().project;
        let links = out.map(|path| LinkResolver::new(self.project.root(), path, &config.layout));

        let ctx = RenderContext {
            settings: &config.render,
            labels: &config.labels,
            today: self.today,
            task_states: &self.task_states,
            category_tasks: &self.category_tasks,
            links: links.as_ref(),
        };

        renderer
            .render(document, &ctx)
            .with_context(|| format!("Failed to render {} document", renderer.doc_type()))
    }
}

/// Writes Markdown, creating parent directories
pub(super) fn write_markdown(path: &Path, markdown: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, markdown).with_context(|| format!("Failed to write {}", path.display()))
}
