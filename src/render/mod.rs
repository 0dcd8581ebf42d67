//! # Render Layer
//!
//! Pure Markdown builders. Renderers never touch the file system: the
//! caller scans sibling documents, picks "today" and resolves links, then
//! hands everything in through [`RenderContext`].

pub mod markdown;
pub mod tasks;
pub mod wbs;

use chrono::NaiveDate;

use crate::domain::{CategoryTasks, TaskDocument, TaskState, WbsDocument};
use crate::storage::{LabelConfig, LinkResolver, RenderConfig};

/// Inputs shared by every renderer
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub settings: &'a RenderConfig,
    pub labels: &'a LabelConfig,
    /// Date used for overdue checks
    pub today: NaiveDate,
    pub task_states: &'a [TaskState],
    pub category_tasks: &'a [CategoryTasks],
    /// Rewrites links relative to the output file; `None` keeps them as written
    pub links: Option<&'a LinkResolver>,
}

/// A Markdown renderer for one doc_type
pub trait DocumentRenderer: Sync {
    /// The `meta.doc_type` this renderer handles
    fn doc_type(&self) -> &'static str;

    /// Renders a parsed YAML document
    fn render(
        &self,
        document: serde_yaml::Value,
        ctx: &RenderContext<'_>,
    ) -> Result<String, serde_yaml::Error>;
}

/// Renderer for `wbs` documents
pub struct WbsRenderer;

impl DocumentRenderer for WbsRenderer {
    fn doc_type(&self) -> &'static str {
        "wbs"
    }

    fn render(
        &self,
        document: serde_yaml::Value,
        ctx: &RenderContext<'_>,
    ) -> Result<String, serde_yaml::Error> {
        let document: WbsDocument = serde_yaml::from_value(document)?;
        Ok(wbs::render(&document, ctx))
    }
}

/// Renderer for a category's detailed `tasks` list
pub struct TasksRenderer;

impl DocumentRenderer for TasksRenderer {
    fn doc_type(&self) -> &'static str {
        "tasks"
    }

    fn render(
        &self,
        document: serde_yaml::Value,
        ctx: &RenderContext<'_>,
    ) -> Result<String, serde_yaml::Error> {
        let document: TaskDocument = serde_yaml::from_value(document)?;
        Ok(tasks::render(&document, ctx))
    }
}

static RENDERERS: &[&dyn DocumentRenderer] = &[&WbsRenderer, &TasksRenderer];

/// Finds the renderer registered for a doc_type
pub fn renderer_for(doc_type: &str) -> Option<&'static dyn DocumentRenderer> {
    RENDERERS.iter().copied().find(|r| r.doc_type() == doc_type)
}

/// Doc types that have a renderer
pub fn supported_doc_types() -> Vec<&'static str> {
    RENDERERS.iter().map(|r| r.doc_type()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renderers_are_registered() {
        assert_eq!(renderer_for("wbs").unwrap().doc_type(), "wbs");
        assert_eq!(renderer_for("tasks").unwrap().doc_type(), "tasks");
        assert!(renderer_for("requirements").is_none());
        assert_eq!(supported_doc_types(), vec!["wbs", "tasks"]);
    }

    #[test]
    fn renders_from_yaml_value() {
        let settings = RenderConfig::default();
        let labels = LabelConfig::default();
        let ctx = RenderContext {
            settings: &settings,
            labels: &labels,
            today: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            task_states: &[],
            category_tasks: &[],
            links: None,
        };

        let value: serde_yaml::Value = serde_yaml::from_str("meta: {title: Plan}").unwrap();
        let md = WbsRenderer.render(value, &ctx).unwrap();
        assert!(md.starts_with("# Plan"));

        let value: serde_yaml::Value =
            serde_yaml::from_str("meta: {title: Todo}\ntasks: [{id: D-1, title: One}]").unwrap();
        let md = TasksRenderer.render(value, &ctx).unwrap();
        assert!(md.starts_with("# Todo"));
        assert!(md.contains("| D-1 | - | One |"));
    }
}
