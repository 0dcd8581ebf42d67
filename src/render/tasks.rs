//! Tasks renderer
//!
//! Renders a category's detailed task list: a status pie, the dependency
//! flowchart, a table in WBS code order and a detail section per task.

use super::markdown::{ai_context_section, or_dash, references_section, Markdown};
use super::wbs::{dependency_diagram, hours_cell, priority_cell};
use super::RenderContext;
use crate::domain::{
    sort_key, ElementStatus, StatusBreakdown, TaskDocument, TaskEntry, WorkBreakdownElement,
};

const DEFAULT_TITLE: &str = "Detailed tasks";

/// Renders a `tasks` document
pub fn render(document: &TaskDocument, ctx: &RenderContext<'_>) -> String {
    let mut md = Markdown::new();
    let meta = &document.meta;

    md.line(format!("# {}", meta.title.as_deref().unwrap_or(DEFAULT_TITLE)))
        .blank();
    md.line(format!(
        "**Type:** 📋 Tasks | **Status:** {} | **Version:** {}",
        meta.status.clone().unwrap_or_default().label(),
        meta.version.as_deref().unwrap_or("-")
    ));
    if let Some(author) = &meta.author {
        md.line(format!("**Author:** {}", author));
    }
    md.blank();

    if let Some(context) = &document.ai_context {
        md.section(&ai_context_section(context));
    }

    md.heading(2, "Task list");
    if document.tasks.is_empty() {
        md.line("(none)").blank();
    } else {
        task_list(&mut md, &document.tasks, ctx);
    }

    md.section(&references_section(&document.references, ctx.links));

    md.finish().trim_end().to_string()
}

fn task_list(md: &mut Markdown, tasks: &[TaskEntry], ctx: &RenderContext<'_>) {
    let elements: Vec<WorkBreakdownElement> = tasks.iter().map(TaskEntry::to_element).collect();
    let work: Vec<&WorkBreakdownElement> = elements.iter().collect();

    let statuses = StatusBreakdown::from_elements(work.iter().copied());
    if statuses.total() > 0 {
        let mut body = vec!["pie showData".to_string(), "    title Task progress".to_string()];
        for (status, count) in statuses.entries() {
            body.push(format!("    \"{}\" : {}", status.label(), count));
        }
        md.mermaid(body);
    }

    dependency_diagram(md, &work, ctx);

    let mut ordered: Vec<&TaskEntry> = tasks.iter().collect();
    ordered.sort_by_cached_key(|t| sort_key(t.wbs_code.as_deref().unwrap_or_default()));
    md.table(
        &["ID", "WBS", "Task", "Priority", "Status", "Estimate (h)", "Depends on"],
        ordered.iter().map(|t| {
            vec![
                t.id.clone(),
                t.wbs_code.clone().unwrap_or_default(),
                t.title.clone(),
                priority_cell(t.priority.as_deref()),
                status_cell(t.status.as_ref()),
                hours_cell(t.estimated_hours),
                t.dependencies.join(", "),
            ]
        }),
    );
    md.blank();

    for task in tasks {
        if task.description.is_none() && task.dependencies.is_empty() {
            continue;
        }
        md.heading(3, &format!("{}: {}", or_dash(&task.id), or_dash(&task.title)));
        if let Some(description) = &task.description {
            md.line(description.trim_end()).blank();
        }
        if !task.dependencies.is_empty() {
            md.line(format!("**Depends on:** {}", task.dependencies.join(", ")))
                .blank();
        }
    }
}

fn status_cell(status: Option<&ElementStatus>) -> String {
    match status {
        Some(status) => format!("{} {}", status.icon(), status.as_str())
            .trim()
            .to_string(),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{LabelConfig, RenderConfig};
    use chrono::NaiveDate;

    const SAMPLE: &str = r#"
meta:
  title: Development tasks
  status: wip
  author: kim
tasks:
  - {id: D-3, wbs_code: "1.10", title: Release notes, status: todo, priority: low}
  - {id: D-1, wbs_code: "1.2", title: Parser, status: done, estimated_hours: 3, description: Tokenizer and AST}
  - {id: D-2, wbs_code: "1.9", title: Renderer, estimated_hours: 5, dependencies: [D-1, X-9]}
references:
  - {title: WBS, url: "https://example.com/wbs"}
"#;

    fn render_yaml(yaml: &str) -> String {
        let document: TaskDocument = serde_yaml::from_str(yaml).unwrap();
        let settings = RenderConfig::default();
        let labels = LabelConfig::default();
        let ctx = RenderContext {
            settings: &settings,
            labels: &labels,
            today: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            task_states: &[],
            category_tasks: &[],
            links: None,
        };
        render(&document, &ctx)
    }

    #[test]
    fn header() {
        let md = render_yaml(SAMPLE);
        assert!(md.starts_with(
            "# Development tasks\n\n**Type:** 📋 Tasks | **Status:** 🔄 WIP | **Version:** -"
        ));
        assert!(md.contains("**Author:** kim"));
    }

    #[test]
    fn table_follows_code_order() {
        let md = render_yaml(SAMPLE);
        let d1 = md.find("| D-1 | 1.2 |").unwrap();
        let d2 = md.find("| D-2 | 1.9 |").unwrap();
        let d3 = md.find("| D-3 | 1.10 |").unwrap();
        assert!(d1 < d2 && d2 < d3);

        assert!(md.contains("| D-1 | 1.2 | Parser | - | ✅ done | 3 | - |"));
        assert!(md.contains("| D-2 | 1.9 | Renderer | - | - | 5 | D-1, X-9 |"));
        assert!(md.contains("| D-3 | 1.10 | Release notes | 🟢 low | ⬜ todo | - | - |"));
    }

    #[test]
    fn diagrams_and_details() {
        let md = render_yaml(SAMPLE);
        assert!(md.contains("\"✅ Done\" : 1"));
        assert!(md.contains("\"⬜ TODO\" : 2"));
        assert!(md.contains("flowchart LR"));
        assert!(md.contains("D_1 --> D_2"));
        assert!(!md.contains("X_9"));

        assert!(md.contains("### D-1: Parser\n\nTokenizer and AST"));
        assert!(md.contains("### D-2: Renderer\n\n**Depends on:** D-1, X-9"));
        assert!(!md.contains("### D-3"));
        assert!(md.contains("## References"));
    }

    #[test]
    fn empty_task_list() {
        let md = render_yaml("meta: {title: Nothing yet}");
        assert!(md.starts_with("# Nothing yet"));
        assert!(md.ends_with("## Task list\n\n(none)"));
    }

    #[test]
    fn output_is_deterministic() {
        assert_eq!(render_yaml(SAMPLE), render_yaml(SAMPLE));
    }
}
