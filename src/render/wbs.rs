//! WBS renderer
//!
//! Turns a WBS document plus the cross-document scan results into Markdown:
//! progress toward the goal, milestones, the code tree, the task table and
//! the task state of every sibling document.

use chrono::NaiveDate;

use super::markdown::{
    ai_context_section, ellipsize, mermaid_id, mermaid_text, or_dash, overview_section,
    references_section, truncate, Markdown,
};
use super::RenderContext;
use crate::domain::{
    depth, remaining, status_label, CategoryBreakdown, CategoryTasks, DependencyGraph,
    ElementKind, ElementStatus, Hierarchy, Progress, StatusBreakdown, TaskState, WbsDocument,
    WorkBreakdownElement,
};

const DEFAULT_TITLE: &str = "WBS (Work Breakdown Structure)";

/// Renders a WBS document
pub fn render(document: &WbsDocument, ctx: &RenderContext<'_>) -> String {
    let mut md = Markdown::new();
    let elements = &document.wbs_elements;

    header(&mut md, document);

    if let Some(context) = &document.ai_context {
        md.section(&ai_context_section(context));
    }
    md.section(&overview_section(&document.overview));

    goal_status(&mut md, document, ctx);
    milestones(&mut md, elements, ctx.today);
    tree(&mut md, elements, ctx);
    task_list(&mut md, elements, ctx);

    constraints(&mut md, document);
    risks(&mut md, document);
    blockers(&mut md, document);

    md.section(&task_states_section(ctx.task_states));
    md.section(&category_tasks_section(ctx.category_tasks));
    md.section(&references_section(&document.references, ctx.links));

    md.finish().trim_end().to_string()
}

fn header(md: &mut Markdown, document: &WbsDocument) {
    let meta = &document.meta;
    md.line(format!("# {}", meta.title.as_deref().unwrap_or(DEFAULT_TITLE)))
        .blank();
    md.line(format!(
        "**Type:** 📋 WBS | **Status:** {} | **Version:** {}",
        meta.status.clone().unwrap_or_default().label(),
        meta.version.as_deref().unwrap_or("-")
    ));
    if let Some(author) = &meta.author {
        md.line(format!("**Author:** {}", author));
    }
    md.blank();
}

fn goal_status(md: &mut Markdown, document: &WbsDocument, ctx: &RenderContext<'_>) {
    let elements = &document.wbs_elements;
    let progress = Progress::from_elements(elements);

    md.heading(2, "Status toward goal");
    if let Some(goal) = &document.overview.goal {
        md.line(goal.trim()).blank();
    }

    md.line(format!(
        "- **Overall progress (tasks):** {}/{} tasks = **{:.0}%**",
        progress.done_count, progress.total_count, progress.task_pct
    ));
    if progress.total_hours > 0.0 {
        md.line(format!(
            "- **Overall progress (hours):** {:.0}/{:.0}h = **{:.0}%**",
            progress.done_hours, progress.total_hours, progress.hours_pct
        ));
    }

    let open = remaining(elements);
    if !open.is_empty() {
        let limit = ctx.settings.remaining_limit;
        let names: Vec<&str> = open
            .iter()
            .take(limit)
            .map(|e| if e.id.is_empty() { e.title.as_str() } else { e.id.as_str() })
            .collect();
        md.blank().line(format!("**Remaining:** {}", names.join(", ")));
        if open.len() > limit {
            md.line(format!("… and {} more", open.len() - limit));
        }
    }
    md.blank();

    md.line(format!(
        "Progress: `{}` {:.0}%",
        progress_bar(progress.task_pct, ctx.settings.progress_bar_width),
        progress.task_pct
    ))
    .blank();
}

/// Text progress bar of `width` cells
pub fn progress_bar(pct: f64, width: usize) -> String {
    let filled = ((width as f64 * pct / 100.0) as usize).min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// True when a milestone's target date has passed without it being done
pub fn is_overdue(element: &WorkBreakdownElement, today: NaiveDate) -> bool {
    if element.is_done() {
        return false;
    }
    element
        .target_date
        .as_deref()
        .and_then(|date| NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok())
        .is_some_and(|date| date < today)
}

fn milestones(md: &mut Markdown, elements: &[WorkBreakdownElement], today: NaiveDate) {
    let hierarchy = Hierarchy::new(elements.iter().filter(|e| e.kind == ElementKind::Milestone));
    if hierarchy.is_empty() {
        return;
    }

    md.heading(2, "Milestones");
    md.table(
        &["ID", "Title", "Target date", "Status"],
        hierarchy.ordered().iter().map(|m| {
            let date = m.target_date.clone().unwrap_or_default();
            let date = if is_overdue(m, today) {
                format!("{} ⚠️ overdue", date)
            } else {
                date
            };
            vec![m.id.clone(), m.title.clone(), date, m.status.label()]
        }),
    );
    md.blank();
}

fn tree(md: &mut Markdown, elements: &[WorkBreakdownElement], ctx: &RenderContext<'_>) {
    let hierarchy = Hierarchy::new(elements);
    if hierarchy.is_empty() {
        return;
    }

    md.heading(2, "WBS tree");
    for element in hierarchy.ordered() {
        md.line(format!(
            "{}- {} **{}** {} ({})",
            "  ".repeat(depth(&element.code)),
            element.kind.icon(),
            element.code,
            or_dash(&element.title),
            element.status.label()
        ));
    }
    md.blank();

    let mut body = vec!["flowchart TB".to_string()];
    for element in hierarchy.ordered() {
        let label = ellipsize(&element.title, ctx.settings.tree_title_limit);
        body.push(format!(
            "    {}[\"{} {}\"]",
            mermaid_id(element.node_key()),
            element.code,
            mermaid_text(&label)
        ));
    }
    for edge in hierarchy.parent_edges() {
        let parent = mermaid_id(edge.parent.node_key());
        let child = mermaid_id(edge.child.node_key());
        if parent != child {
            body.push(format!("    {} --> {}", parent, child));
        }
    }
    md.mermaid(body);
}

fn task_list(md: &mut Markdown, elements: &[WorkBreakdownElement], ctx: &RenderContext<'_>) {
    let work: Vec<&WorkBreakdownElement> = elements.iter().filter(|e| e.is_work()).collect();
    if work.is_empty() {
        return;
    }

    md.heading(2, "Tasks");

    let statuses = StatusBreakdown::from_elements(work.iter().copied());
    if statuses.total() > 0 {
        let mut body = vec!["pie showData".to_string(), "    title Task progress".to_string()];
        for (status, count) in statuses.entries() {
            let label = match status {
                ElementStatus::Todo => "TODO",
                ElementStatus::Wip => "WIP",
                _ => "Done",
            };
            body.push(format!("    \"{}\" : {}", label, count));
        }
        md.mermaid(body);
    }

    let categories = CategoryBreakdown::from_elements(work.iter().copied());
    if categories.total() > 0 {
        let mut body = vec![
            "pie showData".to_string(),
            "    title Task categories".to_string(),
        ];
        for (category, count) in categories.entries() {
            body.push(format!("    \"{}\" : {}", ctx.labels.category(category), count));
        }
        md.mermaid(body);
    }

    dependency_diagram(md, &work, ctx);

    let ordered = Hierarchy::new(work.iter().copied());
    md.table(
        &["ID", "WBS", "Type", "Task", "Category", "Priority", "Status", "Estimate (h)"],
        ordered.ordered().iter().map(|e| {
            vec![
                e.id.clone(),
                e.code.clone(),
                e.kind.as_str().to_string(),
                e.title.clone(),
                e.category
                    .as_deref()
                    .map(|c| ctx.labels.category(c).to_string())
                    .unwrap_or_default(),
                priority_cell(e.priority.as_deref()),
                format!("{} {}", e.status.icon(), e.status.as_str()),
                hours_cell(e.estimated_hours),
            ]
        }),
    );
    md.blank();

    for element in &work {
        if element.description.is_none() && element.dependencies.is_empty() {
            continue;
        }
        md.heading(
            3,
            &format!("{}: {}", or_dash(&element.id), or_dash(&element.title)),
        );
        if let Some(description) = &element.description {
            md.line(description.trim_end()).blank();
        }
        if !element.dependencies.is_empty() {
            md.line(format!("**Depends on:** {}", element.dependencies.join(", ")))
                .blank();
        }
    }
}

pub(super) fn dependency_diagram(
    md: &mut Markdown,
    work: &[&WorkBreakdownElement],
    ctx: &RenderContext<'_>,
) {
    if work.iter().all(|e| e.dependencies.is_empty()) {
        return;
    }

    let graph = DependencyGraph::from_elements(work.iter().copied());
    let mut body = vec!["flowchart LR".to_string()];
    for element in work.iter().take(ctx.settings.dependency_node_limit) {
        let id = mermaid_id(&element.id);
        let title = truncate(&element.title, ctx.settings.dependency_title_limit);
        body.push(format!(
            "    {}[\"{}: {}\"]",
            id,
            mermaid_text(&element.id),
            mermaid_text(title)
        ));
        for dependency in graph.dependencies(&element.id) {
            body.push(format!("    {} --> {}", mermaid_id(&dependency), id));
        }
    }
    md.mermaid(body);
}

pub(super) fn priority_cell(priority: Option<&str>) -> String {
    match priority {
        Some(p @ "high") => format!("🔴 {}", p),
        Some(p @ "medium") => format!("🟡 {}", p),
        Some(p @ "low") => format!("🟢 {}", p),
        Some(p) => p.to_string(),
        None => "-".to_string(),
    }
}

pub(super) fn hours_cell(hours: Option<f64>) -> String {
    hours.map(|h| h.to_string()).unwrap_or_else(|| "-".to_string())
}

fn constraints(md: &mut Markdown, document: &WbsDocument) {
    if document.constraints.is_empty() {
        return;
    }

    md.heading(2, "Constraints");
    for constraint in &document.constraints {
        let icon = match constraint.kind.as_str() {
            "technical" => "🔧",
            "business" => "💼",
            "resource" => "👥",
            "time" => "⏰",
            _ => "•",
        };
        md.line(format!(
            "- {} **{}**: {}",
            icon,
            or_dash(&constraint.kind),
            or_dash(&constraint.description)
        ));
    }
    md.blank();
}

fn impact_icon(impact: &str) -> &'static str {
    match impact {
        "high" => "🔴",
        "medium" => "🟡",
        "low" => "🟢",
        _ => "",
    }
}

fn risks(md: &mut Markdown, document: &WbsDocument) {
    if document.risks.is_empty() {
        return;
    }

    md.heading(2, "Risks");
    md.table(
        &["Risk", "Impact", "Mitigation"],
        document.risks.iter().map(|r| {
            vec![
                r.risk.clone(),
                format!("{} {}", impact_icon(&r.impact), or_dash(&r.impact)),
                r.mitigation.clone(),
            ]
        }),
    );
    md.blank();
}

fn blockers(md: &mut Markdown, document: &WbsDocument) {
    if document.blockers.is_empty() {
        return;
    }

    md.heading(2, "Blockers");
    md.table(
        &["ID", "Description", "Element", "Resolved"],
        document.blockers.iter().map(|b| {
            let resolved = if b.resolved { "✅ Resolved" } else { "⬜ Open" };
            vec![
                b.id.clone(),
                b.description.clone(),
                b.related_element_id.clone(),
                resolved.to_string(),
            ]
        }),
    );
    md.blank();
}

/// Document status and task list of every scanned document
pub fn task_states_section(states: &[TaskState]) -> String {
    if states.is_empty() {
        return String::new();
    }

    let mut md = Markdown::new();
    md.heading(2, "Task state by category");
    md.line("Document status and tasks of every document in the configured categories.")
        .blank();

    for state in states {
        md.heading(3, &format!("{} / {}", state.category, state.doc_type));
        md.line(format!("- **Title:** {}", state.title));
        md.line(format!(
            "- **Document status:** {}",
            status_label(state.status.as_ref())
        ));
        if !state.tasks.is_empty() {
            md.blank();
            md.table(
                &["ID", "Title", "Status"],
                state.tasks.iter().map(|t| {
                    vec![t.id.clone(), t.title.clone(), status_label(t.status.as_ref())]
                }),
            );
        }
        md.blank();
    }

    md.finish()
}

/// Detailed tasks of each category, ordered by WBS code
pub fn category_tasks_section(entries: &[CategoryTasks]) -> String {
    if entries.is_empty() {
        return String::new();
    }

    let mut md = Markdown::new();
    md.heading(2, "Detailed tasks by category");
    md.line("Tasks from each category's `tasks` document, linked to the WBS by `wbs_code`.")
        .blank();

    for entry in entries {
        md.heading(3, &format!("{} / tasks", entry.category));
        md.line(format!("- **Title:** {}", entry.title));
        md.line(format!(
            "- **Document status:** {}",
            status_label(entry.status.as_ref())
        ));
        if !entry.tasks.is_empty() {
            md.blank();
            md.table(
                &["ID", "WBS", "Task", "Status", "Estimate (h)"],
                entry.tasks_by_code().into_iter().map(|t| {
                    vec![
                        t.id.clone(),
                        t.wbs_code.clone().unwrap_or_default(),
                        t.title.clone(),
                        status_label(t.status.as_ref()),
                        hours_cell(t.estimated_hours),
                    ]
                }),
            );
        }
        md.blank();
    }

    md.finish()
}
