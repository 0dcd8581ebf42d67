//! Query commands (progress, tasks)

use std::path::Path;

use anyhow::Result;

use super::output::Output;
use crate::domain::{
    remaining, status_label, CategoryBreakdown, Progress, StatusBreakdown, WbsDocument,
};
use crate::storage::{load_yaml, scan, Project};

/// Show the progress roll-up of a WBS document
pub fn progress(output: &Output, input: &Path) -> Result<()> {
    let document: WbsDocument = load_yaml(input)?;
    let elements = &document.wbs_elements;

    let progress = Progress::from_elements(elements);
    let statuses = StatusBreakdown::from_elements(elements);
    let categories = CategoryBreakdown::from_elements(elements);
    let open: Vec<&str> = remaining(elements)
        .into_iter()
        .map(|e| if e.id.is_empty() { e.title.as_str() } else { e.id.as_str() })
        .collect();

    if output.is_json() {
        let by_category: serde_json::Map<String, serde_json::Value> = categories
            .entries()
            .into_iter()
            .map(|(category, count)| (category.to_string(), count.into()))
            .collect();
        output.data(&serde_json::json!({
            "title": document.meta.title,
            "progress": progress,
            "status": statuses,
            "categories": by_category,
            "remaining": open,
        }));
        return Ok(());
    }

    if let Some(title) = &document.meta.title {
        println!("{}", title);
        println!("{}", "-".repeat(40));
    }
    println!(
        "Tasks:     {}/{} done ({:.0}%)",
        progress.done_count, progress.total_count, progress.task_pct
    );
    if progress.total_hours > 0.0 {
        println!(
            "Hours:     {:.1}/{:.1}h done ({:.0}%)",
            progress.done_hours, progress.total_hours, progress.hours_pct
        );
    }
    println!(
        "Status:    {} todo, {} wip, {} done",
        statuses.todo, statuses.wip, statuses.done
    );
    if !open.is_empty() {
        println!("Remaining: {}", open.join(", "));
    }

    Ok(())
}

/// Show the task state of every document
pub fn tasks(output: &Output, project: &Project) -> Result<()> {
    let states = scan::task_states(project);

    if output.is_json() {
        output.data(&states);
    } else if states.is_empty() {
        println!("No documents found.");
    } else {
        for state in &states {
            println!(
                "{}/{}  {}  [{}]",
                state.category,
                state.doc_type,
                state.title,
                status_label(state.status.as_ref())
            );
            for task in &state.tasks {
                println!(
                    "    {:<12} {:<12} {}",
                    task.id,
                    status_label(task.status.as_ref()),
                    task.title
                );
            }
        }
    }

    Ok(())
}
