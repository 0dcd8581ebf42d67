//! Build command
//!
//! Validates and renders documents in bulk. Every YAML file in a doc_type's
//! source directory is processed, except fixtures named `invalid_*`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, warn};

use super::app::today_or;
use super::output::Output;
use super::render_cmd::{write_markdown, RenderSession};
use super::validate::{check_document, ValidateOptions};
use crate::render::renderer_for;
use crate::storage::{load_value, meta_of, Project};

/// What to build
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    All,
    Category(String),
    File(PathBuf),
}

/// Result of processing one document
#[derive(Debug, Serialize)]
struct BuildResult {
    file: PathBuf,
    success: bool,
    /// Rendered Markdown path, when a renderer ran
    rendered: Option<PathBuf>,
    messages: Vec<String>,
}

pub fn build(
    output: &Output,
    project: &Project,
    target: Target,
    validate_only: bool,
    today: Option<NaiveDate>,
) -> Result<()> {
    let files = match &target {
        Target::File(path) => {
            if !path.is_file() {
                bail!("File not found: {}", path.display());
            }
            vec![path.clone()]
        }
        Target::Category(category) => {
            let available = project.available_categories();
            if !available.contains(category) {
                bail!(
                    "Unknown category: {} (available: {})",
                    category,
                    available.join(", ")
                );
            }
            source_files(project, category)
        }
        Target::All => project
            .available_categories()
            .iter()
            .flat_map(|category| source_files(project, category))
            .collect(),
    };
    debug!(count = files.len(), "Collected source documents");

    let session = (!validate_only).then(|| RenderSession::new(project, today_or(today)));
    let results: Vec<BuildResult> = files
        .iter()
        .map(|file| process(project, file, session.as_ref()))
        .collect();

    let succeeded = results.iter().filter(|r| r.success).count();
    let failed = results.len() - succeeded;

    if output.is_json() {
        output.data(&serde_json::json!({
            "succeeded": succeeded,
            "failed": failed,
            "results": results,
        }));
    } else {
        for result in &results {
            let icon = if result.success { "✅" } else { "❌" };
            println!("{} {}", icon, result.file.display());
            for message in &result.messages {
                println!("    {}", message);
            }
        }
        println!();
        println!("Result: succeeded {} / failed {}", succeeded, failed);
    }

    if failed > 0 {
        bail!("{} of {} documents failed", failed, results.len());
    }
    Ok(())
}

/// YAML sources of every schema-backed doc_type in a category, sorted
fn source_files(project: &Project, category: &str) -> Vec<PathBuf> {
    project
        .doc_types(category)
        .iter()
        .flat_map(|doc_type| {
            let source = project.ai_document_path(category, doc_type);
            let dir = source.parent().map(Path::to_path_buf).unwrap_or_default();
            yaml_files(&dir)
        })
        .collect()
}

fn yaml_files(dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return vec![],
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("yaml") | Some("yml")
            )
        })
        .filter(|path| {
            !path
                .file_name()
                .map(|name| name.to_string_lossy().starts_with("invalid_"))
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    files
}

fn process(project: &Project, file: &Path, session: Option<&RenderSession<'_>>) -> BuildResult {
    let mut result = BuildResult {
        file: project.relative_path(file).unwrap_or_else(|| file.to_path_buf()),
        success: false,
        rendered: None,
        messages: vec![],
    };

    let options = ValidateOptions {
        check_file_paths: true,
        ..ValidateOptions::default()
    };
    match check_document(project, file, &options) {
        Ok(report) if report.passed(false) => {
            result.messages.extend(report.warnings.iter().map(|w| format!("⚠️ {}", w)));
        }
        Ok(report) => {
            result.messages.extend(report.errors);
            result.messages.extend(report.file_path_errors);
            return result;
        }
        Err(err) => {
            warn!(file = %file.display(), error = %format!("{:#}", err), "Validation failed");
            result.messages.push(format!("{:#}", err));
            return result;
        }
    }

    let Some(session) = session else {
        result.success = true;
        return result;
    };

    match render_one(project, file, session) {
        Ok(Some(path)) => {
            result.rendered = Some(project.relative_path(&path).unwrap_or(path));
            result.success = true;
        }
        Ok(None) => {
            result.messages.push("No renderer for this doc_type; validated only".to_string());
            result.success = true;
        }
        Err(err) => result.messages.push(format!("{:#}", err)),
    }
    result
}

/// Renders a validated source next to its rendered siblings
fn render_one(project: &Project, file: &Path, session: &RenderSession<'_>) -> Result<Option<PathBuf>> {
    let document = load_value(file)?;
    let doc_type = meta_of(&document).doc_type.unwrap_or_default();
    let Some(renderer) = renderer_for(&doc_type) else {
        return Ok(None);
    };

    let out = output_path(project, file)?;
    let markdown = session.render(renderer, document, Some(&out))?;
    write_markdown(&out, &markdown)?;
    Ok(Some(out))
}

/// `human/document.md` for the main source, `human/<stem>.md` for others
fn output_path(project: &Project, file: &Path) -> Result<PathBuf> {
    let standard = project.output_path_for(file)?;
    let layout = &project.config().project.layout;
    let main_stem = Path::new(&layout.ai_document).file_stem();

    if file.file_stem() == main_stem {
        return Ok(standard);
    }

    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(standard.with_file_name(format!("{}.md", stem)))
}
