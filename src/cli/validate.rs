//! Validation commands (validate, check-links)

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use serde::Serialize;
use tracing::debug;

use super::output::Output;
use crate::storage::{
    broken_markdown_links, broken_project_links, common_warnings, load_value, meta_of,
    missing_file_paths, Project, SchemaValidator,
};

/// Options of a single document validation
#[derive(Debug, Clone, Default)]
pub struct ValidateOptions {
    /// Schema to use instead of the document's own
    pub schema: Option<PathBuf>,
    pub strict: bool,
    pub check_file_paths: bool,
}

/// Outcome of validating one document
#[derive(Debug, Default, Serialize)]
pub struct ValidationReport {
    pub file: PathBuf,
    pub schema: PathBuf,
    pub category: Option<String>,
    pub doc_type: Option<String>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub file_path_errors: Vec<String>,
}

impl ValidationReport {
    pub fn error_count(&self) -> usize {
        self.errors.len() + self.file_path_errors.len()
    }

    /// Warnings only fail the document in strict mode
    pub fn passed(&self, strict: bool) -> bool {
        self.error_count() == 0 && (!strict || self.warnings.is_empty())
    }
}

/// Validates a document against its schema, the common checks and,
/// optionally, the existence of referenced files
pub(super) fn check_document(
    project: &Project,
    input: &Path,
    options: &ValidateOptions,
) -> Result<ValidationReport> {
    let document = load_value(input)?;
    let meta = meta_of(&document);

    let schema_path = match &options.schema {
        Some(path) => path.clone(),
        None => {
            let (category, doc_type) = meta
                .category
                .as_deref()
                .zip(meta.doc_type.as_deref())
                .ok_or_else(|| {
                    anyhow!("Cannot detect category/doc_type: set meta.category and meta.doc_type")
                })?;
            let path = project.schema_path(category, doc_type);
            if !path.is_file() {
                bail!("Schema not found: {}/{}", category, doc_type);
            }
            path
        }
    };

    debug!(file = %input.display(), schema = %schema_path.display(), "Validating");
    let validator = SchemaValidator::load(&schema_path)?;
    let errors = validator
        .validate(&document)
        .with_context(|| format!("Failed to validate {}", input.display()))?
        .iter()
        .map(ToString::to_string)
        .collect();

    let file_path_errors = if options.check_file_paths {
        missing_file_paths(&document, project.root())
    } else {
        vec![]
    };

    Ok(ValidationReport {
        file: input.to_path_buf(),
        schema: schema_path,
        warnings: common_warnings(&meta),
        category: meta.category,
        doc_type: meta.doc_type,
        errors,
        file_path_errors,
    })
}

/// Validate one document
pub fn validate(
    output: &Output,
    project: &Project,
    input: &Path,
    options: &ValidateOptions,
) -> Result<()> {
    let report = check_document(project, input, options)?;
    let passed = report.passed(options.strict);

    if output.is_json() {
        output.data(&serde_json::json!({
            "success": passed,
            "report": report,
        }));
    } else {
        print_report(&report);
        if passed && report.warnings.is_empty() {
            println!("✅ Validation passed");
        } else if passed {
            println!("✅ Validation passed ({} warnings)", report.warnings.len());
        }
    }

    if !passed {
        if options.strict {
            bail!(
                "Validation failed ({} errors, {} warnings)",
                report.error_count(),
                report.warnings.len()
            );
        }
        bail!("Validation failed ({} errors)", report.error_count());
    }

    Ok(())
}

fn print_report(report: &ValidationReport) {
    println!("📄 File:   {}", report.file.display());
    println!("📋 Schema: {}", report.schema.display());
    println!(
        "📁 Path:   {}/{}",
        report.category.as_deref().unwrap_or("-"),
        report.doc_type.as_deref().unwrap_or("-")
    );

    for (title, lines) in [
        ("Errors", &report.errors),
        ("Warnings", &report.warnings),
        ("File path errors", &report.file_path_errors),
    ] {
        if lines.is_empty() {
            continue;
        }
        println!();
        println!("=== {} ===", title);
        for line in lines {
            println!("{}", line);
        }
    }
    println!();
}

/// Check relative links in one rendered file or all of them
pub fn check_links(output: &Output, project: &Project, input: Option<&Path>) -> Result<()> {
    let broken = match input {
        Some(path) => {
            if !path.is_file() {
                bail!("Not a file: {}", path.display());
            }
            broken_markdown_links(path)
        }
        None => broken_project_links(project),
    };

    if output.is_json() {
        output.data(&serde_json::json!({
            "success": broken.is_empty(),
            "broken": broken,
        }));
    } else {
        for line in &broken {
            println!("{}", line);
        }
    }

    if !broken.is_empty() {
        bail!("Link check failed ({} broken)", broken.len());
    }

    output.text("✅ Link check passed");
    Ok(())
}
