//! Project commands (init, list)

use std::path::Path;

use anyhow::Result;
use serde::Serialize;
use tracing::debug;

use super::output::Output;
use crate::storage::Project;

/// Initialize a project
pub fn init(output: &Output, path: &Path) -> Result<()> {
    debug!(path = %path.display(), "Initializing project");
    let project = Project::init(path)?;

    output.success(&format!(
        "Initialized docket project at {}",
        project.root().display()
    ));
    Ok(())
}

#[derive(Serialize)]
struct CategoryListing {
    category: String,
    doc_types: Vec<String>,
}

/// List categories and their schema-backed document types
pub fn list(output: &Output, project: &Project) -> Result<()> {
    let listing: Vec<CategoryListing> = project
        .available_categories()
        .into_iter()
        .map(|category| CategoryListing {
            doc_types: project.doc_types(&category),
            category,
        })
        .collect();

    if output.is_json() {
        output.data(&listing);
    } else if listing.is_empty() {
        println!("No document types found.");
    } else {
        println!("Available category/doc_type:");
        for entry in &listing {
            println!();
            println!("📦 {}", entry.category);
            for doc_type in &entry.doc_types {
                println!("   └─ {}", doc_type);
            }
        }
    }

    Ok(())
}
