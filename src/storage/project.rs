//! Project management
//!
//! Handles project initialization and resolves the document layout.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use super::config::PROJECT_CONFIG_FILE;
use super::Config;

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Not a docket project: {0}")]
    NotAProject(PathBuf),

    #[error("Not in a docket project. Run 'docket init' first.")]
    NotInProject,

    #[error("Document is outside the categories directory: {0}")]
    OutsideLayout(PathBuf),
}

/// A document location inside the layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPath {
    pub category: String,
    pub doc_type: String,
}

/// A docket project
#[derive(Debug)]
pub struct Project {
    root: PathBuf,
    config: Config,
}

impl Project {
    /// Opens an existing project at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let config = Config::for_project(&root)?;

        let categories_dir = root.join(&config.project.layout.categories_dir);
        if !categories_dir.is_dir() && !root.join(PROJECT_CONFIG_FILE).is_file() {
            return Err(ProjectError::NotAProject(root).into());
        }

        Ok(Self { root, config })
    }

    /// Opens the project at the current directory or a parent
    pub fn open_current() -> Result<Self> {
        let root = Config::find_project_root().ok_or(ProjectError::NotInProject)?;

        Self::open(root)
    }

    /// Initializes a new project at the given path
    ///
    /// Existing configuration and directories are left untouched.
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create project root: {}", root.display()))?;

        let config_path = root.join(PROJECT_CONFIG_FILE);
        if !config_path.exists() {
            fs::write(&config_path, DEFAULT_PROJECT_CONFIG)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        let project_config = Config::load_project_config(&root)?;
        let categories_dir = root.join(&project_config.layout.categories_dir);
        for category in &project_config.categories {
            let dir = categories_dir.join(category);
            fs::create_dir_all(&dir).with_context(|| {
                format!("Failed to create category directory: {}", dir.display())
            })?;
        }

        Self::open(root)
    }

    /// Returns the project root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the directory holding all categories
    pub fn categories_dir(&self) -> PathBuf {
        self.root.join(&self.config.project.layout.categories_dir)
    }

    /// Returns the directory of one document type
    pub fn doc_type_dir(&self, category: &str, doc_type: &str) -> PathBuf {
        self.categories_dir().join(category).join(doc_type)
    }

    /// Returns the YAML source path of a document
    pub fn ai_document_path(&self, category: &str, doc_type: &str) -> PathBuf {
        self.doc_type_dir(category, doc_type)
            .join(&self.config.project.layout.ai_document)
    }

    /// Returns the rendered Markdown path of a document
    pub fn human_document_path(&self, category: &str, doc_type: &str) -> PathBuf {
        self.doc_type_dir(category, doc_type)
            .join(&self.config.project.layout.human_document)
    }

    /// Returns the JSON Schema path of a document type
    pub fn schema_path(&self, category: &str, doc_type: &str) -> PathBuf {
        self.doc_type_dir(category, doc_type)
            .join(&self.config.project.layout.schema)
    }

    /// Categories that contain at least one schema-backed document type
    ///
    /// Configured categories come first in configured order, followed by any
    /// other directories sorted by name. Directories starting with `_` are
    /// ignored.
    pub fn available_categories(&self) -> Vec<String> {
        let mut found: Vec<String> = sorted_subdirs(&self.categories_dir())
            .into_iter()
            .filter(|name| !name.starts_with('_'))
            .filter(|name| !self.doc_types(name).is_empty())
            .collect();

        let configured = &self.config.project.categories;
        found.sort_by_key(|name| {
            configured
                .iter()
                .position(|c| c == name)
                .unwrap_or(configured.len())
        });
        found
    }

    /// Document types of a category that have a schema, sorted by name
    pub fn doc_types(&self, category: &str) -> Vec<String> {
        sorted_subdirs(&self.categories_dir().join(category))
            .into_iter()
            .filter(|doc_type| self.schema_path(category, doc_type).is_file())
            .collect()
    }

    /// All document directories of a category, sorted by name
    pub fn doc_type_dirs(&self, category: &str) -> Vec<String> {
        sorted_subdirs(&self.categories_dir().join(category))
    }

    /// Existing YAML sources, optionally limited to one category
    pub fn documents(&self, category: Option<&str>) -> Vec<(DocumentPath, PathBuf)> {
        let categories = match category {
            Some(category) => vec![category.to_string()],
            None => self.available_categories(),
        };

        categories
            .iter()
            .flat_map(|category| {
                self.doc_type_dirs(category)
                    .into_iter()
                    .map(move |doc_type| DocumentPath {
                        category: category.clone(),
                        doc_type,
                    })
            })
            .filter_map(|location| {
                let path = self.ai_document_path(&location.category, &location.doc_type);
                path.is_file().then_some((location, path))
            })
            .collect()
    }

    /// Resolves the category and doc_type directory of a document path
    ///
    /// The path must lie under `<categories_dir>/<category>/<doc_type>/`.
    pub fn locate(&self, path: &Path) -> Result<DocumentPath, ProjectError> {
        let absolute = absolute_path(path);
        let categories_dir = absolute_path(&self.categories_dir());

        let mut components = absolute
            .strip_prefix(&categories_dir)
            .map_err(|_| ProjectError::OutsideLayout(path.to_path_buf()))?
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned());

        match (components.next(), components.next(), components.next()) {
            (Some(category), Some(doc_type), Some(_)) => Ok(DocumentPath { category, doc_type }),
            _ => Err(ProjectError::OutsideLayout(path.to_path_buf())),
        }
    }

    /// Returns the rendered Markdown path for a YAML source path
    pub fn output_path_for(&self, source: &Path) -> Result<PathBuf, ProjectError> {
        let location = self.locate(source)?;
        Ok(self.human_document_path(&location.category, &location.doc_type))
    }

    /// Checks if a path is inside this project
    pub fn contains(&self, path: &Path) -> bool {
        absolute_path(path).starts_with(absolute_path(&self.root))
    }

    /// Returns a relative path from the project root
    pub fn relative_path(&self, path: &Path) -> Option<PathBuf> {
        absolute_path(path)
            .strip_prefix(absolute_path(&self.root))
            .ok()
            .map(|p| p.to_path_buf())
    }
}

/// Default `docket.toml` written by `docket init`
const DEFAULT_PROJECT_CONFIG: &str = r#"# docket configuration

# Categories in processing and display order
categories = ["overview", "design", "development", "investigation", "verification"]

[layout]
categories_dir = "categories"
ai_document = "ai/document.yaml"
human_document = "human/document.md"
schema = "ai/scheme.json"

[render]
progress_bar_width = 20
remaining_limit = 15
"#;

/// Names of the subdirectories of `dir`, sorted; missing dirs yield nothing
fn sorted_subdirs(dir: &Path) -> Vec<String> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return vec![],
    };

    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Absolute path with symlinks resolved as far as the path exists
///
/// The nearest existing ancestor is canonicalized and the missing tail is
/// appended unchanged, so a path resolves the same before and after it is
/// created.
pub(crate) fn absolute_path(path: &Path) -> PathBuf {
    let path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => path.to_path_buf(),
        }
    };

    let mut existing = path.as_path();
    let mut tail = Vec::new();
    loop {
        if let Ok(canonical) = existing.canonicalize() {
            return tail
                .iter()
                .rev()
                .fold(canonical, |resolved, part| resolved.join(part));
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                tail.push(name.to_os_string());
                existing = parent;
            }
            _ => return path.clone(),
        }
    }
}
