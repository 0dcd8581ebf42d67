//! Configuration handling for docket
//!
//! Configuration is stored in `docket.toml` (project root) and
//! `~/.config/docket/config.toml` (global). Every section is optional and
//! falls back to the defaults below.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File name of the project configuration
pub const PROJECT_CONFIG_FILE: &str = "docket.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Output format for commands
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Document file names inside a doc_type directory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LayoutConfig {
    /// Directory holding the categories, relative to the project root
    pub categories_dir: String,

    /// Machine-authored YAML source
    pub ai_document: String,

    /// Rendered Markdown output
    pub human_document: String,

    /// JSON Schema of the YAML source
    pub schema: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            categories_dir: "categories".to_string(),
            ai_document: "ai/document.yaml".to_string(),
            human_document: "human/document.md".to_string(),
            schema: "ai/scheme.json".to_string(),
        }
    }
}

/// Display labels used by renderers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LabelConfig {
    /// Category name -> display label
    pub categories: BTreeMap<String, String>,
}

impl Default for LabelConfig {
    fn default() -> Self {
        let categories = [
            ("overview", "Overview"),
            ("design", "Design"),
            ("development", "Development"),
            ("investigation", "Investigation"),
            ("verification", "Verification"),
        ]
        .into_iter()
        .map(|(name, label)| (name.to_string(), label.to_string()))
        .collect();

        Self { categories }
    }
}

impl LabelConfig {
    /// Returns the label for a category, or the name itself when unlabeled
    pub fn category<'a>(&'a self, name: &'a str) -> &'a str {
        self.categories.get(name).map(String::as_str).unwrap_or(name)
    }
}

/// Limits applied while rendering
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RenderConfig {
    /// Width of the text progress bar, in cells
    pub progress_bar_width: usize,

    /// Remaining tasks listed before "and N more"
    pub remaining_limit: usize,

    /// Characters of a title shown in WBS tree nodes
    pub tree_title_limit: usize,

    /// Elements drawn in the dependency diagram
    pub dependency_node_limit: usize,

    /// Characters of a title shown in dependency nodes
    pub dependency_title_limit: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            progress_bar_width: 20,
            remaining_limit: 15,
            tree_title_limit: 20,
            dependency_node_limit: 15,
            dependency_title_limit: 12,
        }
    }
}

/// Project-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProjectConfig {
    /// Categories in processing and display order
    pub categories: Vec<String>,

    /// File layout
    pub layout: LayoutConfig,

    /// Display labels
    pub labels: LabelConfig,

    /// Rendering limits
    pub render: RenderConfig,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            categories: ["overview", "design", "development", "investigation", "verification"]
                .into_iter()
                .map(String::from)
                .collect(),
            layout: LayoutConfig::default(),
            labels: LabelConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

impl ProjectConfig {
    /// Checks values that parse but cannot work
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.categories.is_empty() {
            return Err(ConfigError::Invalid("categories must not be empty".to_string()));
        }

        if let Some(name) = self.categories.iter().find(|c| c.trim().is_empty() || c.contains('/')) {
            return Err(ConfigError::Invalid(format!("invalid category name: {:?}", name)));
        }

        let layout = &self.layout;
        for (key, value) in [
            ("layout.categories_dir", &layout.categories_dir),
            ("layout.ai_document", &layout.ai_document),
            ("layout.human_document", &layout.human_document),
            ("layout.schema", &layout.schema),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{} must not be empty", key)));
            }
        }

        Ok(())
    }
}

/// Global user configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct GlobalConfig {
    /// Default output format (text or json)
    pub default_format: OutputFormat,
}

/// Combined configuration (global + project)
#[derive(Debug, Clone)]
pub struct Config {
    pub project: ProjectConfig,
    pub global: GlobalConfig,
    pub project_root: Option<PathBuf>,
}

impl Config {
    /// Loads configuration for a specific project
    pub fn for_project(project_root: &Path) -> Result<Self> {
        let global = Self::load_global()?;
        let project = Self::load_project_config(project_root)?;

        Ok(Self {
            project,
            global,
            project_root: Some(project_root.to_path_buf()),
        })
    }

    /// Loads only the global configuration (no project)
    pub fn global_only() -> Result<Self> {
        Ok(Self {
            project: ProjectConfig::default(),
            global: Self::load_global()?,
            project_root: None,
        })
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "docket", "docket").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Loads global configuration
    fn load_global() -> Result<GlobalConfig> {
        let config_dir = match Self::global_config_dir() {
            Some(dir) => dir,
            None => return Ok(GlobalConfig::default()),
        };

        let config_path = config_dir.join("config.toml");
        if !config_path.exists() {
            return Ok(GlobalConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read global config: {}", config_path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse global config")
    }

    /// Loads project configuration from a specific root
    pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
        let config_path = project_root.join(PROJECT_CONFIG_FILE);

        if !config_path.exists() {
            return Ok(ProjectConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read project config: {}", config_path.display()))?;

        let config: ProjectConfig = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .with_context(|| format!("Failed to parse project config: {}", config_path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid project config: {}", config_path.display()))?;

        Ok(config)
    }

    /// Finds the project root by walking up from `start`
    ///
    /// A directory is a root when it holds `docket.toml` or a `categories/`
    /// directory.
    pub fn find_project_root_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();

        loop {
            let is_root = current.join(PROJECT_CONFIG_FILE).is_file()
                || current.join(LayoutConfig::default().categories_dir).is_dir();
            if is_root {
                return Some(current);
            }

            if !current.pop() {
                return None;
            }
        }
    }

    /// Finds the project root starting at the current directory
    pub fn find_project_root() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::find_project_root_from(&current)
    }

    /// Returns true if we're in a docket project
    pub fn is_in_project(&self) -> bool {
        self.project_root.is_some()
    }

    /// Returns the project root, or an error if not in a project
    pub fn require_project_root(&self) -> Result<&Path> {
        self.project_root
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("Not in a docket project. Run 'docket init' first."))
    }

    /// Saves the project configuration
    pub fn save_project(&self) -> Result<()> {
        let root = self.require_project_root()?;
        let config_path = root.join(PROJECT_CONFIG_FILE);

        let content =
            toml::to_string_pretty(&self.project).context("Failed to serialize project config")?;

        fs::write(&config_path, content)
            .with_context(|| format!("Failed to write project config: {}", config_path.display()))
    }
}
