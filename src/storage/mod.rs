//! # Storage Layer
//!
//! File-system side of docket: project layout, configuration, document
//! loading, cross-document scans, schema validation and link checks.
//!
//! ## Project Structure
//!
//! ```text
//! <root>/
//! ├── docket.toml                    # Project configuration (optional)
//! └── categories/
//!     └── <category>/
//!         └── <doc_type>/
//!             ├── ai/document.yaml   # Source document
//!             ├── ai/scheme.json     # JSON Schema
//!             └── human/document.md  # Rendered Markdown
//! ```
//!
//! ## Key Types
//!
//! - [`Project`] - Entry point for accessing a docket project
//! - [`Config`] - Project and global configuration
//! - [`SchemaValidator`] - Compiled JSON Schema of a doc_type
//! - [`LinkResolver`] - Rewrites document links for rendered output

mod config;
mod document;
mod links;
mod project;
pub mod scan;
mod schema;

pub use config::{
    Config, ConfigError, GlobalConfig, LabelConfig, LayoutConfig, OutputFormat, ProjectConfig,
    RenderConfig, PROJECT_CONFIG_FILE,
};
pub use document::{load_value, load_yaml, meta_of, LoadError};
pub use links::{
    broken_markdown_links, broken_project_links, declared_links, missing_file_paths,
    relative_links, LinkResolver,
};
pub use project::{DocumentPath, Project, ProjectError};
pub use schema::{common_warnings, SchemaError, SchemaValidator, Violation};
