//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Commands
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Project | Layout management | `init`, `list` |
//! | Render | Markdown generation | `render`, `build` |
//! | Query | Progress and task state | `progress`, `tasks` |
//! | Checks | Schema and link validation | `validate`, `check-links` |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug logs on stderr; `RUST_LOG` overrides:
//! ```bash
//! docket --verbose build --all
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod build;
mod output;
mod project_cmd;
mod query;
mod render_cmd;
mod validate;

pub use app::{run, Cli, Commands};
pub use output::{Output, OutputFormat};
pub use validate::{ValidateOptions, ValidationReport};
