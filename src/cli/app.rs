//! Main CLI application structure

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use super::output::{Output, OutputFormat};
use super::{build, project_cmd, query, render_cmd, validate};
use crate::storage::{Config, Project};

#[derive(Parser)]
#[command(name = "docket")]
#[command(author, version, about = "Validate and render structured project documents")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config, then text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable debug logging on stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project root (defaults to the nearest directory with docket.toml or categories/)
    #[arg(long, global = true, env = "DOCKET_ROOT")]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new docket project
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// List categories and document types that have a schema
    List,

    /// Render a document to Markdown
    Render {
        /// YAML source document
        input: PathBuf,

        /// Write to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Date used for overdue checks (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// Show the progress roll-up of a WBS document
    Progress {
        /// YAML source document
        input: PathBuf,
    },

    /// Show the task state of every document
    Tasks,

    /// Validate a document against its JSON Schema
    Validate {
        /// YAML source document
        input: PathBuf,

        /// Schema file (defaults to the schema of meta.category/meta.doc_type)
        #[arg(long, short)]
        schema: Option<PathBuf>,

        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,

        /// Skip the existence check of referenced file paths
        #[arg(long)]
        skip_file_path_check: bool,
    },

    /// Check relative links in rendered Markdown
    CheckLinks {
        /// Markdown file (defaults to every rendered document)
        input: Option<PathBuf>,
    },

    /// Validate and render documents
    Build {
        /// A single YAML source document
        input: Option<PathBuf>,

        /// Process every category
        #[arg(long, short)]
        all: bool,

        /// Process one category
        #[arg(long, short)]
        category: Option<String>,

        /// Validate without rendering
        #[arg(long)]
        validate_only: bool,

        /// Date used for overdue checks (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        today: Option<NaiveDate>,
    },
}

/// Main entry point for the CLI
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let format = cli.format.unwrap_or_else(default_format);
    let output = Output::new(format);

    match execute(cli.command, cli.root.as_deref(), &output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output.error(&format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so stdout stays clean for Markdown and JSON
fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

fn default_format() -> OutputFormat {
    match Config::global_only() {
        Ok(config) => config.global.default_format,
        Err(err) => {
            tracing::warn!(error = %format!("{:#}", err), "Ignoring global config");
            OutputFormat::default()
        }
    }
}

fn execute(command: Commands, root: Option<&Path>, output: &Output) -> Result<()> {
    match command {
        Commands::Init { path } => {
            let path = root.map(Path::to_path_buf).unwrap_or(path);
            project_cmd::init(output, &path)
        }
        Commands::List => project_cmd::list(output, &open_project(root)?),

        Commands::Render {
            input,
            output: out,
            today,
        } => render_cmd::render(output, &open_project(root)?, &input, out.as_deref(), today),

        Commands::Progress { input } => query::progress(output, &input),
        Commands::Tasks => query::tasks(output, &open_project(root)?),

        Commands::Validate {
            input,
            schema,
            strict,
            skip_file_path_check,
        } => validate::validate(
            output,
            &open_project(root)?,
            &input,
            &validate::ValidateOptions {
                schema,
                strict,
                check_file_paths: !skip_file_path_check,
            },
        ),
        Commands::CheckLinks { input } => {
            validate::check_links(output, &open_project(root)?, input.as_deref())
        }

        Commands::Build {
            input,
            all,
            category,
            validate_only,
            today,
        } => {
            let target = match (input, category) {
                (_, _) if all => build::Target::All,
                (Some(input), _) => build::Target::File(input),
                (None, Some(category)) => build::Target::Category(category),
                (None, None) => build::Target::All,
            };
            build::build(output, &open_project(root)?, target, validate_only, today)
        }
    }
}

/// Opens the project at `--root`, or the one containing the current directory
fn open_project(root: Option<&Path>) -> Result<Project> {
    let project = match root {
        Some(root) => Project::open(root)?,
        None => Project::open_current()?,
    };
    debug!(root = %project.root().display(), "Opened project");
    Ok(project)
}

/// Today's local date unless overridden
pub(super) fn today_or(today: Option<NaiveDate>) -> NaiveDate {
    today.unwrap_or_else(|| chrono::Local::now().date_naive())
}
