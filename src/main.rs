//! Docket - Validate structured project documents and render them to Markdown

use std::process::ExitCode;

fn main() -> ExitCode {
    docket::cli::run()
}
