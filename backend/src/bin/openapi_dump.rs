//! Print or write the Questlog OpenAPI document as JSON.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Context, Result};
use questlog::doc::ApiDoc;
use utoipa::OpenApi;

/// `openapi-dump` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "openapi-dump",
    about = "Emit the Questlog REST API description for client generators",
    version
)]
struct CliArgs {
    /// Write to this file instead of standard output.
    #[arg(long, short, value_name = "path")]
    output: Option<PathBuf>,
    /// Emit single-line JSON.
    #[arg(long)]
    compact: bool,
}

fn render(compact: bool) -> Result<String> {
    let doc = ApiDoc::openapi();
    let json = if compact {
        doc.to_json()
    } else {
        doc.to_pretty_json()
    };
    json.wrap_err("serialise OpenAPI document")
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = CliArgs::parse();
    let json = render(args.compact)?;
    match args.output {
        Some(path) => std::fs::write(&path, json)
            .wrap_err_with(|| format!("write {}", path.display()))?,
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{json}").wrap_err("write to stdout")?;
        }
    }
    Ok(())
}
