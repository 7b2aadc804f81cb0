//! blockgraph command-line tool
//!
//! Validates, normalizes, patches and resolves documents against a schema
//! definition file. Results go to stdout as JSON; logs go to stderr.
//!
//! Usage:
//!   blockgraph --schema schema.json validate page.json
//!   blockgraph --schema schema.json resolve page.json --context ctx.json

use anyhow::Result;
use blockgraph_cli::{
    describe, load_schema, normalize_file, patch_file, render, resolve_file, validate_file,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "blockgraph")]
#[command(about = "Schema-governed block document tool")]
struct Args {
    /// Path to the schema definition file
    #[arg(short, long)]
    schema: PathBuf,

    /// Pretty-print JSON output
    #[arg(short, long)]
    pretty: bool,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a document; exits with status 1 when invalid
    Validate { content: PathBuf },
    /// Flatten inline nodes into canonical form
    Normalize { content: PathBuf },
    /// Resolve a document into a nested tree
    Resolve {
        content: PathBuf,
        /// Page context file for context overrides
        #[arg(short, long)]
        context: Option<PathBuf>,
    },
    /// Apply a patch (one op or an array of ops) to a document
    Patch {
        content: PathBuf,
        patch: PathBuf,
        /// Fail when an op targets a missing node
        #[arg(long)]
        strict: bool,
    },
    /// Print the registered block types and the document JSON Schema
    Describe,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let schema = load_schema(&args.schema)?;
    info!("Schema loaded: {} block type(s)", schema.len());

    let (output, code) = match &args.command {
        Command::Validate { content } => {
            let report = validate_file(&schema, content)?;
            let code = if report.is_valid() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            };
            (render(&report, args.pretty)?, code)
        }
        Command::Normalize { content } => {
            let document = normalize_file(&schema, content)?;
            (render(&document, args.pretty)?, ExitCode::SUCCESS)
        }
        Command::Resolve { content, context } => {
            let tree = resolve_file(&schema, content, context.as_deref())?;
            (render(&tree, args.pretty)?, ExitCode::SUCCESS)
        }
        Command::Patch {
            content,
            patch,
            strict,
        } => {
            let document = patch_file(content, patch, *strict)?;
            (render(&document, args.pretty)?, ExitCode::SUCCESS)
        }
        Command::Describe => (render(&describe(&schema), args.pretty)?, ExitCode::SUCCESS),
    };

    println!("{output}");
    Ok(code)
}
