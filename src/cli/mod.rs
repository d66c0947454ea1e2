//! CLI command definitions for composed-vars
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

use crate::format::OutputFormat;
use crate::logging::LogTarget;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Compose custom and environment variables for a service stage
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Service document, relative to the service path
    /// (default: probe serverless.{yml,yaml,json,js})
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Service directory that variable files are resolved against
    #[arg(short = 'p', long, default_value = ".", global = true)]
    pub service_path: PathBuf,

    /// Stage to compose (overrides provider.stage)
    #[arg(short, long, global = true)]
    pub stage: Option<String>,

    /// Allow `.js` module sources, evaluated with node
    #[arg(long, global = true)]
    pub allow_modules: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: LogTarget,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Display variables as composed at load time
    Merged,

    /// Display variables as they currently stand in the service
    Computed,

    /// Write the composed variables as JSON or YAML (default if no subcommand given)
    Render(RenderArgs),
}

/// Arguments for the render subcommand
#[derive(Args, Debug, Default)]
pub struct RenderArgs {
    /// Output format: json (default) or yaml
    #[arg(short, long, default_value = "json", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Output file (stdout if omitted)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}
