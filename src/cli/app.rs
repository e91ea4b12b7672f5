//! Main CLI application structure

use anyhow::Result;
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::{convert_cmd, export_cmd};

#[derive(Parser)]
#[command(name = "dashbook")]
#[command(author, version, about = "Export dashboard queries as notebook YAML documents")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Enable verbose logging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch a dashboard from the host application and export it
    Export(export_cmd::ExportArgs),

    /// Convert a local dashboard snapshot without contacting the host
    Convert(convert_cmd::ConvertArgs),
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    crate::logging::init(cli.verbose);
    let output = Output::new(cli.format);

    match cli.command {
        Commands::Export(args) => export_cmd::run(args, &output),
        Commands::Convert(args) => convert_cmd::run(args, &output),
    }
}
