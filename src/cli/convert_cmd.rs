//! The `convert` command: offline snapshot-to-document conversion

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;

use super::output::Output;
use crate::convert::{dashboard_to_yaml, export_filename};
use crate::domain::Dashboard;
use crate::export::{DirEmitter, FileEmitter};

#[derive(Args)]
pub struct ConvertArgs {
    /// Path to a dashboard JSON snapshot (use '-' for stdin)
    pub input: PathBuf,

    /// Directory the document is written to
    #[arg(long, short = 'o')]
    pub out_dir: Option<PathBuf>,

    /// Print the document to stdout instead of writing a file
    #[arg(long)]
    pub stdout: bool,
}

pub fn run(args: ConvertArgs, output: &Output) -> Result<()> {
    let raw = if args.input.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read snapshot from stdin")?;
        buf
    } else {
        std::fs::read_to_string(&args.input)
            .with_context(|| format!("Failed to read snapshot: {}", args.input.display()))?
    };

    let dashboard = Dashboard::from_json_str(&raw)?;
    let yaml = dashboard_to_yaml(&dashboard)?;

    if args.stdout {
        print!("{yaml}");
        return Ok(());
    }

    let out_dir = args.out_dir.unwrap_or_else(|| PathBuf::from("."));
    let filename = export_filename(&dashboard.name, Utc::now());
    let path = DirEmitter::new(out_dir).save(&yaml, &filename)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "dashboard": dashboard.name,
            "pages": dashboard.export_queries().count(),
            "file": path.display().to_string(),
        }));
    } else {
        output.success(&format!(
            "Converted '{}' to {}",
            dashboard.name,
            path.display()
        ));
    }
    Ok(())
}
