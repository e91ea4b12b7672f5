//! The `export` command: full pipeline against a live host

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use super::output::Output;
use crate::api::{dashboard_id_from_url, DashboardFetcher, DashboardId, HostSession};
use crate::broker::TransformWorker;
use crate::config::Config;
use crate::export::{DirEmitter, ExportCoordinator, LogNotifier};

#[derive(Args)]
pub struct ExportArgs {
    /// Dashboard id, or the dashboard's page URL
    pub dashboard: String,

    /// Base URL of the host application
    #[arg(long, env = "DASHBOOK_BASE_URL")]
    pub base_url: Option<String>,

    /// API key used to authenticate against the host
    #[arg(long, env = "DASHBOOK_API_KEY")]
    pub api_key: Option<String>,

    /// Session cookie used to authenticate against the host
    #[arg(long)]
    pub cookie: Option<String>,

    /// Directory the exported file is written to
    #[arg(long, short = 'o')]
    pub out_dir: Option<PathBuf>,
}

pub fn run(args: ExportArgs, output: &Output) -> Result<()> {
    let config = Config::load()?;

    let base_url = args
        .base_url
        .or(config.host.base_url)
        .context("No base URL configured; pass --base-url or set DASHBOOK_BASE_URL")?;
    let id = resolve_dashboard(&args.dashboard)?;

    let mut session = HostSession::new(base_url);
    if let Some(api_key) = args.api_key.or(config.host.api_key) {
        session = session.with_api_key(api_key);
    }
    if let Some(cookie) = args.cookie {
        session = session.with_session_cookie(cookie);
    }

    let out_dir = args
        .out_dir
        .or(config.export.output_dir)
        .unwrap_or_else(|| PathBuf::from("."));

    let fetcher = DashboardFetcher::new(session)?;
    let (broker, worker) = TransformWorker::spawn()?;
    let coordinator = ExportCoordinator::new(
        fetcher,
        broker,
        Box::new(DirEmitter::new(out_dir)),
        Box::new(LogNotifier),
    );

    let result = coordinator.export_dashboard(id);
    drop(coordinator); // hang up so the worker can exit
    worker.join();

    let outcome = result?;
    if output.is_json() {
        output.data(&serde_json::json!({
            "dashboard": outcome.dashboard,
            "file": outcome.path.display().to_string(),
        }));
    } else {
        output.success(&format!(
            "Exported '{}' to {}",
            outcome.dashboard,
            outcome.path.display()
        ));
    }
    Ok(())
}

fn resolve_dashboard(reference: &str) -> Result<DashboardId> {
    if let Ok(id) = reference.parse::<DashboardId>() {
        return Ok(id);
    }
    dashboard_id_from_url(reference)
        .with_context(|| format!("Could not derive a dashboard id from '{reference}'"))
}
