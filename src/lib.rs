//! dashbook - export analytics dashboards as notebook documents
//!
//! The library models the embedded export tool end to end: a host-page model
//! with mutation-driven control injection, a bounded-wait broker bridging
//! the page context and the transform worker, the pure dashboard-to-notebook
//! transform, and the coordinator that drives fetch → transform → deliver.
//! The `dashbook` binary exposes the same pipeline as CLI commands.

pub mod api;
pub mod broker;
pub mod cli;
pub mod config;
pub mod convert;
pub mod domain;
pub mod error;
pub mod export;
pub mod logging;
pub mod page;

pub use domain::{Dashboard, NotebookDocument, ObjectId, Query, Visualization, Widget};
pub use error::{ExportError, ExportResult};
