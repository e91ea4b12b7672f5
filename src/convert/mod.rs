//! Dashboard-to-document conversion
//!
//! The pure transform from a dashboard snapshot to the notebook document,
//! YAML rendering, and the output filename rule.

pub mod filename;
pub mod transform;

pub use filename::{export_filename, sanitize_name};
pub use transform::{dashboard_to_yaml, render_yaml, transform};
