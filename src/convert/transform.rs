//! Dashboard-to-notebook transform
//!
//! Pure mapping from a dashboard snapshot to the output document tree, plus
//! YAML rendering. Deterministic except for the freshly generated identity
//! tokens.

use crate::domain::{BodyNode, Dashboard, NotebookDocument, NotebookPage, PageBody};
use crate::error::{ExportError, ExportResult};

/// Maps a dashboard to a notebook document.
///
/// One page per qualifying widget, in widget order, with a dense 1-based
/// `order` sequence. Unnamed queries fall back to `Query {position}`.
pub fn transform(dashboard: &Dashboard) -> NotebookDocument {
    let mut doc = NotebookDocument::new(&dashboard.name);

    for (index, query) in dashboard.export_queries().enumerate() {
        let position = index + 1;
        let title = query.display_name(position);
        let body = PageBody::doc(vec![
            BodyNode::heading(2, &title),
            BodyNode::sql_block(&title, &query.query),
        ]);
        doc.pages.push(NotebookPage::new(title, position as u32, body));
    }

    doc
}

/// Renders a document as YAML.
///
/// Field insertion order is preserved, lines are not wrapped, and every node
/// is written out in full (no anchors or aliases). Empty output is a
/// conversion failure.
pub fn render_yaml(doc: &NotebookDocument) -> ExportResult<String> {
    let yaml = serde_yaml::to_string(doc)
        .map_err(|e| ExportError::Conversion(format!("failed to serialize document: {e}")))?;

    if yaml.trim().is_empty() {
        return Err(ExportError::Conversion(
            "serialized document is empty".into(),
        ));
    }

    Ok(yaml)
}

/// Validates, transforms and renders in one step (the worker's operation)
pub fn dashboard_to_yaml(dashboard: &Dashboard) -> ExportResult<String> {
    dashboard.validate()?;
    render_yaml(&transform(dashboard))
}
