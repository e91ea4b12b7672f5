//! Output document model
//!
//! The notebook document an export produces: one page per qualifying widget,
//! each page a heading plus a SQL block. Field declaration order matters:
//! the YAML renderer writes fields in the order they are declared here.

use serde::{Deserialize, Serialize};

use super::id::ObjectId;

/// Schema version stamped on every exported document
pub const SCHEMA_VERSION: &str = "1.3.0";

/// Palette key stamped on every exported document
pub const DEFAULT_PALETTE: &str = "DEFAULT";

/// Kind stamped on every exported page
pub const DEFAULT_PAGE_KIND: &str = "DEFAULT";

/// Fixed layout width of an exported page
pub const PAGE_FIXED_WIDTH: u32 = 800;

/// Root of the exported document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotebookDocument {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub schema_version: String,
    pub icon: Option<String>,
    pub name: String,
    pub palette_key: String,
    pub pages: Vec<NotebookPage>,
    pub notebook_param_widgets: Vec<serde_json::Value>,
}

impl NotebookDocument {
    /// Creates an empty document carrying the fixed schema constants
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ObjectId::generate(),
            schema_version: SCHEMA_VERSION.to_string(),
            icon: None,
            name: name.into(),
            palette_key: DEFAULT_PALETTE.to_string(),
            pages: Vec::new(),
            notebook_param_widgets: Vec::new(),
        }
    }

    /// All identity tokens in the document, in tree order
    pub fn identity_tokens(&self) -> Vec<&ObjectId> {
        let mut tokens = vec![&self.id];
        for page in &self.pages {
            tokens.push(&page.id);
            for node in &page.body.content {
                node.collect_tokens(&mut tokens);
            }
        }
        tokens
    }
}

/// One page of the exported document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotebookPage {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub kind: String,
    pub name: String,
    pub body: PageBody,
    pub order: u32,
    pub width: PageWidth,
    pub notebook_param_widget_values: Vec<serde_json::Value>,
    pub page_param_widgets: Vec<serde_json::Value>,
    pub page_param_widget_values: Vec<serde_json::Value>,
}

impl NotebookPage {
    /// Creates a page with the fixed kind and width metadata
    pub fn new(name: impl Into<String>, order: u32, body: PageBody) -> Self {
        Self {
            id: ObjectId::generate(),
            kind: DEFAULT_PAGE_KIND.to_string(),
            name: name.into(),
            body,
            order,
            width: PageWidth::default(),
            notebook_param_widget_values: Vec::new(),
            page_param_widgets: Vec::new(),
            page_param_widget_values: Vec::new(),
        }
    }
}

/// Page content tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageBody {
    #[serde(rename = "type")]
    pub kind: String,
    pub content: Vec<BodyNode>,
}

impl PageBody {
    pub fn doc(content: Vec<BodyNode>) -> Self {
        Self {
            kind: "doc".to_string(),
            content,
        }
    }
}

/// Fixed layout-width metadata of a page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageWidth {
    pub fixed_width: u32,
    pub width_type: String,
    pub max_width: u32,
}

impl Default for PageWidth {
    fn default() -> Self {
        Self {
            fixed_width: PAGE_FIXED_WIDTH,
            width_type: "RANGE".to_string(),
            max_width: PAGE_FIXED_WIDTH,
        }
    }
}

/// A node of a page's content tree
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BodyNode {
    #[serde(rename = "heading")]
    Heading {
        attrs: HeadingAttrs,
        content: Vec<BodyNode>,
    },
    #[serde(rename = "sqlBlock")]
    SqlBlock {
        attrs: SqlBlockAttrs,
        content: Vec<BodyNode>,
    },
    #[serde(rename = "sqlBlockName")]
    SqlBlockName { content: Vec<BodyNode> },
    #[serde(rename = "sqlBlockBody")]
    SqlBlockBody { content: Vec<BodyNode> },
    #[serde(rename = "text")]
    Text { text: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadingAttrs {
    pub level: u8,
    pub hide_default: bool,
    pub disabled_hide: bool,
    pub link_id: ObjectId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SqlBlockAttrs {
    pub link_id: ObjectId,
    pub sql_id: ObjectId,
    pub conn_id: ObjectId,
    pub args: Vec<serde_json::Value>,
}

impl BodyNode {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// A heading wrapping a single text node
    pub fn heading(level: u8, text: &str) -> Self {
        Self::Heading {
            attrs: HeadingAttrs {
                level,
                hide_default: false,
                disabled_hide: false,
                link_id: ObjectId::generate(),
            },
            content: vec![Self::text(text)],
        }
    }

    /// A SQL block: name and body sub-nodes, each wrapping a text node.
    /// The connection id is a placeholder the importing side rebinds.
    pub fn sql_block(name: &str, sql: &str) -> Self {
        Self::SqlBlock {
            attrs: SqlBlockAttrs {
                link_id: ObjectId::generate(),
                sql_id: ObjectId::generate(),
                conn_id: ObjectId::generate(),
                args: Vec::new(),
            },
            content: vec![
                Self::SqlBlockName {
                    content: vec![Self::text(name)],
                },
                Self::SqlBlockBody {
                    content: vec![Self::text(sql)],
                },
            ],
        }
    }

    fn collect_tokens<'a>(&'a self, tokens: &mut Vec<&'a ObjectId>) {
        match self {
            Self::Heading { attrs, content } => {
                tokens.push(&attrs.link_id);
                for node in content {
                    node.collect_tokens(tokens);
                }
            }
            Self::SqlBlock { attrs, content } => {
                tokens.push(&attrs.link_id);
                tokens.push(&attrs.sql_id);
                tokens.push(&attrs.conn_id);
                for node in content {
                    node.collect_tokens(tokens);
                }
            }
            Self::SqlBlockName { content } | Self::SqlBlockBody { content } => {
                for node in content {
                    node.collect_tokens(tokens);
                }
            }
            Self::Text { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_document_carries_schema_constants() {
        let doc = NotebookDocument::new("Sales");
        assert_eq!(doc.schema_version, SCHEMA_VERSION);
        assert_eq!(doc.palette_key, DEFAULT_PALETTE);
        assert!(doc.icon.is_none());
        assert!(doc.pages.is_empty());
    }

    #[test]
    fn sql_block_wraps_name_and_body() {
        let node = BodyNode::sql_block("Q1", "SELECT 1");
        let json = serde_json::to_value(&node).unwrap();

        assert_eq!(json["type"], "sqlBlock");
        assert_eq!(json["attrs"]["args"], serde_json::json!([]));
        assert_eq!(json["content"][0]["type"], "sqlBlockName");
        assert_eq!(json["content"][0]["content"][0]["text"], "Q1");
        assert_eq!(json["content"][1]["type"], "sqlBlockBody");
        assert_eq!(json["content"][1]["content"][0]["text"], "SELECT 1");
    }

    #[test]
    fn heading_serializes_camel_case_attrs() {
        let node = BodyNode::heading(2, "Q1");
        let json = serde_json::to_value(&node).unwrap();

        assert_eq!(json["type"], "heading");
        assert_eq!(json["attrs"]["level"], 2);
        assert_eq!(json["attrs"]["hideDefault"], false);
        assert_eq!(json["attrs"]["disabledHide"], false);
        assert!(json["attrs"]["linkId"].is_string());
    }

    #[test]
    fn identity_tokens_walks_the_whole_tree() {
        let mut doc = NotebookDocument::new("Sales");
        let body = PageBody::doc(vec![
            BodyNode::heading(2, "Q1"),
            BodyNode::sql_block("Q1", "SELECT 1"),
        ]);
        doc.pages.push(NotebookPage::new("Q1", 1, body));

        // document + page + heading link + sqlBlock link/sql/conn
        assert_eq!(doc.identity_tokens().len(), 6);
    }
}
