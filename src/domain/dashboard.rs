//! Source dashboard model
//!
//! Read-only snapshots of the host application's dashboard resource, fetched
//! once per export. A widget qualifies for export iff its visualization
//! carries a query with non-empty text; everything else on the snapshot is
//! display metadata the transform ignores.

use serde::{Deserialize, Serialize};

use crate::error::{ExportError, ExportResult};

/// A dashboard snapshot as returned by `GET /api/dashboards/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub widgets: Vec<Widget>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// A positioned panel on a dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Widget {
    #[serde(default)]
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visualization: Option<Visualization>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Display wrapper around a query; its metadata is not exported
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Visualization {
    #[serde(default)]
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<Query>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// The query backing a visualization; only `name` and `query` are consumed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    #[serde(default)]
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Dashboard {
    /// Parses a snapshot from JSON, classifying decode failures
    pub fn from_json_str(raw: &str) -> ExportResult<Self> {
        serde_json::from_str(raw)
            .map_err(|e| ExportError::Validation(format!("dashboard snapshot is malformed: {e}")))
    }

    /// Checks the invariants the transform relies on
    pub fn validate(&self) -> ExportResult<()> {
        if self.name.trim().is_empty() {
            return Err(ExportError::Validation(
                "dashboard name must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Queries of the qualifying widgets, in widget order
    pub fn export_queries(&self) -> impl Iterator<Item = &Query> {
        self.widgets.iter().filter_map(Widget::export_query)
    }
}

impl Widget {
    /// Returns the query to export, if this widget qualifies
    pub fn export_query(&self) -> Option<&Query> {
        self.visualization
            .as_ref()?
            .query
            .as_ref()
            .filter(|q| !q.query.is_empty())
    }
}

impl Query {
    /// Page title for this query: its name, or `Query {position}` when unnamed
    pub fn display_name(&self, position: usize) -> String {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("Query {position}"),
        }
    }
}

#[cfg(test)]
impl Dashboard {
    pub fn sample(name: &str, widgets: Vec<Widget>) -> Self {
        Self {
            id: 1,
            name: name.to_string(),
            slug: None,
            widgets,
            tags: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }
}

#[cfg(test)]
impl Widget {
    pub fn query_widget(name: Option<&str>, sql: &str) -> Self {
        Self {
            id: 0,
            visualization: Some(Visualization {
                id: 0,
                name: None,
                query: Some(Query {
                    id: 0,
                    name: name.map(str::to_string),
                    query: sql.to_string(),
                    created_at: None,
                    updated_at: None,
                }),
                kind: None,
            }),
            text: None,
        }
    }

    pub fn text_widget(text: &str) -> Self {
        Self {
            id: 0,
            visualization: None,
            text: Some(text.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_snapshot_with_unknown_fields() {
        let raw = r#"{
            "id": 7,
            "name": "Sales",
            "slug": "sales",
            "user_id": 3,
            "layout": "[]",
            "widgets": [
                {"id": 1, "visualization": {"id": 2, "type": "TABLE",
                 "query": {"id": 3, "name": "Q1", "query": "SELECT 1"}}},
                {"id": 4, "text": "note"}
            ]
        }"#;

        let dashboard = Dashboard::from_json_str(raw).unwrap();
        assert_eq!(dashboard.name, "Sales");
        assert_eq!(dashboard.widgets.len(), 2);
        assert_eq!(dashboard.export_queries().count(), 1);
    }

    #[test]
    fn missing_required_fields_are_validation_errors() {
        let err = Dashboard::from_json_str(r#"{"id": 7, "widgets": []}"#).unwrap_err();
        assert!(err.is_validation());

        let err = Dashboard::from_json_str(r#"{"id": 7, "name": "x", "widgets": 3}"#).unwrap_err();
        assert!(err.is_validation());

        let err = Dashboard::from_json_str("not json").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn empty_name_fails_validation() {
        let dashboard = Dashboard::sample("  ", Vec::new());
        assert!(dashboard.validate().unwrap_err().is_validation());
    }

    #[test]
    fn widget_with_empty_query_text_does_not_qualify() {
        let widget = Widget::query_widget(Some("Q"), "");
        assert!(widget.export_query().is_none());
    }

    #[test]
    fn text_widget_does_not_qualify() {
        assert!(Widget::text_widget("note").export_query().is_none());
    }

    #[test]
    fn display_name_falls_back_for_unnamed_and_empty_names() {
        let named = Widget::query_widget(Some("Q1"), "SELECT 1");
        assert_eq!(named.export_query().unwrap().display_name(1), "Q1");

        let unnamed = Widget::query_widget(None, "SELECT 1");
        assert_eq!(unnamed.export_query().unwrap().display_name(2), "Query 2");

        let blank = Widget::query_widget(Some(""), "SELECT 1");
        assert_eq!(blank.export_query().unwrap().display_name(3), "Query 3");
    }
}
