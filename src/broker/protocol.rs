//! Broker message types
//!
//! Requests are tagged by an `action` string; responses carry a success flag
//! with either serialized document data or an error message. Both sides of
//! the channel exchange these as serialized JSON, never as shared state.

use serde::{Deserialize, Serialize};

use crate::domain::Dashboard;
use crate::error::{ExportError, ExportResult};

/// A request crossing into the worker context
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum BrokerRequest {
    #[serde(rename = "exportDashboard")]
    ExportDashboard {
        #[serde(rename = "dashboardData")]
        dashboard_data: Dashboard,
    },
}

impl BrokerRequest {
    pub fn export(dashboard: Dashboard) -> Self {
        Self::ExportDashboard {
            dashboard_data: dashboard,
        }
    }
}

/// A terminal reply for one request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerResponse {
    /// Whether the operation succeeded
    pub success: bool,

    /// Serialized document (if success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,

    /// Error message (if failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BrokerResponse {
    pub fn success(data: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data.into()),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }

    /// Unwraps the reply, rewrapping a failure with its original text
    pub fn into_result(self) -> ExportResult<String> {
        if self.success {
            self.data
                .ok_or_else(|| ExportError::Broker("response carries no data".into()))
        } else {
            Err(ExportError::Broker(
                self.error.unwrap_or_else(|| "Unknown error".into()),
            ))
        }
    }
}
