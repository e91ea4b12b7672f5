//! Host application API access
//!
//! The fetcher issues a single read against the dashboard resource with a
//! bounded 10 second wait. Credentials are an injected capability: the
//! session carries an optional API key and/or session cookie instead of
//! relying on an ambient global.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, COOKIE};
use tracing::debug;

use crate::domain::Dashboard;
use crate::error::{ExportError, ExportResult};

/// Bounded wait for the dashboard read
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Identity of a dashboard on the host application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DashboardId(u64);

impl DashboardId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for DashboardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for DashboardId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl FromStr for DashboardId {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
            return Err(ExportError::Validation(format!(
                "invalid dashboard id '{s}': expected digits"
            )));
        }
        s.parse::<u64>()
            .map(Self)
            .map_err(|e| ExportError::Validation(format!("invalid dashboard id '{s}': {e}")))
    }
}

/// Derives the dashboard identity from a page path.
///
/// The id is the leading digits of the segment following `dashboards`,
/// e.g. `/dashboards/42` or `/dashboards/42-sales-overview`.
pub fn dashboard_id_from_path(path: &str) -> Option<DashboardId> {
    let mut segments = path.split(['/', '?', '#']).filter(|s| !s.is_empty());
    while let Some(segment) = segments.next() {
        if segment == "dashboards" {
            let digits: String = segments
                .next()?
                .chars()
                .take_while(char::is_ascii_digit)
                .collect();
            return digits.parse::<u64>().ok().map(DashboardId);
        }
    }
    None
}

/// Derives the dashboard identity from a full page address
pub fn dashboard_id_from_url(url: &str) -> Option<DashboardId> {
    let path = match url.find("://") {
        Some(scheme_end) => {
            let rest = &url[scheme_end + 3..];
            match rest.find('/') {
                Some(slash) => &rest[slash..],
                None => return None,
            }
        }
        None => url,
    };
    dashboard_id_from_path(path)
}

/// Connection details for the host application
#[derive(Debug, Clone)]
pub struct HostSession {
    base_url: String,
    api_key: Option<String>,
    session_cookie: Option<String>,
}

impl HostSession {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            session_cookie: None,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_session_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.session_cookie = Some(cookie.into());
        self
    }

    /// Resource URL of a dashboard
    pub fn dashboard_endpoint(&self, id: DashboardId) -> String {
        format!(
            "{}/api/dashboards/{}",
            self.base_url.trim_end_matches('/'),
            id
        )
    }
}

/// Retrieves dashboard snapshots from the host application
pub struct DashboardFetcher {
    session: HostSession,
    client: reqwest::blocking::Client,
    timeout: Duration,
}

impl DashboardFetcher {
    pub fn new(session: HostSession) -> ExportResult<Self> {
        Self::with_timeout(session, FETCH_TIMEOUT)
    }

    pub fn with_timeout(session: HostSession, timeout: Duration) -> ExportResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ExportError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            session,
            client,
            timeout,
        })
    }

    /// Fetches one dashboard snapshot.
    ///
    /// Classification: non-2xx status becomes a server error carrying status
    /// and body text; an undecodable payload is a validation error; an
    /// elapsed wait is a timeout; everything else is a transport fault.
    pub fn fetch(&self, id: DashboardId) -> ExportResult<Dashboard> {
        let url = self.session.dashboard_endpoint(id);
        debug!(%url, "fetching dashboard");

        let mut request = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json");
        if let Some(key) = &self.session.api_key {
            request = request.header(AUTHORIZATION, format!("Key {key}"));
        }
        if let Some(cookie) = &self.session.session_cookie {
            request = request.header(COOKIE, cookie.clone());
        }

        let response = request.send().map_err(|e| self.classify(e))?;
        let status = response.status();
        let body = response
            .text()
            .unwrap_or_else(|_| "Unknown error".to_string());

        if !status.is_success() {
            return Err(ExportError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let dashboard = Dashboard::from_json_str(&body)?;
        dashboard.validate()?;
        debug!(id = dashboard.id, widgets = dashboard.widgets.len(), "dashboard fetched");
        Ok(dashboard)
    }

    fn classify(&self, err: reqwest::Error) -> ExportError {
        if err.is_timeout() {
            ExportError::Timeout(format!(
                "dashboard request exceeded {}s",
                self.timeout.as_secs()
            ))
        } else {
            ExportError::Transport(err.to_string())
        }
    }
}
