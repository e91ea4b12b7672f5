//! Error taxonomy for the export pipeline
//!
//! Every layer classifies the failures it understands and rewraps anything
//! unknown with the original message text. Failures are never retried; the
//! coordinator is the only layer that turns them into user-visible notices.

use thiserror::Error;

/// The error type shared by the export pipeline
#[derive(Debug, Error)]
pub enum ExportError {
    /// Malformed or missing required input (snapshot fields, page address)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Network or channel fault outside the bounded waits
    #[error("Transport error: {0}")]
    Transport(String),

    /// A bounded wait elapsed (dashboard fetch or worker round-trip)
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Non-success response from the host application
    #[error("Server error: {status} - {body}")]
    Server { status: u16, body: String },

    /// The transform produced no usable output
    #[error("Conversion error: {0}")]
    Conversion(String),

    /// The file delivery boundary failed
    #[error("Delivery error: {0}")]
    Delivery(String),

    /// The worker bridge failed to produce a reply
    #[error("Broker error: {0}")]
    Broker(String),
}

impl ExportError {
    /// Check if this is a bounded-wait expiry
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Status code of a server failure, if that is what this is
    pub fn server_status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for export operations
pub type ExportResult<T> = Result<T, ExportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_display_includes_status_and_body() {
        let err = ExportError::Server {
            status: 404,
            body: "not found".into(),
        };
        assert_eq!(err.to_string(), "Server error: 404 - not found");
        assert_eq!(err.server_status(), Some(404));
    }

    #[test]
    fn timeout_predicate() {
        assert!(ExportError::Timeout("fetch".into()).is_timeout());
        assert!(!ExportError::Validation("x".into()).is_timeout());
    }
}
