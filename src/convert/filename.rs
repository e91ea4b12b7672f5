//! Output filename derivation
//!
//! `dashboard_{sanitized-name}_{timestamp}.yml`, where the name keeps only
//! word characters, whitespace and hyphens, collapses whitespace runs to a
//! single underscore, lowercases, and is capped at 50 characters. The
//! timestamp is the UTC capture instant.

use chrono::{DateTime, Utc};

/// Maximum length of the sanitized name portion
pub const MAX_NAME_LEN: usize = 50;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Sanitizes a dashboard name for use in a filename.
///
/// Idempotent: sanitizing an already-sanitized name returns it unchanged.
pub fn sanitize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_separator = false;

    for c in name.chars() {
        if c.is_whitespace() {
            pending_separator = true;
        } else if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            if pending_separator {
                out.push('_');
                pending_separator = false;
            }
            out.push(c.to_ascii_lowercase());
        }
        // everything else is stripped
    }
    if pending_separator {
        out.push('_');
    }

    out.truncate(MAX_NAME_LEN);
    out
}

/// Full output filename for a dashboard captured at `at`
pub fn export_filename(dashboard_name: &str, at: DateTime<Utc>) -> String {
    format!(
        "dashboard_{}_{}.yml",
        sanitize_name(dashboard_name),
        at.format(TIMESTAMP_FORMAT)
    )
}
